//! Demonstrates checkpoint compaction: folding the write-ahead log into a
//! snapshot so recovery does not replay the full history.
//!
//! Run with: cargo run -p loglite --example checkpoint_demo

use loglite::{Database, CHECKPOINT_FILE, WAL_FILE};
use std::path::Path;

fn log_len(dir: &str) -> u64 {
    std::fs::metadata(Path::new(dir).join(WAL_FILE))
        .map(|m| m.len())
        .unwrap_or(0)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let db_path = "./demo_checkpoint";

    println!("=== Loglite Checkpoint Demo ===\n");

    if Path::new(db_path).exists() {
        std::fs::remove_dir_all(db_path)?;
    }

    let db = Database::open(db_path)?;

    // A burst of writes, many of them overwriting the same key.
    println!("📝 Writing 1000 updates to 10 keys...");
    for i in 0..1000 {
        db.put(&format!("counter:{}", i % 10), &i.to_string())?;
    }
    println!("   Log size before checkpoint: {} bytes", log_len(db_path));

    // The checkpoint captures the 10 live entries and truncates the log.
    println!("\n📸 Taking a checkpoint...");
    db.checkpoint()?;
    println!("   Log size after checkpoint:  {} bytes", log_len(db_path));
    println!(
        "   Snapshot written to: {}/{}",
        db_path, CHECKPOINT_FILE
    );

    // Post-checkpoint writes append to the fresh log.
    db.put("counter:0", "final")?;
    db.close()?;

    // Recovery loads the snapshot and replays only the short fresh log.
    println!("\n🔓 Reopening...");
    let db = Database::open(db_path)?;
    assert_eq!(db.get("counter:0").as_deref(), Some("final"));
    assert_eq!(db.get("counter:9").as_deref(), Some("999"));
    println!("   counter:0 = {:?}", db.get("counter:0"));
    println!("   counter:9 = {:?}", db.get("counter:9"));
    println!("   ✅ State recovered from snapshot + fresh log");

    std::fs::remove_dir_all(db_path)?;
    println!("\n=== Demo Complete! ===");

    Ok(())
}
