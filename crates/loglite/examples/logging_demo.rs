use loglite::logging::LogConfig;
use loglite::Database;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize debug-level logging to stdout
    let _guard = LogConfig::debug().init()?;

    println!("=== Loglite Debug Logging Demo ===\n");

    let dir = tempfile_dir()?;
    let db = Database::open(&dir)?;

    println!("\n1. Writing data with debug logs...");
    db.put("user:alice", "Alice Smith - Engineer")?;
    db.put("user:bob", "Bob Jones - Manager")?;

    println!("\n2. Reading data...");
    if let Some(value) = db.get("user:alice") {
        println!("Found: {}", value);
    }

    println!("\n3. Deleting with debug logs...");
    db.delete("user:bob")?;

    println!("\n4. Checkpointing with debug logs...");
    db.checkpoint()?;

    db.close()?;
    std::fs::remove_dir_all(&dir)?;

    println!("\n=== Debug Logging Demo Complete ===");

    Ok(())
}

fn tempfile_dir() -> std::io::Result<std::path::PathBuf> {
    let dir = std::env::temp_dir().join("loglite_logging_demo");
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
