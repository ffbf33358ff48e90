//! Demonstrates Loglite's write-ahead log durability.
//!
//! Run with: cargo run -p loglite --example durability_demo

use loglite::Database;
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let db_path = "./demo_database";

    println!("=== Loglite Durability Demo ===\n");

    // Clean up any previous demo data
    if Path::new(db_path).exists() {
        std::fs::remove_dir_all(db_path)?;
        println!("🧹 Cleaned up previous demo data\n");
    }

    // PART 1: Write data
    println!("📝 PART 1: Writing data...");
    {
        let db = Database::open(db_path)?;

        db.put("user:1:name", "Alice")?;
        db.put("user:1:role", "admin")?;
        db.put("user:2:name", "Bob")?;
        db.put("user:2:role", "user")?;

        println!("   ✅ Stored 2 users");
        println!("   📁 Every write is in {}/wal.log before put() returns", db_path);

        db.close()?;
    }
    println!("   🔒 Database closed\n");

    // PART 2: Reopen and verify the log replayed
    println!("🔓 PART 2: Reopening and replaying the log...");
    {
        let db = Database::open(db_path)?;

        println!("   User 1: {:?}", db.get("user:1:name"));
        println!("   User 2: {:?}", db.get("user:2:name"));

        assert_eq!(db.get("user:1:name").as_deref(), Some("Alice"));
        assert_eq!(db.get("user:2:name").as_deref(), Some("Bob"));
        println!("   ✅ All data recovered from the write-ahead log");
    }
    println!();

    // PART 3: Updates and deletes are logged the same way
    println!("🔄 PART 3: Updating and deleting...");
    {
        let db = Database::open(db_path)?;

        db.put("user:1:role", "superadmin")?;
        println!("   📝 Updated Alice's role to 'superadmin'");

        db.delete("user:2:role")?;
        println!("   🗑️  Deleted Bob's role");

        db.close()?;
    }
    println!();

    // PART 4: Final verification
    println!("✅ PART 4: Final verification...");
    {
        let db = Database::open(db_path)?;

        assert_eq!(db.get("user:1:role").as_deref(), Some("superadmin"));
        assert_eq!(db.get("user:2:role"), None);

        println!("   Alice's role: {:?}", db.get("user:1:role"));
        println!("   Bob's role: {:?}", db.get("user:2:role"));
        println!("   ✅ All assertions passed!");
    }

    // Clean up demo
    std::fs::remove_dir_all(db_path)?;
    println!("\n🧹 Cleaned up demo database");
    println!("\n=== Demo Complete! ===");

    Ok(())
}
