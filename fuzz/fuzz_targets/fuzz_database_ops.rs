#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use loglite::Database;

#[derive(Arbitrary, Debug)]
enum DbOp {
    Put { key: String, value: String },
    Get { key: String },
    Delete { key: String },
}

fuzz_target!(|ops: Vec<DbOp>| {
    // In-memory database for fast fuzzing
    let db = Database::in_memory();
    for op in ops.iter().take(100) {
        // Limit operations to prevent timeout
        match op {
            DbOp::Put { key, value } => {
                if key.len() <= 1024 && value.len() <= 1024 {
                    let _ = db.put(key, value);
                }
            }
            DbOp::Get { key } => {
                if key.len() <= 1024 {
                    let _ = db.get(key);
                }
            }
            DbOp::Delete { key } => {
                if key.len() <= 1024 {
                    let _ = db.delete(key);
                }
            }
        }
    }
});
