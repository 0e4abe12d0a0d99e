//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `mindspace_core` linkage.
//! - Exercise the full hydration path against an in-memory store.

use mindspace_core::db::open_db_in_memory;
use mindspace_core::{SpaceService, SqliteSnapshotRepository};

fn main() {
    println!("mindspace_core ping={}", mindspace_core::ping());
    println!("mindspace_core version={}", mindspace_core::core_version());

    // A fresh in-memory store hydrates to the seeded starter collection;
    // printing the count proves the whole open path works end to end.
    match open_db_in_memory() {
        Ok(conn) => {
            let service = SpaceService::hydrate(SqliteSnapshotRepository::new(&conn));
            println!(
                "mindspace_core first_run_nodes={}",
                service.graph().node_count()
            );
        }
        Err(err) => {
            eprintln!("mindspace_core probe failed: {err}");
            std::process::exit(1);
        }
    }
}
