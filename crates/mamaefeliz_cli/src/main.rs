//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `mamaefeliz_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use mamaefeliz_core::{MemoryPersistence, PostListQuery, PostStore};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("mamaefeliz_core ping={}", mamaefeliz_core::ping());
    println!("mamaefeliz_core version={}", mamaefeliz_core::core_version());

    // Seeds an ephemeral store to prove the forum wiring end to end.
    let store = PostStore::new(MemoryPersistence::new());
    match store.browse(&PostListQuery::default()) {
        Ok(posts) => {
            println!("mamaefeliz_core forum_seed_posts={}", posts.len());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("mamaefeliz_core forum_error={err}");
            ExitCode::FAILURE
        }
    }
}
