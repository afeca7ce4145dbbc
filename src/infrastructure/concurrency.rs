//! Worker pool sizing for concurrent read-only traversals.
//! Leaves about half of the machine free for the host compiler.

use anyhow::{Context, Result};
use tracing::debug;

/// Default worker count: half the cores, minimum 1.
pub fn default_workers() -> usize {
    std::cmp::max(1, num_cpus::get() / 2)
}

/// Build a local rayon pool. `None` picks `default_workers()`.
///
/// A local pool is used so that repeated inspections and tests never fight
/// over the global one.
pub fn build_pool(workers: Option<usize>) -> Result<rayon::ThreadPool> {
    let workers = workers.unwrap_or_else(default_workers).max(1);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("thunderbird-inspect-{}", i))
        .build()
        .context("failed to build inspection thread pool")?;

    debug!(workers = workers, cores = num_cpus::get(), "inspection pool ready");
    Ok(pool)
}
