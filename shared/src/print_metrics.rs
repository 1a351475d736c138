use std::time::Duration;
use dipstick::*;

/// Flushes the run counters (columns, LP and MIP solves) to stdout.
pub fn setup_metrics_printer(every: Duration) {
    let metrics = AtomicBucket::new();

    metrics.flush_every(every);
    metrics.drain(Stream::write_to_stdout());
    metrics.stats(dipstick::stats_all);

    dipstick::Proxy::default_target(metrics);
}
