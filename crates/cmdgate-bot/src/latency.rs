//! Feeds shard heartbeat latency into the dispatcher's estimate.

use cmdgate_dispatch::SharedLatency;
use serenity::gateway::ShardManager;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::trace;

/// How often shard latency is sampled.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(10);

/// Averages the known latencies of all shards. `None` until one shard has
/// completed a heartbeat.
pub fn average_latency(samples: impl IntoIterator<Item = Option<Duration>>) -> Option<Duration> {
    let known: Vec<Duration> = samples.into_iter().flatten().collect();
    let count = u32::try_from(known.len()).ok().filter(|count| *count > 0)?;
    Some(known.iter().sum::<Duration>() / count)
}

/// Spawns a task sampling `shards` into `latency` every [`REFRESH_INTERVAL`].
pub fn spawn_refresh(shards: Arc<ShardManager>, latency: Arc<SharedLatency>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(REFRESH_INTERVAL);
        loop {
            interval.tick().await;

            let samples: Vec<Option<Duration>> = {
                let runners = shards.runners.lock().await;
                runners.values().map(|runner| runner.latency).collect()
            };

            match average_latency(samples) {
                Some(average) => {
                    trace!(latency = ?average, "Refreshed gateway latency");
                    latency.record(average);
                }
                None => latency.clear(),
            }
        }
    })
}
