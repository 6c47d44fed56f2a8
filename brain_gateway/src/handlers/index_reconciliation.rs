use std::{sync::Arc, time::Duration};
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{error, info, Instrument};

use crate::{
    configuration::ReconciliationSettings, domain::use_cases::reindex_content::ReindexContentUseCase,
};

/// Spawns the task indexing the contents left pending, for ex after a vector index outage
///
/// Runs a batch right away, then every `interval_s`. A batch never overlaps the next one:
/// missed ticks are delayed.
pub fn spawn_index_reconciliation(
    reindex_content: Arc<ReindexContentUseCase>,
    settings: &ReconciliationSettings,
) -> JoinHandle<()> {
    let period = Duration::from_secs(settings.interval_s.max(1));
    let batch_size = settings.batch_size;

    info!(?period, batch_size, "Starting the index reconciliation");

    tokio::spawn(
        async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;

                if let Err(error) = reindex_content.reindex_pending(batch_size).await {
                    error!(?error, "Index reconciliation failed");
                }
            }
        }
        .instrument(tracing::info_span!("Index reconciliation")),
    )
}
