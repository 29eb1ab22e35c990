use crate::db::TranslationStore;
use crate::i18n::sync::{sync_every_kind, SyncReport};
use crate::i18n::{LanguageRegistry, ResolutionMetrics};
use anyhow::Result;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

/// Initialize and start the translation sweep scheduler.
///
/// One job per `HH:MM` (UTC) entry in `times`; each job fills missing
/// translations for every entity kind.
pub async fn start_scheduler(
    times: &[String],
    store: Arc<dyn TranslationStore>,
    registry: Arc<LanguageRegistry>,
) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    for time in times {
        let cron_expr = time_to_cron(time)?;
        info!("Scheduling translation sweep for {} UTC (cron: {})", time, cron_expr);

        let store_clone = Arc::clone(&store);
        let registry_clone = Arc::clone(&registry);

        let job = Job::new_async(cron_expr.as_str(), move |_uuid, _l| {
            let store = Arc::clone(&store_clone);
            let registry = Arc::clone(&registry_clone);

            Box::pin(async move {
                info!("⏰ Scheduled translation sweep triggered");
                let reports = run_sweep(store.as_ref(), &registry).await;
                let failures: usize = reports.iter().map(|r| r.failures.len()).sum();
                if failures > 0 {
                    error!("Scheduled sweep finished with {} failure(s)", failures);
                }
            })
        })?;

        scheduler.add(job).await?;
    }

    scheduler.start().await?;
    info!("✓ Scheduler started");

    Ok(scheduler)
}

/// Convert time string (HH:MM, UTC) to a cron expression
fn time_to_cron(time: &str) -> Result<String> {
    let parts: Vec<&str> = time.split(':').collect();
    if parts.len() != 2 {
        anyhow::bail!("Invalid time format: {}. Expected HH:MM", time);
    }

    let hour: u8 = parts[0].parse()?;
    let minute: u8 = parts[1].parse()?;

    if hour > 23 || minute > 59 {
        anyhow::bail!("Invalid time: {}. Hour must be 0-23 and minute 0-59", time);
    }

    // Cron format: "second minute hour day month day_of_week"
    Ok(format!("0 {} {} * * *", minute, hour))
}

/// Run one sweep over every kind and record it in the global metrics.
pub async fn run_sweep(
    store: &dyn TranslationStore,
    registry: &LanguageRegistry,
) -> Vec<SyncReport> {
    info!("Starting translation sweep");

    let reports = sync_every_kind(store, registry).await;
    let metrics = ResolutionMetrics::global();

    for report in &reports {
        metrics.record_rows_synced(report.created);
        metrics.record_sync_failures(report.failures.len());

        if !report.is_clean() {
            warn!(
                kind = %report.kind,
                "{} entity sync failure(s): {:?}",
                report.failures.len(),
                report.failures
            );
        }
    }

    let created: usize = reports.iter().map(|r| r.created).sum();
    info!("✓ Translation sweep completed, {} row(s) created", created);

    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::i18n::{EntityKind, Region};

    #[test]
    fn test_time_to_cron() {
        assert_eq!(time_to_cron("03:00").expect("valid"), "0 0 3 * * *");
        assert_eq!(time_to_cron("15:30").expect("valid"), "0 30 15 * * *");
        assert_eq!(time_to_cron("00:05").expect("valid"), "0 5 0 * * *");
    }

    #[test]
    fn test_time_to_cron_invalid() {
        assert!(time_to_cron("3").is_err());
        assert!(time_to_cron("aa:bb").is_err());
        assert!(time_to_cron("24:00").is_err());
        assert!(time_to_cron("12:60").is_err());
        assert!(time_to_cron("12:00:00").is_err());
    }

    #[tokio::test]
    async fn test_run_sweep_reports_every_kind() {
        let store = MemoryStore::new();
        let registry = LanguageRegistry::from_codes(["en", "ka", "ru"], "en").expect("registry");
        store.add_entity(EntityKind::Project, "1").await;

        let reports = run_sweep(&store, &registry).await;
        assert_eq!(reports.len(), EntityKind::ALL.len());

        let created: usize = reports.iter().map(|r| r.created).sum();
        assert_eq!(created, 3 + Region::ALL.len() * 3);
        assert_eq!(store.row_count(EntityKind::Project, "1").await, 3);
    }
}
