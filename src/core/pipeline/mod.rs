//! Pipeline orchestration
//!
//! The [`Orchestrator`] runs the full per-file pipeline:
//! extract, validate, cursor-filter, transform, load, flush. Files are
//! processed strictly one at a time, which is what lets the state store get
//! away without internal locking.
//!
//! Failure containment: any error while processing a file quarantines that
//! file, fires a non-blocking notification, discards the entity's unflushed
//! cursor update, and leaves the pipeline ready for the next file. A file
//! whose rows were all already ingested is not a failure; it resolves to
//! [`FileOutcome::SkippedNoNewRows`] and is simply consumed.

pub mod quarantine;

use crate::adapters::extract;
use crate::adapters::load::StagingLoader;
use crate::adapters::notify::{LogNotifier, Notifier};
use crate::config::SiloConfig;
use crate::core::state::{FilterOutcome, StateStore};
use crate::core::transform::TransformerRegistry;
use crate::core::validate;
use crate::domain::errors::SiloError;
use crate::domain::ids::CursorColumn;
use crate::domain::result::Result;
use crate::domain::work_item::WorkItem;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Terminal outcome of processing one landing file
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    /// The file contributed new rows, now durable in staging
    Loaded {
        /// Number of rows loaded after cursor filtering
        rows: usize,
        /// Staging file the rows were written to
        staging_path: PathBuf,
    },
    /// Every row was already ingested; nothing was loaded or quarantined
    SkippedNoNewRows,
    /// The file failed and was moved to quarantine
    Quarantined {
        /// Error that caused the failure
        reason: String,
    },
}

/// Sequential per-file pipeline with failure containment
pub struct Orchestrator {
    config: SiloConfig,
    state: StateStore,
    transformers: TransformerRegistry,
    loader: StagingLoader,
    notifier: Arc<dyn Notifier>,
    notifications: JoinSet<()>,
}

impl Orchestrator {
    /// Builds an orchestrator from validated configuration
    ///
    /// The transformer registry and state directory are set up here, so a
    /// misconfigured entity fails at startup rather than on its first file.
    ///
    /// # Errors
    ///
    /// Returns an error if the state directory cannot be created or an
    /// entity declaration is invalid.
    pub fn new(config: SiloConfig) -> Result<Self> {
        Self::with_notifier(config, Arc::new(LogNotifier))
    }

    /// Builds an orchestrator with a custom notifier
    ///
    /// # Errors
    ///
    /// Same failure modes as [`new`](Self::new).
    pub fn with_notifier(config: SiloConfig, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let state = StateStore::new(&config.state.dir)?;
        let transformers = TransformerRegistry::from_config(&config)?;
        let loader = StagingLoader::new(&config.staging.base_dir);
        Ok(Self {
            config,
            state,
            transformers,
            loader,
            notifier,
            notifications: JoinSet::new(),
        })
    }

    /// Processes one landing file end to end
    ///
    /// Never returns an error for a per-file failure: those quarantine the
    /// file and resolve to [`FileOutcome::Quarantined`].
    ///
    /// # Errors
    ///
    /// Returns an error only when failure containment itself breaks, i.e.
    /// the quarantine move fails.
    pub fn process(&mut self, path: &Path) -> Result<FileOutcome> {
        self.reap_finished_notifications();

        match self.run_stages(path) {
            Ok(outcome) => Ok(outcome),
            Err(error) => {
                let reason = error.to_string();
                tracing::error!(
                    file = %path.display(),
                    error = %reason,
                    "Pipeline failed, quarantining file"
                );

                // A failure after filtering must not remember the file's rows
                // as ingested.
                if let Ok(item) = WorkItem::from_path(path) {
                    self.state.discard(&item.entity);
                }

                quarantine::quarantine_file(path, Path::new(&self.config.quarantine.dir))?;
                self.spawn_notification(path, reason.clone());
                Ok(FileOutcome::Quarantined { reason })
            }
        }
    }

    fn run_stages(&mut self, path: &Path) -> Result<FileOutcome> {
        let item = WorkItem::from_path(path)?;
        let entity_config = self
            .config
            .entity(item.entity.as_str())
            .ok_or_else(|| SiloError::UnsupportedEntity(item.entity.as_str().to_string()))?
            .clone();
        let transformer = self
            .transformers
            .get(&item.entity)
            .ok_or_else(|| SiloError::UnsupportedEntity(item.entity.as_str().to_string()))?;

        tracing::info!(
            file = %path.display(),
            entity = %item.entity,
            format = %item.format,
            "Processing file"
        );

        let mut batch = extract::extract(path, item.format, &self.config.extract)?;
        validate::validate(&mut batch, &entity_config)?;

        let column = CursorColumn::new(&entity_config.cursor_column)
            .map_err(SiloError::Configuration)?;
        let batch = match self.state.filter(
            batch,
            &item.entity,
            &column,
            entity_config.cursor_mode,
        )? {
            FilterOutcome::Filtered(batch) => batch,
            FilterOutcome::Exhausted => {
                tracing::info!(
                    file = %path.display(),
                    entity = %item.entity,
                    "All rows already ingested, skipping file"
                );
                self.state.discard(&item.entity);
                return Ok(FileOutcome::SkippedNoNewRows);
            }
        };

        let batch = transformer.transform(batch)?;
        let rows = batch.row_count();
        let staging_path = self.loader.load(&batch, &item.entity, &item.stem)?;

        // Cursor becomes durable only after the rows are.
        self.state.flush(&item.entity)?;

        tracing::info!(
            file = %path.display(),
            entity = %item.entity,
            rows,
            "File processed"
        );
        Ok(FileOutcome::Loaded { rows, staging_path })
    }

    fn spawn_notification(&mut self, path: &Path, reason: String) {
        let notifier = Arc::clone(&self.notifier);
        let recipient = self.config.notify.recipient.clone();
        let path = path.to_path_buf();
        self.notifications.spawn(async move {
            notifier
                .notify_failure(recipient.as_deref(), &path, &reason)
                .await;
        });
    }

    fn reap_finished_notifications(&mut self) {
        while let Some(result) = self.notifications.try_join_next() {
            if let Err(e) = result {
                tracing::warn!(error = %e, "Notification task failed");
            }
        }
    }

    /// Read-only view of the configuration
    pub fn config(&self) -> &SiloConfig {
        &self.config
    }

    /// Read-only access to the cursor store, for status output
    pub fn state(&self) -> &StateStore {
        &self.state
    }

    /// Waits for all in-flight notifications to finish
    pub async fn shutdown(mut self) {
        while let Some(result) = self.notifications.join_next().await {
            if let Err(e) = result {
                tracing::warn!(error = %e, "Notification task failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct Dirs {
        _root: TempDir,
        landing: PathBuf,
        config: SiloConfig,
    }

    fn setup(entities: &str) -> Dirs {
        let root = TempDir::new().unwrap();
        let landing = root.path().join("landing");
        fs::create_dir_all(&landing).unwrap();
        let config: SiloConfig = toml::from_str(&format!(
            r#"
[landing]
base_dir = "{landing}"
[staging]
base_dir = "{staging}"
[quarantine]
dir = "{quarantine}"
[state]
dir = "{state}"
{entities}
"#,
            landing = landing.display(),
            staging = root.path().join("staging").display(),
            quarantine = root.path().join("failed").display(),
            state = root.path().join("state").display(),
        ))
        .unwrap();
        config.validate().unwrap();
        Dirs {
            landing,
            config,
            _root: root,
        }
    }

    fn loans_entities() -> &'static str {
        r#"
[[entities]]
name = "loans"
cursor_column = "utilization_date"
cursor_mode = "watermark"

[entities.columns]
customer_id = "str"
amount_utilized = "float"
utilization_date = "datetime"
"#
    }

    #[tokio::test]
    async fn test_process_loads_new_rows() {
        let dirs = setup(loans_entities());
        let file = dirs.landing.join("loans_20240105120000.csv");
        fs::write(
            &file,
            "customer_id,amount_utilized,utilization_date\n\
             c-1,5000.0,2024-01-05\n\
             c-2,7000.0,2024-01-06\n",
        )
        .unwrap();

        let mut orchestrator = Orchestrator::new(dirs.config.clone()).unwrap();
        let outcome = orchestrator.process(&file).unwrap();

        let FileOutcome::Loaded { rows, staging_path } = outcome else {
            panic!("expected Loaded, got {outcome:?}");
        };
        assert_eq!(rows, 2);
        let staged = fs::read_to_string(&staging_path).unwrap();
        assert_eq!(staged.lines().count(), 2);
        assert!(staged.contains("utilization_days"));
        assert!(staged.contains("partition_hour"));

        // Watermark is durable after load.
        let documents = orchestrator.state().list_persisted().unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].cursor.watermark(), Some("2024-01-06"));
        orchestrator.shutdown().await;
    }

    #[tokio::test]
    async fn test_redelivered_file_skips_without_quarantine() {
        let dirs = setup(loans_entities());
        let file = dirs.landing.join("loans_20240105120000.csv");
        let contents = "customer_id,amount_utilized,utilization_date\nc-1,5000.0,2024-01-05\n";
        fs::write(&file, contents).unwrap();

        let mut orchestrator = Orchestrator::new(dirs.config.clone()).unwrap();
        assert!(matches!(
            orchestrator.process(&file).unwrap(),
            FileOutcome::Loaded { .. }
        ));

        // Same rows again, as a re-delivery.
        let redelivered = dirs.landing.join("loans_20240105130000.csv");
        fs::write(&redelivered, contents).unwrap();
        let outcome = orchestrator.process(&redelivered).unwrap();

        assert_eq!(outcome, FileOutcome::SkippedNoNewRows);
        assert!(redelivered.exists());
        let quarantine = PathBuf::from(&dirs.config.quarantine.dir);
        assert!(!quarantine.exists() || fs::read_dir(quarantine).unwrap().next().is_none());
        orchestrator.shutdown().await;
    }

    #[tokio::test]
    async fn test_schema_failure_quarantines_file() {
        let dirs = setup(loans_entities());
        let file = dirs.landing.join("loans_20240105120000.csv");
        // utilization_date is not a parseable date
        fs::write(
            &file,
            "customer_id,amount_utilized,utilization_date\nc-1,5000.0,not-a-date\n",
        )
        .unwrap();

        let mut orchestrator = Orchestrator::new(dirs.config.clone()).unwrap();
        let outcome = orchestrator.process(&file).unwrap();

        let FileOutcome::Quarantined { reason } = outcome else {
            panic!("expected Quarantined, got {outcome:?}");
        };
        assert!(reason.contains("Schema validation"));
        assert!(!file.exists());
        assert!(PathBuf::from(&dirs.config.quarantine.dir)
            .join("loans_20240105120000.csv")
            .exists());
        // No cursor was persisted for the failed file.
        assert!(orchestrator.state().list_persisted().unwrap().is_empty());
        orchestrator.shutdown().await;
    }

    #[tokio::test]
    async fn test_unknown_entity_quarantines_file() {
        let dirs = setup(loans_entities());
        let file = dirs.landing.join("mystery_20240105.csv");
        fs::write(&file, "id\n1\n").unwrap();

        let mut orchestrator = Orchestrator::new(dirs.config.clone()).unwrap();
        let outcome = orchestrator.process(&file).unwrap();

        assert!(matches!(outcome, FileOutcome::Quarantined { .. }));
        assert!(!file.exists());
        orchestrator.shutdown().await;
    }

    #[tokio::test]
    async fn test_failure_fires_notification() {
        struct Counting(AtomicUsize);

        #[async_trait::async_trait]
        impl Notifier for Counting {
            async fn notify_failure(&self, _: Option<&str>, _: &Path, _: &str) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let dirs = setup(loans_entities());
        let file = dirs.landing.join("loans_20240105.csv");
        fs::write(&file, "garbage-without-required-columns\nx\n").unwrap();

        let notifier = Arc::new(Counting(AtomicUsize::new(0)));
        let mut orchestrator =
            Orchestrator::with_notifier(dirs.config.clone(), notifier.clone()).unwrap();
        let outcome = orchestrator.process(&file).unwrap();
        assert!(matches!(outcome, FileOutcome::Quarantined { .. }));

        orchestrator.shutdown().await;
        assert_eq!(notifier.0.load(Ordering::SeqCst), 1);
    }
}
