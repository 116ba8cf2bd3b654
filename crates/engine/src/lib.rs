use analytics::StatisticsAnalyzer;
use api_client::{CoinGeckoClient, MarketDataClient, RecordTransformer};
use chrono::{DateTime, Local};
use configuration::TrackerConfig;
use sheets::{GoogleSheetsClient, MemorySheet, SheetLayout, SheetPublisher, SheetsApi};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, sleep_until};

pub mod error;

pub use error::{CycleError, EngineError};

/// The two states of the tracker. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Running,
    Stopped,
}

/// The cadence of the loop and the size of each fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSettings {
    pub top_n: u32,
    pub update_interval: Duration,
    pub retry_backoff: Duration,
}

impl LoopSettings {
    pub fn from_config(config: &TrackerConfig) -> Self {
        Self {
            top_n: config.market_data.top_n,
            update_interval: config.tracker.update_interval(),
            retry_backoff: config.tracker.retry_backoff(),
        }
    }
}

/// What a successful cycle published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleSummary {
    pub rows: usize,
    pub captured_at: DateTime<Local>,
}

/// The central orchestrator: fetch, transform, analyze, publish, sleep, repeat.
pub struct TrackerLoop {
    // --- Collaborators ---
    market_data: Arc<dyn MarketDataClient>,
    transformer: RecordTransformer,
    analyzer: StatisticsAnalyzer,
    publisher: SheetPublisher,

    // --- Loop State ---
    settings: LoopSettings,
    state: TrackerState,
    cycles_completed: u64,
    cycles_failed: u64,
}

impl TrackerLoop {
    pub fn new(
        market_data: Arc<dyn MarketDataClient>,
        publisher: SheetPublisher,
        settings: LoopSettings,
    ) -> Self {
        Self {
            market_data,
            transformer: RecordTransformer::new(),
            analyzer: StatisticsAnalyzer::new(),
            publisher,
            settings,
            state: TrackerState::Stopped,
            cycles_completed: 0,
            cycles_failed: 0,
        }
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed
    }

    pub fn cycles_failed(&self) -> u64 {
        self.cycles_failed
    }

    /// Resets the sheet, then runs cycles until `shutdown` turns `true` (or its
    /// sender is dropped).
    ///
    /// Only a failed sheet initialization is returned as an error; every failure
    /// inside a cycle is logged and retried after the backoff. A cycle that has
    /// started always runs to completion before the stop is observed.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<(), EngineError> {
        self.publisher
            .initialize()
            .await
            .map_err(EngineError::Initialization)?;

        self.state = TrackerState::Running;
        tracing::info!(
            top_n = self.settings.top_n,
            interval_secs = self.settings.update_interval.as_secs(),
            backoff_secs = self.settings.retry_backoff.as_secs(),
            "Tracker is running."
        );

        while self.state == TrackerState::Running {
            if *shutdown.borrow_and_update() {
                self.state = TrackerState::Stopped;
                break;
            }

            let pause = match self.run_cycle().await {
                Ok(summary) => {
                    self.cycles_completed += 1;
                    tracing::info!(
                        rows = summary.rows,
                        captured_at = %summary.captured_at.format("%Y-%m-%d %H:%M:%S"),
                        "Sheet updated. Next update in {}s.",
                        self.settings.update_interval.as_secs()
                    );
                    self.settings.update_interval
                }
                Err(e) => {
                    self.cycles_failed += 1;
                    tracing::error!(
                        error = %e,
                        "Update failed. Retrying in {}s.",
                        self.settings.retry_backoff.as_secs()
                    );
                    self.settings.retry_backoff
                }
            };

            if sleep_or_shutdown(&mut shutdown, pause).await {
                self.state = TrackerState::Stopped;
            }
        }

        tracing::info!(
            completed = self.cycles_completed,
            failed = self.cycles_failed,
            "Tracker stopped."
        );
        Ok(())
    }

    /// One fetch → transform → analyze → publish pass. The data and the analysis
    /// are computed from the same batch.
    pub async fn run_cycle(&self) -> Result<CycleSummary, CycleError> {
        let records = self.market_data.fetch(self.settings.top_n).await?;
        let batch = self.transformer.transform_batch(&records)?;
        let report = self.analyzer.analyze(&batch);

        self.publisher.publish_data(&batch).await?;
        self.publisher.publish_analysis(&report).await?;

        Ok(CycleSummary {
            rows: batch.len(),
            captured_at: batch.captured_at(),
        })
    }
}

/// Sleeps for `pause` unless a stop is requested first. Returns `true` when the
/// tracker should stop. A dropped sender counts as a stop request.
async fn sleep_or_shutdown(shutdown: &mut watch::Receiver<bool>, pause: Duration) -> bool {
    let deadline = Instant::now() + pause;
    loop {
        if *shutdown.borrow_and_update() {
            return true;
        }
        tokio::select! {
            _ = sleep_until(deadline) => return false,
            changed = shutdown.changed() => {
                if changed.is_err() {
                    return true;
                }
            }
        }
    }
}

/// Builds a tracker wired to CoinGecko and either the configured Google sheet
/// or, for a dry run, an in-memory sheet that logs what would be written.
///
/// Credential problems are reported here, before any cycle runs.
pub fn build_tracker(config: &TrackerConfig, dry_run: bool) -> Result<TrackerLoop, EngineError> {
    let market_data = CoinGeckoClient::new(&config.market_data)?;

    let api: Arc<dyn SheetsApi> = if dry_run {
        tracing::warn!("Dry run: nothing will be written to Google Sheets.");
        Arc::new(MemorySheet::with_echo())
    } else {
        let (credentials, spreadsheet_id) = config.sheets.target()?;
        let client = GoogleSheetsClient::new(credentials, spreadsheet_id, &config.sheets)
            .map_err(EngineError::Setup)?;
        Arc::new(client)
    };

    let layout = SheetLayout::new(&config.sheets, config.market_data.top_n as usize);
    Ok(TrackerLoop::new(
        Arc::new(market_data),
        SheetPublisher::new(api, layout),
        LoopSettings::from_config(config),
    ))
}
