//! Configuration service
//!
//! Owns the authoritative simulation configuration and a case-insensitive
//! URI index over it. Readers work against an immutable snapshot behind an
//! `Arc`; a reload builds a fresh snapshot and swaps it atomically, so a
//! concurrent lookup sees either the old or the new configuration in full,
//! never a mix. The bulk external-value prefetch runs at most once per
//! loaded snapshot, guarded by a flag that resets on reload or cancellation.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use futures::StreamExt;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{SimulationError, SimulatorResult};
use crate::fetch::ExternalValueFetcher;
use crate::model::{ApiConfiguration, ApiPath, Example};

/// Concurrency cap for the bulk external-value prefetch
pub const MAX_CONCURRENT_FETCHES: usize = 10;

/// Where the configuration is (re-)obtained from
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// A JSON/YAML file on disk, re-read on every reload
    File(PathBuf),
    /// A pre-built graph; reload re-validates and re-indexes it
    InMemory(Arc<ApiConfiguration>),
}

impl ConfigSource {
    fn load(&self) -> SimulatorResult<Arc<ApiConfiguration>> {
        match self {
            Self::File(path) => Ok(Arc::new(ApiConfiguration::from_file(path)?)),
            Self::InMemory(configuration) => {
                configuration.validate()?;
                Ok(configuration.clone())
            }
        }
    }
}

/// One immutable configuration version plus its lookup index
#[derive(Debug)]
struct Snapshot {
    configuration: Arc<ApiConfiguration>,
    /// Lowercased URI -> path; last writer wins on duplicate URIs
    index: HashMap<String, Arc<ApiPath>>,
}

impl Snapshot {
    fn build(configuration: Arc<ApiConfiguration>) -> Self {
        let mut index = HashMap::with_capacity(configuration.paths.len());
        for path in &configuration.paths {
            index.insert(path.uri.to_ascii_lowercase(), path.clone());
        }
        Self {
            configuration,
            index,
        }
    }
}

/// Thread-safe owner of the current configuration snapshot
#[derive(Debug)]
pub struct ConfigurationService {
    source: ConfigSource,
    snapshot: RwLock<Arc<Snapshot>>,
    /// "External values fetched" guard; also serializes the snapshot swap
    fetched: Mutex<bool>,
    fetcher: Arc<ExternalValueFetcher>,
    max_concurrent_fetches: usize,
}

impl ConfigurationService {
    /// Load the initial configuration from the source. Fails fast.
    pub fn new(source: ConfigSource, fetcher: Arc<ExternalValueFetcher>) -> SimulatorResult<Self> {
        let configuration = source.load()?;
        let snapshot = Arc::new(Snapshot::build(configuration));

        info!(
            paths = snapshot.index.len(),
            examples = snapshot.configuration.example_count(),
            "Configuration loaded"
        );

        Ok(Self {
            source,
            snapshot: RwLock::new(snapshot),
            fetched: Mutex::new(false),
            fetcher,
            max_concurrent_fetches: MAX_CONCURRENT_FETCHES,
        })
    }

    pub fn from_file(
        path: impl Into<PathBuf>,
        fetcher: Arc<ExternalValueFetcher>,
    ) -> SimulatorResult<Self> {
        Self::new(ConfigSource::File(path.into()), fetcher)
    }

    /// O(1) path lookup, case-insensitive on the URI. The caller passes the
    /// path component only; no normalization of trailing slashes happens here.
    pub fn path_by_uri(&self, uri: &str) -> Option<Arc<ApiPath>> {
        self.snapshot
            .read()
            .index
            .get(&uri.to_ascii_lowercase())
            .cloned()
    }

    /// Current configuration graph (kept alive by in-flight requests)
    pub fn configuration(&self) -> Arc<ApiConfiguration> {
        self.snapshot.read().configuration.clone()
    }

    /// Re-obtain, re-validate, and atomically swap in the configuration.
    ///
    /// On failure the previous snapshot stays in effect. A successful reload
    /// resets the prefetch guard so the next prefetch pass runs again.
    pub fn reload(&self) -> SimulatorResult<()> {
        let configuration = self.source.load().map_err(|e| {
            warn!(error = %e, "Reload failed, previous configuration kept");
            e
        })?;
        let snapshot = Arc::new(Snapshot::build(configuration));

        let mut fetched = self.fetched.lock();
        *self.snapshot.write() = snapshot.clone();
        *fetched = false;

        info!(
            paths = snapshot.index.len(),
            examples = snapshot.configuration.example_count(),
            "Configuration reloaded"
        );
        Ok(())
    }

    /// Bulk-prefetch every unmaterialized external value, at most once per
    /// loaded snapshot.
    ///
    /// A concurrent second caller observes the guard flag already set and
    /// returns immediately. Individual fetch failures are logged and do not
    /// abort the batch; cancellation resets the guard so a later call
    /// retries.
    pub async fn fetch_external_values(&self, cancel: &CancellationToken) -> SimulatorResult<()> {
        {
            let mut fetched = self.fetched.lock();
            if *fetched {
                debug!("External values already fetched for this configuration");
                return Ok(());
            }
            *fetched = true;
        }

        let configuration = self.configuration();
        let pending: Vec<Arc<Example>> = configuration
            .iter_examples()
            .filter(|e| e.needs_fetch())
            .cloned()
            .collect();

        if pending.is_empty() {
            debug!("No external values to fetch");
            return Ok(());
        }

        info!(count = pending.len(), "Prefetching external values");

        futures::stream::iter(pending)
            .for_each_concurrent(self.max_concurrent_fetches, |example| {
                let fetcher = self.fetcher.clone();
                let cancel = cancel.clone();
                async move {
                    if cancel.is_cancelled() {
                        return;
                    }
                    let Some(url) = example.external_value.as_deref() else {
                        return;
                    };
                    match fetcher.fetch(url, &cancel).await {
                        Ok(body) => example.set_value(body),
                        Err(SimulationError::Cancelled) => {}
                        Err(e) => {
                            warn!(example = %example.name, url = %url, error = %e,
                                "External value fetch failed, continuing with batch");
                        }
                    }
                }
            })
            .await;

        if cancel.is_cancelled() {
            *self.fetched.lock() = false;
            return Err(SimulationError::Cancelled);
        }

        Ok(())
    }

    /// Diagnostic summary of the current snapshot
    pub fn summary(&self) -> ConfigurationSummary {
        let configuration = self.configuration();
        ConfigurationSummary {
            path_count: configuration.paths.len(),
            example_count: configuration.example_count(),
            paths: configuration
                .paths
                .iter()
                .map(|p| PathSummary {
                    uri: p.uri.clone(),
                    methods: p.operations.iter().map(|o| o.method.clone()).collect(),
                })
                .collect(),
        }
    }

    pub fn fetcher(&self) -> &Arc<ExternalValueFetcher> {
        &self.fetcher
    }

    #[cfg(test)]
    fn is_fetched(&self) -> bool {
        *self.fetched.lock()
    }
}

/// Snapshot overview served by the admin config endpoint
#[derive(Debug, Serialize)]
pub struct ConfigurationSummary {
    pub path_count: usize,
    pub example_count: usize,
    pub paths: Vec<PathSummary>,
}

#[derive(Debug, Serialize)]
pub struct PathSummary {
    pub uri: String,
    pub methods: Vec<String>,
}
