//! Dataset load lifecycle shared by every reader
//!
//! A session owns the current [`LoadState`]. Reloads follow a
//! last-request-wins discipline: starting a reload aborts the previous
//! in-flight load, and a load only publishes its result if no newer reload
//! has started since. Readers get an `Arc<Dataset>` and never observe a
//! partially built dataset.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, error, info};

use crate::loader::Loader;
use crate::merge::Dataset;
use crate::query::Ranking;
use crate::Error;

/// Current state of the dataset
#[derive(Debug, Clone)]
pub enum LoadState {
    /// No load has completed yet, or a reload is running
    Loading,
    /// The most recent load failed; nothing is displayed
    Failed(String),
    Ready(Arc<Dataset>),
}

impl LoadState {
    pub fn status(&self) -> ViewStatus {
        match self {
            LoadState::Loading => ViewStatus::Loading,
            LoadState::Failed(_) => ViewStatus::Error,
            LoadState::Ready(_) => ViewStatus::Ready,
        }
    }

    pub fn dataset(&self) -> Option<&Arc<Dataset>> {
        match self {
            LoadState::Ready(dataset) => Some(dataset),
            _ => None,
        }
    }
}

/// What a presentation layer should render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewStatus {
    Loading,
    Error,
    /// Data loaded, but the filters leave nothing to show
    Empty,
    Ready,
}

impl ViewStatus {
    pub fn for_ranking(ranking: &Ranking<'_>) -> Self {
        if ranking.is_empty() {
            ViewStatus::Empty
        } else {
            ViewStatus::Ready
        }
    }
}

/// Result of a single reload request
#[derive(Debug)]
pub enum ReloadOutcome {
    Loaded(Arc<Dataset>),
    Failed(Error),
    /// A newer reload started before this one finished; its result was discarded
    Superseded,
}

/// Owns the loader and the published dataset
pub struct DatasetSession {
    loader: Loader,
    state: RwLock<LoadState>,
    generation: AtomicU64,
    inflight: Mutex<Option<(u64, AbortHandle)>>,
}

impl DatasetSession {
    /// New session in the `Loading` state; call [`reload`](Self::reload) to populate it
    pub fn new(loader: Loader) -> Arc<Self> {
        Arc::new(Self {
            loader,
            state: RwLock::new(LoadState::Loading),
            generation: AtomicU64::new(0),
            inflight: Mutex::new(None),
        })
    }

    pub fn loader(&self) -> &Loader {
        &self.loader
    }

    pub async fn state(&self) -> LoadState {
        self.state.read().await.clone()
    }

    /// The published dataset, if the last completed load succeeded
    pub async fn dataset(&self) -> Option<Arc<Dataset>> {
        self.state.read().await.dataset().cloned()
    }

    /// Reload the full dataset and wait for the outcome
    pub async fn reload(self: &Arc<Self>) -> ReloadOutcome {
        let generation = self.next_generation();
        Arc::clone(self).run(generation).await
    }

    /// Start a reload without waiting for it
    ///
    /// The generation is taken before returning, so of several calls the
    /// last one made is the one whose result is kept.
    pub fn spawn_reload(self: &Arc<Self>) -> JoinHandle<ReloadOutcome> {
        let generation = self.next_generation();
        tokio::spawn(Arc::clone(self).run(generation))
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    async fn run(self: Arc<Self>, generation: u64) -> ReloadOutcome {
        {
            let mut state = self.state.write().await;
            if !self.is_current(generation) {
                return ReloadOutcome::Superseded;
            }
            *state = LoadState::Loading;
        }

        let session = Arc::clone(&self);
        let task = tokio::spawn(async move { session.loader.load().await.map(Dataset::from_raw) });

        {
            let mut inflight = self.inflight.lock().await;
            match inflight.as_ref() {
                Some((newer, _)) if *newer > generation => task.abort(),
                _ => {
                    if let Some((previous, handle)) = inflight.replace((generation, task.abort_handle())) {
                        debug!("Abandoning in-flight load #{}", previous);
                        handle.abort();
                    }
                }
            }
        }

        let result = match task.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => {
                debug!("Load #{} cancelled", generation);
                return ReloadOutcome::Superseded;
            }
            Err(e) => Err(Error::unavailable("dataset", format!("load task failed: {}", e))),
        };

        {
            let mut inflight = self.inflight.lock().await;
            if matches!(inflight.as_ref(), Some((g, _)) if *g == generation) {
                inflight.take();
            }
        }

        let mut state = self.state.write().await;
        if !self.is_current(generation) {
            debug!("Discarding result of superseded load #{}", generation);
            return ReloadOutcome::Superseded;
        }

        match result {
            Ok(dataset) => {
                let dataset = Arc::new(dataset);
                info!("Dataset ready: {} browsers", dataset.records.len());
                *state = LoadState::Ready(Arc::clone(&dataset));
                ReloadOutcome::Loaded(dataset)
            }
            Err(e) => {
                error!("Dataset load failed: {}", e);
                *state = LoadState::Failed(e.to_string());
                ReloadOutcome::Failed(e)
            }
        }
    }
}
