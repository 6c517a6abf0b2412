//! Load workflow - background wallet loading with start/stop control
//!
//! ```text
//! Idle ──start()──► Running ──stop()──► Stopped
//!  │                                      ▲
//!  └── stop(): no-op      start(): no-op ─┘
//! ```
//!
//! `start()` and `stop()` never wait: loading runs on a spawned task that
//! `stop()` aborts.

use crate::events::{Dispatcher, Signal, Stream};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    Running,
    Stopped,
}

impl LoadPhase {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => LoadPhase::Idle,
            1 => LoadPhase::Running,
            _ => LoadPhase::Stopped,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            LoadPhase::Idle => 0,
            LoadPhase::Running => 1,
            LoadPhase::Stopped => 2,
        }
    }
}

/// Start/stop control consumed by the session. Both calls are idempotent.
pub trait LoadWorkflow: Send + Sync {
    fn start(&self);
    fn stop(&self);
    fn phase(&self) -> LoadPhase;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadProgress {
    /// 0..=100
    pub percent: u8,
    pub remaining: Option<Duration>,
}

#[derive(Clone)]
pub struct ProgressReporter {
    signal: Signal<LoadProgress>,
}

impl ProgressReporter {
    pub fn report(&self, percent: u8, remaining: Option<Duration>) {
        self.signal.publish(LoadProgress { percent: percent.min(100), remaining });
    }
}

/// The actual loading sequence (filters, mempool, initial sync...).
#[async_trait]
pub trait WalletLoader: Send + Sync {
    async fn load(&self, progress: ProgressReporter) -> anyhow::Result<()>;
}

pub struct WalletLoadWorkflow {
    loader: Arc<dyn WalletLoader>,
    runtime: Handle,
    phase: AtomicU8,
    task: Mutex<Option<JoinHandle<()>>>,
    progress: Signal<LoadProgress>,
}

impl WalletLoadWorkflow {
    pub fn new(loader: Arc<dyn WalletLoader>, runtime: Handle, dispatcher: Dispatcher) -> Self {
        Self {
            loader,
            runtime,
            phase: AtomicU8::new(LoadPhase::Idle.as_u8()),
            task: Mutex::new(None),
            progress: Signal::new(dispatcher),
        }
    }

    pub fn progress(&self) -> Stream<LoadProgress> {
        self.progress.stream()
    }

    pub fn is_running(&self) -> bool {
        self.phase() == LoadPhase::Running
    }

    fn transition(&self, from: LoadPhase, to: LoadPhase) -> bool {
        self.phase
            .compare_exchange(from.as_u8(), to.as_u8(), Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

impl LoadWorkflow for WalletLoadWorkflow {
    fn start(&self) {
        if !self.transition(LoadPhase::Idle, LoadPhase::Running) {
            tracing::debug!(phase = ?self.phase(), "load start ignored");
            return;
        }
        let mut task = self.task.lock().unwrap_or_else(|p| p.into_inner());
        // stop() may have won the race before we took the lock
        if self.phase() != LoadPhase::Running {
            return;
        }
        tracing::info!("wallet load started");
        let loader = self.loader.clone();
        let reporter = ProgressReporter { signal: self.progress.clone() };
        *task = Some(self.runtime.spawn(async move {
            match loader.load(reporter).await {
                Ok(()) => tracing::info!("wallet load sequence finished"),
                Err(e) => tracing::error!(error = %e, "wallet load failed"),
            }
        }));
    }

    fn stop(&self) {
        if !self.transition(LoadPhase::Running, LoadPhase::Stopped) {
            tracing::debug!(phase = ?self.phase(), "load stop ignored");
            return;
        }
        if let Some(task) = self.task.lock().unwrap_or_else(|p| p.into_inner()).take() {
            task.abort();
        }
        tracing::info!("wallet load stopped");
    }

    fn phase(&self) -> LoadPhase {
        LoadPhase::from_u8(self.phase.load(Ordering::SeqCst))
    }
}

impl Drop for WalletLoadWorkflow {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().unwrap_or_else(|p| p.into_inner()).take() {
            task.abort();
        }
    }
}
