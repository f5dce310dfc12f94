//! Render graph, output backends and the persistent audio route

pub mod backend;
pub mod cpal_backend;
pub mod graph;
pub mod limiter;
pub mod param;
pub mod route;

pub use backend::{AudioBackend, OfflineBackend};
pub use cpal_backend::CpalBackend;
pub use graph::{BusStage, RenderGraph, SharedGraph};
pub use limiter::{Limiter, LimiterSettings};
pub use param::AutomationParam;
pub use route::{AudioRoute, RouteState};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// State reported by an output backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Suspended,
    Running,
    Closed,
}

/// Lock a mutex shared with the audio thread, recovering from poisoning.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
