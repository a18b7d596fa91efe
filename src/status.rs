//! Pipeline status transitions and the observer that receives them.
//!
//! A run moves through `Idle → Reading → Analyzing → Stamping → Done`, or
//! drops to `Error` from any active state. Both terminal states return to
//! `Idle` so the caller can start over with the same or another file.
//!
//! Inject an [`Arc<dyn StatusObserver>`] via
//! [`crate::config::StampConfigBuilder::status_observer`] to drive a spinner,
//! a UI label or a log line from these transitions.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdfstamp::{PipelineStatus, StampConfig, StatusObserver};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl StatusObserver for Printer {
//!     fn on_status(&self, status: PipelineStatus) {
//!         eprintln!("status: {status}");
//!     }
//! }
//!
//! let config = StampConfig::builder()
//!     .status_observer(Arc::new(Printer) as Arc<dyn StatusObserver>)
//!     .build()
//!     .unwrap();
//! ```

use crate::placement::PlacementSuggestion;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Abstract state of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PipelineStatus {
    #[default]
    Idle,
    /// Loading the input bytes.
    Reading,
    /// Rasterising page 1 and waiting for the resolver.
    Analyzing,
    /// Editing and serialising the PDF.
    Stamping,
    Done,
    Error,
}

impl PipelineStatus {
    /// Whether `next` is a legal successor of `self`.
    pub fn can_advance_to(self, next: PipelineStatus) -> bool {
        use PipelineStatus::*;
        matches!(
            (self, next),
            (Idle, Reading)
                | (Reading, Analyzing)
                | (Analyzing, Stamping)
                | (Stamping, Done)
                | (Reading | Analyzing | Stamping, Error)
                | (Done | Error, Idle)
        )
    }

    pub fn is_active(self) -> bool {
        matches!(
            self,
            PipelineStatus::Reading | PipelineStatus::Analyzing | PipelineStatus::Stamping
        )
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineStatus::Idle => "idle",
            PipelineStatus::Reading => "reading",
            PipelineStatus::Analyzing => "analyzing",
            PipelineStatus::Stamping => "stamping",
            PipelineStatus::Done => "done",
            PipelineStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// Called by the pipeline at each I/O boundary.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait StatusObserver: Send + Sync {
    /// Called on every transition, including the final return to `Idle`.
    fn on_status(&self, status: PipelineStatus) {
        let _ = status;
    }

    /// Called once the resolver's suggestion has passed validation.
    fn on_placement(&self, placement: &PlacementSuggestion) {
        let _ = placement;
    }

    /// Called with the error message when a run aborts.
    fn on_error(&self, message: &str) {
        let _ = message;
    }
}

/// A no-op observer for callers that don't need status events.
pub struct NoopStatusObserver;

impl StatusObserver for NoopStatusObserver {}

/// Current state of one run plus the observer to notify.
pub struct StatusTracker {
    current: PipelineStatus,
    observer: Option<Arc<dyn StatusObserver>>,
}

impl StatusTracker {
    pub fn new(observer: Option<Arc<dyn StatusObserver>>) -> Self {
        Self {
            current: PipelineStatus::Idle,
            observer,
        }
    }

    pub fn current(&self) -> PipelineStatus {
        self.current
    }

    /// Move to `next`, notifying the observer. An illegal transition is
    /// logged and ignored.
    pub fn advance(&mut self, next: PipelineStatus) {
        if !self.current.can_advance_to(next) {
            warn!("Ignoring status transition {} → {}", self.current, next);
            return;
        }
        debug!("Status {} → {}", self.current, next);
        self.current = next;
        if let Some(ref obs) = self.observer {
            obs.on_status(next);
        }
    }

    pub fn placement(&self, placement: &PlacementSuggestion) {
        if let Some(ref obs) = self.observer {
            obs.on_placement(placement);
        }
    }

    /// Report a failure and return to `Idle`. A run rejected before it
    /// started only reports the error; its status stays `Idle`.
    pub fn fail(&mut self, message: &str) {
        if let Some(ref obs) = self.observer {
            obs.on_error(message);
        }
        if !self.current.is_active() {
            return;
        }
        self.advance(PipelineStatus::Error);
        self.advance(PipelineStatus::Idle);
    }

    /// Report success and return to `Idle`.
    pub fn finish(&mut self) {
        self.advance(PipelineStatus::Done);
        self.advance(PipelineStatus::Idle);
    }
}
