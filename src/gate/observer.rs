//! Presentation-layer notification interface.
//!
//! The decision core never touches a rendering surface; it reports step
//! transitions and the final verdict through [`GateObserver`] so callers can
//! drive whatever presentation they have (the CLI logs through `tracing`).

use std::fmt;
use tracing::info;

use super::Verdict;

/// Detection steps, in the order the resolver tries them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectStep {
    UrlParameter,
    StoredSession,
    AutoDetect,
}

impl DetectStep {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UrlParameter => "detecting-url",
            Self::StoredSession => "detecting-storage",
            Self::AutoDetect => "detecting-auto",
        }
    }
}

impl fmt::Display for DetectStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Active,
    Completed,
    Failed,
}

impl StepStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Callbacks for step transitions and the final verdict.
pub trait GateObserver {
    fn step(&self, step: DetectStep, status: StepStatus);

    /// Final verdict, with a human-readable session-persistence description.
    fn verdict(&self, verdict: &Verdict, persistence: &str);
}

/// Reports transitions as structured tracing events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceObserver;

impl GateObserver for TraceObserver {
    fn step(&self, step: DetectStep, status: StepStatus) {
        info!(step = %step, status = %status, "detection step");
    }

    fn verdict(&self, verdict: &Verdict, persistence: &str) {
        match verdict {
            Verdict::Granted(identity) => info!(
                email = %identity.email,
                method = identity.source.method_name(),
                persistence,
                "access granted"
            ),
            Verdict::Denied(Some(email)) => {
                info!(email = %email, "access denied: detected email is not authorized");
            }
            Verdict::Denied(None) => info!("access denied: no email detected"),
        }
    }
}

/// Ignores everything; for callers with no presentation layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl GateObserver for NullObserver {
    fn step(&self, _step: DetectStep, _status: StepStatus) {}

    fn verdict(&self, _verdict: &Verdict, _persistence: &str) {}
}
