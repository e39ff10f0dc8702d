//! Tagged stage results
//!
//! Fatal failures travel as `Err(ImportError)`. Soft, per-title failures are
//! recorded as gaps next to the data, so the final failure count is a pure
//! function of what the stages returned.

/// Why an item is missing from a stage's data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GapReason {
    /// Upstream answered but had nothing for the item
    NoMatch,
    /// Upstream call for the item failed or timed out
    LookupFailed(String),
}

/// One item a stage could not fill in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gap {
    pub key: String,
    pub reason: GapReason,
}

impl Gap {
    pub fn no_match(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            reason: GapReason::NoMatch,
        }
    }

    pub fn failed(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            reason: GapReason::LookupFailed(reason.into()),
        }
    }
}

/// Non-fatal stage result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome<T> {
    Complete(T),
    Partial { data: T, gaps: Vec<Gap> },
}

impl<T> StageOutcome<T> {
    /// `Complete` when nothing is missing
    pub fn from_parts(data: T, gaps: Vec<Gap>) -> Self {
        if gaps.is_empty() {
            StageOutcome::Complete(data)
        } else {
            StageOutcome::Partial { data, gaps }
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, StageOutcome::Complete(_))
    }

    pub fn data(&self) -> &T {
        match self {
            StageOutcome::Complete(data) | StageOutcome::Partial { data, .. } => data,
        }
    }

    pub fn gaps(&self) -> &[Gap] {
        match self {
            StageOutcome::Complete(_) => &[],
            StageOutcome::Partial { gaps, .. } => gaps,
        }
    }

    pub fn into_parts(self) -> (T, Vec<Gap>) {
        match self {
            StageOutcome::Complete(data) => (data, Vec::new()),
            StageOutcome::Partial { data, gaps } => (data, gaps),
        }
    }
}
