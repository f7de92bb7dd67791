//! Isolation capability detection.

/// Availability of the isolation primitive strict sandboxing relies on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IsolationSupport {
    /// Strict isolation is available
    Full,
    /// Only loose isolation is possible, for the given reason
    Degraded(String),
}

/// Detects what isolation the host environment supports.
pub trait IsolationProbe: Send + Sync {
    fn probe(&self) -> IsolationSupport;
}

/// A probe that always reports the same answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticProbe(pub IsolationSupport);

impl StaticProbe {
    pub fn full() -> Self {
        Self(IsolationSupport::Full)
    }

    pub fn degraded(reason: impl Into<String>) -> Self {
        Self(IsolationSupport::Degraded(reason.into()))
    }
}

impl Default for StaticProbe {
    fn default() -> Self {
        Self::full()
    }
}

impl IsolationProbe for StaticProbe {
    fn probe(&self) -> IsolationSupport {
        self.0.clone()
    }
}
