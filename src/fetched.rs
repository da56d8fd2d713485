//! Outcome tag for reads that may be served from fallback data.
//!
//! `Result<Fetched<T>, E>` gives callers the three cases explicitly: a real
//! backend payload, a mock substitute of the same shape, or an error.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched<T> {
    /// Decoded from the live upstream.
    Real(T),
    /// Substituted from mock data after an upstream failure.
    Fallback(T),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Real,
    Fallback,
}

impl<T> Fetched<T> {
    #[must_use]
    pub fn source(&self) -> Source {
        match self {
            Self::Real(_) => Source::Real,
            Self::Fallback(_) => Source::Fallback,
        }
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    #[must_use]
    pub fn get(&self) -> &T {
        match self {
            Self::Real(v) | Self::Fallback(v) => v,
        }
    }

    #[must_use]
    pub fn into_inner(self) -> T {
        match self {
            Self::Real(v) | Self::Fallback(v) => v,
        }
    }

    /// Transform the payload, keeping the source tag.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        match self {
            Self::Real(v) => Fetched::Real(f(v)),
            Self::Fallback(v) => Fetched::Fallback(f(v)),
        }
    }
}

/// JSON envelope used by the gateway routes: `{"source": "...", "data": ...}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub source: Source,
    pub data: T,
}

impl<T> From<Fetched<T>> for Envelope<T> {
    fn from(fetched: Fetched<T>) -> Self {
        let source = fetched.source();
        Self { source, data: fetched.into_inner() }
    }
}
