//! Error types for the trajectory-distance and clustering cores.
//!
//! Input validation fails at the API boundary with a typed error naming the
//! offending component; numerical anomalies inside kernels are clamped rather
//! than propagated; only genuine solver failures surface as
//! [`MeasureError::Unavailable`].

use thiserror::Error;

/// Errors raised by trajectory distance measures and the pointwise XTD
/// kernels.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeasureError {
    /// A parameter or trajectory violated the measure's input contract.
    #[error("{measure}: invalid input: {reason}")]
    InvalidInput {
        measure: &'static str,
        reason: String,
    },

    /// The measure was used before required setup (e.g. an unfitted PCA
    /// projection).
    #[error("{measure}: invalid state: {reason}")]
    InvalidState {
        measure: &'static str,
        reason: String,
    },

    /// The measure could not be computed; the caller may fall back to
    /// another measure. Raised when the optimal-transport solver fails to
    /// converge.
    #[error("{measure}: unavailable: {reason}")]
    Unavailable {
        measure: &'static str,
        reason: String,
    },
}

impl MeasureError {
    pub(crate) fn invalid_input(measure: &'static str, reason: impl Into<String>) -> Self {
        MeasureError::InvalidInput {
            measure,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_state(measure: &'static str, reason: impl Into<String>) -> Self {
        MeasureError::InvalidState {
            measure,
            reason: reason.into(),
        }
    }

    pub(crate) fn unavailable(measure: &'static str, reason: impl Into<String>) -> Self {
        MeasureError::Unavailable {
            measure,
            reason: reason.into(),
        }
    }
}

/// Errors raised by the clustering engines and evaluation functions.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClusterError {
    /// A parameter or matrix violated the engine's input contract.
    #[error("{component}: invalid input: {reason}")]
    InvalidInput {
        component: &'static str,
        reason: String,
    },

    /// The engine was used out of its train/cleanup lifecycle.
    #[error("{component}: invalid state: {reason}")]
    InvalidState {
        component: &'static str,
        reason: String,
    },

    /// The operation is declared but not provided by this engine
    /// (online classification after training).
    #[error("{component}: {operation} is not implemented")]
    NotImplemented {
        component: &'static str,
        operation: &'static str,
    },
}

impl ClusterError {
    pub(crate) fn invalid_input(component: &'static str, reason: impl Into<String>) -> Self {
        ClusterError::InvalidInput {
            component,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_state(component: &'static str, reason: impl Into<String>) -> Self {
        ClusterError::InvalidState {
            component,
            reason: reason.into(),
        }
    }
}

/// Errors raised by the process-wide coordinate-system registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeodesyError {
    /// The registry is configured once at start-up; conflicting
    /// reconfiguration is rejected.
    #[error("geodesy registry: {setting} is already configured")]
    AlreadyConfigured { setting: &'static str },
}
