//! Failure classification for acquisition logging.
//!
//! Tier fallthrough is the designed response to a failing source, so most
//! acquisition failures are routine. This module decides how loudly to log
//! one: an offline remote service during a scheduled run is expected noise,
//! a parse error suggests the API changed shape and deserves attention.

use crate::model::{AcquisitionError, SourceTier};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Routine for this source — the fallback tiers exist for exactly this.
    Expected,
    /// Indicates service degradation or an upstream format change.
    Unexpected,
    /// Cannot tell from the error alone.
    Unknown,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Expected => write!(f, "EXPECTED"),
            FailureKind::Unexpected => write!(f, "UNEXPECTED"),
            FailureKind::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Classifies a remote-tier failure.
pub fn classify_remote_failure(err: &AcquisitionError) -> FailureKind {
    match err {
        // Connectivity problems are the designed trigger for fallback.
        AcquisitionError::Probe
        | AcquisitionError::Network(_)
        | AcquisitionError::Http(_) => FailureKind::Expected,
        // Envelope or validation failures suggest the API changed under us.
        AcquisitionError::Envelope(_) | AcquisitionError::Validation(_) => FailureKind::Unexpected,
        AcquisitionError::ApiResult { .. } => FailureKind::Unknown,
        AcquisitionError::Empty => FailureKind::Unknown,
    }
}

/// Logs one tier's failure at a severity chosen by its classification,
/// naming the tier that will be tried next.
pub fn log_tier_fallthrough(tier: SourceTier, err: &AcquisitionError) {
    let kind = classify_remote_failure(err);
    let message = format!("{:?} tier failed [{}]: {}", tier, kind, err);
    match kind {
        FailureKind::Expected => log::info!("{}", message),
        FailureKind::Unexpected => log::error!("{}", message),
        FailureKind::Unknown => log::warn!("{}", message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_failures_are_expected_fallback_triggers() {
        assert_eq!(
            classify_remote_failure(&AcquisitionError::Http(503)),
            FailureKind::Expected
        );
    }

    #[test]
    fn test_envelope_failures_are_unexpected() {
        let err = AcquisitionError::Envelope("missing <body>".to_string());
        assert_eq!(classify_remote_failure(&err), FailureKind::Unexpected);
    }

    #[test]
    fn test_api_result_codes_are_unknown() {
        let err = AcquisitionError::ApiResult {
            code: "22".to_string(),
            message: "LIMITED NUMBER OF SERVICE REQUESTS EXCEEDS".to_string(),
        };
        assert_eq!(classify_remote_failure(&err), FailureKind::Unknown);
    }
}
