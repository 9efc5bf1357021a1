//! Service-level error types.
//!
//! Only operation-fatal conditions surface here. Per-tile failures are
//! handled (and logged) inside the fetch layer and never reach the caller;
//! a composite near a coverage boundary simply has un-drawn cells.

use thiserror::Error;

use crate::provider::{HttpError, MetadataError};

/// Errors that fail a whole service operation.
#[derive(Debug, Error)]
pub enum RadarError {
    /// The HTTP client could not be constructed.
    #[error("failed to initialize HTTP client: {0}")]
    ClientSetup(#[source] HttpError),

    /// The radar metadata endpoint failed or returned garbage. No stale
    /// data is substituted.
    #[error("radar metadata unavailable: {0}")]
    MetadataUnavailable(#[source] MetadataError),

    /// Metadata parsed but carried no usable radar timestamps.
    #[error("no radar data available")]
    NoRadarData,

    /// The operation was cancelled; nothing was written to the cache.
    #[error("operation cancelled")]
    Cancelled,
}

impl RadarError {
    /// Maps a metadata error, folding the empty-payload case into
    /// [`RadarError::NoRadarData`].
    pub(crate) fn from_metadata(e: MetadataError) -> Self {
        match e {
            MetadataError::Empty => RadarError::NoRadarData,
            other => RadarError::MetadataUnavailable(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_metadata_folds_to_no_data() {
        assert!(matches!(
            RadarError::from_metadata(MetadataError::Empty),
            RadarError::NoRadarData
        ));
    }

    #[test]
    fn test_http_metadata_error_stays_metadata() {
        let err = RadarError::from_metadata(MetadataError::Parse("bad".into()));
        assert!(matches!(err, RadarError::MetadataUnavailable(_)));
        assert!(err.to_string().contains("metadata unavailable"));
    }
}
