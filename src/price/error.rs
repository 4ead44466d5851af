//! Error kinds surfaced by the price resolver.

/// Errors that can occur while resolving a regional fuel price.
///
/// The first three variants classify the outcome of a cache miss. `Store`
/// covers failures of the cache store itself.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PriceError {
    /// No provider series is mapped for the region.
    ///
    /// Detected before any network call. Not retryable; callers should treat
    /// it as a client input error.
    #[error("Gas price data not available for region: {0}")]
    UnsupportedRegion(String),

    /// The provider could not be reached or answered with a transport-level failure.
    #[error("Failed to fetch price data from provider: {0}")]
    UpstreamUnavailable(String),

    /// The provider answered but the payload was missing, empty or not a positive number.
    #[error("Invalid price data from provider: {0}")]
    UpstreamDataInvalid(String),

    /// The price cache store failed to read or write.
    #[error("Price cache store error: {0}")]
    Store(String),
}

impl PriceError {
    pub fn unsupported_region(region_code: impl Into<String>) -> Self {
        PriceError::UnsupportedRegion(region_code.into())
    }

    pub fn upstream_unavailable(details: impl Into<String>) -> Self {
        PriceError::UpstreamUnavailable(details.into())
    }

    pub fn upstream_data_invalid(details: impl Into<String>) -> Self {
        PriceError::UpstreamDataInvalid(details.into())
    }

    /// Whether a caller may reasonably retry the same request later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PriceError::UpstreamUnavailable(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PriceError::UnsupportedRegion(_) => "unsupported_region",
            PriceError::UpstreamUnavailable(_) => "upstream_unavailable",
            PriceError::UpstreamDataInvalid(_) => "upstream_data_invalid",
            PriceError::Store(_) => "store_error",
        }
    }
}

impl From<sqlx::Error> for PriceError {
    fn from(err: sqlx::Error) -> Self {
        PriceError::Store(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_upstream_unavailable_is_retryable() {
        assert!(PriceError::upstream_unavailable("timeout").is_retryable());
        assert!(!PriceError::unsupported_region("ZZ").is_retryable());
        assert!(!PriceError::upstream_data_invalid("empty").is_retryable());
        assert!(!PriceError::Store("locked".to_string()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let error = PriceError::unsupported_region("TX");
        assert_eq!(
            error.to_string(),
            "Gas price data not available for region: TX"
        );
        assert_eq!(error.kind(), "unsupported_region");
    }
}
