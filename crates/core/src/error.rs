use std::fmt;

/// Failure classes for the recommendation pipeline.
///
/// Contract violations (`InvalidArgument`, `DataMismatch`) surface to the
/// caller immediately. The remaining classes describe upstream trouble and
/// are absorbed by degrading to a local fallback: synthetic weather for
/// `UpstreamDataUnavailable`, the deterministic scorer for the oracle
/// classes. `OracleUnavailable` is the only class worth retrying against
/// an alternate oracle instance.
#[derive(Debug, Clone)]
pub enum RecommendError {
    InvalidArgument(String),
    DataMismatch(String),
    OracleUnavailable(String),
    OracleMalformed(String),
    UpstreamDataUnavailable(String),
}

impl RecommendError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::DataMismatch(_) => "data_mismatch",
            Self::OracleUnavailable(_) => "oracle_unavailable",
            Self::OracleMalformed(_) => "oracle_malformed",
            Self::UpstreamDataUnavailable(_) => "upstream_data_unavailable",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::OracleUnavailable(_))
    }

    /// True for the classes the caller must propagate rather than degrade.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::InvalidArgument(_) | Self::DataMismatch(_))
    }
}

impl fmt::Display for RecommendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let detail = match self {
            Self::InvalidArgument(d)
            | Self::DataMismatch(d)
            | Self::OracleUnavailable(d)
            | Self::OracleMalformed(d)
            | Self::UpstreamDataUnavailable(d) => d,
        };
        write!(f, "{}: {detail}", self.kind())
    }
}

impl std::error::Error for RecommendError {}
