use thiserror::Error;

/// Validation and contract errors exposed by `prevista-core`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("invalid provider '{value}', expected one of binance, coingecko, yahoo")]
    InvalidProvider { value: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },
    #[error("unix timestamp out of representable range: {value}")]
    TimestampOutOfRange { value: i64 },

    #[error("invalid calendar date '{value}', expected YYYY-MM-DD")]
    InvalidDate { value: String },
    #[error("horizon of {days} days is outside the allowed range {min}..={max}")]
    HorizonOutOfRange { days: i64, min: u32, max: u32 },

    #[error("interval width {value} must lie strictly between 0 and 1")]
    IntervalWidthOutOfRange { value: f64 },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("request_id must be at least 8 characters")]
    InvalidRequestId,
    #[error("schema_version must match vMAJOR.MINOR.PATCH: '{value}'")]
    InvalidSchemaVersion { value: String },
    #[error("provider_chain must contain at least one provider")]
    EmptyProviderChain,
    #[error("error code cannot be empty")]
    EmptyErrorCode,
    #[error("error message cannot be empty")]
    EmptyErrorMessage,
}

/// Pipeline-level failure taxonomy.
///
/// Provider and normalizer failures that the contract recovers locally
/// (fallback symbol lists, empty raw series) never surface here; the
/// variants below are the outcomes a caller must handle explicitly.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DataError {
    /// Upstream call failed, timed out, or the response lacked a usable price.
    #[error("upstream data unavailable: {0}")]
    DataUnavailable(String),

    /// Response shape did not match the provider's documented schema.
    #[error("upstream response did not match the expected schema: {0}")]
    MalformedSchema(String),

    /// Fewer than 2 valid historical points after cleaning; the model is
    /// undefined on 0-1 points.
    #[error("insufficient historical data: {valid_rows} valid row(s), need at least 2")]
    InsufficientData { valid_rows: usize },

    /// The model failed to fit or predict. Fatal for the current request.
    #[error("forecast failed: {0}")]
    ForecastFailed(String),
}

impl DataError {
    /// Stable machine-readable code used in envelope errors.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::DataUnavailable(_) => "data.unavailable",
            Self::MalformedSchema(_) => "data.malformed_schema",
            Self::InsufficientData { .. } => "data.insufficient",
            Self::ForecastFailed(_) => "forecast.failed",
        }
    }

    pub const fn retryable(&self) -> bool {
        matches!(self, Self::DataUnavailable(_))
    }
}
