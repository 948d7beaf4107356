use serde::{Deserialize, Serialize};

use crate::{ProviderId, UtcDateTime, ValidationError};

/// Standard response envelope for all `prevista` machine-readable outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub meta: EnvelopeMeta,
    pub data: T,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<EnvelopeError>,
}

impl<T> Envelope<T> {
    pub fn success(meta: EnvelopeMeta, data: T) -> Self {
        Self {
            meta,
            data,
            errors: Vec::new(),
        }
    }

    pub fn with_errors(
        meta: EnvelopeMeta,
        data: T,
        errors: Vec<EnvelopeError>,
    ) -> Result<Self, ValidationError> {
        meta.validate_schema_compliance()?;
        for error in &errors {
            error.validate()?;
        }

        Ok(Self { meta, data, errors })
    }

    pub fn push_error(&mut self, error: EnvelopeError) -> Result<(), ValidationError> {
        error.validate()?;
        self.errors.push(error);
        Ok(())
    }
}

/// Metadata attached to every envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeMeta {
    pub request_id: String,
    pub schema_version: String,
    pub generated_at: UtcDateTime,
    pub provider_chain: Vec<ProviderId>,
    pub latency_ms: u64,
    pub cache_hit: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl EnvelopeMeta {
    pub fn new(
        request_id: impl Into<String>,
        schema_version: impl Into<String>,
        provider_chain: Vec<ProviderId>,
        latency_ms: u64,
        cache_hit: bool,
    ) -> Result<Self, ValidationError> {
        let meta = Self {
            request_id: request_id.into(),
            schema_version: schema_version.into(),
            generated_at: UtcDateTime::now(),
            provider_chain,
            latency_ms,
            cache_hit,
            warnings: Vec::new(),
        };
        meta.validate_schema_compliance()?;
        Ok(meta)
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn validate_schema_compliance(&self) -> Result<(), ValidationError> {
        if self.request_id.trim().len() < 8 {
            return Err(ValidationError::InvalidRequestId);
        }

        if !is_valid_schema_version(&self.schema_version) {
            return Err(ValidationError::InvalidSchemaVersion {
                value: self.schema_version.clone(),
            });
        }

        if self.provider_chain.is_empty() {
            return Err(ValidationError::EmptyProviderChain);
        }

        Ok(())
    }
}

/// Structured error payload for partial or failed responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderId>,
}

impl EnvelopeError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let error = Self {
            code: code.into(),
            message: message.into(),
            retryable: None,
            provider: None,
        };
        error.validate()?;
        Ok(error)
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = Some(retryable);
        self
    }

    pub fn with_provider(mut self, provider: ProviderId) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.code.trim().is_empty() {
            return Err(ValidationError::EmptyErrorCode);
        }

        if self.message.trim().is_empty() {
            return Err(ValidationError::EmptyErrorMessage);
        }

        Ok(())
    }
}

fn is_valid_schema_version(value: &str) -> bool {
    let Some(version) = value.strip_prefix('v') else {
        return false;
    };

    let mut parts = version.split('.');
    let major = parts.next();
    let minor = parts.next();
    let patch = parts.next();

    if parts.next().is_some() {
        return false;
    }

    [major, minor, patch].iter().all(|part| {
        part.is_some_and(|segment| {
            !segment.is_empty() && segment.chars().all(|ch| ch.is_ascii_digit())
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> EnvelopeMeta {
        EnvelopeMeta::new(
            "req-12345678",
            "v1.0.0",
            vec![ProviderId::Binance],
            12,
            false,
        )
        .expect("valid meta")
    }

    #[test]
    fn short_request_id_is_rejected() {
        let err = EnvelopeMeta::new("short", "v1.0.0", vec![ProviderId::Binance], 0, false)
            .expect_err("must fail");
        assert_eq!(err, ValidationError::InvalidRequestId);
    }

    #[test]
    fn schema_version_must_be_semver_with_prefix() {
        for bad in ["1.0.0", "v1.0", "v1.0.0.0", "vx.y.z", ""] {
            let err = EnvelopeMeta::new("req-12345678", bad, vec![ProviderId::Binance], 0, false)
                .expect_err("must fail");
            assert!(matches!(err, ValidationError::InvalidSchemaVersion { .. }));
        }
    }

    #[test]
    fn empty_provider_chain_is_rejected() {
        let err =
            EnvelopeMeta::new("req-12345678", "v1.0.0", vec![], 0, false).expect_err("must fail");
        assert_eq!(err, ValidationError::EmptyProviderChain);
    }

    #[test]
    fn errors_require_code_and_message() {
        assert!(EnvelopeError::new("", "message").is_err());
        assert!(EnvelopeError::new("data.unavailable", " ").is_err());

        let mut envelope = Envelope::success(meta(), serde_json::json!({"ok": true}));
        let error = EnvelopeError::new("data.unavailable", "upstream timed out")
            .expect("valid error")
            .with_retryable(true)
            .with_provider(ProviderId::Binance);
        envelope.push_error(error).expect("valid error");

        assert_eq!(envelope.errors.len(), 1);
        assert_eq!(envelope.errors[0].retryable, Some(true));
    }

    #[test]
    fn empty_warning_and_error_lists_are_omitted_from_json() {
        let envelope = Envelope::success(meta(), serde_json::json!({"ok": true}));
        let rendered = serde_json::to_string(&envelope).expect("serializes");

        assert!(!rendered.contains("\"errors\""));
        assert!(!rendered.contains("\"warnings\""));
    }
}
