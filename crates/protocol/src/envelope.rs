//! Response envelope
//!
//! Every backend reply is wrapped as `{code, message, data}`. The code space is
//! owned by the server: one or more sentinel values mean success, anything
//! else is an application failure whose `message` is meant for the user.

use serde::{Deserialize, Serialize};

/// Success sentinel used by the current backend handlers
pub const CODE_OK: i64 = 200;

/// Success sentinel used by the older response helpers
pub const CODE_OK_LEGACY: i64 = 0;

/// Embedded code the backend uses for a missing or rejected token
pub const CODE_UNAUTHORIZED: i64 = 401;

/// Uniform wrapper of every server reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope<T> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

impl<T> ResponseEnvelope<T> {
    /// Success envelope around a payload that arrived without one
    pub fn ok(data: T) -> Self {
        Self {
            code: CODE_OK,
            message: "success".to_string(),
            data: Some(data),
        }
    }

    /// Whether the embedded code is one of the given success sentinels
    pub fn is_success(&self, sentinels: &[i64]) -> bool {
        sentinels.contains(&self.code)
    }

    /// Take the payload, leaving the envelope metadata behind
    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_data_is_none() {
        let env: ResponseEnvelope<String> =
            serde_json::from_str(r#"{"code":0,"message":"success"}"#).unwrap();
        assert_eq!(env.code, 0);
        assert!(env.data.is_none());
    }

    #[test]
    fn test_null_data_is_none() {
        let env: ResponseEnvelope<Vec<String>> =
            serde_json::from_str(r#"{"code":200,"message":"ok","data":null}"#).unwrap();
        assert!(env.data.is_none());
    }

    #[test]
    fn test_success_sentinels() {
        let ok: ResponseEnvelope<()> =
            serde_json::from_str(r#"{"code":0,"message":"success"}"#).unwrap();
        assert!(ok.is_success(&[CODE_OK_LEGACY, CODE_OK]));
        assert!(ResponseEnvelope::ok(()).is_success(&[CODE_OK]));

        let failed: ResponseEnvelope<()> =
            serde_json::from_str(r#"{"code":-1,"message":"record not found"}"#).unwrap();
        assert!(!failed.is_success(&[CODE_OK_LEGACY, CODE_OK]));
    }
}
