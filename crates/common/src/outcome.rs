//! Discriminated result carried in JSON bodies
//!
//! Pipeline stages that must never fail a request (summaries, per-paper
//! steps inside a batch) report through `Outcome`. It serializes as
//! `{"success": true, ...payload}` or `{"success": false, "code", "error"}`.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::errors::{AppError, ErrorCode, ErrorResponse};

#[derive(Debug, Clone)]
pub enum Outcome<T> {
    Success(T),
    Failure { kind: ErrorCode, message: String },
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure { message, .. } => Some(message),
        }
    }
}

impl<T> From<AppError> for Outcome<T> {
    fn from(err: AppError) -> Self {
        Outcome::Failure {
            kind: err.code(),
            message: err.to_string(),
        }
    }
}

impl<T> From<Result<T, AppError>> for Outcome<T> {
    fn from(result: Result<T, AppError>) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(err) => err.into(),
        }
    }
}

impl<T: Serialize> Serialize for Outcome<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Outcome::Success(value) => {
                let payload = serde_json::to_value(value).map_err(serde::ser::Error::custom)?;
                match payload {
                    serde_json::Value::Object(fields) => {
                        let mut map = serializer.serialize_map(Some(fields.len() + 1))?;
                        map.serialize_entry("success", &true)?;
                        for (key, field) in &fields {
                            map.serialize_entry(key, field)?;
                        }
                        map.end()
                    }
                    other => {
                        let mut map = serializer.serialize_map(Some(2))?;
                        map.serialize_entry("success", &true)?;
                        map.serialize_entry("data", &other)?;
                        map.end()
                    }
                }
            }
            Outcome::Failure { kind, message } => ErrorResponse {
                success: false,
                code: *kind,
                error: message.clone(),
            }
            .serialize(serializer),
        }
    }
}
