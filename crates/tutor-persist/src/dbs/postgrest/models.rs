use serde::Deserialize;

use crate::error::PersistError;

/// Postgres unique_violation
pub const UNIQUE_VIOLATION: &str = "23505";

/// Error payload returned by PostgREST on non-2xx responses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostgrestErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
}

impl PostgrestErrorBody {
    pub fn into_error(self, status: u16, raw_body: &str) -> PersistError {
        let message = match (self.message, self.details) {
            (Some(message), Some(details)) => format!("{} ({})", message, details),
            (Some(message), None) => message,
            (None, _) => raw_body.to_string(),
        };

        if self.code.as_deref() == Some(UNIQUE_VIOLATION) {
            return PersistError::Conflict(message);
        }

        PersistError::Backend {
            status,
            code: self.code,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_maps_to_conflict() {
        let body: PostgrestErrorBody = serde_json::from_str(
            r#"{"code":"23505","message":"duplicate key value","details":"Key (memberstack_id)=(x) already exists.","hint":null}"#,
        )
        .unwrap();

        assert!(matches!(body.into_error(409, ""), PersistError::Conflict(_)));
    }

    #[test]
    fn test_other_codes_map_to_backend() {
        let body: PostgrestErrorBody =
            serde_json::from_str(r#"{"code":"42501","message":"permission denied"}"#).unwrap();

        match body.into_error(403, "") {
            PersistError::Backend { status, code, message } => {
                assert_eq!(status, 403);
                assert_eq!(code.as_deref(), Some("42501"));
                assert_eq!(message, "permission denied");
            }
            other => panic!("Expected Backend error, got {:?}", other),
        }
    }
}
