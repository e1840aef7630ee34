use std::io;

use http::status::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum MolybdenumError {
    /// Malformed input shape, schema violation or duplicate ids.
    #[error("Validation error: {0}")]
    Validation(String),
    /// A value was present but could not be coerced to the attribute's type.
    #[error("Type error: {0}")]
    Type(String),
    /// A node or entity id that the model does not know about.
    #[error("Reference error: {0}")]
    Reference(String),
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
    #[error("File System error: {0}")]
    Io(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("You do not have permission to access this resource")]
    PermissionDenied,
}

impl MolybdenumError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            MolybdenumError::Validation(_) => StatusCode::BAD_REQUEST,
            MolybdenumError::Type(_) => StatusCode::UNPROCESSABLE_ENTITY,
            MolybdenumError::Reference(_) => StatusCode::CONFLICT,
            MolybdenumError::Serialization(_) => StatusCode::BAD_REQUEST,
            MolybdenumError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            MolybdenumError::NotFound(_) => StatusCode::NOT_FOUND,
            MolybdenumError::PermissionDenied => StatusCode::FORBIDDEN,
        }
    }

    /// True for the error kinds that leave the model untouched and only describe bad input.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            MolybdenumError::Validation(_) | MolybdenumError::Type(_) | MolybdenumError::Reference(_)
        )
    }
}

impl From<toml::de::Error> for MolybdenumError {
    fn from(src: toml::de::Error) -> MolybdenumError {
        MolybdenumError::Serialization(format!("Toml deserialization error: {src}"))
    }
}

impl From<JsonError> for MolybdenumError {
    fn from(src: JsonError) -> MolybdenumError {
        MolybdenumError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<io::Error> for MolybdenumError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => MolybdenumError::NotFound(format!("{x}")),
            io::ErrorKind::PermissionDenied => MolybdenumError::PermissionDenied,
            _ => MolybdenumError::Io(format!("IOError: {}", x.kind())),
        }
    }
}
