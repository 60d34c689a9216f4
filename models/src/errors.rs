// models/src/errors.rs

use std::io;
pub use thiserror::Error;
use uuid::Error as UuidError;
use uuid::Uuid;

#[cfg(feature = "bincode-errors")]
use bincode::error::{DecodeError, EncodeError};

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Storage error: {0}")]
    StorageError(String), // General storage operation error
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Deserialization error: {0}")]
    DeserializationError(String),
    #[error("Transaction error: {0}")]
    TransactionError(String), // Error specific to transaction management
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Entity already exists: {0}")]
    AlreadyExists(String),
    #[error("Invalid data provided: {0}")]
    InvalidData(String),
    #[error("An internal error occurred: {0}")]
    InternalError(String),

    #[error("{0} with id {1} was not found")]
    NotFound(&'static str, Uuid),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[cfg(feature = "sled-errors")]
    #[error(transparent)]
    Sled(#[from] sled::Error),
    #[cfg(feature = "bincode-errors")]
    #[error(transparent)]
    BincodeDecode(#[from] DecodeError),
    #[cfg(feature = "bincode-errors")]
    #[error(transparent)]
    BincodeEncode(#[from] EncodeError),
    #[error("UUID parsing or generation error: {0}")]
    Uuid(#[from] UuidError),
    #[error("Authentication error: {0}")]
    Auth(String),
}

impl From<serde_json::Error> for RecordError {
    fn from(err: serde_json::Error) -> Self {
        RecordError::SerializationError(format!("JSON processing error: {}", err))
    }
}

/// A validation error.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// An invalid value was provided where a specific value or format was expected.
    #[error("invalid value provided")]
    InvalidValue,
    /// A phone number that does not match the expected format.
    #[error("phone number '{0}' must be entered in the format '+999999999', up to 13 digits")]
    InvalidPhoneNumber(String),
    /// A role string outside the known set.
    #[error("unknown role '{0}'")]
    UnknownRole(String),
    /// A facility status string outside the known set.
    #[error("unknown health facility status '{0}'")]
    UnknownFacilityStatus(String),
    /// A visit status string outside the known set.
    #[error("unknown visit status '{0}'")]
    UnknownVisitStatus(String),
    /// A diagnosis classification string outside the known set.
    #[error("unknown diagnosis classification '{0}'")]
    UnknownClassification(String),
    /// An invalid date format was provided.
    #[error("invalid date format: {0}")]
    InvalidDateFormat(String),
    /// A required field was not provided.
    #[error("required field {0} is missing")]
    MissingField(&'static str),
    /// A transfer destination that is not a hospital.
    #[error("transfer destination {0} is not a hospital")]
    DestinationNotHospital(Uuid),
    /// Password hashing failed.
    #[error("password hashing failed")]
    PasswordHashingFailed,
}

/// A type alias for a `Result` that returns a `RecordError` on failure.
pub type RecordResult<T> = Result<T, RecordError>;

/// A type alias for a `Result` that returns a `ValidationError` on failure.
pub type ValidationResult<T> = Result<T, ValidationError>;
