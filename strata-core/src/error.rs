use crate::Error;
use std::fmt::{self, Display};
use thiserror::Error;

/// Stage of a statement at which the backend reported a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStage {
    Prepare,
    Execute,
}

impl Display for QueryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            QueryStage::Prepare => "prepare",
            QueryStage::Execute => "execute",
        })
    }
}

/// Typed failure kinds. They travel inside [`crate::Error`], retrieve them with [`OrmError::of`].
///
/// None of these are transient, nothing in the crate retries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrmError {
    /// Unknown entity type, table, column or relationship, or an API misuse that a code change
    /// must fix.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(
        "Could not {stage} query {}: {detail}",
        .statement.as_deref().unwrap_or("<unnamed>")
    )]
    Query {
        stage: QueryStage,
        statement: Option<String>,
        detail: String,
    },

    /// The row backing an entity disappeared between load and update.
    #[error("The row of `{table}` being updated no longer exists")]
    StaleEntity { table: String },

    #[error("No row of `{table}` matches {detail}")]
    NotFound { table: String, detail: String },

    #[error("Invalid value for column `{column}`: {detail}")]
    InvalidValue { column: String, detail: String },

    #[error("The entity of `{table}` does not have a persisted primary key")]
    Unsaved { table: String },
}

impl OrmError {
    /// The typed kind carried by `error`, if any.
    pub fn of(error: &Error) -> Option<&OrmError> {
        error.downcast_ref::<OrmError>()
    }

    pub fn configuration(message: impl Into<String>) -> Error {
        OrmError::Configuration(message.into()).into_logged()
    }

    /// Wraps into [`crate::Error`] and logs it: misses are informational, the rest are errors.
    pub fn into_logged(self) -> Error {
        let level = match self {
            OrmError::NotFound { .. } | OrmError::Unsaved { .. } => log::Level::Info,
            _ => log::Level::Error,
        };
        let error = Error::new(self);
        log::log!(level, "{:#}", error);
        error
    }
}
