//! # Errors
//!
//! Database errors from Sea-ORM are carried unchanged in [`CrudError::Database`].
//! The remaining variants cover what this crate itself can reject: keys that do
//! not name a column, relation or field, values that cannot be turned into a
//! filter, data that fails to deserialise back into a model, and the row-count
//! checks of [`one`](crate::AsyncBaseCrud::one).

use sea_orm::DbErr;

/// Errors returned by the CRUD helpers.
#[derive(Debug, thiserror::Error)]
pub enum CrudError {
    /// Error raised by Sea-ORM or the database driver.
    #[error(transparent)]
    Database(#[from] DbErr),

    /// A filter or ordering key does not name a column of the table.
    #[error("table `{table}` has no column `{column}`")]
    UnknownColumn { table: String, column: String },

    /// An update tried to change a primary key column.
    #[error("primary key `{0}` cannot be changed by an update")]
    ImmutableField(String),

    /// An eager-load directive names a relation that was never registered.
    #[error("table `{table}` has no relation `{relation}`")]
    UnknownRelation { table: String, relation: String },

    /// A record was asked for a relation the query did not load.
    #[error("relation `{0}` was not loaded for this record")]
    RelationNotLoaded(String),

    /// A partial update carries a key that is not a field of the model.
    #[error("model has no field `{0}`")]
    UnknownField(String),

    /// A keyword value that cannot be used as an equality filter.
    #[error("invalid filter `{key}`: {reason}")]
    InvalidFilter { key: String, reason: String },

    /// The data could not be (de)serialised as the target model.
    #[error("validation failed: {0}")]
    Validation(#[from] serde_json::Error),

    /// `one` found no row.
    #[error("no `{0}` row matched the filters")]
    NoResultFound(String),

    /// `one` found more than one row.
    #[error("multiple `{0}` rows matched the filters")]
    MultipleResultsFound(String),

    /// The blocking runtime could not be started.
    #[error("failed to start runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

impl CrudError {
    pub(crate) fn invalid_filter(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFilter {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Returns the wrapped database error, if any.
    #[must_use]
    pub fn as_db_err(&self) -> Option<&DbErr> {
        match self {
            Self::Database(err) => Some(err),
            _ => None,
        }
    }

    /// True for the "no row" outcome of `one`.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NoResultFound(_) | Self::Database(DbErr::RecordNotFound(_))
        )
    }
}

pub type Result<T, E = CrudError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_errors_stay_reachable() {
        let err = CrudError::from(DbErr::RecordNotFound("authors".into()));
        assert!(matches!(err.as_db_err(), Some(DbErr::RecordNotFound(_))));
        assert!(err.is_not_found());

        let err = CrudError::NoResultFound("authors".into());
        assert!(err.as_db_err().is_none());
        assert!(err.is_not_found());
        assert!(!CrudError::ImmutableField("id".into()).is_not_found());
    }
}
