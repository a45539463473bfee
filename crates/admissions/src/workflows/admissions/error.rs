use serde::Serialize;

use super::documents::DocumentRuleError;
use super::eligibility::EligibilityError;
use super::lifecycle::TransitionError;
use super::repository::RepositoryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    NotFound,
    Unauthorized,
    InvalidState,
    Conflict,
    ValidationFailed,
    Unexpected,
}

/// Failure returned by every admissions command and query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdmissionsError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    InvalidState(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{message}")]
    ValidationFailed {
        message: String,
        errors: Vec<String>,
    },
    #[error("{0}")]
    Unexpected(String),
}

/// Serializable `{error, errors}` view of a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl AdmissionsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AdmissionsError::NotFound(_) => ErrorKind::NotFound,
            AdmissionsError::Unauthorized(_) => ErrorKind::Unauthorized,
            AdmissionsError::InvalidState(_) => ErrorKind::InvalidState,
            AdmissionsError::Conflict(_) => ErrorKind::Conflict,
            AdmissionsError::ValidationFailed { .. } => ErrorKind::ValidationFailed,
            AdmissionsError::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    pub fn errors(&self) -> &[String] {
        match self {
            AdmissionsError::ValidationFailed { errors, .. } => errors,
            _ => &[],
        }
    }

    pub fn failure(&self) -> Failure {
        Failure {
            error: self.to_string(),
            errors: self.errors().to_vec(),
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        AdmissionsError::ValidationFailed {
            message: message.into(),
            errors: Vec::new(),
        }
    }

    /// Validation failure whose headline is the first listed problem.
    pub(crate) fn from_violations(errors: Vec<String>) -> Result<(), Self> {
        match errors.first() {
            None => Ok(()),
            Some(first) => Err(AdmissionsError::ValidationFailed {
                message: first.clone(),
                errors,
            }),
        }
    }

    pub(crate) fn unauthorized(message: impl Into<String>) -> Self {
        AdmissionsError::Unauthorized(message.into())
    }
}

impl From<EligibilityError> for AdmissionsError {
    fn from(value: EligibilityError) -> Self {
        AdmissionsError::invalid(value.to_string())
    }
}

impl From<TransitionError> for AdmissionsError {
    fn from(value: TransitionError) -> Self {
        AdmissionsError::InvalidState(value.to_string())
    }
}

impl From<DocumentRuleError> for AdmissionsError {
    fn from(value: DocumentRuleError) -> Self {
        match value {
            DocumentRuleError::FileTooLarge { .. } => AdmissionsError::invalid(value.to_string()),
            DocumentRuleError::DuplicateFileName | DocumentRuleError::DuplicateDocumentType(_) => {
                AdmissionsError::Conflict(value.to_string())
            }
        }
    }
}

/// Maps storage failures onto caller-facing errors. Infrastructure faults are logged and
/// replaced with a generic message naming the operation.
pub(crate) trait StoreResultExt<T> {
    fn or_fail(self, operation: &str) -> Result<T, AdmissionsError>;
}

impl<T> StoreResultExt<T> for Result<T, RepositoryError> {
    fn or_fail(self, operation: &str) -> Result<T, AdmissionsError> {
        self.map_err(|err| match err {
            RepositoryError::Conflict(message) => AdmissionsError::Conflict(message),
            RepositoryError::NotFound => AdmissionsError::NotFound("Record not found".to_string()),
            RepositoryError::Unavailable(reason) => {
                tracing::error!(operation, %reason, "admissions store failure");
                AdmissionsError::Unexpected(format!("An error occurred while {operation}"))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_view_carries_sub_errors() {
        let err = AdmissionsError::from_violations(vec![
            "Score must be between 0 and 100".to_string(),
            "Feedback is required".to_string(),
        ])
        .expect_err("violations present");
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
        let failure = err.failure();
        assert_eq!(failure.error, "Score must be between 0 and 100");
        assert_eq!(failure.errors.len(), 2);
    }

    #[test]
    fn unavailable_store_hides_the_cause() {
        let result: Result<(), RepositoryError> =
            Err(RepositoryError::Unavailable("disk on fire".to_string()));
        let err = result.or_fail("submitting application").expect_err("fails");
        assert_eq!(
            err,
            AdmissionsError::Unexpected("An error occurred while submitting application".into())
        );
    }

    #[test]
    fn duplicate_documents_are_conflicts() {
        let err: AdmissionsError = DocumentRuleError::DuplicateFileName.into();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        let err: AdmissionsError = DocumentRuleError::FileTooLarge { size: 1 }.into();
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    }
}
