use thiserror::Error;

/// Service-level errors that can occur in business logic
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Cafe not found: {id}")]
    CafeNotFound { id: i64 },

    #[error("No cafes available")]
    NoCafesAvailable,

    #[error("A cafe named '{name}' already exists")]
    DuplicateName { name: String },

    #[error("Required field missing: {field}")]
    MissingField { field: String },

    #[error("Repository error: {source}")]
    Repository {
        #[from]
        source: RepositoryError,
    },
}

/// Repository-level errors for data access operations
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Item not found")]
    NotFound,

    #[error("AWS SDK error: {message}")]
    AwsSdk { message: String },

    #[error("DynamoDB table not found: {table_name}. Ensure the table exists and IAM permissions are correct.")]
    TableNotFound { table_name: String },

    #[error("Invalid item: {message}")]
    InvalidItem { message: String },
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ServiceError::CafeNotFound { id: 42 };
        assert_eq!(error.to_string(), "Cafe not found: 42");

        let error = ServiceError::MissingField {
            field: "map_url".to_string(),
        };
        assert_eq!(error.to_string(), "Required field missing: map_url");
    }

    #[test]
    fn test_repository_error_conversion() {
        let repo_error = RepositoryError::NotFound;

        let service_error: ServiceError = repo_error.into();
        match service_error {
            ServiceError::Repository { source } => {
                assert!(matches!(source, RepositoryError::NotFound));
            }
            _ => panic!("Expected Repository conversion"),
        }
    }
}
