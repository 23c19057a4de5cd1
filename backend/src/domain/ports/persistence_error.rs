//! Error shared by every database-backed port.

use serde_json::json;

use super::define_port_error;
use crate::domain::Error;

define_port_error! {
    /// Failures raised by persistence adapters.
    pub enum PersistenceError {
        /// The database could not be reached or the pool is exhausted.
        Connection { message: String } => "database connection failed: {message}",
        /// A query failed for a reason the caller cannot fix.
        Query { message: String } => "database query failed: {message}",
        /// A unique constraint rejected the write.
        Conflict { message: String } => "unique constraint violated: {message}",
        /// A foreign key or check constraint rejected the write.
        ForeignKey { message: String } => "referenced row is missing: {message}",
    }
}

impl From<PersistenceError> for Error {
    fn from(value: PersistenceError) -> Self {
        match value {
            PersistenceError::Connection { message } => {
                Error::service_unavailable(format!("database unavailable: {message}"))
            }
            PersistenceError::Query { message } => {
                Error::internal(format!("database error: {message}"))
            }
            PersistenceError::Conflict { message } => Error::invalid_request(message)
                .with_details(json!({ "code": "unique" })),
            PersistenceError::ForeignKey { message } => Error::invalid_request(message)
                .with_details(json!({ "code": "does_not_exist" })),
        }
    }
}
