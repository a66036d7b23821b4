//! Shared driver error classification.

use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use tracing::debug;

const DUPLICATE_KEY: i32 = 11000;

/// Whether `error` reports a unique-index violation.
pub(super) fn is_duplicate_key(error: &MongoError) -> bool {
    duplicate_key_message(error).is_some()
}

/// Driver message for a unique-index violation, which names the index.
pub(super) fn duplicate_key_message(error: &MongoError) -> Option<&str> {
    match error.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(failure)) if failure.code == DUPLICATE_KEY => {
            Some(failure.message.as_str())
        }
        ErrorKind::Command(failure) if failure.code == DUPLICATE_KEY => {
            Some(failure.message.as_str())
        }
        _ => None,
    }
}

/// Map a driver error into a repository's connection or query constructor.
pub(super) fn map_basic_mongo_error<E, Q, C>(error: &MongoError, query: Q, connection: C) -> E
where
    Q: FnOnce(String) -> E,
    C: FnOnce(String) -> E,
{
    debug!(error = %error, "mongodb operation failed");
    match error.kind.as_ref() {
        ErrorKind::ServerSelection { .. }
        | ErrorKind::Io(_)
        | ErrorKind::ConnectionPoolCleared { .. }
        | ErrorKind::DnsResolve { .. } => connection(error.to_string()),
        _ => query(error.to_string()),
    }
}
