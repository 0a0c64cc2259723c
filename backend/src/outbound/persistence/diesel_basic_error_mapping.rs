//! Pool and Diesel error translation shared by every registry adapter.
//!
//! Adapters pass their port error constructors in, so this module never
//! names a concrete port.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Turn a pool failure into the port's `Connection` error.
pub fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Turn a Diesel failure into the port's `Query` or `Connection` error.
///
/// Only a closed connection counts as a connection problem. Constraint
/// violations get a fixed description; the database's own message is logged
/// at debug and never returned, since it can quote row values.
pub fn map_basic_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: FnOnce(&'static str) -> E,
    C: FnOnce(&'static str) -> E,
{
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection closed")
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            query("referenced obstacle does not exist")
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            query("duplicate record")
        }
        DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, _) => {
            query("value rejected by a table constraint")
        }
        DieselError::QueryBuilderError(_) => query("database query could not be built"),
        _ => query("database error"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug, PartialEq, Eq)]
    enum Probe {
        Query(&'static str),
        Connection(&'static str),
    }

    #[derive(Debug)]
    struct Info(&'static str);

    impl diesel::result::DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            self.0
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            None
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn database(kind: DatabaseErrorKind) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(Info("row (7, 'secret') violates")))
    }

    #[rstest]
    #[case(DieselError::NotFound, Probe::Query("record not found"))]
    #[case(
        database(DatabaseErrorKind::ClosedConnection),
        Probe::Connection("database connection closed")
    )]
    #[case(
        database(DatabaseErrorKind::ForeignKeyViolation),
        Probe::Query("referenced obstacle does not exist")
    )]
    #[case(database(DatabaseErrorKind::UniqueViolation), Probe::Query("duplicate record"))]
    #[case(DieselError::RollbackTransaction, Probe::Query("database error"))]
    fn diesel_errors_are_classified(#[case] error: DieselError, #[case] expected: Probe) {
        assert_eq!(
            map_basic_diesel_error(error, Probe::Query, Probe::Connection),
            expected
        );
    }

    #[rstest]
    fn pool_errors_keep_their_message() {
        let mapped: String = map_basic_pool_error(PoolError::build("bad url"), |message| message);

        assert_eq!(mapped, "bad url");
    }
}
