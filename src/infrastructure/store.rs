use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::db::DbPool;
use crate::domain::errors::DomainError;

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<DieselError> for DomainError {
    fn from(e: DieselError) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

/// Translates constraint violations that carry domain meaning; everything
/// else stays internal.
pub(super) fn constraint_error(e: DieselError, on_unique: impl FnOnce() -> DomainError) -> DomainError {
    match e {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => on_unique(),
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            DomainError::NotFound(format!(
                "Referenced row ({})",
                info.constraint_name().unwrap_or("foreign key")
            ))
        }
        other => other.into(),
    }
}

// ── Store ────────────────────────────────────────────────────────────────────

/// Postgres-backed implementation of every persistence port.
pub struct DieselStore {
    pool: DbPool,
}

impl DieselStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub(super) fn conn(
        &self,
    ) -> Result<PooledConnection<ConnectionManager<PgConnection>>, DomainError> {
        Ok(self.pool.get()?)
    }
}
