use diesel::pg::PgConnection;
use diesel::prelude::*;

use super::models::NewUserRow;
use super::store::DieselStore;
use crate::domain::errors::DomainError;
use crate::domain::identity::{normalize_email, Purchaser};
use crate::domain::ports::UserDirectory;
use crate::schema::users;

diesel::define_sql_function! {
    fn lower(x: diesel::sql_types::Text) -> diesel::sql_types::Text;
}

/// Returns the owning user id, creating the guest shell account on first
/// use of an e-mail address.
pub(super) fn resolve_purchaser(
    conn: &mut PgConnection,
    purchaser: &Purchaser,
) -> Result<i64, DomainError> {
    let profile = match purchaser {
        Purchaser::Registered(user_id) | Purchaser::ReturningGuest(user_id) => {
            return Ok(*user_id)
        }
        Purchaser::Guest(profile) => profile,
    };

    let inserted = diesel::insert_into(users::table)
        .values(&NewUserRow {
            username: &profile.username,
            email: &profile.email,
            first_name: &profile.first_name,
            last_name: &profile.last_name,
            password_hash: &profile.password_hash,
            role: "customer",
            is_guest: true,
        })
        .on_conflict_do_nothing()
        .execute(conn)?;
    if inserted == 1 {
        log::info!("Created guest account {} for checkout", profile.username);
    }

    Ok(users::table
        .filter(lower(users::email).eq(&profile.email))
        .select(users::id)
        .first(conn)?)
}

impl UserDirectory for DieselStore {
    fn find_active_user(&self, user_id: i64) -> Result<Option<i64>, DomainError> {
        let mut conn = self.conn()?;
        Ok(users::table
            .find(user_id)
            .filter(users::is_active.eq(true))
            .select(users::id)
            .first(&mut conn)
            .optional()?)
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<i64>, DomainError> {
        let mut conn = self.conn()?;
        Ok(users::table
            .filter(lower(users::email).eq(normalize_email(email)))
            .select(users::id)
            .first(&mut conn)
            .optional()?)
    }
}
