use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;

use super::models::{DiscountCodeRow, NewDiscountCodeRow};
use super::store::{constraint_error, DieselStore};
use crate::domain::discount::{DiscountCode, DiscountStatus, NewDiscountCode};
use crate::domain::errors::DomainError;
use crate::domain::ports::DiscountLedger;
use crate::schema::discount_codes;

pub(super) fn find(conn: &mut PgConnection, code: &str) -> Result<Option<DiscountCode>, DomainError> {
    discount_codes::table
        .filter(discount_codes::code.eq(code))
        .select(DiscountCodeRow::as_select())
        .first(conn)
        .optional()?
        .map(DiscountCode::try_from)
        .transpose()
}

/// Marks an active code used by `order_number`. A concurrent commit that got
/// there first leaves zero matching rows.
pub(super) fn consume(
    conn: &mut PgConnection,
    code: &str,
    order_number: &str,
    at: DateTime<Utc>,
) -> Result<(), DomainError> {
    let updated = diesel::update(
        discount_codes::table
            .filter(discount_codes::code.eq(code))
            .filter(discount_codes::status.eq(DiscountStatus::Active.as_str())),
    )
    .set((
        discount_codes::status.eq(DiscountStatus::Used.as_str()),
        discount_codes::used_at.eq(Some(at)),
        discount_codes::used_on_order.eq(Some(order_number)),
    ))
    .execute(conn)?;

    if updated == 0 {
        return Err(DomainError::DiscountAlreadyUsed(code.to_string()));
    }
    Ok(())
}

impl DiscountLedger for DieselStore {
    fn find_discount(&self, code: &str) -> Result<Option<DiscountCode>, DomainError> {
        let mut conn = self.conn()?;
        find(&mut conn, code)
    }

    fn create_discount(&self, new: NewDiscountCode) -> Result<DiscountCode, DomainError> {
        let mut conn = self.conn()?;
        let row = diesel::insert_into(discount_codes::table)
            .values(&NewDiscountCodeRow {
                code: &new.code,
                percent_off: new.percent_off,
                status: DiscountStatus::Active.as_str(),
                created_by: new.created_by,
            })
            .returning(DiscountCodeRow::as_returning())
            .get_result(&mut conn)
            .map_err(|e| constraint_error(e, || DomainError::DuplicateCode(new.code.clone())))?;
        row.try_into()
    }

    fn set_discount_status(
        &self,
        code: &str,
        status: DiscountStatus,
    ) -> Result<DiscountCode, DomainError> {
        let mut conn = self.conn()?;
        diesel::update(
            discount_codes::table
                .filter(discount_codes::code.eq(code))
                .filter(discount_codes::status.eq(DiscountStatus::Active.as_str())),
        )
        .set(discount_codes::status.eq(status.as_str()))
        .returning(DiscountCodeRow::as_returning())
        .get_result(&mut conn)
        .optional()?
        .ok_or_else(|| DomainError::DiscountNotFound(code.to_string()))?
        .try_into()
    }
}
