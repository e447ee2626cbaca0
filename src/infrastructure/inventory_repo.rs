use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;

use super::models::ProductRow;
use super::store::DieselStore;
use crate::domain::errors::DomainError;
use crate::domain::ports::InventoryLedger;
use crate::domain::product::Product;
use crate::schema::products;

fn product_not_found(product_id: i64) -> DomainError {
    DomainError::NotFound(format!("Product {product_id}"))
}

/// Takes row locks on the given products, in ascending id order.
pub(super) fn lock_products(conn: &mut PgConnection, ids: &[i64]) -> Result<(), DomainError> {
    products::table
        .filter(products::id.eq_any(ids))
        .order(products::id.asc())
        .select(products::id)
        .for_update()
        .load::<i64>(conn)?;
    Ok(())
}

/// Re-reads the authoritative stock under a row lock before writing, so it
/// is safe to call from inside a larger transaction.
pub(super) fn decrement_stock(
    conn: &mut PgConnection,
    product_id: i64,
    quantity: i32,
) -> Result<i32, DomainError> {
    let stock: i32 = products::table
        .find(product_id)
        .select(products::stock)
        .for_update()
        .first(conn)
        .optional()?
        .ok_or_else(|| product_not_found(product_id))?;

    if stock < quantity {
        return Err(DomainError::InsufficientStock {
            product_id,
            available: stock,
        });
    }

    let remaining = diesel::update(products::table.find(product_id))
        .set((
            products::stock.eq(products::stock - quantity),
            products::updated_at.eq(Utc::now()),
        ))
        .returning(products::stock)
        .get_result(conn)?;
    Ok(remaining)
}

impl InventoryLedger for DieselStore {
    fn load_products(&self, ids: &[i64]) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.conn()?;
        let rows = products::table
            .filter(products::id.eq_any(ids))
            .select(ProductRow::as_select())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    fn get_stock(&self, product_id: i64) -> Result<i32, DomainError> {
        let mut conn = self.conn()?;
        products::table
            .find(product_id)
            .select(products::stock)
            .first(&mut conn)
            .optional()?
            .ok_or_else(|| product_not_found(product_id))
    }

    fn decrement_stock(&self, product_id: i64, quantity: i32) -> Result<i32, DomainError> {
        let mut conn = self.conn()?;
        conn.transaction::<_, DomainError, _>(|conn| decrement_stock(conn, product_id, quantity))
    }

    fn restock(&self, product_id: i64, quantity: i32) -> Result<i32, DomainError> {
        let mut conn = self.conn()?;
        diesel::update(products::table.find(product_id))
            .set((
                products::stock.eq(products::stock + quantity),
                products::updated_at.eq(Utc::now()),
            ))
            .returning(products::stock)
            .get_result(&mut conn)
            .optional()?
            .ok_or_else(|| product_not_found(product_id))
    }
}
