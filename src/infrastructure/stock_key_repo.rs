use chrono::Utc;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;

use super::models::{NewStockKeyRow, StockKeyChangeset, StockKeyRow};
use super::order_repo::find_order_row;
use super::store::{constraint_error, DieselStore};
use crate::domain::errors::DomainError;
use crate::domain::order::{page_offset, ListResult};
use crate::domain::ports::StockKeyRepository;
use crate::domain::stock_key::{
    NewStockKey, OrderBinding, OrderRef, StockKey, StockKeyFilter, StockKeyPatch, StockKeyStatus,
};
use crate::schema::{order_items, stock_keys};

fn lock_key(conn: &mut PgConnection, key_id: i64) -> Result<StockKey, DomainError> {
    stock_keys::table
        .find(key_id)
        .select(StockKeyRow::as_select())
        .for_update()
        .first(conn)
        .optional()?
        .ok_or(DomainError::KeyNotFound)?
        .try_into()
}

fn order_binding(
    conn: &mut PgConnection,
    order: &OrderRef,
) -> Result<Option<OrderBinding>, DomainError> {
    let Some(row) = find_order_row(conn, order)? else {
        return Ok(None);
    };
    let product_ids = order_items::table
        .filter(order_items::order_id.eq(row.id))
        .select(order_items::product_id)
        .load::<i64>(conn)?;
    Ok(Some(OrderBinding {
        order_id: row.id,
        order_number: row.order_number,
        product_ids,
    }))
}

fn filtered(filter: &StockKeyFilter) -> stock_keys::BoxedQuery<'static, Pg> {
    let mut query = stock_keys::table.into_boxed();
    if let Some(product_id) = filter.product_id {
        query = query.filter(stock_keys::product_id.eq(product_id));
    }
    if let Some(status) = filter.status {
        query = query.filter(stock_keys::status.eq(status.as_str()));
    }
    query
}

impl StockKeyRepository for DieselStore {
    fn create_key(&self, new: NewStockKey) -> Result<StockKey, DomainError> {
        let mut conn = self.conn()?;
        diesel::insert_into(stock_keys::table)
            .values(&NewStockKeyRow {
                product_id: new.product_id,
                game_key: &new.game_key,
                notes: new.notes.as_deref(),
            })
            .returning(StockKeyRow::as_returning())
            .get_result(&mut conn)
            .map_err(|e| constraint_error(e, || DomainError::DuplicateKey))?
            .try_into()
    }

    fn bulk_create_keys(&self, keys: Vec<NewStockKey>) -> Result<usize, DomainError> {
        let mut conn = self.conn()?;
        let rows: Vec<NewStockKeyRow> = keys
            .iter()
            .map(|k| NewStockKeyRow {
                product_id: k.product_id,
                game_key: &k.game_key,
                notes: k.notes.as_deref(),
            })
            .collect();
        diesel::insert_into(stock_keys::table)
            .values(&rows)
            .on_conflict(stock_keys::game_key)
            .do_nothing()
            .execute(&mut conn)
            .map_err(|e| constraint_error(e, || DomainError::DuplicateKey))
    }

    fn find_key(&self, key_id: i64) -> Result<Option<StockKey>, DomainError> {
        let mut conn = self.conn()?;
        stock_keys::table
            .find(key_id)
            .select(StockKeyRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(StockKey::try_from)
            .transpose()
    }

    fn assign_key(&self, key_id: i64, order: &OrderRef) -> Result<StockKey, DomainError> {
        let mut conn = self.conn()?;
        conn.transaction::<_, DomainError, _>(|conn| {
            let key = lock_key(conn, key_id)?;
            key.ensure_assignable()?;

            let binding = order_binding(conn, order)?.ok_or(DomainError::OrderNotFound)?;
            binding.ensure_contains(key.product_id)?;

            let now = Utc::now();
            let updated = diesel::update(
                stock_keys::table
                    .find(key_id)
                    .filter(stock_keys::status.eq(StockKeyStatus::Available.as_str())),
            )
            .set((
                stock_keys::status.eq(StockKeyStatus::Sold.as_str()),
                stock_keys::order_id.eq(Some(binding.order_id)),
                stock_keys::order_number.eq(Some(binding.order_number.as_str())),
                stock_keys::assigned_at.eq(Some(now)),
                stock_keys::updated_at.eq(now),
            ))
            .returning(StockKeyRow::as_returning())
            .get_result(conn)
            .optional()?;

            match updated {
                Some(row) => row.try_into(),
                None => Err(DomainError::KeyNotAvailable {
                    status: lock_key(conn, key_id)?.status,
                }),
            }
        })
    }

    fn update_key(&self, key_id: i64, patch: StockKeyPatch) -> Result<StockKey, DomainError> {
        let mut conn = self.conn()?;
        conn.transaction::<_, DomainError, _>(|conn| {
            let key = lock_key(conn, key_id)?;
            key.ensure_patchable(&patch)?;

            diesel::update(stock_keys::table.find(key_id))
                .set(&StockKeyChangeset {
                    game_key: patch.game_key.as_deref(),
                    status: patch.status.map(|s| s.as_str()),
                    notes: patch.notes.as_deref(),
                    updated_at: Some(Utc::now()),
                })
                .returning(StockKeyRow::as_returning())
                .get_result(conn)
                .map_err(|e| constraint_error(e, || DomainError::DuplicateKey))?
                .try_into()
        })
    }

    fn delete_key(&self, key_id: i64) -> Result<(), DomainError> {
        let mut conn = self.conn()?;
        conn.transaction::<_, DomainError, _>(|conn| {
            lock_key(conn, key_id)?.ensure_deletable()?;
            diesel::delete(stock_keys::table.find(key_id)).execute(conn)?;
            Ok(())
        })
    }

    fn list_keys(
        &self,
        filter: &StockKeyFilter,
        page: i64,
        limit: i64,
    ) -> Result<ListResult<StockKey>, DomainError> {
        let mut conn = self.conn()?;

        let offset = page_offset(page, limit)?;
        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = filtered(filter).count().get_result(conn)?;

            let rows = filtered(filter)
                .select(StockKeyRow::as_select())
                .order((stock_keys::created_at.desc(), stock_keys::id.desc()))
                .limit(limit)
                .offset(offset)
                .load(conn)?;

            Ok(ListResult {
                items: rows
                    .into_iter()
                    .map(StockKey::try_from)
                    .collect::<Result<_, _>>()?,
                total,
            })
        })
    }
}
