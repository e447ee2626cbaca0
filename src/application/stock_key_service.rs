use std::sync::Arc;

use crate::domain::errors::DomainError;
use crate::domain::order::ListResult;
use crate::domain::ports::StockKeyRepository;
use crate::domain::stock_key::{
    NewStockKey, OrderRef, StockKey, StockKeyFilter, StockKeyPatch,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkOutcome {
    pub inserted: usize,
    pub skipped: usize,
}

pub struct StockKeyService<R: ?Sized> {
    repo: Arc<R>,
}

impl<R: StockKeyRepository + ?Sized> StockKeyService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub fn create(
        &self,
        product_id: i64,
        game_key: &str,
        notes: Option<String>,
    ) -> Result<StockKey, DomainError> {
        self.repo
            .create_key(NewStockKey::new(product_id, game_key, notes)?)
    }

    /// Blank entries are skipped along with keys that already exist.
    pub fn bulk_create(&self, product_id: i64, game_keys: &[String]) -> Result<BulkOutcome, DomainError> {
        let keys: Vec<NewStockKey> = game_keys
            .iter()
            .filter_map(|k| NewStockKey::new(product_id, k, None).ok())
            .collect();
        let inserted = if keys.is_empty() {
            0
        } else {
            self.repo.bulk_create_keys(keys)?
        };
        Ok(BulkOutcome {
            inserted,
            skipped: game_keys.len() - inserted,
        })
    }

    pub fn get(&self, key_id: i64) -> Result<StockKey, DomainError> {
        self.repo.find_key(key_id)?.ok_or(DomainError::KeyNotFound)
    }

    pub fn assign(&self, key_id: i64, order: &OrderRef) -> Result<StockKey, DomainError> {
        let key = self.repo.assign_key(key_id, order)?;
        log::info!(
            "Stock key {} sold on order {}",
            key.id,
            key.order_number.as_deref().unwrap_or_default()
        );
        Ok(key)
    }

    pub fn update(&self, key_id: i64, mut patch: StockKeyPatch) -> Result<StockKey, DomainError> {
        if let Some(game_key) = patch.game_key.as_deref() {
            let trimmed = game_key.trim();
            if trimmed.is_empty() {
                return Err(DomainError::InvalidInput("game_key cannot be empty".into()));
            }
            patch.game_key = Some(trimmed.to_string());
        }
        self.repo.update_key(key_id, patch)
    }

    pub fn delete(&self, key_id: i64) -> Result<(), DomainError> {
        self.repo.delete_key(key_id)
    }

    pub fn list(
        &self,
        filter: &StockKeyFilter,
        page: i64,
        limit: i64,
    ) -> Result<ListResult<StockKey>, DomainError> {
        self.repo.list_keys(filter, page.max(1), limit.clamp(1, 100))
    }
}
