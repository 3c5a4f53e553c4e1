//! Inventory catalog seam
//!
//! The catalog itself (listing management, search, media) belongs to
//! another subsystem; the lifecycle engine only reads identity, unit
//! price and availability, and moves quantities with atomic
//! decrement-if-available updates so two checkouts cannot both take the
//! last unit.

use rust_decimal::Decimal;
use sqlx::{Pool, Postgres, Row, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Catalog listing as seen by the lifecycle engine
#[derive(Debug, Clone)]
pub struct InventoryListing {
    pub id: Uuid,
    pub supplier_id: Option<Uuid>,
    pub name: String,
    pub price_per_day: Decimal,
    pub quantity: i32,
}

#[derive(Clone)]
pub struct InventoryRepository {
    pool: Pool<Postgres>,
}

impl InventoryRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get several listings at once; every requested id must exist
    pub async fn get_many(&self, ids: &[Uuid]) -> AppResult<Vec<InventoryListing>> {
        let rows = sqlx::query(
            "SELECT id, supplier_id, name, price_per_day, quantity FROM inventory WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let listings: Vec<InventoryListing> = rows.iter().map(Self::map_row).collect();

        if listings.len() != ids.len() {
            let missing: Vec<String> = ids
                .iter()
                .filter(|id| !listings.iter().any(|l| l.id == **id))
                .map(|id| id.to_string())
                .collect();
            return Err(AppError::NotFound(format!(
                "Inventory items not found: {}",
                missing.join(", ")
            )));
        }

        Ok(listings)
    }

    /// Atomically take `qty` units within the caller's transaction.
    /// Returns false when not enough stock remains; the caller rolls
    /// back and reports which items fell short.
    pub async fn reserve(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        qty: i32,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE inventory SET quantity = quantity - $2 WHERE id = $1 AND quantity >= $2",
        )
        .bind(id)
        .bind(qty)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Give `qty` units back, within the caller's transaction
    pub async fn release(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        qty: i32,
    ) -> AppResult<()> {
        sqlx::query("UPDATE inventory SET quantity = quantity + $2 WHERE id = $1")
            .bind(id)
            .bind(qty)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    fn map_row(row: &sqlx::postgres::PgRow) -> InventoryListing {
        InventoryListing {
            id: row.get("id"),
            supplier_id: row.get("supplier_id"),
            name: row.get("name"),
            price_per_day: row.get("price_per_day"),
            quantity: row.get("quantity"),
        }
    }
}
