//! Repository layer for database operations

pub mod bookings;
pub mod deliveries;
pub mod inventory;
pub mod supplier_requests;

use sqlx::{Pool, Postgres};

use crate::error::AppResult;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pool: Pool<Postgres>,
    pub inventory: inventory::InventoryRepository,
    pub bookings: bookings::BookingsRepository,
    pub deliveries: deliveries::DeliveriesRepository,
    pub supplier_requests: supplier_requests::SupplierRequestsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            inventory: inventory::InventoryRepository::new(pool.clone()),
            bookings: bookings::BookingsRepository::new(pool.clone()),
            deliveries: deliveries::DeliveriesRepository::new(pool.clone()),
            supplier_requests: supplier_requests::SupplierRequestsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Round-trip to the database, for the readiness probe
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
