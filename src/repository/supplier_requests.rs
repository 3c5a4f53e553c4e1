//! Supplier requests repository

use chrono::{DateTime, Utc};
use sqlx::{types::Json, Pool, Postgres, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{FulfillmentStatus, RequestStatus},
        supplier_request::{RequestItem, SupplierRequest},
    },
};

#[derive(Clone)]
pub struct SupplierRequestsRepository {
    pool: Pool<Postgres>,
}

impl SupplierRequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get a request by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<SupplierRequest> {
        let row = sqlx::query("SELECT * FROM supplier_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Supplier request {} not found", id)))?;

        Self::map_row(&row)
    }

    /// Insert a new request
    pub async fn create(&self, request: &SupplierRequest) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO supplier_requests (
                id, supplier_id, customer_id, customer_name, customer_email,
                customer_phone, items, booking_date, return_date,
                status, fulfillment_status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(request.id)
        .bind(request.supplier_id)
        .bind(request.customer_id)
        .bind(&request.customer_name)
        .bind(&request.customer_email)
        .bind(&request.customer_phone)
        .bind(Json(&request.items))
        .bind(request.booking_date)
        .bind(request.return_date)
        .bind(request.status.as_str())
        .bind(request.fulfillment_status.as_str())
        .bind(request.created_at)
        .bind(request.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Record the supplier's accept/reject decision
    pub async fn set_status(
        &self,
        id: Uuid,
        status: RequestStatus,
        expected_updated_at: DateTime<Utc>,
    ) -> AppResult<SupplierRequest> {
        let result = sqlx::query(
            "UPDATE supplier_requests SET status = $2, updated_at = $3 WHERE id = $1 AND updated_at = $4",
        )
        .bind(id)
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(expected_updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            self.get_by_id(id).await?;
            return Err(AppError::Conflict(
                "Supplier request was modified concurrently, please retry".to_string(),
            ));
        }

        self.get_by_id(id).await
    }

    /// Advance the fulfillment chain one step
    pub async fn set_fulfillment(
        &self,
        id: Uuid,
        status: FulfillmentStatus,
        expected_updated_at: DateTime<Utc>,
    ) -> AppResult<SupplierRequest> {
        let result = sqlx::query(
            "UPDATE supplier_requests SET fulfillment_status = $2, updated_at = $3 WHERE id = $1 AND updated_at = $4",
        )
        .bind(id)
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(expected_updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            self.get_by_id(id).await?;
            return Err(AppError::Conflict(
                "Supplier request was modified concurrently, please retry".to_string(),
            ));
        }

        self.get_by_id(id).await
    }

    fn map_row(row: &sqlx::postgres::PgRow) -> AppResult<SupplierRequest> {
        let status: String = row.get("status");
        let fulfillment: String = row.get("fulfillment_status");

        Ok(SupplierRequest {
            id: row.get("id"),
            supplier_id: row.get("supplier_id"),
            customer_id: row.get("customer_id"),
            customer_name: row.get("customer_name"),
            customer_email: row.get("customer_email"),
            customer_phone: row.get("customer_phone"),
            items: row.get::<Json<Vec<RequestItem>>, _>("items").0,
            booking_date: row.get("booking_date"),
            return_date: row.get("return_date"),
            status: RequestStatus::try_from(status.as_str())?,
            fulfillment_status: FulfillmentStatus::try_from(fulfillment.as_str())?,
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}
