//! Deliveries repository, covering both fulfillment legs

use chrono::{DateTime, Utc};
use sqlx::{types::Json, Pool, Postgres, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        delivery::{Delivery, RecollectReport},
        enums::{DeliveryStatus, RecollectStatus},
    },
};

#[derive(Clone)]
pub struct DeliveriesRepository {
    pool: Pool<Postgres>,
}

impl DeliveriesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get a delivery by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Delivery> {
        let row = sqlx::query("SELECT * FROM deliveries WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Delivery {} not found", id)))?;

        Self::map_row(&row)
    }

    /// Get the delivery attached to a booking, if any
    pub async fn get_by_booking_id(&self, booking_id: Uuid) -> AppResult<Option<Delivery>> {
        let row = sqlx::query("SELECT * FROM deliveries WHERE booking_id = $1")
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    /// Insert a freshly assigned delivery. The unique index on
    /// booking_id backs up the one-delivery-per-booking rule.
    pub async fn create(&self, delivery: &Delivery) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO deliveries (
                id, booking_id, driver_id, status, recollect_status,
                recollect_driver_id, recollect_report, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(delivery.id)
        .bind(delivery.booking_id)
        .bind(delivery.driver_id)
        .bind(delivery.status.as_str())
        .bind(delivery.recollect_status.as_str())
        .bind(delivery.recollect_driver_id)
        .bind(delivery.recollect_report.as_ref().map(Json))
        .bind(delivery.created_at)
        .bind(delivery.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Conflict(
                format!("Booking {} already has a delivery", delivery.booking_id),
            ),
            _ => AppError::Database(e),
        })?;

        Ok(())
    }

    /// Advance the outbound status
    pub async fn update_status(
        &self,
        id: Uuid,
        status: DeliveryStatus,
        expected_updated_at: DateTime<Utc>,
    ) -> AppResult<Delivery> {
        let result = sqlx::query(
            "UPDATE deliveries SET status = $2, updated_at = $3 WHERE id = $1 AND updated_at = $4",
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
                "Delivery was modified concurrently, please retry".to_string(),
            ));
        }

        self.get_by_id(id).await
    }

    /// Advance the recollection leg, optionally (re)assigning its driver
    pub async fn update_recollect(
        &self,
        id: Uuid,
        status: RecollectStatus,
        driver_id: Option<Uuid>,
        expected_updated_at: DateTime<Utc>,
    ) -> AppResult<Delivery> {
        let result = sqlx::query(
            r#"
            UPDATE deliveries SET
                recollect_status = $2,
                recollect_driver_id = COALESCE($3, recollect_driver_id),
                updated_at = $4
            WHERE id = $1 AND updated_at = $5
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(driver_id)
        .bind(Utc::now())
        .bind(expected_updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            self.get_by_id(id).await?;
            return Err(AppError::Conflict(
                "Delivery was modified concurrently, please retry".to_string(),
            ));
        }

        self.get_by_id(id).await
    }

    /// Store the recollection report and move to report_submitted
    pub async fn store_report(
        &self,
        id: Uuid,
        report: &RecollectReport,
        expected_updated_at: DateTime<Utc>,
    ) -> AppResult<Delivery> {
        let result = sqlx::query(
            r#"
            UPDATE deliveries SET
                recollect_report = $2,
                recollect_status = $3,
                updated_at = $4
            WHERE id = $1 AND updated_at = $5
            "#,
        )
        .bind(id)
        .bind(Json(report))
        .bind(RecollectStatus::ReportSubmitted.as_str())
        .bind(Utc::now())
        .bind(expected_updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            self.get_by_id(id).await?;
            return Err(AppError::Conflict(
                "Delivery was modified concurrently, please retry".to_string(),
            ));
        }

        self.get_by_id(id).await
    }

    fn map_row(row: &sqlx::postgres::PgRow) -> AppResult<Delivery> {
        let status: String = row.get("status");
        let recollect_status: String = row.get("recollect_status");
        let report: Option<Json<RecollectReport>> = row.get("recollect_report");

        Ok(Delivery {
            id: row.get("id"),
            booking_id: row.get("booking_id"),
            driver_id: row.get("driver_id"),
            status: DeliveryStatus::try_from(status.as_str())?,
            recollect_status: RecollectStatus::try_from(recollect_status.as_str())?,
            recollect_driver_id: row.get("recollect_driver_id"),
            recollect_report: report.map(|j| j.0),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}
