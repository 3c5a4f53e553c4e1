//! Bookings repository
//!
//! Every mutation is a single transaction: inventory movement and the
//! booking row change either both land or neither does. Updates carry an
//! optimistic guard on `updated_at` so concurrent edits of the same
//! booking cannot interleave.

use chrono::{DateTime, Utc};
use sqlx::{types::Json, Pool, Postgres, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        booking::{Booking, BookingItem},
        enums::BookingStatus,
    },
};

use super::inventory::InventoryRepository;

/// Names of cart lines whose reservation fell short, in cart order
fn shortfall(outcomes: &[(&BookingItem, bool)]) -> Vec<String> {
    outcomes
        .iter()
        .filter(|(_, reserved)| !reserved)
        .map(|(item, _)| item.name.clone())
        .collect()
}

#[derive(Clone)]
pub struct BookingsRepository {
    pool: Pool<Postgres>,
}

impl BookingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get a booking by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Booking> {
        let row = sqlx::query("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", id)))?;

        Self::map_row(&row)
    }

    /// Insert a new booking, reserving stock for every line.
    ///
    /// Each line is checked so that an overstocked cart reports every
    /// offending item, not just the first one.
    pub async fn create(&self, booking: &Booking) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let mut outcomes = Vec::with_capacity(booking.items.len());
        for item in &booking.items {
            let reserved =
                InventoryRepository::reserve(&mut tx, item.equipment_id, item.qty).await?;
            outcomes.push((item, reserved));
        }
        let short = shortfall(&outcomes);
        if !short.is_empty() {
            tx.rollback().await?;
            return Err(AppError::Overstock(short));
        }

        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, customer_id, items, booking_date, return_date,
                customer_name, customer_email, customer_phone, delivery_address,
                notes, subtotal, security_deposit, total, status, cancel_reason,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(booking.id)
        .bind(booking.customer_id)
        .bind(Json(&booking.items))
        .bind(booking.booking_date)
        .bind(booking.return_date)
        .bind(&booking.customer_name)
        .bind(&booking.customer_email)
        .bind(&booking.customer_phone)
        .bind(&booking.delivery_address)
        .bind(&booking.notes)
        .bind(booking.subtotal)
        .bind(booking.security_deposit)
        .bind(booking.total)
        .bind(booking.status.as_str())
        .bind(&booking.cancel_reason)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Write back an edited booking.
    ///
    /// `previous_items` is given when the cart changed: the old
    /// reservation is released and the new one taken in the same
    /// transaction. `expected_updated_at` guards against a concurrent
    /// edit of the same row.
    pub async fn update(
        &self,
        booking: &Booking,
        expected_updated_at: DateTime<Utc>,
        previous_items: Option<&[BookingItem]>,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        if let Some(old_items) = previous_items {
            for item in old_items {
                InventoryRepository::release(&mut tx, item.equipment_id, item.qty).await?;
            }
            let mut outcomes = Vec::with_capacity(booking.items.len());
            for item in &booking.items {
                let reserved =
                    InventoryRepository::reserve(&mut tx, item.equipment_id, item.qty).await?;
                outcomes.push((item, reserved));
            }
            let short = shortfall(&outcomes);
            if !short.is_empty() {
                tx.rollback().await?;
                return Err(AppError::Overstock(short));
            }
        }

        let result = sqlx::query(
            r#"
            UPDATE bookings SET
                items = $2, booking_date = $3, return_date = $4,
                customer_name = $5, customer_email = $6, customer_phone = $7,
                delivery_address = $8, notes = $9,
                subtotal = $10, security_deposit = $11, total = $12,
                status = $13, cancel_reason = $14, updated_at = $15
            WHERE id = $1 AND updated_at = $16
            "#,
        )
        .bind(booking.id)
        .bind(Json(&booking.items))
        .bind(booking.booking_date)
        .bind(booking.return_date)
        .bind(&booking.customer_name)
        .bind(&booking.customer_email)
        .bind(&booking.customer_phone)
        .bind(&booking.delivery_address)
        .bind(&booking.notes)
        .bind(booking.subtotal)
        .bind(booking.security_deposit)
        .bind(booking.total)
        .bind(booking.status.as_str())
        .bind(&booking.cancel_reason)
        .bind(booking.updated_at)
        .bind(expected_updated_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            // Distinguish a vanished row from a concurrent edit
            self.get_by_id(booking.id).await?;
            return Err(AppError::Conflict(
                "Booking was modified concurrently, please retry".to_string(),
            ));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Cancel a booking and hand its reserved units back to inventory
    pub async fn cancel(
        &self,
        booking: &Booking,
        reason: &str,
        expected_updated_at: DateTime<Utc>,
    ) -> AppResult<Booking> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        for item in &booking.items {
            InventoryRepository::release(&mut tx, item.equipment_id, item.qty).await?;
        }

        let result = sqlx::query(
            r#"
            UPDATE bookings SET status = $2, cancel_reason = $3, updated_at = $4
            WHERE id = $1 AND updated_at = $5 AND status != $2
            "#,
        )
        .bind(booking.id)
        .bind(BookingStatus::Cancelled.as_str())
        .bind(reason)
        .bind(now)
        .bind(expected_updated_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            self.get_by_id(booking.id).await?;
            return Err(AppError::Conflict(
                "Booking was modified concurrently, please retry".to_string(),
            ));
        }

        tx.commit().await?;
        self.get_by_id(booking.id).await
    }

    /// Mark a pending booking confirmed. Affects no rows when the
    /// booking is already confirmed, which the service treats as a
    /// no-op.
    pub async fn confirm(&self, id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE bookings SET status = $2, updated_at = $3 WHERE id = $1 AND status = $4",
        )
        .bind(id)
        .bind(BookingStatus::Confirmed.as_str())
        .bind(Utc::now())
        .bind(BookingStatus::Pending.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    fn map_row(row: &sqlx::postgres::PgRow) -> AppResult<Booking> {
        let status: String = row.get("status");
        Ok(Booking {
            id: row.get("id"),
            customer_id: row.get("customer_id"),
            items: row.get::<Json<Vec<BookingItem>>, _>("items").0,
            booking_date: row.get("booking_date"),
            return_date: row.get("return_date"),
            customer_name: row.get("customer_name"),
            customer_email: row.get("customer_email"),
            customer_phone: row.get("customer_phone"),
            delivery_address: row.get("delivery_address"),
            notes: row.get("notes"),
            subtotal: row.get("subtotal"),
            security_deposit: row.get("security_deposit"),
            total: row.get("total"),
            status: BookingStatus::try_from(status.as_str())?,
            cancel_reason: row.get("cancel_reason"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(name: &str, qty: i32) -> BookingItem {
        BookingItem {
            equipment_id: Uuid::new_v4(),
            name: name.to_string(),
            price_per_day: dec!(10),
            qty,
        }
    }

    #[test]
    fn overstocked_lines_are_named() {
        // 6 requested against 5 in stock fails; 2 against 2 passes
        let excavator = line("Excavator", 6);
        let ladder = line("Ladder", 2);
        let available = [5, 2];

        let outcomes: Vec<_> = [&excavator, &ladder]
            .into_iter()
            .zip(available)
            .map(|(item, stock)| (item, item.qty <= stock))
            .collect();

        assert_eq!(shortfall(&outcomes), vec!["Excavator".to_string()]);
    }

    #[test]
    fn exact_stock_reserves_cleanly() {
        let excavator = line("Excavator", 5);
        let outcomes = [(&excavator, excavator.qty <= 5)];
        assert!(shortfall(&outcomes).is_empty());
    }

    #[test]
    fn every_short_line_is_reported() {
        let a = line("Excavator", 3);
        let b = line("Scaffolding", 8);
        let outcomes = [(&a, false), (&b, false)];
        assert_eq!(
            shortfall(&outcomes),
            vec!["Excavator".to_string(), "Scaffolding".to_string()]
        );
    }
}
