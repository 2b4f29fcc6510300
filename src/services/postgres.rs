use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, Row, Transaction};
use std::time::Duration;

use crate::models::{
    Donation, DonationId, DonationStatus, Match, MatchStatus, NewDonation, NewMatch, NewRequest, Request, RequestId,
    RequestStatus,
};
use crate::services::store::{MatchStore, MatchTransaction, RequestIntake, StoreError};

/// PostgreSQL client backing donations, requests and the match ledger
///
/// Matching runs go through [`MatchStore::begin`]; the remaining methods serve
/// the plain create/list endpoints.
#[derive(Debug, Clone)]
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    pub async fn create_donation(&self, donation: NewDonation) -> Result<Donation, StoreError> {
        let query = r#"
            INSERT INTO donations
                (donor_id, item_name, category, quantity, quantity_remaining, location, status)
            VALUES ($1, $2, $3, $4, $4, $5, 'available')
            RETURNING *
        "#;

        let row = sqlx::query(query)
            .bind(donation.donor_id)
            .bind(&donation.item_name)
            .bind(&donation.category)
            .bind(donation.quantity)
            .bind(&donation.location)
            .fetch_one(&self.pool)
            .await?;

        let donation = donation_from_row(&row)?;
        tracing::debug!("Created donation {} ({} x {})", donation.id, donation.item_name, donation.category);
        Ok(donation)
    }

    pub async fn fetch_donation(&self, id: DonationId) -> Result<Option<Donation>, StoreError> {
        let row = sqlx::query("SELECT * FROM donations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(donation_from_row).transpose()
    }

    /// Match ledger for one request, newest first
    pub async fn list_matches_for_request(&self, request_id: RequestId) -> Result<Vec<Match>, StoreError> {
        let query = r#"
            SELECT id, donation_id, request_id, allocated_quantity, status, distance_score, created_at
            FROM matches
            WHERE request_id = $1
            ORDER BY created_at DESC, id DESC
        "#;

        let rows = sqlx::query(query)
            .bind(request_id.value())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(match_from_row).collect()
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

impl RequestIntake for PostgresClient {
    async fn create_request(&self, request: NewRequest) -> Result<Request, StoreError> {
        let query = r#"
            INSERT INTO requests
                (recipient_id, item_name, category, quantity, quantity_remaining, location, status)
            VALUES ($1, $2, $3, $4, $4, $5, 'open')
            RETURNING *
        "#;

        let row = sqlx::query(query)
            .bind(request.recipient_id)
            .bind(&request.item_name)
            .bind(&request.category)
            .bind(request.quantity)
            .bind(&request.location)
            .fetch_one(&self.pool)
            .await?;

        let request = request_from_row(&row)?;
        tracing::debug!("Created request {} ({} x {})", request.id, request.item_name, request.category);
        Ok(request)
    }
}

impl MatchStore for PostgresClient {
    type Tx = PgMatchTransaction;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(PgMatchTransaction { tx })
    }
}

/// Transaction over a pooled connection; rolled back by sqlx when dropped
pub struct PgMatchTransaction {
    tx: Transaction<'static, Postgres>,
}

impl MatchTransaction for PgMatchTransaction {
    async fn fetch_request_for_update(&mut self, id: RequestId) -> Result<Option<Request>, StoreError> {
        let query = r#"
            SELECT * FROM requests
            WHERE id = $1
            FOR UPDATE
        "#;

        let row = sqlx::query(query).bind(id.value()).fetch_optional(&mut *self.tx).await?;
        row.as_ref().map(request_from_row).transpose()
    }

    async fn fetch_available_donations(&mut self, category: &str) -> Result<Vec<Donation>, StoreError> {
        // Locks are taken in id order so that concurrent runs cannot deadlock
        let query = r#"
            SELECT * FROM donations
            WHERE category = $1
              AND quantity_remaining > 0
              AND status = 'available'
            ORDER BY id
            FOR UPDATE
        "#;

        let rows = sqlx::query(query).bind(category).fetch_all(&mut *self.tx).await?;
        rows.iter().map(donation_from_row).collect()
    }

    async fn decrement_donation(&mut self, id: DonationId, amount: i64) -> Result<bool, StoreError> {
        let query = r#"
            UPDATE donations
            SET quantity_remaining = quantity_remaining - $1,
                status = CASE
                    WHEN quantity_remaining - $1 <= 0 THEN 'exhausted'::donation_status
                    ELSE status
                END
            WHERE id = $2
              AND status = 'available'
              AND quantity_remaining >= $1
        "#;

        let result = sqlx::query(query).bind(amount).bind(id).execute(&mut *self.tx).await?;
        Ok(result.rows_affected() == 1)
    }

    async fn insert_match(&mut self, new_match: NewMatch) -> Result<Match, StoreError> {
        let query = r#"
            INSERT INTO matches (donation_id, request_id, allocated_quantity, status, distance_score)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, donation_id, request_id, allocated_quantity, status, distance_score, created_at
        "#;

        let distance_score = i32::try_from(new_match.distance_score)
            .map_err(|_| StoreError::Malformed(format!("distance score {} out of range", new_match.distance_score)))?;

        let row = sqlx::query(query)
            .bind(new_match.donation_id)
            .bind(new_match.request_id.value())
            .bind(new_match.allocated_quantity)
            .bind(new_match.status)
            .bind(distance_score)
            .fetch_one(&mut *self.tx)
            .await?;

        match_from_row(&row)
    }

    async fn update_request(
        &mut self,
        id: RequestId,
        status: RequestStatus,
        quantity_remaining: i64,
    ) -> Result<(), StoreError> {
        let query = r#"
            UPDATE requests
            SET status = $1, quantity_remaining = $2
            WHERE id = $3
        "#;

        let result = sqlx::query(query)
            .bind(status)
            .bind(quantity_remaining)
            .bind(id.value())
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() != 1 {
            return Err(StoreError::Malformed(format!("request {} vanished during transaction", id)));
        }
        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

/// Decode failures at this boundary mean the row itself is unusable
fn malformed(table: &str) -> impl Fn(sqlx::Error) -> StoreError + '_ {
    move |e| match e {
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::ColumnNotFound(_) | sqlx::Error::Decode(_) => {
            StoreError::Malformed(format!("{}: {}", table, e))
        }
        other => StoreError::Sqlx(other),
    }
}

fn request_from_row(row: &PgRow) -> Result<Request, StoreError> {
    let m = malformed("requests");
    Ok(Request {
        id: RequestId::from_stored(row.try_get("id").map_err(&m)?),
        recipient_id: row.try_get("recipient_id").map_err(&m)?,
        item_name: row.try_get("item_name").map_err(&m)?,
        category: row.try_get("category").map_err(&m)?,
        location: row.try_get("location").map_err(&m)?,
        quantity: row.try_get("quantity").map_err(&m)?,
        quantity_remaining: row.try_get("quantity_remaining").map_err(&m)?,
        status: row.try_get::<RequestStatus, _>("status").map_err(&m)?,
        created_at: row.try_get("created_at").map_err(&m)?,
    })
}

fn donation_from_row(row: &PgRow) -> Result<Donation, StoreError> {
    let m = malformed("donations");
    Ok(Donation {
        id: row.try_get("id").map_err(&m)?,
        donor_id: row.try_get("donor_id").map_err(&m)?,
        item_name: row.try_get("item_name").map_err(&m)?,
        category: row.try_get("category").map_err(&m)?,
        location: row.try_get("location").map_err(&m)?,
        quantity: row.try_get("quantity").map_err(&m)?,
        quantity_remaining: row.try_get("quantity_remaining").map_err(&m)?,
        status: row.try_get::<DonationStatus, _>("status").map_err(&m)?,
        created_at: row.try_get("created_at").map_err(&m)?,
    })
}

fn match_from_row(row: &PgRow) -> Result<Match, StoreError> {
    let m = malformed("matches");
    let distance_score: i32 = row.try_get("distance_score").map_err(&m)?;
    Ok(Match {
        id: row.try_get("id").map_err(&m)?,
        donation_id: row.try_get("donation_id").map_err(&m)?,
        request_id: RequestId::from_stored(row.try_get("request_id").map_err(&m)?),
        allocated_quantity: row.try_get("allocated_quantity").map_err(&m)?,
        status: row.try_get::<MatchStatus, _>("status").map_err(&m)?,
        distance_score: u32::try_from(distance_score)
            .map_err(|_| StoreError::Malformed(format!("matches: negative distance score {}", distance_score)))?,
        created_at: row.try_get("created_at").map_err(&m)?,
    })
}
