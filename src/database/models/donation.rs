use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::datetime::now_rfc3339;

/// A logged donation intent. No payment is processed; the record is the
/// whole feature.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Donation {
    pub id: String,
    pub participant_id: i64,
    pub amount: i64,
    pub created_at: String,
}

impl Donation {
    pub async fn create(
        pool: &sqlx::SqlitePool,
        participant_id: i64,
        amount: i64,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4().to_string();
        let now = now_rfc3339();

        sqlx::query("INSERT INTO donations (id, participant_id, amount, created_at) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(participant_id)
            .bind(amount)
            .bind(&now)
            .execute(pool)
            .await?;

        Ok(Donation {
            id,
            participant_id,
            amount,
            created_at: now,
        })
    }

    pub async fn find_by_participant(
        pool: &sqlx::SqlitePool,
        participant_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Donation>(
            "SELECT id, participant_id, amount, created_at
             FROM donations WHERE participant_id = ? ORDER BY created_at",
        )
        .bind(participant_id)
        .fetch_all(pool)
        .await
    }
}
