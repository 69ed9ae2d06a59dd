use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;

use crate::feedback::errors::FeedbackError;
use crate::feedback::models::ContactEmail;
use crate::feedback::models::Feedback;
use crate::feedback::models::FeedbackId;
use crate::feedback::models::FeedbackMessage;
use crate::feedback::models::PhoneNumber;
use crate::feedback::models::SenderName;
use crate::feedback::ports::FeedbackRepository;

pub struct PostgresFeedbackRepository {
    pool: PgPool,
}

impl PostgresFeedbackRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_feedback(row: &PgRow) -> Result<Feedback, FeedbackError> {
        Ok(Feedback {
            id: FeedbackId(row.get("id")),
            name: SenderName::new(row.get("name"))?,
            message: FeedbackMessage::new(row.get("message"))?,
            email: ContactEmail::new(row.get("email"))?,
            phone: PhoneNumber::new(row.get("phone"))?,
            created_at: row.get("created_at"),
        })
    }
}

#[async_trait]
impl FeedbackRepository for PostgresFeedbackRepository {
    async fn create(&self, feedback: Feedback) -> Result<Feedback, FeedbackError> {
        sqlx::query(
            r#"
            INSERT INTO feedback (id, name, message, email, phone, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(feedback.id.0)
        .bind(feedback.name.as_str())
        .bind(feedback.message.as_str())
        .bind(feedback.email.as_str())
        .bind(feedback.phone.as_str())
        .bind(feedback.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| FeedbackError::DatabaseError(e.to_string()))?;

        Ok(feedback)
    }

    async fn list_all(&self) -> Result<Vec<Feedback>, FeedbackError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, message, email, phone, created_at
            FROM feedback
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| FeedbackError::DatabaseError(e.to_string()))?;

        rows.iter().map(Self::row_to_feedback).collect()
    }

    async fn delete(&self, id: &FeedbackId) -> Result<(), FeedbackError> {
        let result = sqlx::query(
            r#"
            DELETE FROM feedback
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| FeedbackError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(FeedbackError::NotFound(id.to_string()));
        }

        Ok(())
    }
}
