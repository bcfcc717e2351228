use sqlx::{Error, PgPool};
use uuid::Uuid;

pub struct UserRepository;

impl UserRepository {
    pub async fn exists(pool: &PgPool, user_id: Uuid) -> Result<bool, Error> {
        let found: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
        Ok(found.is_some())
    }
}
