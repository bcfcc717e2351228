use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::OffsetDateTime;

/// Course certification backed by an external issuer. `issued_at` is null
/// until the certificate has actually been issued.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
#[allow(unused)]
pub struct Certification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub certificate_id: Option<String>,
    pub issued_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}
