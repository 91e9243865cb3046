use serde::{Deserialize, Serialize};

/// Administrator credentials as stored; the hash is argon2 PHC format.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AdminAccount {
    pub id: u64,
    pub username: String,
    pub password_hash: String,
}
