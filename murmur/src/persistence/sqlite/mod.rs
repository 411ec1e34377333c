mod error;
mod persistence;

pub use error::SqlError;
pub use persistence::SqliteMessagePersistence;
use sqlx::{migrate::MigrateError, SqlitePool};

/// Create or upgrade the `messages` table using the migrations embedded in
/// this crate.
pub async fn migrate(pool: &SqlitePool) -> Result<(), MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
