use std::future::Future;
use std::time::Duration;

use plaza_db::DbError;

/// Run one store round trip under `limit`. Elapsed becomes [`DbError::Timeout`].
pub(crate) async fn bounded<T, F>(limit: Duration, round_trip: F) -> Result<T, DbError>
where
    F: Future<Output = Result<T, DbError>>,
{
    match tokio::time::timeout(limit, round_trip).await {
        Ok(result) => result,
        Err(_) => Err(DbError::Timeout(limit)),
    }
}
