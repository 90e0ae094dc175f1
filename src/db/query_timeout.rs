// Database query timeout protection
use std::time::Duration;

use tokio::time::timeout;

pub struct QueryTimeout;

impl QueryTimeout {
    /// Run a query future, failing with `sqlx::Error::PoolTimedOut` when it
    /// does not finish in `timeout_duration`.
    pub async fn execute_with_timeout<F, T>(
        query_fn: F,
        timeout_duration: Duration,
    ) -> Result<T, sqlx::Error>
    where
        F: std::future::Future<Output = Result<T, sqlx::Error>>,
    {
        match timeout(timeout_duration, query_fn).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("Query timed out after {:?}", timeout_duration);
                Err(sqlx::Error::PoolTimedOut)
            }
        }
    }

    /// Longer timeout for aggregation queries (30 seconds)
    pub const AGGREGATION_TIMEOUT: Duration = Duration::from_secs(30);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_through_fast_queries() {
        let value = QueryTimeout::execute_with_timeout(async { Ok::<_, sqlx::Error>(7) }, QueryTimeout::AGGREGATION_TIMEOUT)
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn times_out_slow_queries() {
        let result = QueryTimeout::execute_with_timeout(
            async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok::<_, sqlx::Error>(())
            },
            Duration::from_millis(10),
        )
        .await;
        assert!(matches!(result, Err(sqlx::Error::PoolTimedOut)));
    }
}
