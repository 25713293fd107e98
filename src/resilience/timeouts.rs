//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap probe calls with a local deadline
//! - Cancel the underlying future when the deadline passes
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from transport errors

use std::future::Future;
use std::time::Duration;
use tokio::time;

use crate::health::types::ProbeError;

/// Run `future` with a deadline, mapping expiry to [`ProbeError::Timeout`].
pub async fn with_deadline<F, T>(deadline: Duration, future: F) -> Result<T, ProbeError>
where
    F: Future<Output = T>,
{
    time::timeout(deadline, future)
        .await
        .map_err(|_| ProbeError::Timeout(deadline))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_deadline_expires() {
        let result = with_deadline(Duration::from_secs(10), async {
            time::sleep(Duration::from_secs(60)).await;
        })
        .await;

        assert_eq!(result, Err(ProbeError::Timeout(Duration::from_secs(10))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_completes_within_deadline() {
        let result = with_deadline(Duration::from_secs(10), async { 7 }).await;
        assert_eq!(result, Ok(7));
    }
}
