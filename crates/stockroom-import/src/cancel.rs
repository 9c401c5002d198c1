// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cancellation helpers shared by the pipeline stages.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::ImportError;

/// Races `fut` against the caller's token.
///
/// Returns `Err(ImportError::Cancelled)` as soon as the token fires; the
/// in-flight future is dropped.
pub(crate) async fn cancellable<F, T>(
    cancel: &CancellationToken,
    fut: F,
) -> Result<T, ImportError>
where
    F: Future<Output = T>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ImportError::Cancelled),
        out = fut => Ok(out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completes_when_not_cancelled() {
        let cancel = CancellationToken::new();
        let out = cancellable(&cancel, async { 7 }).await.unwrap();
        assert_eq!(out, 7);
    }

    #[tokio::test]
    async fn cancelled_token_wins() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let out = cancellable(&cancel, std::future::pending::<()>()).await;
        assert!(matches!(out, Err(ImportError::Cancelled)));
    }
}
