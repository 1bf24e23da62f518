/// Token Store Sync
///
/// Records the most recently issued pair for an account. Upsert keyed by user
/// id: a repeated call with the same pair is harmless, a newer pair overwrites.

use std::time::Duration;

use uuid::Uuid;

use crate::domain::TokenPair;
use crate::error::AppError;
use crate::store::{bounded, TokenStore};

/// Persist `pair` as the latest pair for `user_id`
///
/// # Errors
/// `StoreError` on persistence failure or when the store exceeds `limit`.
/// Not retried here; the client retries the whole login.
pub async fn persist_token_pair<S>(
    store: &S,
    user_id: Uuid,
    pair: &TokenPair,
    limit: Duration,
) -> Result<(), AppError>
where
    S: TokenStore + ?Sized,
{
    bounded(
        limit,
        "upsert_tokens",
        store.upsert_tokens(user_id, &pair.access_token, &pair.refresh_token),
    )
    .await?;

    tracing::debug!(user_id = %user_id, "Token pair recorded");
    Ok(())
}
