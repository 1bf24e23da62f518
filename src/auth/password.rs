/// Password Hashing and Verification
///
/// bcrypt with a fixed work factor; the salt is embedded in the output so equal
/// passwords hash differently. The async wrappers move the work off the request
/// task and bound it with a timeout.

use std::time::Duration;

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::{AppError, StoreError};

#[derive(Debug, Clone, Copy)]
pub struct CredentialHasher {
    cost: u32,
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl CredentialHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a plaintext password
    ///
    /// # Errors
    /// `AppError::Hashing` if bcrypt cannot run (e.g. invalid cost, no entropy)
    pub fn hash(&self, plaintext: &str) -> Result<String, AppError> {
        hash(plaintext, self.cost).map_err(|e| AppError::Hashing(format!("hash failed: {}", e)))
    }

    /// Check a candidate password against a stored hash
    ///
    /// A mismatch is `Ok(false)`; only a corrupt stored hash is an error.
    pub fn verify(&self, hashed: &str, candidate: &str) -> Result<bool, AppError> {
        verify(candidate, hashed)
            .map_err(|e| AppError::Hashing(format!("stored hash unusable: {}", e)))
    }

    pub async fn hash_bounded(&self, plaintext: &str, limit: Duration) -> Result<String, AppError> {
        let hasher = *self;
        let plaintext = plaintext.to_string();
        run_blocking(limit, "hash_password", move || hasher.hash(&plaintext)).await
    }

    pub async fn verify_bounded(
        &self,
        hashed: &str,
        candidate: &str,
        limit: Duration,
    ) -> Result<bool, AppError> {
        let hasher = *self;
        let hashed = hashed.to_string();
        let candidate = candidate.to_string();
        run_blocking(limit, "verify_password", move || hasher.verify(&hashed, &candidate)).await
    }

    /// Verify against a stored hash that may not exist
    ///
    /// With no stored hash the candidate is hashed at the same cost and the
    /// result is `Ok(false)`, so an unknown account costs as much as a wrong
    /// password.
    pub async fn verify_or_burn(
        &self,
        hashed: Option<&str>,
        candidate: &str,
        limit: Duration,
    ) -> Result<bool, AppError> {
        match hashed {
            Some(hashed) => self.verify_bounded(hashed, candidate, limit).await,
            None => {
                self.hash_bounded(candidate, limit).await?;
                Ok(false)
            }
        }
    }
}

async fn run_blocking<T, F>(limit: Duration, operation: &str, work: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::time::timeout(limit, tokio::task::spawn_blocking(work)).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(AppError::Hashing(format!("{} aborted: {}", operation, join_err))),
        Err(_) => {
            tracing::warn!(operation = operation, "Password work exceeded time bound");
            Err(AppError::Store(StoreError::Timeout(operation.to_string())))
        }
    }
}
