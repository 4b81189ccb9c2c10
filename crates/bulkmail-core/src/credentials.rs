//! Session token storage.
//!
//! The token for the current session lives in the session store next to the
//! draft. The platform credential store is only ever cleaned up on logout:
//! - Linux: Secret Service (GNOME Keyring, `KWallet`)
//! - macOS: Keychain
//! - Windows: Credential Manager

use keyring::Entry;
use tracing::{debug, warn};

use crate::Result;
use crate::store::KeyValueStore;

/// Session key holding the bearer token.
pub const TOKEN_KEY: &str = "token";

/// Session key holding cached user data.
pub const USER_DATA_KEY: &str = "userData";

/// Service name used for keyring entries.
const SERVICE_NAME: &str = "bulkmail";

/// Error type for credential operations.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Failed to access keyring.
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

fn entry(session: &str) -> std::result::Result<Entry, CredentialError> {
    Ok(Entry::new(SERVICE_NAME, &format!("{SERVICE_NAME}_token_{session}"))?)
}

/// Token saved in the session store, if any.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub async fn stored_token<S: KeyValueStore>(store: &S) -> Result<Option<String>> {
    Ok(store
        .load(TOKEN_KEY)
        .await?
        .filter(|token| !token.is_empty()))
}

/// Saves the token in the session store.
///
/// # Errors
///
/// Returns an error if the store cannot be written.
pub async fn store_token<S: KeyValueStore>(store: &S, token: &str) -> Result<()> {
    store.save(TOKEN_KEY, token).await
}

/// Removes the token and cached user data from the session store.
///
/// # Errors
///
/// Returns an error if the store cannot be written.
pub async fn clear_session_token<S: KeyValueStore>(store: &S) -> Result<()> {
    store.clear(&[TOKEN_KEY, USER_DATA_KEY]).await
}

/// Deletes any keyring token left for `session`. A missing entry is not an error.
///
/// # Errors
///
/// Returns an error if the keyring operation fails.
pub fn forget_token(session: &str) -> Result<()> {
    match entry(session)?.delete_credential() {
        Ok(()) => {
            debug!(session, "Deleted token from keyring");
            Ok(())
        }
        Err(keyring::Error::NoEntry) => {
            debug!(session, "No token to delete from keyring");
            Ok(())
        }
        Err(e) => {
            warn!("Failed to delete token from keyring: {e}");
            Err(CredentialError::from(e).into())
        }
    }
}
