//! Bearer token storage using the system keyring.
//!
//! Tokens are kept in the platform's native credential storage:
//! - Linux: Secret Service (GNOME Keyring, `KWallet`)
//! - macOS: Keychain
//! - Windows: Credential Manager

use keyring::Entry;
use tracing::{debug, warn};

use crate::model::UserId;

/// Service name used for keyring entries.
const SERVICE_NAME: &str = "sponsorbridge";

/// Credential type identifier for bearer tokens.
const TOKEN_CREDENTIAL: &str = "token";

/// Error type for credential operations.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Failed to access keyring.
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Result type for credential operations.
pub type CredentialResult<T> = std::result::Result<T, CredentialError>;

/// Generates the keyring entry key for a user's credential.
fn credential_key(user_id: UserId, credential_type: &str) -> String {
    format!("{SERVICE_NAME}_{credential_type}_{user_id}")
}

/// Stores a bearer token in the system keyring.
///
/// # Errors
///
/// Returns an error if the keyring operation fails.
pub fn store_token(user_id: UserId, token: &str) -> CredentialResult<()> {
    let key = credential_key(user_id, TOKEN_CREDENTIAL);
    let entry = Entry::new(SERVICE_NAME, &key)?;
    entry.set_password(token)?;
    debug!("Stored token for user {user_id}");
    Ok(())
}

/// Retrieves a bearer token from the system keyring.
///
/// # Errors
///
/// Returns an error if the keyring operation fails.
pub fn get_token(user_id: UserId) -> CredentialResult<Option<String>> {
    let key = credential_key(user_id, TOKEN_CREDENTIAL);
    let entry = Entry::new(SERVICE_NAME, &key)?;
    match entry.get_password() {
        Ok(token) => Ok(Some(token)),
        Err(keyring::Error::NoEntry) => {
            debug!("No token found for user {user_id}");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Deletes a user's bearer token from the keyring.
///
/// # Errors
///
/// Returns an error if the keyring operation fails (except for missing entries).
pub fn delete_token(user_id: UserId) -> CredentialResult<()> {
    let key = credential_key(user_id, TOKEN_CREDENTIAL);
    let entry = Entry::new(SERVICE_NAME, &key)?;
    match entry.delete_credential() {
        Ok(()) => {
            debug!("Deleted token for user {user_id}");
            Ok(())
        }
        Err(keyring::Error::NoEntry) => {
            debug!("No token to delete for user {user_id}");
            Ok(())
        }
        Err(e) => {
            warn!("Failed to delete token: {e}");
            Err(e.into())
        }
    }
}
