//! Account service: credential checks and the sign-in/sign-up/sign-out calls.

use crate::backend::{AuthBackend, BackendError, SignUpOutcome};
use crate::session::Session;
use tracing::{info, warn};

/// Minimum password length accepted by the hosted auth service.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("enter a valid email address")]
    InvalidEmail,
    #[error("password must be at least {} characters", MIN_PASSWORD_LEN)]
    PasswordTooShort,
    #[error("enter your full name")]
    MissingName,
}

/// Check sign-in fields before hitting the network.
pub fn validate_sign_in(email: &str, password: &str) -> Result<(), CredentialError> {
    let email = email.trim();
    let valid_email = email
        .split_once('@')
        .is_some_and(|(user, domain)| !user.is_empty() && domain.contains('.'));
    if !valid_email {
        return Err(CredentialError::InvalidEmail);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CredentialError::PasswordTooShort);
    }
    Ok(())
}

pub fn validate_sign_up(email: &str, password: &str, full_name: &str) -> Result<(), CredentialError> {
    if full_name.trim().is_empty() {
        return Err(CredentialError::MissingName);
    }
    validate_sign_in(email, password)
}

pub struct AccountService;

impl AccountService {
    pub async fn sign_in(
        auth: &dyn AuthBackend,
        email: &str,
        password: &str,
    ) -> Result<Session, BackendError> {
        let session = auth.sign_in_with_password(email.trim(), password).await?;
        info!("Signed in as {}", session.user.id);
        Ok(session)
    }

    pub async fn sign_up(
        auth: &dyn AuthBackend,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<SignUpOutcome, BackendError> {
        let outcome = auth
            .sign_up(email.trim(), password, full_name.trim())
            .await?;
        if outcome == SignUpOutcome::ConfirmationRequired {
            info!("Sign-up pending email confirmation");
        }
        Ok(outcome)
    }

    /// Revoke the session remotely. Failure is logged; the local session is
    /// dropped by the caller either way.
    pub async fn sign_out(auth: &dyn AuthBackend, session: &Session) {
        if let Err(e) = auth.sign_out(&session.access_token).await {
            warn!("Remote sign-out failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_sign_in() {
        assert_eq!(validate_sign_in("joao@example.com", "secret1"), Ok(()));
        assert_eq!(
            validate_sign_in("joao", "secret1"),
            Err(CredentialError::InvalidEmail)
        );
        assert_eq!(
            validate_sign_in("@example.com", "secret1"),
            Err(CredentialError::InvalidEmail)
        );
        assert_eq!(
            validate_sign_in("joao@example.com", "12345"),
            Err(CredentialError::PasswordTooShort)
        );
    }

    #[test]
    fn test_validate_sign_up_needs_name() {
        assert_eq!(
            validate_sign_up("joao@example.com", "secret1", "  "),
            Err(CredentialError::MissingName)
        );
        assert_eq!(
            validate_sign_up("joao@example.com", "secret1", "João Silva"),
            Ok(())
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CredentialError::PasswordTooShort.to_string(),
            "password must be at least 6 characters"
        );
    }
}
