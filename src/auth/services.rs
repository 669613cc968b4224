use crate::auth::dto::{LoginRequest, RegisterRequest};
use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use regex::Regex;
use thiserror::Error;
use tracing::error;

pub const MAX_USERNAME_LEN: usize = 50;

/// Why a registration form was rejected. The message is shown to the user.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegisterError {
    #[error("Username is required.")]
    MissingUsername,
    #[error("Email is required.")]
    MissingEmail,
    #[error("Password is required.")]
    MissingPassword,
    #[error("Username must be at most 50 characters.")]
    UsernameTooLong,
    #[error("Invalid email address.")]
    InvalidEmail,
    #[error("User {username} or email {email} is already registered.")]
    AlreadyRegistered { username: String, email: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoginError {
    #[error("Incorrect username.")]
    UnknownUsername,
    #[error("Incorrect password.")]
    WrongPassword,
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Trim and normalize the form, then check required fields in order.
pub fn validate_registration(payload: &mut RegisterRequest) -> Result<(), RegisterError> {
    payload.username = payload.username.trim().to_string();
    payload.email = payload.email.trim().to_lowercase();

    if payload.username.is_empty() {
        return Err(RegisterError::MissingUsername);
    }
    if payload.email.is_empty() {
        return Err(RegisterError::MissingEmail);
    }
    if payload.password.is_empty() {
        return Err(RegisterError::MissingPassword);
    }
    if payload.username.chars().count() > MAX_USERNAME_LEN {
        return Err(RegisterError::UsernameTooLong);
    }
    if !is_valid_email(&payload.email) {
        return Err(RegisterError::InvalidEmail);
    }
    Ok(())
}

pub fn normalize_login(payload: &mut LoginRequest) {
    payload.username = payload.username.trim().to_string();
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}
