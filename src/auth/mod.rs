//! Authentication module for treevault.
//!
//! Password hashing, user registration and credential verification. Token
//! issuance and verification live in the web layer.

mod password;
mod registration;

pub use password::{
    hash_password, validate_password, verify_password, PasswordError, MAX_PASSWORD_LENGTH,
    MIN_PASSWORD_LENGTH,
};
pub use registration::{
    authenticate, register, validate_username, MAX_USERNAME_LENGTH, MIN_USERNAME_LENGTH,
};
