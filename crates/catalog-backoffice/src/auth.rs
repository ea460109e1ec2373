//! Local validation for the login and registration forms.
//!
//! These checks run before the session store is asked to do anything:
//! a form that fails here never reaches the network.

/// Validation failures on the auth forms.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("all fields are required")]
    MissingFields,
    #[error("invalid email address")]
    InvalidEmail,
    #[error("password must be at least 6 characters")]
    PasswordTooShort,
    #[error("passwords do not match")]
    PasswordMismatch,
}

pub fn validate_login(email: &str, password: &str) -> Result<(), FormError> {
    if email.is_empty() || password.is_empty() {
        return Err(FormError::MissingFields);
    }
    if !email.contains('@') {
        return Err(FormError::InvalidEmail);
    }
    Ok(())
}

pub fn validate_registration(
    name: &str,
    email: &str,
    password: &str,
    confirmation: &str,
) -> Result<(), FormError> {
    if name.is_empty() || email.is_empty() || password.is_empty() || confirmation.is_empty() {
        return Err(FormError::MissingFields);
    }
    if !email.contains('@') {
        return Err(FormError::InvalidEmail);
    }
    if password.len() < 6 {
        return Err(FormError::PasswordTooShort);
    }
    if password != confirmation {
        return Err(FormError::PasswordMismatch);
    }
    Ok(())
}
