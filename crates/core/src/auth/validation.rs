//! Caller input checks performed before any network call

use campus_domain::{DomainError, ProfileUpdate};

pub fn validate_credentials(email: &str, password: &str) -> Result<(), DomainError> {
    validate_email(email)?;
    if password.trim().is_empty() {
        return Err(DomainError::validation("Password must not be blank"));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), DomainError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(DomainError::validation("Email must not be blank"));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(())
        }
        _ => Err(DomainError::validation("Email address is not valid").with_details(email.to_string())),
    }
}

pub fn validate_profile_update(update: &ProfileUpdate) -> Result<(), DomainError> {
    if update.is_empty() {
        return Err(DomainError::validation("Profile update contains no changes"));
    }
    if let Some(email) = update.email.as_deref() {
        validate_email(email)?;
    }
    Ok(())
}
