//! Login and signup forms with client-side validation.
//!
//! Validation runs before any network call. Errors are reported per field so
//! a front end can render them next to the offending input.

use std::collections::BTreeMap;
use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use super::email::Email;

/// Minimum password length accepted at signup.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Validation errors keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    /// No errors.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Record an error for `field`. The first error for a field wins.
    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    /// Whether no field has an error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The error for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Iterate over `(field, message)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    /// `Ok(value)` when there are no errors, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns `self` if any field has an error.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for message in self.0.values() {
            if !first {
                f.write_str(", ")?;
            }
            f.write_str(message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// Credentials entered in the login tab.
#[derive(Debug)]
pub struct LoginForm {
    pub email: String,
    pub password: SecretString,
}

impl LoginForm {
    /// Validate the form, returning the parsed email.
    ///
    /// # Errors
    ///
    /// Returns field errors for a blank or malformed email and a blank
    /// password.
    pub fn validate(&self) -> Result<Email, FieldErrors> {
        let mut errors = FieldErrors::new();

        let email = Email::parse(&self.email)
            .map_err(|e| errors.insert("email", e.to_string()))
            .ok();
        if self.password.expose_secret().is_empty() {
            errors.insert("password", "Password is required");
        }

        match email {
            Some(email) => errors.into_result(email),
            None => Err(errors),
        }
    }
}

/// Details entered in the signup tab.
#[derive(Debug)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub password_confirmation: SecretString,
    pub agree_to_terms: bool,
}

impl SignupForm {
    /// Validate the form, returning the parsed email.
    ///
    /// # Errors
    ///
    /// Returns field errors for blank fields, a malformed email, mismatched
    /// or short passwords and unaccepted terms.
    pub fn validate(&self) -> Result<Email, FieldErrors> {
        let mut errors = FieldErrors::new();
        let password = self.password.expose_secret();
        let confirmation = self.password_confirmation.expose_secret();

        if self.name.trim().is_empty() {
            errors.insert("name", "Full name is required");
        }
        let email = Email::parse(&self.email)
            .map_err(|e| errors.insert("email", e.to_string()))
            .ok();
        if password.is_empty() {
            errors.insert("password", "Password is required");
        } else if password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.insert(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
            );
        }
        if confirmation.is_empty() {
            errors.insert("password_confirmation", "Please confirm your password");
        } else if confirmation != password {
            errors.insert("password_confirmation", "Passwords do not match");
        }
        if !self.agree_to_terms {
            errors.insert("agree_to_terms", "Please agree to terms and conditions");
        }

        match email {
            Some(email) => errors.into_result(email),
            None => Err(errors),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn signup(password: &str, confirmation: &str, agree: bool) -> SignupForm {
        SignupForm {
            name: "Juan Dela Cruz".to_string(),
            email: "juan@relux.ph".to_string(),
            password: SecretString::from(password.to_string()),
            password_confirmation: SecretString::from(confirmation.to_string()),
            agree_to_terms: agree,
        }
    }

    #[test]
    fn test_login_requires_both_fields() {
        let form = LoginForm {
            email: String::new(),
            password: SecretString::from(String::new()),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("email"), Some("Email is required"));
        assert_eq!(errors.get("password"), Some("Password is required"));
    }

    #[test]
    fn test_login_valid() {
        let form = LoginForm {
            email: "juan@relux.ph".to_string(),
            password: SecretString::from("hunter22".to_string()),
        };
        assert_eq!(form.validate().unwrap().as_str(), "juan@relux.ph");
    }

    #[test]
    fn test_signup_valid() {
        assert!(signup("sapphire", "sapphire", true).validate().is_ok());
    }

    #[test]
    fn test_signup_password_mismatch() {
        let errors = signup("sapphire", "sapphir3", true).validate().unwrap_err();
        assert_eq!(errors.get("password_confirmation"), Some("Passwords do not match"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_signup_short_password() {
        let errors = signup("abc", "abc", true).validate().unwrap_err();
        assert_eq!(
            errors.get("password"),
            Some("Password must be at least 6 characters")
        );
    }

    #[test]
    fn test_signup_requires_terms() {
        let errors = signup("sapphire", "sapphire", false).validate().unwrap_err();
        assert!(errors.get("agree_to_terms").is_some());
    }

    #[test]
    fn test_field_errors_display_joins_messages() {
        let mut errors = FieldErrors::new();
        errors.insert("b", "second");
        errors.insert("a", "first");
        errors.insert("a", "ignored");
        assert_eq!(errors.to_string(), "first, second");
    }
}
