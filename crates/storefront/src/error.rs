//! Unified error handling with Sentry integration.
//!
//! Provides a unified `ClientError` type for every storefront operation.
//! Server and transport failures are captured to Sentry before the shell
//! turns them into a notice for the user.

use relux_core::FieldErrors;
use relux_core::cart::CheckoutBlocked;
use thiserror::Error;

use crate::api::ApiError;
use crate::storage::StorageError;

/// Client-level error type for the storefront.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Form input failed validation; nothing was sent.
    #[error("{0}")]
    Validation(FieldErrors),

    /// The operation needs a signed-in user.
    #[error("Please login to continue")]
    Unauthenticated,

    /// Checkout with nothing in the cart.
    #[error("Your cart is empty")]
    EmptyCart,

    /// Cart quantities start at 1.
    #[error("Quantity must be at least 1")]
    InvalidQuantity(i64),

    /// The product has no stock left.
    #[error("{0} is sold out")]
    SoldOut(String),

    /// Relux API operation failed.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// Durable state could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<FieldErrors> for ClientError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<CheckoutBlocked> for ClientError {
    fn from(blocked: CheckoutBlocked) -> Self {
        match blocked {
            CheckoutBlocked::InvalidForm(errors) => Self::Validation(errors),
            CheckoutBlocked::EmptyCart => Self::EmptyCart,
        }
    }
}

impl ClientError {
    /// Whether the user has to sign in (again) before retrying.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        match self {
            Self::Unauthenticated => true,
            Self::Api(e) => e.is_unauthorized(),
            _ => false,
        }
    }

    /// Per-field messages, when the error came from form validation.
    #[must_use]
    pub const fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// Text to show the user.
    ///
    /// Transport and parse details stay in the logs.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) if e.is_transport() => {
                "Connection error. Please check your connection and try again.".to_string()
            }
            Self::Api(ApiError::Parse(_) | ApiError::InvalidUrl(_)) => {
                "Unexpected response from the server".to_string()
            }
            Self::Storage(_) => "Could not save your session on this device".to_string(),
            _ => self.to_string(),
        }
    }

    /// Capture server and transport failures to Sentry.
    ///
    /// User-caused errors (validation, sign-in, client-side rejections and
    /// 4xx responses) are not reported.
    pub fn report(&self) {
        let reportable = match self {
            Self::Api(ApiError::Status { status, .. }) => *status >= 500,
            Self::Api(ApiError::Http(_) | ApiError::Parse(_) | ApiError::InvalidUrl(_))
            | Self::Storage(_) => true,
            _ => false,
        };
        if reportable {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront operation failed"
            );
        }
    }
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Set the Sentry user context.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_display() {
        let err = ClientError::SoldOut("Nautilus 5711".to_string());
        assert_eq!(err.to_string(), "Nautilus 5711 is sold out");

        let err = ClientError::Api(ApiError::Status {
            status: 422,
            message: "The qty field must be at least 1.".to_string(),
        });
        assert_eq!(err.user_message(), "The qty field must be at least 1.");
    }

    #[test]
    fn test_auth_errors() {
        assert!(ClientError::Unauthenticated.is_auth());
        assert!(ClientError::Api(ApiError::Unauthorized("Unauthenticated.".to_string())).is_auth());
        assert!(!ClientError::EmptyCart.is_auth());
        assert!(!ClientError::Api(ApiError::Status {
            status: 403,
            message: "Forbidden".to_string(),
        })
        .is_auth());
    }

    #[test]
    fn test_checkout_blocked_conversion() {
        let mut errors = FieldErrors::new();
        errors.insert("delivery_city", "City is required");
        let err = ClientError::from(CheckoutBlocked::InvalidForm(errors));
        assert_eq!(
            err.field_errors().and_then(|e| e.get("delivery_city")),
            Some("City is required")
        );
        assert!(matches!(
            ClientError::from(CheckoutBlocked::EmptyCart),
            ClientError::EmptyCart
        ));
    }

    #[test]
    fn test_parse_errors_hide_details() {
        let err = ClientError::Api(ApiError::Parse(
            serde_json::from_str::<u32>("nope").unwrap_err(),
        ));
        assert_eq!(err.user_message(), "Unexpected response from the server");
    }
}
