//! Cart fetch state machine.
//!
//! ```text
//! idle ──begin──▶ loading ──succeed──▶ loaded ─┐
//!                    │                          │ begin (every mutation)
//!                    └────fail────▶ error ──────┘
//! ```
//!
//! The last good snapshot rides along through `loading` and `error`, so a
//! failed request never discards what the user was looking at.

use thiserror::Error;

use crate::types::{CartSnapshot, DeliveryForm, FieldErrors};

/// Where the cart view is in its fetch cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CartState {
    /// Nothing fetched yet (or the session ended).
    #[default]
    Idle,
    Loading {
        last: Option<CartSnapshot>,
    },
    Loaded(CartSnapshot),
    Error {
        message: String,
        last: Option<CartSnapshot>,
    },
}

impl CartState {
    /// Enter `loading`, keeping the last good snapshot.
    pub fn begin(&mut self) {
        let last = self.take_snapshot();
        *self = Self::Loading { last };
    }

    /// Enter `loaded` with a fresh server snapshot.
    pub fn succeed(&mut self, snapshot: CartSnapshot) {
        *self = Self::Loaded(snapshot);
    }

    /// Enter `error`, keeping the last good snapshot.
    pub fn fail(&mut self, message: impl Into<String>) {
        let last = self.take_snapshot();
        *self = Self::Error {
            message: message.into(),
            last,
        };
    }

    /// Back to `idle`, dropping any snapshot.
    pub fn reset(&mut self) {
        *self = Self::Idle;
    }

    /// The snapshot to display, if any.
    #[must_use]
    pub const fn snapshot(&self) -> Option<&CartSnapshot> {
        match self {
            Self::Idle => None,
            Self::Loaded(snapshot) => Some(snapshot),
            Self::Loading { last } | Self::Error { last, .. } => last.as_ref(),
        }
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    /// Error message from the last failed request.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error { message, .. } => Some(message.as_str()),
            _ => None,
        }
    }

    /// Badge count shown in the header.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.snapshot().map_or(0, |cart| cart.item_count)
    }

    fn take_snapshot(&mut self) -> Option<CartSnapshot> {
        match std::mem::take(self) {
            Self::Idle => None,
            Self::Loaded(snapshot) => Some(snapshot),
            Self::Loading { last } | Self::Error { last, .. } => last,
        }
    }
}

/// Why checkout cannot be submitted yet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutBlocked {
    /// Required delivery fields are blank.
    #[error("{0}")]
    InvalidForm(FieldErrors),
    /// Nothing to order.
    #[error("Your cart is empty")]
    EmptyCart,
}

/// Client-side checkout preconditions, checked before any network call.
///
/// Form fields are checked first so the user sees every inline error even
/// when the cart is also empty.
///
/// # Errors
///
/// Returns the first blocking reason.
pub fn checkout_blockers(
    form: &DeliveryForm,
    cart: Option<&CartSnapshot>,
) -> Result<(), CheckoutBlocked> {
    form.validate().map_err(CheckoutBlocked::InvalidForm)?;
    match cart {
        Some(cart) if !cart.is_empty() => Ok(()),
        _ => Err(CheckoutBlocked::EmptyCart),
    }
}
