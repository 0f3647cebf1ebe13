//! The active modal.
//!
//! Auth, cart drawer, checkout and order confirmation are mutually
//! exclusive. Holding them in one value makes two open at once
//! unrepresentable; opening one replaces whatever was showing.

use crate::types::Order;

/// Which modal (if any) is on screen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Overlay {
    #[default]
    None,
    Auth,
    Cart,
    Checkout,
    OrderSuccess(Box<Order>),
}

impl Overlay {
    /// Whether any modal is showing.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Short name for logs and the terminal status line.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Auth => "auth",
            Self::Cart => "cart",
            Self::Checkout => "checkout",
            Self::OrderSuccess(_) => "order_success",
        }
    }

    /// Whether the modal only makes sense for a signed-in user.
    #[must_use]
    pub const fn requires_session(&self) -> bool {
        matches!(self, Self::Checkout | Self::OrderSuccess(_))
    }
}
