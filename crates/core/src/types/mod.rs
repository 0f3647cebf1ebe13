//! Domain types for the Relux storefront.
//!
//! These mirror the JSON shapes returned by the Relux API, with type-safe
//! wrappers for IDs, prices and user input.

pub mod cart;
pub mod delivery;
pub mod email;
pub mod forms;
pub mod id;
pub mod order;
pub mod price;
pub mod product;
pub mod status;
pub mod user;

pub use cart::{CartItem, CartSnapshot, LineProduct};
pub use delivery::{DeliveryField, DeliveryForm};
pub use email::{Email, EmailError};
pub use forms::{FieldErrors, LoginForm, SignupForm};
pub use id::*;
pub use order::{Order, OrderItem, PaymentMethod};
pub use price::Price;
pub use product::{Availability, Product, ProductPage};
pub use status::OrderStatus;
pub use user::{AuthToken, UserProfile};
