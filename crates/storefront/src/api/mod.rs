//! Relux REST API client.
//!
//! Uses `reqwest` 0.13 for HTTP with bearer-token auth on the cart, checkout
//! and order endpoints. Unfiltered product listings are cached using `moka`;
//! cart and order reads always go to the server.
//!
//! # Example
//!
//! ```rust,ignore
//! use relux_storefront::api::ApiClient;
//!
//! let api = ApiClient::new(&config)?;
//! let page = api.products(&SearchFilters::default(), 1).await?;
//! let (user, token) = api.login("mc@relux.ph", "secret").await?;
//! let cart = api.cart(&token).await?;
//! ```

mod cache;
pub mod types;

use std::sync::Arc;

use moka::future::Cache;
use relux_core::{
    AuthToken, CartItemId, CartSnapshot, DeliveryForm, Order, OrderId, ProductId, ProductPage,
    SearchFilters, UserProfile,
};
use reqwest::header::ACCEPT;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::StorefrontConfig;

use cache::ListingKey;
use types::{
    AddItemRequest, AuthResponse, CheckoutResponse, LoginRequest, OrderResponse, OrdersResponse,
    RegisterRequest, UpdateItemRequest, cart_item_path,
};

const LOGIN_FALLBACK: &str = "Invalid credentials";
const REGISTER_FALLBACK: &str = "Registration failed";

/// Errors that can occur when talking to the Relux API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The token was missing, expired or rejected.
    #[error("{0}")]
    Unauthorized(String),

    /// Non-success status with the best message the body offered.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// A success response that did not contain what was asked for.
    #[error("{0}")]
    Rejected(String),

    /// A path could not be joined onto the base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// Whether the server rejected the credentials.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// Whether the request never produced a usable response.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the Relux REST API.
///
/// Cheap to clone; clones share the connection pool and listing cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base: Url,
    per_page: u32,
    listings: Option<Cache<ListingKey, ProductPage>>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }

        let listings = config.product_cache_ttl.map(|ttl| {
            Cache::builder()
                .max_capacity(100)
                .time_to_live(ttl)
                .build()
        });

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client: builder.build()?,
                base: config.api_url.clone(),
                per_page: config.per_page,
                listings,
            }),
        })
    }

    /// Base URL every path is joined onto.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base
    }

    /// Products requested per listing page.
    #[must_use]
    pub fn per_page(&self) -> u32 {
        self.inner.per_page
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.inner.base.join(path)?;
        Ok(self
            .inner
            .client
            .request(method, url)
            .header(ACCEPT, "application/json"))
    }

    fn authed(
        &self,
        method: Method,
        path: &str,
        token: &AuthToken,
    ) -> Result<RequestBuilder, ApiError> {
        Ok(self.request(method, path)?.bearer_auth(token.expose()))
    }

    /// Send a request and decode a JSON body.
    async fn execute<T: DeserializeOwned>(
        request: RequestBuilder,
        fallback: Option<&str>,
    ) -> Result<T, ApiError> {
        let text = Self::send(request, fallback).await?;

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate(&text, 500),
                "Failed to parse Relux API response"
            );
            ApiError::Parse(e)
        })
    }

    /// Send a request, returning the raw body of a success response.
    async fn send(request: RequestBuilder, fallback: Option<&str>) -> Result<String, ApiError> {
        let response = request.send().await.map_err(|e| {
            tracing::error!(error = %e, "Relux API request failed");
            ApiError::Http(e)
        })?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let text = response.text().await?;

        if status.is_success() {
            return Ok(text);
        }

        let message = extract_message(&text)
            .or_else(|| fallback.map(str::to_string))
            .unwrap_or_else(|| format!("Request failed (HTTP {})", status.as_u16()));

        if status == StatusCode::UNAUTHORIZED {
            debug!(message = %message, "Relux API rejected credentials");
            return Err(ApiError::Unauthorized(message));
        }

        tracing::error!(
            status = %status,
            body = %truncate(&text, 500),
            "Relux API returned non-success status"
        );
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Exchange credentials for a profile and token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for rejected credentials and
    /// `ApiError::Rejected` when the response lacks a user or token.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(UserProfile, AuthToken), ApiError> {
        let request = self
            .request(Method::POST, "login")?
            .json(&LoginRequest { email, password });
        let response: AuthResponse = Self::execute(request, Some(LOGIN_FALLBACK)).await?;
        session_from(response, LOGIN_FALLBACK)
    }

    /// Create an account, returning its profile and token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` carrying the server's validation messages
    /// and `ApiError::Rejected` when the response lacks a user or token.
    #[instrument(skip(self, password, password_confirmation))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        password_confirmation: &str,
    ) -> Result<(UserProfile, AuthToken), ApiError> {
        let request = self.request(Method::POST, "register")?.json(&RegisterRequest {
            name,
            email,
            password,
            password_confirmation,
        });
        let response: AuthResponse = Self::execute(request, Some(REGISTER_FALLBACK)).await?;
        session_from(response, REGISTER_FALLBACK)
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Get one page of the catalog.
    ///
    /// Unfiltered pages are served from the listing cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn products(
        &self,
        filters: &SearchFilters,
        page: u32,
    ) -> Result<ProductPage, ApiError> {
        let per_page = self.inner.per_page;
        let cache = self.inner.listings.as_ref().filter(|_| !filters.is_active());
        let key = ListingKey { page, per_page };

        if let Some(cached) = cache
            && let Some(hit) = cached.get(&key).await
        {
            debug!(page, "Cache hit for product listing");
            return Ok(hit);
        }

        let request = self
            .request(Method::GET, "products")?
            .query(&filters.query_params(page, per_page));
        let listing: ProductPage = Self::execute(request, None).await?;

        if let Some(cached) = cache {
            cached.insert(key, listing.clone()).await;
        }

        Ok(listing)
    }

    /// Drop every cached listing.
    pub fn invalidate_listings(&self) {
        if let Some(cache) = &self.inner.listings {
            cache.invalidate_all();
        }
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Get the user's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all)]
    pub async fn cart(&self, token: &AuthToken) -> Result<CartSnapshot, ApiError> {
        let request = self.authed(Method::GET, "cart", token)?;
        Self::execute(request, None).await
    }

    /// Add a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn add_cart_item(
        &self,
        token: &AuthToken,
        product_id: ProductId,
        qty: u32,
    ) -> Result<(), ApiError> {
        let request = self
            .authed(Method::POST, "cart/items", token)?
            .json(&AddItemRequest { product_id, qty });
        Self::send(request, None).await.map(drop)
    }

    /// Set the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn update_cart_item(
        &self,
        token: &AuthToken,
        item: CartItemId,
        qty: u32,
    ) -> Result<(), ApiError> {
        let request = self
            .authed(Method::PATCH, &cart_item_path(item), token)?
            .json(&UpdateItemRequest { qty });
        Self::send(request, None).await.map(drop)
    }

    /// Remove a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn remove_cart_item(&self, token: &AuthToken, item: CartItemId) -> Result<(), ApiError> {
        let request = self.authed(Method::DELETE, &cart_item_path(item), token)?;
        Self::send(request, None).await.map(drop)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Place an order for the current cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all, fields(payment = %form.payment_method.label()))]
    pub async fn checkout(&self, token: &AuthToken, form: &DeliveryForm) -> Result<Order, ApiError> {
        let request = self.authed(Method::POST, "checkout", token)?.json(form);
        let response: CheckoutResponse = Self::execute(request, None).await?;
        Ok(response.into_order())
    }

    /// Get the user's orders, newest first as the server returns them.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all)]
    pub async fn orders(&self, token: &AuthToken) -> Result<Vec<Order>, ApiError> {
        let request = self.authed(Method::GET, "orders", token)?;
        let response: OrdersResponse = Self::execute(request, None).await?;
        Ok(response.orders)
    }

    /// Get one order with its lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn order(&self, token: &AuthToken, id: OrderId) -> Result<Order, ApiError> {
        let request = self.authed(Method::GET, &format!("orders/{id}"), token)?;
        let response: OrderResponse = Self::execute(request, None).await?;
        Ok(response.order)
    }
}

fn session_from(
    response: AuthResponse,
    fallback: &str,
) -> Result<(UserProfile, AuthToken), ApiError> {
    match (response.user, response.token) {
        (Some(user), Some(token)) if !token.is_blank() => Ok((user, token)),
        _ => Err(ApiError::Rejected(fallback.to_string())),
    }
}

/// Best-effort error message from a JSON error body.
///
/// Tries `message`, then `error`, then every entry of an `errors` map
/// flattened and joined with ", ".
fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    let text = |key: &str| {
        value
            .get(key)
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    text("message").or_else(|| text("error")).or_else(|| {
        let errors = value.get("errors")?.as_object()?;
        let messages: Vec<&str> = errors
            .values()
            .flat_map(|v| match v {
                serde_json::Value::Array(items) => items.iter().filter_map(serde_json::Value::as_str).collect(),
                serde_json::Value::String(s) => vec![s.as_str()],
                _ => Vec::new(),
            })
            .collect();
        (!messages.is_empty()).then(|| messages.join(", "))
    })
}

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
