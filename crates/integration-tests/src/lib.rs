//! Integration tests for the Relux storefront client.
//!
//! [`MockApi`] serves the Relux REST API from memory on an ephemeral port so
//! the full client stack (HTTP, caching, session storage, the shell) can be
//! exercised without the production backend.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p relux-integration-tests
//! ```
//!
//! # Mock Behaviour
//!
//! - One seeded customer ([`CUSTOMER_EMAIL`] / [`CUSTOMER_PASSWORD`]) and six
//!   watches across four brands
//! - Bearer tokens are issued on login and registration; anything else is 401
//! - Cart totals subtract a configurable discount, so the total never equals
//!   the sum of the lines unless the discount is zero
//! - Every route counts its requests, see [`MockApi::hits`]

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::extract::{Path as UrlPath, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use chrono::Utc;
use relux_core::{
    CartItem, CartItemId, CartSnapshot, DeliveryForm, LineProduct, Order, OrderId, OrderItem,
    OrderStatus, Price, Product, ProductId, ProductPage, UserId, UserProfile,
};
use relux_storefront::StorefrontConfig;
use relux_storefront::config::ConfigError;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

pub const CUSTOMER_NAME: &str = "Maria Clara";
pub const CUSTOMER_EMAIL: &str = "mc@relux.ph";
pub const CUSTOMER_PASSWORD: &str = "secret1";

/// Discount the mock applies to every non-empty cart.
pub const DEFAULT_DISCOUNT_CENTAVOS: i64 = 500_000;

/// Search debounce used by [`MockApi::config`].
pub const TEST_DEBOUNCE: Duration = Duration::from_millis(20);

pub const PRODUCTS: &str = "GET /products";
pub const LOGIN: &str = "POST /login";
pub const REGISTER: &str = "POST /register";
pub const CART: &str = "GET /cart";
pub const ADD_ITEM: &str = "POST /cart/items";
pub const UPDATE_ITEM: &str = "PATCH /cart/items";
pub const REMOVE_ITEM: &str = "DELETE /cart/items";
pub const CHECKOUT: &str = "POST /checkout";
pub const ORDERS: &str = "GET /orders";
pub const ORDER: &str = "GET /orders/{id}";

struct Line {
    id: CartItemId,
    product: ProductId,
    qty: u32,
}

struct Store {
    users: Vec<(UserProfile, String)>,
    tokens: HashMap<String, UserId>,
    products: Vec<Product>,
    carts: HashMap<UserId, Vec<Line>>,
    orders: Vec<(UserId, Order)>,
    next_id: i64,
    discount: Price,
    hits: HashMap<&'static str, usize>,
    failures: HashMap<&'static str, StatusCode>,
}

type Shared = Arc<Mutex<Store>>;

fn lock(shared: &Shared) -> MutexGuard<'_, Store> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

fn watch(id: i64, name: &str, brand: &str, pesos: i64, stock: i64) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        brand: Some(brand.to_string()),
        price: Price::from_centavos(pesos * 100),
        stock,
        image: None,
        description: None,
    }
}

impl Store {
    fn seeded() -> Self {
        let customer = UserProfile {
            id: UserId::new(1),
            name: CUSTOMER_NAME.to_string(),
            email: CUSTOMER_EMAIL.to_string(),
        };
        Self {
            users: vec![(customer, CUSTOMER_PASSWORD.to_string())],
            tokens: HashMap::new(),
            products: vec![
                watch(1, "Submariner Date", "Rolex", 850_000, 10),
                watch(2, "Cosmograph Daytona", "Rolex", 1_900_000, 3),
                watch(3, "Speedmaster Moonwatch", "Omega", 420_000, 8),
                watch(4, "Seamaster Diver 300M", "Omega", 330_000, 0),
                watch(5, "Nautilus 5711", "Patek Philippe", 7_500_000, 2),
                watch(6, "Royal Oak 15500", "Audemars Piguet", 2_500_000, 4),
            ],
            carts: HashMap::new(),
            orders: Vec::new(),
            next_id: 100,
            discount: Price::from_centavos(DEFAULT_DISCOUNT_CENTAVOS),
            hits: HashMap::new(),
            failures: HashMap::new(),
        }
    }

    /// Count a request and return the queued failure for `route`, if any.
    fn enter(&mut self, route: &'static str) -> Option<Response> {
        *self.hits.entry(route).or_default() += 1;
        self.failures
            .remove(route)
            .map(|status| error(status, "Server Error"))
    }

    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn issue_token(&mut self, user: UserId) -> String {
        let token = format!("token-{}-{}", user, self.next_id());
        self.tokens.insert(token.clone(), user);
        token
    }

    fn authenticate(&self, headers: &HeaderMap) -> Result<UserId, Response> {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .and_then(|token| self.tokens.get(token).copied())
            .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Unauthenticated."))
    }

    fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    fn line_product(product: &Product) -> LineProduct {
        LineProduct {
            id: Some(product.id),
            name: Some(product.name.clone()),
            brand: product.brand.clone(),
            image: product.image.clone(),
        }
    }

    fn snapshot(&self, user: UserId) -> CartSnapshot {
        let items: Vec<CartItem> = self
            .carts
            .get(&user)
            .into_iter()
            .flatten()
            .filter_map(|line| {
                let product = self.product(line.product)?;
                Some(CartItem {
                    id: line.id,
                    product: Some(Self::line_product(product)),
                    name: None,
                    qty: line.qty,
                    unit_price: product.price,
                })
            })
            .collect();

        let subtotal: Decimal = items.iter().map(|item| item.line_total().amount()).sum();
        let total = if items.is_empty() {
            Decimal::ZERO
        } else {
            (subtotal - self.discount.amount()).max(Decimal::ZERO)
        };
        CartSnapshot {
            item_count: items.iter().map(|item| item.qty).sum(),
            items,
            total: Price::new(total),
        }
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

// ============================================================================
// Handlers
// ============================================================================

#[derive(Deserialize)]
struct Credentials {
    email: String,
    password: String,
}

async fn login(State(shared): State<Shared>, Json(body): Json<Credentials>) -> Response {
    let mut store = lock(&shared);
    if let Some(failure) = store.enter(LOGIN) {
        return failure;
    }

    let user = store
        .users
        .iter()
        .find(|(user, password)| user.email == body.email && *password == body.password)
        .map(|(user, _)| user.clone());
    let Some(user) = user else {
        return error(StatusCode::UNAUTHORIZED, "Invalid credentials");
    };
    let token = store.issue_token(user.id);
    Json(json!({ "user": user, "token": token })).into_response()
}

#[derive(Deserialize)]
struct Registration {
    name: String,
    email: String,
    password: String,
    password_confirmation: String,
}

async fn register(State(shared): State<Shared>, Json(body): Json<Registration>) -> Response {
    let mut store = lock(&shared);
    if let Some(failure) = store.enter(REGISTER) {
        return failure;
    }

    if store.users.iter().any(|(user, _)| user.email == body.email) {
        let message = "The email has already been taken.";
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "message": message, "errors": { "email": [message] } })),
        )
            .into_response();
    }
    if body.password != body.password_confirmation {
        return error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "The password confirmation does not match.",
        );
    }

    let user = UserProfile {
        id: UserId::new(store.next_id()),
        name: body.name,
        email: body.email,
    };
    store.users.push((user.clone(), body.password));
    let token = store.issue_token(user.id);
    (
        StatusCode::CREATED,
        Json(json!({ "user": user, "token": token })),
    )
        .into_response()
}

#[derive(Deserialize)]
struct ListingQuery {
    #[serde(default)]
    q: String,
    #[serde(default)]
    brand: String,
    #[serde(default)]
    sort: String,
    page: Option<u32>,
    per_page: Option<u32>,
}

async fn products(State(shared): State<Shared>, Query(query): Query<ListingQuery>) -> Response {
    let mut store = lock(&shared);
    if let Some(failure) = store.enter(PRODUCTS) {
        return failure;
    }

    let needle = query.q.to_lowercase();
    let mut matches: Vec<Product> = store
        .products
        .iter()
        .filter(|p| {
            let brand = p.brand.as_deref().unwrap_or_default();
            (needle.is_empty()
                || p.name.to_lowercase().contains(&needle)
                || brand.to_lowercase().contains(&needle))
                && (query.brand.is_empty() || brand == query.brand)
        })
        .cloned()
        .collect();
    match query.sort.as_str() {
        "price_asc" => matches.sort_by_key(|p| p.price),
        "price_desc" => matches.sort_by_key(|p| std::cmp::Reverse(p.price)),
        "newest" => matches.sort_by_key(|p| std::cmp::Reverse(p.id)),
        _ => {}
    }

    let per_page = query.per_page.unwrap_or(50).max(1);
    let page = query.page.unwrap_or(1).max(1);
    let count = u32::try_from(matches.len()).unwrap_or(u32::MAX);
    let last_page = count.div_ceil(per_page).max(1);
    let data = matches
        .into_iter()
        .skip(((page - 1) * per_page) as usize)
        .take(per_page as usize)
        .collect();

    Json(ProductPage {
        data,
        current_page: page,
        last_page,
        per_page: Some(per_page),
    })
    .into_response()
}

async fn cart(State(shared): State<Shared>, headers: HeaderMap) -> Response {
    let mut store = lock(&shared);
    if let Some(failure) = store.enter(CART) {
        return failure;
    }
    match store.authenticate(&headers) {
        Ok(user) => Json(store.snapshot(user)).into_response(),
        Err(rejection) => rejection,
    }
}

#[derive(Deserialize)]
struct AddItem {
    product_id: ProductId,
    qty: u32,
}

async fn add_item(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<AddItem>,
) -> Response {
    let mut store = lock(&shared);
    if let Some(failure) = store.enter(ADD_ITEM) {
        return failure;
    }
    let user = match store.authenticate(&headers) {
        Ok(user) => user,
        Err(rejection) => return rejection,
    };
    let Some(stock) = store.product(body.product_id).map(|p| p.stock) else {
        return error(StatusCode::NOT_FOUND, "Product not found");
    };

    let in_cart: u32 = store
        .carts
        .get(&user)
        .into_iter()
        .flatten()
        .filter(|line| line.product == body.product_id)
        .map(|line| line.qty)
        .sum();
    if i64::from(in_cart + body.qty) > stock {
        return error(StatusCode::UNPROCESSABLE_ENTITY, "Insufficient stock");
    }

    let id = CartItemId::new(store.next_id());
    let lines = store.carts.entry(user).or_default();
    match lines.iter_mut().find(|line| line.product == body.product_id) {
        Some(line) => line.qty += body.qty,
        None => lines.push(Line {
            id,
            product: body.product_id,
            qty: body.qty,
        }),
    }
    (
        StatusCode::CREATED,
        Json(json!({ "message": "Item added to cart" })),
    )
        .into_response()
}

#[derive(Deserialize)]
struct UpdateItem {
    qty: u32,
}

async fn update_item(
    State(shared): State<Shared>,
    headers: HeaderMap,
    UrlPath(id): UrlPath<i64>,
    Json(body): Json<UpdateItem>,
) -> Response {
    let mut store = lock(&shared);
    if let Some(failure) = store.enter(UPDATE_ITEM) {
        return failure;
    }
    let user = match store.authenticate(&headers) {
        Ok(user) => user,
        Err(rejection) => return rejection,
    };

    let id = CartItemId::new(id);
    let line = store
        .carts
        .get_mut(&user)
        .and_then(|lines| lines.iter_mut().find(|line| line.id == id));
    match line {
        Some(line) => {
            line.qty = body.qty;
            Json(json!({ "message": "Cart updated" })).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Cart item not found"),
    }
}

async fn remove_item(
    State(shared): State<Shared>,
    headers: HeaderMap,
    UrlPath(id): UrlPath<i64>,
) -> Response {
    let mut store = lock(&shared);
    if let Some(failure) = store.enter(REMOVE_ITEM) {
        return failure;
    }
    let user = match store.authenticate(&headers) {
        Ok(user) => user,
        Err(rejection) => return rejection,
    };

    let id = CartItemId::new(id);
    let Some(lines) = store.carts.get_mut(&user) else {
        return error(StatusCode::NOT_FOUND, "Cart item not found");
    };
    let before = lines.len();
    lines.retain(|line| line.id != id);
    if lines.len() == before {
        return error(StatusCode::NOT_FOUND, "Cart item not found");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn checkout(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Json(form): Json<DeliveryForm>,
) -> Response {
    let mut store = lock(&shared);
    if let Some(failure) = store.enter(CHECKOUT) {
        return failure;
    }
    let user = match store.authenticate(&headers) {
        Ok(user) => user,
        Err(rejection) => return rejection,
    };

    let snapshot = store.snapshot(user);
    if snapshot.is_empty() {
        return error(StatusCode::UNPROCESSABLE_ENTITY, "Your cart is empty");
    }

    for item in &snapshot.items {
        let id = item.product.as_ref().and_then(|p| p.id);
        if let Some(product) = store.products.iter_mut().find(|p| Some(p.id) == id) {
            product.stock -= i64::from(item.qty);
        }
    }
    store.carts.remove(&user);

    let order = Order {
        id: OrderId::new(store.next_id()),
        status: OrderStatus::Pending,
        total: snapshot.total,
        payment_method: form.payment_method,
        delivery_name: Some(form.delivery_name),
        delivery_address: Some(form.delivery_address),
        delivery_city: Some(form.delivery_city),
        item_count: Some(snapshot.item_count),
        items: snapshot
            .items
            .into_iter()
            .map(|item| OrderItem {
                id: Some(item.id.get()),
                name: item.product.as_ref().and_then(|p| p.name.clone()),
                product: item.product,
                qty: item.qty,
                unit_price: item.unit_price,
            })
            .collect(),
        created_at: Some(Utc::now()),
    };
    store.orders.push((user, order.clone()));
    (
        StatusCode::CREATED,
        Json(json!({ "message": "Order placed", "order": order })),
    )
        .into_response()
}

async fn orders(State(shared): State<Shared>, headers: HeaderMap) -> Response {
    let mut store = lock(&shared);
    if let Some(failure) = store.enter(ORDERS) {
        return failure;
    }
    let user = match store.authenticate(&headers) {
        Ok(user) => user,
        Err(rejection) => return rejection,
    };

    let orders: Vec<&Order> = store
        .orders
        .iter()
        .rev()
        .filter(|(owner, _)| *owner == user)
        .map(|(_, order)| order)
        .collect();
    Json(json!({ "orders": orders })).into_response()
}

async fn order(
    State(shared): State<Shared>,
    headers: HeaderMap,
    UrlPath(id): UrlPath<i64>,
) -> Response {
    let mut store = lock(&shared);
    if let Some(failure) = store.enter(ORDER) {
        return failure;
    }
    let user = match store.authenticate(&headers) {
        Ok(user) => user,
        Err(rejection) => return rejection,
    };

    let id = OrderId::new(id);
    store
        .orders
        .iter()
        .find(|(owner, order)| *owner == user && order.id == id)
        .map_or_else(
            || error(StatusCode::NOT_FOUND, "Order not found"),
            |(_, order)| Json(json!({ "order": order })).into_response(),
        )
}

fn router(store: Shared) -> Router {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/register", post(register))
        .route("/api/products", get(products))
        .route("/api/cart", get(cart))
        .route("/api/cart/items", post(add_item))
        .route("/api/cart/items/{id}", patch(update_item).delete(remove_item))
        .route("/api/checkout", post(checkout))
        .route("/api/orders", get(orders))
        .route("/api/orders/{id}", get(order))
        .with_state(store)
}

// ============================================================================
// Test handle
// ============================================================================

/// In-memory Relux API running on a local port until dropped.
pub struct MockApi {
    addr: SocketAddr,
    store: Shared,
    server: tokio::task::JoinHandle<()>,
}

impl MockApi {
    /// Bind an ephemeral port and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn spawn() -> std::io::Result<Self> {
        let store = Arc::new(Mutex::new(Store::seeded()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = router(Arc::clone(&store));
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Ok(Self {
            addr,
            store,
            server,
        })
    }

    #[must_use]
    pub fn api_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Client configuration pointing at this server with a short debounce.
    ///
    /// # Errors
    ///
    /// Returns an error if the server URL is rejected.
    pub fn config(&self, state_dir: &Path) -> Result<StorefrontConfig, ConfigError> {
        let mut config = StorefrontConfig::new(&self.api_url(), state_dir)?;
        config.search_debounce = TEST_DEBOUNCE;
        Ok(config)
    }

    /// Requests served on `route` so far (e.g. [`PRODUCTS`]).
    #[must_use]
    pub fn hits(&self, route: &str) -> usize {
        lock(&self.store).hits.get(route).copied().unwrap_or_default()
    }

    /// Requests served on all routes so far.
    #[must_use]
    pub fn total_hits(&self) -> usize {
        lock(&self.store).hits.values().sum()
    }

    /// Answer the next request on `route` with `status`.
    pub fn fail_next(&self, route: &'static str, status: StatusCode) {
        lock(&self.store).failures.insert(route, status);
    }

    pub fn set_discount(&self, discount: Price) {
        lock(&self.store).discount = discount;
    }

    pub fn set_stock(&self, product: ProductId, stock: i64) {
        if let Some(p) = lock(&self.store)
            .products
            .iter_mut()
            .find(|p| p.id == product)
        {
            p.stock = stock;
        }
    }

    #[must_use]
    pub fn stock(&self, product: ProductId) -> Option<i64> {
        lock(&self.store).product(product).map(|p| p.stock)
    }

    /// Invalidate every issued token, as if they all expired.
    pub fn revoke_tokens(&self) {
        lock(&self.store).tokens.clear();
    }

    /// Number of orders placed by anyone.
    #[must_use]
    pub fn order_count(&self) -> usize {
        lock(&self.store).orders.len()
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}
