//! Application shell.
//!
//! [`Storefront`] owns the state container and performs the effects the
//! reducer asks for: product fetches, cart refreshes, session persistence
//! and hash updates. Front ends call one method per user interaction and
//! render from [`Storefront::state`] afterwards.
//!
//! Errors are scoped to the interaction that caused them. Each failing
//! operation returns its error and also leaves a notice for the user; a
//! rejected or expired token opens the sign-in overlay instead.

use std::future::Future;
use std::sync::Arc;

use relux_core::catalog::{BrandSection, group_by_brand};
use relux_core::{
    Action, AppState, AuthToken, CartItemId, CartSnapshot, DeliveryForm, Effect, LoginForm,
    Notice, Order, OrderId, Product, ProductId, ProductPage, Route, SearchFilters, SignupForm,
    SortOrder, UserProfile, reduce,
};
use secrecy::ExposeSecret;
use tracing::{info, instrument, warn};

use crate::api::ApiClient;
use crate::cart::CartClient;
use crate::config::StorefrontConfig;
use crate::error::{self, ClientError, Result};
use crate::search::SearchCoordinator;
use crate::session::SessionStore;
use crate::storage::{FileStore, KeyValueStore};

const ADD_PROMPT: &str = "Please login to add items to cart";

/// How a product fetch is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fetch {
    /// Wait out the search debounce (typing).
    Debounced,
    /// Send right away (navigation, brand, sort, paging).
    Immediate,
}

/// The running storefront client.
pub struct Storefront {
    state: AppState,
    api: ApiClient,
    cart: CartClient,
    sessions: SessionStore,
    search: SearchCoordinator,
    listing: Option<ProductPage>,
    hash: String,
}

impl Storefront {
    /// Build a storefront over `storage`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &StorefrontConfig, storage: Arc<dyn KeyValueStore>) -> Result<Self> {
        let api = ApiClient::new(config)?;
        Ok(Self {
            state: AppState::default(),
            cart: CartClient::new(api.clone()),
            api,
            sessions: SessionStore::new(storage),
            search: SearchCoordinator::new(config.search_debounce),
            listing: None,
            hash: String::new(),
        })
    }

    /// Build a storefront persisting to the configured state directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &StorefrontConfig) -> Result<Self> {
        Self::new(config, Arc::new(FileStore::new(config.storage_path())))
    }

    // =========================================================================
    // Read access
    // =========================================================================

    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Current URL hash fragment (empty for home).
    #[must_use]
    pub fn hash(&self) -> &str {
        &self.hash
    }

    #[must_use]
    pub fn user(&self) -> Option<&UserProfile> {
        self.state.session.user()
    }

    /// Last product page shown.
    #[must_use]
    pub const fn listing(&self) -> Option<&ProductPage> {
        self.listing.as_ref()
    }

    /// Last product page grouped by brand.
    ///
    /// Only unfiltered listings are grouped; a search or filter result is one
    /// section in server order.
    #[must_use]
    pub fn sections(&self) -> Vec<BrandSection> {
        let Some(listing) = &self.listing else {
            return Vec::new();
        };
        if self.state.filters.is_active() {
            vec![BrandSection {
                brand: String::new(),
                products: listing.data.clone(),
            }]
        } else {
            group_by_brand(&listing.data)
        }
    }

    /// Find a product on the current page.
    #[must_use]
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.listing
            .as_ref()
            .and_then(|page| page.data.iter().find(|p| p.id == id))
    }

    /// Find a product by ID, walking the unfiltered catalog when it is not on
    /// the current page.
    ///
    /// # Errors
    ///
    /// Returns the product fetch error.
    pub async fn find_product(&mut self, id: ProductId) -> Result<Option<Product>> {
        if let Some(product) = self.product(id) {
            return Ok(Some(product.clone()));
        }

        let filters = SearchFilters::default();
        let mut page = 1;
        loop {
            let listing = match self.api.products(&filters, page).await {
                Ok(listing) => listing,
                Err(e) => return Err(self.surface(e.into())),
            };
            if let Some(product) = listing.data.into_iter().find(|p| p.id == id) {
                return Ok(Some(product));
            }
            if page >= listing.last_page {
                return Ok(None);
            }
            page += 1;
        }
    }

    /// Take all pending notices, oldest first.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.state.drain_notices()
    }

    // =========================================================================
    // Lifecycle and routing
    // =========================================================================

    /// Restore the persisted session, then route to `initial_hash`.
    ///
    /// # Errors
    ///
    /// Returns the first error from the resulting cart or product fetch.
    pub async fn start(&mut self, initial_hash: &str) -> Result<()> {
        let session = self.sessions.restore();
        if let Some(user) = session.user() {
            error::set_sentry_user(&user.id, Some(&user.email));
            info!(user_id = %user.id, "Session restored");
        }
        let restored = self.apply(Action::Restore(session), Fetch::Immediate).await;
        let routed = self.navigate(initial_hash).await;
        restored.and(routed)
    }

    /// Follow a hash change.
    ///
    /// # Errors
    ///
    /// Returns the product fetch error when entering the shop.
    pub async fn navigate(&mut self, hash: &str) -> Result<()> {
        error::add_breadcrumb("navigation", hash, None);
        self.hash = Route::from_hash(hash).hash().to_string();
        self.apply(Action::Navigate(hash.to_string()), Fetch::Immediate)
            .await
    }

    /// On the home page, report whether the intro section is on screen.
    pub fn intro_visible(&mut self, visible: bool) {
        self.commit(Action::IntroVisible(visible));
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Search from the header bar or the shop page.
    ///
    /// Waits out the debounce first. Calls on one storefront never overlap, so
    /// a front end that reads keystrokes concurrently drops a pending search
    /// through [`Storefront::search_handle`].
    ///
    /// # Errors
    ///
    /// Returns the product fetch error.
    pub async fn search(&mut self, query: &str) -> Result<()> {
        self.apply(Action::SetQuery(query.to_string()), Fetch::Debounced)
            .await
    }

    /// Shares the search generation counter. Calling
    /// [`SearchCoordinator::begin`] on it from another task makes a pending
    /// [`Storefront::search`] return without sending or showing anything.
    #[must_use]
    pub fn search_handle(&self) -> SearchCoordinator {
        self.search.clone()
    }

    /// # Errors
    ///
    /// Returns the product fetch error.
    pub async fn set_brand(&mut self, brand: &str) -> Result<()> {
        self.apply(Action::SetBrand(brand.to_string()), Fetch::Immediate)
            .await
    }

    /// # Errors
    ///
    /// Returns the product fetch error.
    pub async fn set_sort(&mut self, sort: SortOrder) -> Result<()> {
        self.apply(Action::SetSort(sort), Fetch::Immediate).await
    }

    /// # Errors
    ///
    /// Returns the product fetch error.
    pub async fn clear_filters(&mut self) -> Result<()> {
        self.apply(Action::ClearFilters, Fetch::Immediate).await
    }

    /// Show another page of the current listing.
    ///
    /// # Errors
    ///
    /// Returns the product fetch error.
    pub async fn load_products(&mut self, page: u32) -> Result<()> {
        self.apply(Action::SetPage(page), Fetch::Immediate).await
    }

    async fn fetch_products(&mut self, mode: Fetch) -> Result<()> {
        let api = self.api.clone();
        let filters = self.state.filters.clone();
        let page = self.state.shop_page;
        let request = || async move { api.products(&filters, page).await };

        let outcome = match mode {
            Fetch::Debounced => self.search.run(request).await,
            Fetch::Immediate => self.search.run_now(request).await,
        };

        match outcome.current() {
            Some(Ok(listing)) => {
                self.listing = Some(listing);
                Ok(())
            }
            Some(Err(e)) => Err(self.surface(e.into())),
            None => Ok(()),
        }
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Sign in.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` without a network call for invalid
    /// input, or the API error.
    #[instrument(skip_all)]
    pub async fn login(&mut self, form: &LoginForm) -> Result<UserProfile> {
        let email = form.validate()?;
        let result = self
            .api
            .login(email.as_str(), form.password.expose_secret())
            .await;
        match result {
            Ok((user, token)) => {
                self.signed_in(&user, token).await;
                self.commit(Action::Notify(Notice::success(format!(
                    "Welcome back, {}!",
                    user.first_name()
                ))));
                Ok(user)
            }
            Err(e) => Err(self.surface(e.into())),
        }
    }

    /// Create an account and sign in.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` without a network call for invalid
    /// input, or the API error.
    #[instrument(skip_all)]
    pub async fn signup(&mut self, form: &SignupForm) -> Result<UserProfile> {
        let email = form.validate()?;
        let result = self
            .api
            .register(
                form.name.trim(),
                email.as_str(),
                form.password.expose_secret(),
                form.password_confirmation.expose_secret(),
            )
            .await;
        match result {
            Ok((user, token)) => {
                self.signed_in(&user, token).await;
                self.commit(Action::Notify(Notice::success(format!(
                    "Welcome to Relux, {}!",
                    user.first_name()
                ))));
                Ok(user)
            }
            Err(e) => Err(self.surface(e.into())),
        }
    }

    async fn signed_in(&mut self, user: &UserProfile, token: AuthToken) {
        error::set_sentry_user(&user.id, Some(&user.email));
        info!(user_id = %user.id, "Signed in");
        // Persistence and cart failures are already surfaced as notices
        let _ = self
            .apply(
                Action::Login {
                    user: user.clone(),
                    token,
                },
                Fetch::Immediate,
            )
            .await;
    }

    /// Sign out, clearing the persisted session and the cart view.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` if the persisted session could not be
    /// removed; the in-memory session is signed out regardless.
    pub async fn logout(&mut self) -> Result<()> {
        error::clear_sentry_user();
        info!("Signed out");
        self.apply(Action::Logout, Fetch::Immediate).await
    }

    // =========================================================================
    // Overlays
    // =========================================================================

    pub fn open_auth(&mut self) {
        self.commit(Action::OpenAuth);
    }

    /// Open the cart drawer, refreshing it when signed in.
    ///
    /// # Errors
    ///
    /// Returns the cart fetch error.
    pub async fn open_cart(&mut self) -> Result<()> {
        self.apply(Action::OpenCart, Fetch::Immediate).await
    }

    /// Proceed from the cart to checkout (or to sign-in when anonymous).
    ///
    /// # Errors
    ///
    /// Returns the cart fetch error.
    pub async fn request_checkout(&mut self) -> Result<()> {
        self.apply(Action::CheckoutRequested, Fetch::Immediate).await
    }

    pub fn close_overlay(&mut self) {
        self.commit(Action::CloseOverlay);
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the product cannot be added.
    pub async fn add_to_cart(&mut self, product: &Product, qty: u32) -> Result<CartSnapshot> {
        error::add_breadcrumb("cart", "Add to cart", Some(&[("product", product.name.as_str())]));
        let product = product.clone();
        self.mutate_cart(ADD_PROMPT, move |cart, token| async move {
            cart.add(Some(&token), &product, qty).await
        })
        .await
    }

    /// Add a product by ID, looking it up in the catalog first.
    ///
    /// Returns the product added, or `None` if no product has that ID.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Unauthenticated` before any lookup when signed
    /// out, or the fetch or cart error.
    pub async fn add_by_id(&mut self, id: ProductId, qty: u32) -> Result<Option<Product>> {
        if !self.state.session.is_authenticated() {
            self.commit(Action::AuthRequired(ADD_PROMPT.to_string()));
            return Err(ClientError::Unauthenticated);
        }
        let Some(product) = self.find_product(id).await? else {
            return Ok(None);
        };
        self.add_to_cart(&product, qty).await?;
        Ok(Some(product))
    }

    /// # Errors
    ///
    /// Quantities below 1 are rejected without a network call.
    pub async fn update_quantity(&mut self, item: CartItemId, qty: i64) -> Result<CartSnapshot> {
        self.mutate_cart("Please login to manage your cart", move |cart, token| async move {
            cart.update_quantity(Some(&token), item, qty).await
        })
        .await
    }

    /// # Errors
    ///
    /// Returns an error if the line cannot be removed.
    pub async fn remove_item(&mut self, item: CartItemId) -> Result<CartSnapshot> {
        self.mutate_cart("Please login to manage your cart", move |cart, token| async move {
            cart.remove(Some(&token), item).await
        })
        .await
    }

    async fn mutate_cart<F, Fut>(&mut self, login_prompt: &str, op: F) -> Result<CartSnapshot>
    where
        F: FnOnce(CartClient, AuthToken) -> Fut,
        Fut: Future<Output = Result<CartSnapshot>>,
    {
        let Some(token) = self.state.session.token().cloned() else {
            self.commit(Action::AuthRequired(login_prompt.to_string()));
            return Err(ClientError::Unauthenticated);
        };

        self.commit(Action::CartLoading);
        match op(self.cart.clone(), token).await {
            Ok(snapshot) => {
                self.commit(Action::CartLoaded(snapshot.clone()));
                Ok(snapshot)
            }
            Err(e) => {
                self.commit(Action::CartFailed(e.user_message()));
                Err(self.surface(e))
            }
        }
    }

    async fn refresh_cart(&mut self) -> Result<()> {
        let Some(token) = self.state.session.token().cloned() else {
            return Ok(());
        };

        self.commit(Action::CartLoading);
        match self.cart.fetch(Some(&token)).await {
            Ok(snapshot) => {
                self.commit(Action::CartLoaded(snapshot));
                Ok(())
            }
            Err(e) => {
                self.commit(Action::CartFailed(e.user_message()));
                Err(self.surface(e))
            }
        }
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Submit the checkout form.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` or `ClientError::EmptyCart` without
    /// posting anything, or the API error.
    pub async fn place_order(&mut self, form: &DeliveryForm) -> Result<Order> {
        let Some(token) = self.state.session.token().cloned() else {
            self.commit(Action::AuthRequired("Please login to checkout".to_string()));
            return Err(ClientError::Unauthenticated);
        };
        error::add_breadcrumb(
            "checkout",
            "Place order",
            Some(&[("payment_method", form.payment_method.label())]),
        );

        let known = self.state.cart.snapshot().cloned();
        match self.cart.checkout(Some(&token), form, known.as_ref()).await {
            Ok(order) => {
                // Cached listings carry the old stock counts
                self.api.invalidate_listings();
                // The cart refresh after an order is best-effort; the order stands
                if let Err(e) = self
                    .apply(Action::OrderPlaced(order.clone()), Fetch::Immediate)
                    .await
                {
                    warn!(error = %e, "Cart refresh after checkout failed");
                }
                Ok(order)
            }
            Err(e) => Err(self.surface(e)),
        }
    }

    /// The signed-in user's orders.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Unauthenticated` without a network call when
    /// signed out, or the API error.
    pub async fn orders(&mut self) -> Result<Vec<Order>> {
        let Some(token) = self.state.session.token().cloned() else {
            self.commit(Action::AuthRequired("Please login to view orders".to_string()));
            return Err(ClientError::Unauthenticated);
        };
        match self.api.orders(&token).await {
            Ok(orders) => Ok(orders),
            Err(e) => Err(self.surface(e.into())),
        }
    }

    /// One order with its lines.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Unauthenticated` without a network call when
    /// signed out, or the API error.
    pub async fn order(&mut self, id: OrderId) -> Result<Order> {
        let Some(token) = self.state.session.token().cloned() else {
            self.commit(Action::AuthRequired("Please login to view orders".to_string()));
            return Err(ClientError::Unauthenticated);
        };
        match self.api.order(&token, id).await {
            Ok(order) => Ok(order),
            Err(e) => Err(self.surface(e.into())),
        }
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Apply a transition that cannot request effects.
    fn commit(&mut self, action: Action) {
        let effects = reduce(&mut self.state, action);
        debug_assert!(effects.is_empty(), "unexpected effects: {effects:?}");
    }

    /// Apply a transition and perform its effects in order.
    ///
    /// Every effect runs even if an earlier one fails; the first error is
    /// returned.
    async fn apply(&mut self, action: Action, mode: Fetch) -> Result<()> {
        let mut first_error = None;
        for effect in reduce(&mut self.state, action) {
            if let Err(e) = self.perform(effect, mode).await {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    async fn perform(&mut self, effect: Effect, mode: Fetch) -> Result<()> {
        match effect {
            Effect::FetchProducts => self.fetch_products(mode).await,
            Effect::RefreshCart => self.refresh_cart().await,
            Effect::PersistSession => self
                .sessions
                .save(&self.state.session)
                .map_err(|e| self.surface(e.into())),
            Effect::ClearPersistedSession => {
                self.sessions.clear().map_err(|e| self.surface(e.into()))
            }
            Effect::SetHash(route) => {
                route.hash().clone_into(&mut self.hash);
                Ok(())
            }
        }
    }

    /// Record `err` for the user and return it.
    fn surface(&mut self, err: ClientError) -> ClientError {
        err.report();
        if err.is_auth() {
            self.commit(Action::AuthRequired(err.user_message()));
        } else {
            match &err {
                ClientError::Validation(_) => {}
                ClientError::EmptyCart
                | ClientError::InvalidQuantity(_)
                | ClientError::SoldOut(_) => {
                    self.commit(Action::Notify(Notice::warning(err.user_message())));
                }
                _ => self.commit(Action::Notify(Notice::error(err.user_message()))),
            }
        }
        err
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, TOKEN_KEY, USER_KEY};
    use relux_core::{NoticeLevel, Overlay, Price, Session};

    // Nothing listens on this port; tests here stay off the network.
    fn storefront(memory: &MemoryStore) -> Storefront {
        let config = StorefrontConfig::new("http://127.0.0.1:9/api", "/tmp/relux-test").unwrap();
        Storefront::new(&config, Arc::new(memory.clone())).unwrap()
    }

    fn watch() -> Product {
        Product {
            id: ProductId::new(4),
            name: "Royal Oak".to_string(),
            brand: Some("Audemars Piguet".to_string()),
            price: Price::from_centavos(250_000_000),
            stock: 2,
            image: None,
            description: None,
        }
    }

    #[tokio::test]
    async fn test_start_with_corrupt_session_is_anonymous() {
        let memory = MemoryStore::new();
        memory.set(USER_KEY, "{oops").unwrap();
        memory.set(TOKEN_KEY, "tok").unwrap();

        let mut app = storefront(&memory);
        app.start("#about").await.unwrap();

        assert_eq!(app.state().session, Session::Anonymous);
        assert_eq!(app.state().route, Route::About);
        assert!(memory.is_empty());
        assert!(app.drain_notices().is_empty());
    }

    #[tokio::test]
    async fn test_anonymous_add_to_cart_prompts_login() {
        let memory = MemoryStore::new();
        let mut app = storefront(&memory);

        let err = app.add_to_cart(&watch(), 1).await.unwrap_err();
        assert!(err.is_auth());
        assert_eq!(app.state().overlay, Overlay::Auth);
        let notices = app.drain_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Warning);
        assert_eq!(notices[0].message, "Please login to add items to cart");
    }

    #[tokio::test]
    async fn test_invalid_login_never_reaches_api() {
        let memory = MemoryStore::new();
        let mut app = storefront(&memory);
        let form = LoginForm {
            email: "not-an-email".to_string(),
            password: String::new().into(),
        };

        let err = app.login(&form).await.unwrap_err();
        let fields = err.field_errors().unwrap();
        assert!(fields.get("email").is_some());
        assert!(fields.get("password").is_some());
        // Field errors are returned, not turned into notices
        assert!(app.drain_notices().is_empty());
    }

    #[tokio::test]
    async fn test_anonymous_orders_open_auth() {
        let memory = MemoryStore::new();
        let mut app = storefront(&memory);
        app.navigate("#orders").await.unwrap();

        assert!(matches!(app.orders().await, Err(ClientError::Unauthenticated)));
        assert_eq!(app.state().overlay, Overlay::Auth);
    }

    #[tokio::test]
    async fn test_hash_follows_programmatic_routing() {
        let memory = MemoryStore::new();
        let mut app = storefront(&memory);
        app.navigate("#contact").await.unwrap();
        assert_eq!(app.hash(), "#contact");

        app.navigate("#nowhere").await.unwrap();
        assert_eq!(app.hash(), "");
        assert_eq!(app.state().route, Route::Home);
    }

    #[tokio::test]
    async fn test_checkout_request_while_anonymous() {
        let memory = MemoryStore::new();
        let mut app = storefront(&memory);
        app.request_checkout().await.unwrap();
        assert_eq!(app.state().overlay, Overlay::Auth);
        assert_eq!(app.drain_notices()[0].message, "Please login to checkout");
    }
}
