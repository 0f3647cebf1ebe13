//! Application state container.
//!
//! Every change to routing, filters, session, overlay and cart state goes
//! through [`reduce`]. The reducer is pure: it mutates the state and returns
//! the [`Effect`]s the shell has to perform (network calls, persistence,
//! URL updates). Nothing here blocks or touches I/O.

use crate::cart::CartState;
use crate::filters::{SearchFilters, SortOrder};
use crate::overlay::Overlay;
use crate::route::Route;
use crate::session::Session;
use crate::types::{AuthToken, CartSnapshot, Order, UserProfile};

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A blocking message for the user (an alert dialog in a browser).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Everything the front end renders from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub route: Route,
    pub filters: SearchFilters,
    /// Current shop listing page (1-based).
    pub shop_page: u32,
    pub session: Session,
    pub overlay: Overlay,
    /// Whether the persistent header and sidebar are shown.
    pub chrome_visible: bool,
    pub cart: CartState,
    /// Pending notices, oldest first.
    pub notices: Vec<Notice>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            route: Route::Home,
            filters: SearchFilters::default(),
            shop_page: 1,
            session: Session::Anonymous,
            overlay: Overlay::None,
            chrome_visible: false,
            cart: CartState::Idle,
            notices: Vec::new(),
        }
    }
}

impl AppState {
    /// Take all pending notices.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

/// A state transition request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The URL hash changed (or was read at startup).
    Navigate(String),
    /// On the home page, the intro section entered or left the viewport.
    IntroVisible(bool),
    SetQuery(String),
    SetBrand(String),
    SetSort(SortOrder),
    ClearFilters,
    SetPage(u32),
    /// Session read back from durable storage at startup.
    Restore(Session),
    Login {
        user: UserProfile,
        token: AuthToken,
    },
    Logout,
    OpenAuth,
    OpenCart,
    CloseOverlay,
    CheckoutRequested,
    OrderPlaced(Order),
    /// The API rejected the token or no token was available.
    AuthRequired(String),
    CartLoading,
    CartLoaded(CartSnapshot),
    CartFailed(String),
    Notify(Notice),
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Re-query the shop listing with the current filters and page.
    FetchProducts,
    /// Re-fetch the cart from the server.
    RefreshCart,
    /// Write profile and token to durable storage.
    PersistSession,
    /// Remove profile and token from durable storage.
    ClearPersistedSession,
    /// Reflect a programmatic route change in the URL hash.
    SetHash(Route),
}

/// Apply `action` to `state`, returning the effects to perform in order.
pub fn reduce(state: &mut AppState, action: Action) -> Vec<Effect> {
    let mut effects = Vec::new();

    match action {
        Action::Navigate(hash) => enter(state, Route::from_hash(&hash), &mut effects),
        Action::IntroVisible(visible) => {
            if state.route == Route::Home {
                state.chrome_visible = !visible;
            }
        }
        Action::SetQuery(query) => {
            let routes = !query.trim().is_empty();
            state.filters.query = query;
            filters_changed(state, routes, &mut effects);
        }
        Action::SetBrand(brand) => {
            state.filters.brand = brand;
            filters_changed(state, true, &mut effects);
        }
        Action::SetSort(sort) => {
            state.filters.sort = sort;
            filters_changed(state, true, &mut effects);
        }
        Action::ClearFilters => {
            state.filters = SearchFilters::default();
            state.shop_page = 1;
            if state.route == Route::Shop {
                effects.push(Effect::FetchProducts);
            }
        }
        Action::SetPage(page) => {
            state.shop_page = page.max(1);
            if state.route == Route::Shop {
                effects.push(Effect::FetchProducts);
            }
        }
        Action::Restore(session) => {
            state.session = session;
            if state.session.is_authenticated() {
                effects.push(Effect::RefreshCart);
            }
        }
        Action::Login { user, token } => {
            state.session = Session::authenticated(user, token);
            if state.session.is_authenticated() {
                if state.overlay == Overlay::Auth {
                    state.overlay = Overlay::None;
                }
                effects.push(Effect::PersistSession);
                effects.push(Effect::RefreshCart);
            }
        }
        Action::Logout => {
            state.session = Session::Anonymous;
            state.cart.reset();
            if matches!(state.overlay, Overlay::Cart) || state.overlay.requires_session() {
                state.overlay = Overlay::None;
            }
            effects.push(Effect::ClearPersistedSession);
        }
        Action::OpenAuth => state.overlay = Overlay::Auth,
        Action::OpenCart => {
            state.overlay = Overlay::Cart;
            if state.session.is_authenticated() {
                effects.push(Effect::RefreshCart);
            }
        }
        Action::CloseOverlay => state.overlay = Overlay::None,
        Action::CheckoutRequested => {
            if state.session.is_authenticated() {
                state.overlay = Overlay::Checkout;
                effects.push(Effect::RefreshCart);
            } else {
                state.overlay = Overlay::Auth;
                state.notices.push(Notice::warning("Please login to checkout"));
            }
        }
        Action::OrderPlaced(order) => {
            state.overlay = Overlay::OrderSuccess(Box::new(order));
            effects.push(Effect::RefreshCart);
        }
        Action::AuthRequired(message) => {
            state.overlay = Overlay::Auth;
            state.notices.push(Notice::warning(message));
        }
        Action::CartLoading => state.cart.begin(),
        Action::CartLoaded(snapshot) => state.cart.succeed(snapshot),
        Action::CartFailed(message) => state.cart.fail(message),
        Action::Notify(notice) => state.notices.push(notice),
    }

    effects
}

fn enter(state: &mut AppState, route: Route, effects: &mut Vec<Effect>) {
    state.route = route;
    if route == Route::Home {
        state.filters = SearchFilters::default();
        state.shop_page = 1;
    } else {
        state.chrome_visible = true;
    }
    if route == Route::Shop {
        effects.push(Effect::FetchProducts);
    }
}

fn filters_changed(state: &mut AppState, routes_to_shop: bool, effects: &mut Vec<Effect>) {
    state.shop_page = 1;
    if state.route == Route::Shop {
        effects.push(Effect::FetchProducts);
    } else if routes_to_shop {
        effects.push(Effect::SetHash(Route::Shop));
        enter(state, Route::Shop, effects);
    }
}
