//! Hash-fragment routing.
//!
//! The URL hash is the whole routing surface: a fixed table maps exact
//! fragments to pages and everything else lands on the home page. There is
//! no history stack and no nesting, so the route is a pure function of the
//! current hash.

use serde::{Deserialize, Serialize};

/// A top-level page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    #[default]
    Home,
    Shop,
    About,
    Contact,
    Orders,
}

impl Route {
    /// Every route, in navigation order.
    pub const ALL: [Self; 5] = [
        Self::Home,
        Self::Shop,
        Self::About,
        Self::Contact,
        Self::Orders,
    ];

    /// Resolve a hash fragment. Matching is exact; unknown or empty
    /// fragments resolve to [`Route::Home`].
    #[must_use]
    pub fn from_hash(hash: &str) -> Self {
        match hash {
            "#shop" => Self::Shop,
            "#about" => Self::About,
            "#contact" => Self::Contact,
            "#orders" => Self::Orders,
            _ => Self::Home,
        }
    }

    /// Canonical fragment for this route (`""` for home).
    #[must_use]
    pub const fn hash(self) -> &'static str {
        match self {
            Self::Home => "",
            Self::Shop => "#shop",
            Self::About => "#about",
            Self::Contact => "#contact",
            Self::Orders => "#orders",
        }
    }

    /// Whether the persistent header and sidebar are always shown.
    ///
    /// On the home page chrome visibility follows the intro section instead.
    #[must_use]
    pub const fn shows_chrome(self) -> bool {
        !matches!(self, Self::Home)
    }

    /// Page title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Shop => "Shop",
            Self::About => "About",
            Self::Contact => "Contact",
            Self::Orders => "My Orders",
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}
