//! Plain-text views of the storefront state.
//!
//! Every function here is pure: it takes state and returns the text to print.

use std::fmt::Write as _;

use relux_core::catalog::BrandSection;
use relux_core::{
    AppState, Availability, CartSnapshot, CartState, FieldErrors, Notice, NoticeLevel, Order,
    Overlay, Product, ProductPage, Route, SearchFilters, Session,
};

const RULE: &str = "----------------------------------------";

/// One line with the route, the signed-in user, the cart badge and any open
/// overlay.
#[must_use]
pub fn status_line(state: &AppState) -> String {
    let mut line = format!("[{}]", state.route.title());
    match &state.session {
        Session::Authenticated { user, .. } => {
            let _ = write!(line, " {} | cart: {}", user.first_name(), state.cart.item_count());
        }
        Session::Anonymous => line.push_str(" guest"),
    }
    if state.overlay.is_open() {
        let _ = write!(line, " | overlay: {}", state.overlay.name());
    }
    line
}

#[must_use]
pub fn notices(notices: &[Notice]) -> String {
    notices
        .iter()
        .map(|notice| {
            let tag = match notice.level {
                NoticeLevel::Info => "info",
                NoticeLevel::Success => "ok",
                NoticeLevel::Warning => "warning",
                NoticeLevel::Error => "error",
            };
            format!("[{tag}] {}\n", notice.message)
        })
        .collect()
}

#[must_use]
pub fn field_errors(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("  {field}: {message}\n"))
        .collect()
}

/// Short description of what a route shows.
#[must_use]
pub fn page(route: Route) -> String {
    let body = match route {
        Route::Home => "Timeless luxury. Browse the collection with `shop`.",
        Route::Shop => "The full collection.",
        Route::About => "Relux curates authenticated luxury timepieces from the great houses.",
        Route::Contact => "Write to hello@relux.com. We usually reply within two hours.",
        Route::Orders => "Your order history.",
    };
    format!("{}\n{body}\n", route.title().to_uppercase())
}

#[must_use]
pub fn product_line(product: &Product) -> String {
    let badge = match product.availability() {
        Availability::InStock => String::new(),
        Availability::Limited(n) => format!("  (only {n} left)"),
        Availability::SoldOut => "  (sold out)".to_string(),
    };
    format!(
        "  #{:<5} {:<40} {:>18}{badge}\n",
        product.id, product.name, product.price
    )
}

/// The shop listing: brand sections, active filters and paging.
#[must_use]
pub fn listing(
    sections: &[BrandSection],
    page: Option<&ProductPage>,
    filters: &SearchFilters,
) -> String {
    let mut out = String::new();

    if filters.is_active() {
        let mut parts = Vec::new();
        if !filters.query.trim().is_empty() {
            parts.push(format!("search \"{}\"", filters.query.trim()));
        }
        if !filters.brand.is_empty() {
            parts.push(format!("brand {}", filters.brand));
        }
        if !filters.sort.as_param().is_empty() {
            parts.push(filters.sort.label().to_string());
        }
        let _ = writeln!(out, "Filters: {}", parts.join(", "));
    }

    let Some(page) = page else {
        out.push_str("Loading collection...\n");
        return out;
    };
    if page.data.is_empty() {
        out.push_str("No watches match your search.\n");
        return out;
    }

    for section in sections {
        if !section.brand.is_empty() {
            let _ = writeln!(out, "{}", section.brand.to_uppercase());
        }
        for product in &section.products {
            out.push_str(&product_line(product));
        }
    }

    let _ = write!(out, "Page {} of {}", page.current_page, page.last_page.max(1));
    if page.has_previous() {
        let _ = write!(out, "  [page {} for previous]", page.current_page - 1);
    }
    if page.has_next() {
        let _ = write!(out, "  [page {} for next]", page.current_page + 1);
    }
    out.push('\n');
    out
}

fn cart_lines(cart: &CartSnapshot, out: &mut String) {
    if cart.is_empty() {
        out.push_str("Your cart is empty\n");
        return;
    }
    for item in &cart.items {
        let _ = writeln!(
            out,
            "  item {:<5} {:<36} x{:<3} {:>18}",
            item.id,
            item.display_name(),
            item.qty,
            item.line_total()
        );
    }
    out.push_str(RULE);
    out.push('\n');
    let _ = writeln!(out, "  {} pieces   Total {}", cart.item_count, cart.total);
}

/// The cart drawer.
#[must_use]
pub fn cart(state: &CartState, session: &Session) -> String {
    let mut out = String::from("SHOPPING CART\n");
    if !session.is_authenticated() {
        out.push_str("Please login to view your cart\n");
        return out;
    }
    match state {
        CartState::Idle => out.push_str("Your cart is empty\n"),
        CartState::Loading { last: None } => out.push_str("Loading cart...\n"),
        CartState::Loading { last: Some(cart) } | CartState::Loaded(cart) => {
            cart_lines(cart, &mut out);
        }
        CartState::Error { message, last } => {
            let _ = writeln!(out, "Could not load cart: {message}");
            if let Some(cart) = last {
                cart_lines(cart, &mut out);
            }
        }
    }
    out
}

/// Checkout summary shown above the delivery form.
#[must_use]
pub fn checkout(state: &CartState) -> String {
    let mut out = String::from("CHECKOUT\n");
    match state.snapshot() {
        Some(cart) => cart_lines(cart, &mut out),
        None => out.push_str("Your cart is empty\n"),
    }
    out.push_str(
        "Enter: checkout NAME; PHONE; ADDRESS; CITY; POSTAL CODE[; NOTES[; cod|card|gcash|paymaya]]\n",
    );
    out
}

#[must_use]
pub fn order_success(order: &Order) -> String {
    let mut out = String::from("ORDER CONFIRMED\n");
    let _ = writeln!(out, "Order #{}", order.id);
    let _ = writeln!(out, "Total {}", order.total);
    let _ = writeln!(out, "Payment {}", order.payment_method.label());
    if let Some(name) = &order.delivery_name {
        let _ = writeln!(out, "Deliver to {name}");
    }
    out.push_str("Thank you for shopping with Relux.\n");
    out
}

#[must_use]
pub fn orders(orders: &[Order]) -> String {
    if orders.is_empty() {
        return "No orders yet. Start shopping with `shop`.\n".to_string();
    }
    orders
        .iter()
        .map(|order| {
            let date = order
                .created_at
                .map(|at| at.format("%b %e, %Y").to_string())
                .unwrap_or_default();
            format!(
                "  #{:<6} {:<12} {:>3} pcs {:>18}  {date}\n",
                order.id,
                order.status.label(),
                order.pieces(),
                order.total
            )
        })
        .collect()
}

/// One order with its progress and lines.
#[must_use]
pub fn order_detail(order: &Order) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Order #{}  {}", order.id, order.status.label());

    let filled = usize::from(order.status.progress() / 10);
    let _ = writeln!(
        out,
        "[{}{}] {}%",
        "#".repeat(filled),
        ".".repeat(10 - filled),
        order.status.progress()
    );

    for item in &order.items {
        let _ = writeln!(
            out,
            "  {:<36} {:<18} x{:<3} {:>18}",
            item.display_name(),
            item.brand(),
            item.qty,
            item.unit_price
        );
    }
    out.push_str(RULE);
    out.push('\n');
    let _ = writeln!(out, "  Total {}", order.total);
    let _ = writeln!(out, "  Payment {}", order.payment_method.label());
    let address: Vec<&str> = [&order.delivery_name, &order.delivery_address, &order.delivery_city]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .collect();
    if !address.is_empty() {
        let _ = writeln!(out, "  Deliver to {}", address.join(", "));
    }
    out
}

/// Whatever the active overlay shows, if anything.
#[must_use]
pub fn overlay(state: &AppState) -> Option<String> {
    match &state.overlay {
        Overlay::None => None,
        Overlay::Auth => Some(
            "SIGN IN\nEnter: login EMAIL PASSWORD\n   or: signup NAME; EMAIL; PASSWORD; CONFIRM; agree\n"
                .to_string(),
        ),
        Overlay::Cart => Some(cart(&state.cart, &state.session)),
        Overlay::Checkout => Some(checkout(&state.cart)),
        Overlay::OrderSuccess(order) => Some(order_success(order)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use relux_core::{
        AuthToken, CartItem, CartItemId, OrderId, OrderStatus, PaymentMethod, Price, ProductId,
        UserId, UserProfile,
    };

    fn product(stock: i64) -> Product {
        Product {
            id: ProductId::new(12),
            name: "Speedmaster".to_string(),
            brand: Some("Omega".to_string()),
            price: Price::from_centavos(42_000_000),
            stock,
            image: None,
            description: None,
        }
    }

    fn signed_in() -> Session {
        Session::authenticated(
            UserProfile {
                id: UserId::new(1),
                name: "Maria Clara".to_string(),
                email: "mc@relux.ph".to_string(),
            },
            AuthToken::new("tok"),
        )
    }

    #[test]
    fn test_product_line_shows_stock_badge() {
        assert!(product_line(&product(2)).contains("(only 2 left)"));
        assert!(product_line(&product(0)).contains("(sold out)"));
        assert!(!product_line(&product(9)).contains('('));
        assert!(product_line(&product(9)).contains("₱420,000.00"));
    }

    #[test]
    fn test_cart_shows_server_total() {
        let snapshot = CartSnapshot {
            items: vec![CartItem {
                id: CartItemId::new(3),
                product: None,
                name: Some("Speedmaster".to_string()),
                qty: 2,
                unit_price: Price::from_centavos(42_000_000),
            }],
            // Server applied a discount
            total: Price::from_centavos(80_000_000),
            item_count: 2,
        };
        let text = cart(&CartState::Loaded(snapshot), &signed_in());
        assert!(text.contains("₱840,000.00"));
        assert!(text.contains("Total ₱800,000.00"));
    }

    #[test]
    fn test_cart_for_guest() {
        let text = cart(&CartState::Idle, &Session::Anonymous);
        assert!(text.contains("Please login to view your cart"));
    }

    #[test]
    fn test_cart_error_keeps_last_snapshot() {
        let state = CartState::Error {
            message: "Network error".to_string(),
            last: Some(CartSnapshot::default()),
        };
        let text = cart(&state, &signed_in());
        assert!(text.contains("Could not load cart: Network error"));
        assert!(text.contains("Your cart is empty"));
    }

    #[test]
    fn test_order_detail_progress() {
        let order = Order {
            id: OrderId::new(77),
            status: OrderStatus::Shipped,
            total: Price::from_centavos(100),
            payment_method: PaymentMethod::Gcash,
            delivery_name: Some("Maria".to_string()),
            delivery_address: None,
            delivery_city: Some("Makati".to_string()),
            item_count: None,
            items: Vec::new(),
            created_at: None,
        };
        let text = order_detail(&order);
        assert!(text.contains("[#######...] 75%"));
        assert!(text.contains("Deliver to Maria, Makati"));
        assert!(text.contains("GCash"));
    }

    #[test]
    fn test_status_line() {
        let mut state = AppState::default();
        assert_eq!(status_line(&state), "[Home] guest");
        state.session = signed_in();
        state.overlay = Overlay::Cart;
        assert_eq!(status_line(&state), "[Home] Maria | cart: 0 | overlay: cart");
    }

    #[test]
    fn test_notices() {
        let text = notices(&[Notice::warning("Please login to checkout")]);
        assert_eq!(text, "[warning] Please login to checkout\n");
    }
}
