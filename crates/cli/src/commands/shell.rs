//! Interactive session.
//!
//! Reads one command per line from stdin and keeps a single storefront alive
//! between them, so searches, overlays and the cart behave as they would in a
//! browser tab. After each command the status line, the open overlay and
//! any notices are printed.
//!
//! # Usage
//!
//! ```text
//! goto #shop
//! search daytona
//! brand Rolex
//! add 42 2
//! checkout
//! checkout Maria Clara; 0917; 1 Ayala Ave; Makati; 1226; ; gcash
//! quit
//! ```

use relux_core::{
    CartItemId, DeliveryForm, LoginForm, OrderId, PaymentMethod, ProductId, Route, SignupForm,
    SortOrder,
};
use relux_storefront::{ClientError, Storefront, StorefrontConfig};
use secrecy::SecretString;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use super::{CommandError, emit, flush_notices, open_storefront};
use crate::render;

const HELP: &str = "\
Commands:
  goto HASH                 open a page (#shop, #about, #contact, #orders)
  search TEXT               search the collection
  brand [NAME]              filter by brand (no name clears it)
  sort ORDER                featured, price_asc, price_desc, newest
  clear                     clear search and filters
  page N                    show page N of the listing
  cart                      open the cart
  add PRODUCT [QTY]         add a product
  set ITEM QTY              change a cart line
  rm ITEM                   remove a cart line
  checkout                  proceed to checkout
  checkout NAME; PHONE; ADDRESS; CITY; POSTAL CODE[; NOTES[; PAYMENT]]
  close                     close the open overlay
  login EMAIL PASSWORD      sign in
  signup NAME; EMAIL; PASSWORD; CONFIRM; agree
  logout                    sign out
  orders [ID]               order history
  help                      this text
  quit                      leave
";

/// One parsed line of input.
#[derive(Debug)]
pub enum ShellCommand {
    Help,
    Goto(String),
    Search(String),
    Brand(String),
    Sort(SortOrder),
    Clear,
    Page(u32),
    Cart,
    Add { product: ProductId, qty: u32 },
    Set { item: CartItemId, qty: i64 },
    Remove(CartItemId),
    Checkout(Option<DeliveryForm>),
    Close,
    Login(LoginForm),
    Signup(SignupForm),
    Logout,
    Orders(Option<OrderId>),
    Quit,
}

fn parse_arg<T: std::str::FromStr>(value: Option<&str>, usage: &str) -> Result<T, String> {
    value
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| format!("usage: {usage}"))
}

fn split_fields(rest: &str) -> Vec<&str> {
    rest.split(';').map(str::trim).collect()
}

fn parse_delivery(rest: &str) -> Result<DeliveryForm, String> {
    let fields = split_fields(rest);
    let field = |i: usize| fields.get(i).copied().unwrap_or_default().to_string();

    let payment_method = match fields.get(6).copied() {
        None | Some("") => PaymentMethod::default(),
        Some(method) => method.parse()?,
    };
    Ok(DeliveryForm {
        delivery_name: field(0),
        delivery_phone: field(1),
        delivery_address: field(2),
        delivery_city: field(3),
        delivery_postal_code: field(4),
        delivery_notes: field(5),
        payment_method,
    })
}

fn parse_signup(rest: &str) -> SignupForm {
    let fields = split_fields(rest);
    let field = |i: usize| fields.get(i).copied().unwrap_or_default().to_string();
    SignupForm {
        name: field(0),
        email: field(1),
        password: SecretString::from(field(2)),
        password_confirmation: SecretString::from(field(3)),
        agree_to_terms: fields
            .get(4)
            .is_some_and(|v| v.eq_ignore_ascii_case("agree")),
    }
}

/// Parse one line. Blank lines parse to `None`; errors carry a usage hint.
///
/// # Errors
///
/// Returns a message for unknown commands and malformed arguments.
pub fn parse_command(line: &str) -> Result<Option<ShellCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let mut args = rest.split_whitespace();

    let command = match word.to_ascii_lowercase().as_str() {
        "help" | "?" => ShellCommand::Help,
        "goto" | "open" => ShellCommand::Goto(rest.to_string()),
        "home" => ShellCommand::Goto(String::new()),
        "search" => ShellCommand::Search(rest.to_string()),
        "brand" => ShellCommand::Brand(rest.to_string()),
        "sort" => ShellCommand::Sort(rest.parse()?),
        "clear" => ShellCommand::Clear,
        "page" => ShellCommand::Page(parse_arg(args.next(), "page N")?),
        "cart" => ShellCommand::Cart,
        "add" => {
            let product = parse_arg(args.next(), "add PRODUCT [QTY]")?;
            let qty = match args.next() {
                Some(qty) => parse_arg(Some(qty), "add PRODUCT [QTY]")?,
                None => 1,
            };
            ShellCommand::Add { product, qty }
        }
        "set" => ShellCommand::Set {
            item: parse_arg(args.next(), "set ITEM QTY")?,
            qty: parse_arg(args.next(), "set ITEM QTY")?,
        },
        "rm" | "remove" => ShellCommand::Remove(parse_arg(args.next(), "rm ITEM")?),
        "checkout" if rest.is_empty() => ShellCommand::Checkout(None),
        "checkout" => ShellCommand::Checkout(Some(parse_delivery(rest)?)),
        "close" => ShellCommand::Close,
        "login" => ShellCommand::Login(LoginForm {
            email: args.next().unwrap_or_default().to_string(),
            password: SecretString::from(args.next().unwrap_or_default().to_string()),
        }),
        "signup" => ShellCommand::Signup(parse_signup(rest)),
        "logout" => ShellCommand::Logout,
        "orders" => match args.next() {
            Some(id) => ShellCommand::Orders(Some(parse_arg(Some(id), "orders [ID]")?)),
            None => ShellCommand::Orders(None),
        },
        "quit" | "exit" => ShellCommand::Quit,
        other => return Err(format!("unknown command: {other} (try `help`)")),
    };
    Ok(Some(command))
}

fn listing(app: &Storefront) -> String {
    render::listing(&app.sections(), app.listing(), &app.state().filters)
}

/// Run one command; returns extra text to print besides the usual views.
async fn execute(app: &mut Storefront, command: ShellCommand) -> Result<String, ClientError> {
    match command {
        ShellCommand::Help => Ok(HELP.to_string()),
        ShellCommand::Goto(hash) => {
            app.navigate(&hash).await?;
            let route = app.state().route;
            let mut out = render::page(route);
            if route == Route::Shop {
                out.push_str(&listing(app));
            }
            Ok(out)
        }
        ShellCommand::Search(query) => {
            app.search(&query).await?;
            Ok(listing(app))
        }
        ShellCommand::Brand(brand) => {
            app.set_brand(&brand).await?;
            Ok(listing(app))
        }
        ShellCommand::Sort(sort) => {
            app.set_sort(sort).await?;
            Ok(listing(app))
        }
        ShellCommand::Clear => {
            app.clear_filters().await?;
            Ok(listing(app))
        }
        ShellCommand::Page(page) => {
            app.load_products(page).await?;
            Ok(listing(app))
        }
        ShellCommand::Cart => app.open_cart().await.map(|()| String::new()),
        ShellCommand::Add { product, qty } => Ok(match app.add_by_id(product, qty).await? {
            Some(found) => format!("Added {} x{qty}\n", found.name),
            None => format!("No product #{product}\n"),
        }),
        ShellCommand::Set { item, qty } => app.update_quantity(item, qty).await.map(|_| String::new()),
        ShellCommand::Remove(item) => app.remove_item(item).await.map(|_| String::new()),
        ShellCommand::Checkout(None) => app.request_checkout().await.map(|()| String::new()),
        ShellCommand::Checkout(Some(form)) => app.place_order(&form).await.map(|_| String::new()),
        ShellCommand::Close => {
            app.close_overlay();
            Ok(String::new())
        }
        ShellCommand::Login(form) => app.login(&form).await.map(|_| String::new()),
        ShellCommand::Signup(form) => app.signup(&form).await.map(|_| String::new()),
        ShellCommand::Logout => app.logout().await.map(|()| String::new()),
        ShellCommand::Orders(None) => app.orders().await.map(|orders| render::orders(&orders)),
        ShellCommand::Orders(Some(id)) => app.order(id).await.map(|order| render::order_detail(&order)),
        ShellCommand::Quit => Ok(String::new()),
    }
}

fn show(app: &mut Storefront) {
    if let Some(overlay) = render::overlay(app.state()) {
        emit(&overlay);
    }
    flush_notices(app);
    emit(&render::status_line(app.state()));
}

/// Run the interactive session until `quit` or end of input.
pub async fn run(config: &StorefrontConfig) -> Result<(), CommandError> {
    let mut app = open_storefront(config, "").await?;
    emit(&render::page(app.state().route));
    show(&mut app);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(Some(ShellCommand::Quit)) => break,
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(usage) => {
                emit(&usage);
                continue;
            }
        };

        match execute(&mut app, command).await {
            Ok(output) => emit(&output),
            Err(e) => {
                debug!(error = %e, "Command failed");
                if let Some(errors) = e.field_errors() {
                    emit(&render::field_errors(errors));
                }
            }
        }
        show(&mut app);
    }
    Ok(())
}
