//! Command implementations.
//!
//! Each command opens the storefront (restoring any saved session), performs
//! one interaction and prints what the storefront then shows.

pub mod account;
pub mod cart;
pub mod orders;
pub mod shell;
pub mod shop;

use relux_storefront::{ClientError, Storefront, StorefrontConfig};
use thiserror::Error;

use crate::render;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A storefront operation failed.
    #[error("{}", .0.user_message())]
    Client(#[from] ClientError),

    /// Reading commands from the terminal failed.
    #[error("Input error: {0}")]
    Io(#[from] std::io::Error),
}

/// Print rendered output.
#[allow(clippy::print_stdout)]
pub fn emit(text: &str) {
    if !text.is_empty() {
        print!("{text}");
        if !text.ends_with('\n') {
            println!();
        }
    }
}

/// Open the storefront at `hash` with the saved session restored.
///
/// Failures while restoring (an unreachable API, an expired token) are left
/// as notices for the command to print.
pub async fn open_storefront(
    config: &StorefrontConfig,
    hash: &str,
) -> Result<Storefront, CommandError> {
    let mut app = Storefront::from_config(config)?;
    if let Err(e) = app.start(hash).await {
        tracing::debug!(error = %e, "Startup fetch failed");
    }
    Ok(app)
}

/// Print and clear pending notices.
pub fn flush_notices(app: &mut Storefront) {
    emit(&render::notices(&app.drain_notices()));
}

/// Print field errors for a rejected form, then pass the error on.
pub fn fail(app: &mut Storefront, err: ClientError) -> CommandError {
    if let Some(errors) = err.field_errors() {
        emit(&render::field_errors(errors));
    }
    flush_notices(app);
    CommandError::Client(err)
}
