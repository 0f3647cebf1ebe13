//! Account commands.
//!
//! # Usage
//!
//! ```bash
//! relux login -e mc@relux.ph -p secret
//! relux signup -n "Maria Clara" -e mc@relux.ph -p secret -c secret --agree-terms
//! relux whoami
//! relux logout
//! ```

use relux_core::{LoginForm, SignupForm};
use relux_storefront::StorefrontConfig;
use secrecy::SecretString;

use super::{CommandError, emit, fail, flush_notices, open_storefront};
use crate::render;

/// Sign in and save the session.
pub async fn login(
    config: &StorefrontConfig,
    email: String,
    password: String,
) -> Result<(), CommandError> {
    let mut app = open_storefront(config, "").await?;
    let form = LoginForm {
        email,
        password: SecretString::from(password),
    };

    match app.login(&form).await {
        Ok(_) => {
            flush_notices(&mut app);
            emit(&render::status_line(app.state()));
            Ok(())
        }
        Err(e) => Err(fail(&mut app, e)),
    }
}

/// Create an account, sign in and save the session.
pub async fn signup(
    config: &StorefrontConfig,
    name: String,
    email: String,
    password: String,
    confirmation: String,
    agree_to_terms: bool,
) -> Result<(), CommandError> {
    let mut app = open_storefront(config, "").await?;
    let form = SignupForm {
        name,
        email,
        password: SecretString::from(password),
        password_confirmation: SecretString::from(confirmation),
        agree_to_terms,
    };

    match app.signup(&form).await {
        Ok(_) => {
            flush_notices(&mut app);
            emit(&render::status_line(app.state()));
            Ok(())
        }
        Err(e) => Err(fail(&mut app, e)),
    }
}

/// Sign out and forget the saved session.
pub async fn logout(config: &StorefrontConfig) -> Result<(), CommandError> {
    let mut app = open_storefront(config, "").await?;
    let was_signed_in = app.state().session.is_authenticated();

    if let Err(e) = app.logout().await {
        return Err(fail(&mut app, e));
    }
    emit(if was_signed_in {
        "Signed out.\n"
    } else {
        "Not signed in.\n"
    });
    Ok(())
}

/// Show the signed-in user.
pub async fn whoami(config: &StorefrontConfig) -> Result<(), CommandError> {
    let mut app = open_storefront(config, "").await?;
    match app.user() {
        Some(user) => emit(&format!("{} <{}>\n", user.name, user.email)),
        None => emit("Not signed in.\n"),
    }
    flush_notices(&mut app);
    Ok(())
}
