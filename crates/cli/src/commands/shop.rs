//! Catalog commands.

use relux_core::{Route, SearchFilters, SortOrder};
use relux_storefront::StorefrontConfig;

use super::{CommandError, emit, fail, flush_notices, open_storefront};
use crate::render;

/// List the collection with optional filters.
pub async fn browse(
    config: &StorefrontConfig,
    filters: SearchFilters,
    page: u32,
) -> Result<(), CommandError> {
    let mut app = open_storefront(config, Route::Shop.hash()).await?;

    let mut result = Ok(());
    if !filters.brand.is_empty() {
        result = result.and(app.set_brand(&filters.brand).await);
    }
    if filters.sort != SortOrder::Featured {
        result = result.and(app.set_sort(filters.sort).await);
    }
    if !filters.query.trim().is_empty() {
        result = result.and(app.search(&filters.query).await);
    }
    if page > 1 {
        result = result.and(app.load_products(page).await);
    }
    if let Err(e) = result {
        return Err(fail(&mut app, e));
    }

    emit(&render::listing(
        &app.sections(),
        app.listing(),
        &app.state().filters,
    ));
    flush_notices(&mut app);
    Ok(())
}

/// Resolve a hash fragment and show that page.
pub async fn open(config: &StorefrontConfig, hash: &str) -> Result<(), CommandError> {
    let mut app = open_storefront(config, hash).await?;
    let route = app.state().route;

    emit(&format!("{} -> {}\n", hash, route.title()));
    emit(&render::page(route));
    if route == Route::Shop {
        emit(&render::listing(
            &app.sections(),
            app.listing(),
            &app.state().filters,
        ));
    }
    flush_notices(&mut app);
    Ok(())
}
