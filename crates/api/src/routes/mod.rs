//! API route definitions.

use axum::{Router, middleware};

use crate::{
    AppState,
    middleware::auth::{auth_middleware, optional_auth_middleware, staff_middleware},
};

pub mod auth;
pub mod balances;
pub mod catalog;
pub mod dashboard;
pub mod health;
pub mod movements;
pub mod payments;
pub mod reports;
pub mod requests;
pub mod sales;

/// Creates the API router with public and staff-protected routes.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Back-office routes: valid token + staff flag required
    let staff_routes = Router::new()
        .merge(requests::staff_routes())
        .merge(sales::routes())
        .merge(movements::routes())
        .merge(balances::routes())
        .merge(catalog::routes())
        .merge(reports::routes())
        .merge(dashboard::routes())
        .layer(middleware::from_fn(staff_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Intake and checkout bind to the caller's account when a valid
    // token is presented, but never require one
    let public_routes = Router::new()
        .merge(requests::public_routes())
        .merge(payments::routes())
        .layer(middleware::from_fn_with_state(
            state,
            optional_auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(public_routes)
        .merge(staff_routes)
}
