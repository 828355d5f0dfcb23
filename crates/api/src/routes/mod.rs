pub mod auth;
pub mod email;
pub mod health;
pub mod knowledge_share;
pub mod signoffs;
pub mod tallies;
pub mod users;
pub mod vds;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                        create account (public)
/// /auth/login                         issue token (public)
///
/// /users/me                           current user
///
/// /vds                                list VDS reference data
///
/// /signoffs                           list (?search=), create
/// /signoffs/{id}                      get (with tallies), update
///
/// /test-cases                         add one test-case row (POST)
/// /defects                            add one defect row (POST)
///
/// /knowledge-share                    list, create (multipart)
/// /knowledge-share/{id}/download      download attached document
///
/// /email/status                       active transport, re-verified (GET)
/// /email/test                         send a test message to the caller (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/vds", vds::router())
        .nest("/signoffs", signoffs::router())
        .merge(tallies::router())
        .nest("/knowledge-share", knowledge_share::router())
        .nest("/email", email::router())
}
