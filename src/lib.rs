//! animedash: session and fallback data-access gateway for the anime admin
//! dashboard.
//!
//! ARCHITECTURE
//! ============
//! - `session`: the single authentication state, its token store, and the
//!   signed marker cookie derived from it.
//! - `api`: typed REST backend client with mock fallback.
//! - `content`: public anime feed adapter with a built-in catalog.
//! - `dashboard`: synthetic analytics plus content views.
//! - `services::console`: session-gated user and watchlist operations.
//! - `guard` + `routes`: the Axum surface.

pub mod api;
pub mod config;
pub mod content;
pub mod dashboard;
pub mod fetched;
pub mod guard;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;
