//! REST backend access: transport, typed client, and mock fallback data.
//!
//! ARCHITECTURE
//! ============
//! `transport` owns HTTP details, `client` owns endpoint typing and the
//! fallback policy, `mock` owns the substitute dataset. Only `client` is
//! used by the session and console layers.

pub mod client;
pub mod mock;
pub mod transport;
pub mod types;

pub use client::ResilientClient;
pub use mock::MockStore;
pub use transport::{ApiRequest, HttpTransport, Transport};
pub use types::ApiError;
