//! Remote resource gateways.
//!
//! One module per resource. Each function is a pure mapping from typed
//! parameters to an [`ApiClient`](crate::transport::ApiClient) call plus
//! the expected response shape. No caching and no retry logic lives here;
//! this is the narrowest seam between the cache layer and the network.

pub mod admin;
pub mod auth;
pub mod books;
pub mod loans;
pub mod reviews;
pub mod user;

pub use admin::{AdminOverview, OverdueLoans, OverviewBook};
pub use auth::AuthData;
