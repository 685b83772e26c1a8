// Being Happy - API Core
//
// HTTP surface over the directory crate: location hierarchy management,
// post listings and image uploads, with bearer-token authentication.

pub mod config;
pub mod domains;
pub mod server;

pub use config::*;
