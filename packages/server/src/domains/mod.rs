// Business domains served over HTTP
pub mod auth;
