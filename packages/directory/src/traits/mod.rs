//! Core trait abstractions for the directory library.
//!
//! Applications implement these to plug in a document store.

pub mod store;
