//! `shoplog` - product-usage registration core
//!
//! Users log which product was used, where, and for what purpose. The crate
//! is the synchronization-and-fallback layer under that flow: six entity
//! collections (users, products, locations, purposes, categories,
//! registrations) backed by a remote store when one is configured and
//! reachable, and by a local persistence mirror otherwise. Remote writes
//! degrade to optimistic local success; fetches never come up empty on
//! first load.

// Deny the most critical lints that could lead to bugs
#![deny(
    unsafe_code,
    unsafe_op_in_unsafe_fn,
    unreachable_code,
    unreachable_patterns,
    unused_must_use,
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::dbg_macro,
    future_incompatible,
    rust_2018_idioms,
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,  // Will add gradually
)]

/// Session state and startup control flow
pub mod app;
/// Email+password authentication against the remote identity service
pub mod auth;
/// Environment and settings-file configuration
pub mod config;
/// Entity types, kinds, and row mappings
pub mod entities;
/// Unified error types and result handling
pub mod errors;
/// Registration form controller
pub mod form;
/// Local persistence mirror
pub mod local;
/// Remote store boundary (REST client and stub)
pub mod remote;
/// Entity store adapter
pub mod store;
/// Mode probe, edit guard, and push-update plumbing
pub mod sync;

#[cfg(test)]
pub mod test_utils;
