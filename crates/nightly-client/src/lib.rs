//! HTTP client for the nightly build API.
//!
//! This crate provides [`NightlyClient`], the production implementation of
//! the checker's [`BuildSource`] trait. It reads the index page that lists
//! `slot/id/` entries and the per-build JSON summary documents.

mod client;

pub use client::{ClientOptions, NightlyClient, DEFAULT_TIMEOUT};
