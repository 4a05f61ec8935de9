//! Data acquisition: three tiers, freshest first.
//!
//! `collector` drives the fallback chain; `api` is the remote open-API
//! client, `cache` the canonical CSV pair it refreshes, `legacy` the
//! municipal CSV exports of last resort.

pub mod api;
pub mod cache;
pub mod collector;
pub mod legacy;

pub use collector::{CollectOutcome, Collector};
