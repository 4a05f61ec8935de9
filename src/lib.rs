//! Water-quality risk assessment and spatial aggregation engine.
//!
//! The engine acquires total-phosphorus/total-nitrogen measurements through
//! a three-tier source chain (remote open API, canonical CSV cache, legacy
//! municipal exports), collapses each reading into a weighted risk index,
//! rolls stations up into administrative-region statistics by spatial join
//! or bounding-rectangle fallback, and fits a day-over-day trend. Output is
//! plain data for a downstream rendering consumer; nothing here draws maps.

pub mod config;
pub mod coords;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod regions;
pub mod scoring;
pub mod trend;
