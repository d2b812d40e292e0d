//! Mortality Dashboard - Colombian 2019 non-fetal mortality records
//!
//! Loads the death records with their division and cause catalogs, aggregates
//! them under the dashboard filters and serves the charts over HTTP.

pub mod charts;
pub mod config;
pub mod data;
pub mod export;
pub mod server;
pub mod stats;
