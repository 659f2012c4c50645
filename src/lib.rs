//! ipgeo - IP geolocation lookup service
//!
//! Loads GeoLite2-style CSV datasets (zip archives of network blocks and
//! locations), answers address-to-location queries against an immutable
//! in-memory snapshot, and refreshes the snapshot in the background.
//!
//! # Architecture
//! - `geo`: address codec, range index, location table, loader, snapshot manager
//! - `source`: file and HTTP(S) byte sources
//! - `api`: HTTP services and middleware
//! - `config`: Configuration management
//! - `runtime`: Application lifecycle and execution modes
//! - `system`: Logging initialization

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod geo;
pub mod runtime;
pub mod source;
pub mod system;
