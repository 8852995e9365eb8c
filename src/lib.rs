//! Drive Media Library
//!
//! Serves a cloud-drive folder tree as a browsable movie and TV library:
//! filename parsing, subtitle matching, TMDB enrichment and range streaming.

pub mod cli;
pub mod core;
pub mod error;
pub mod models;
pub mod preflight;
pub mod server;
pub mod services;
pub mod utils;

pub use error::{Error, Result};
