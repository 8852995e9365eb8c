//! Utility functions.

pub mod names;
