//! Data models.

pub mod config;
pub mod drive;
pub mod media;
