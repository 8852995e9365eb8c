//! Core library logic: name parsing, subtitle handling, scanning, streaming.

pub mod converter;
pub mod enrich;
pub mod folder;
pub mod parser;
pub mod scanner;
pub mod stream;
pub mod subtitles;
