//! Convert command implementation.

use crate::core::converter::to_webvtt;
use crate::utils::names::get_extension;
use crate::{Error, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Convert a subtitle file to WebVTT and write it next to the input.
pub fn convert(input: &Path, output: Option<&Path>) -> Result<PathBuf> {
    if !input.is_file() {
        return Err(Error::not_found(input.display().to_string()));
    }

    let content = std::fs::read_to_string(input)?;
    let extension = input
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(get_extension);
    let vtt = to_webvtt(&content, extension.as_deref());

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.with_extension("vtt"));
    if output == input {
        return Err(Error::BadRequest(format!(
            "{} is already WebVTT; pass --output to copy it",
            input.display()
        )));
    }

    std::fs::write(&output, vtt)?;
    println!("{} {}", "Wrote".green(), output.display());

    Ok(output)
}
