use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Result, ensure};
use regex::Regex;

use crate::config::{INPUT_PATTERN, PIXELS_PER_CHAR};
use crate::error::NeedlError;
use crate::haystack::Haystack;

static COMPILED_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

fn input_pattern() -> Option<&'static Regex> {
    COMPILED_PATTERN.get_or_init(|| Regex::new(INPUT_PATTERN).ok()).as_ref()
}

fn matches_pattern(value: &str) -> bool {
    input_pattern().is_some_and(|re| re.is_match(value))
}

/// Drops a trailing extension and any leading directories.
pub fn strip_extension(filename: &str) -> &str {
    Path::new(filename).file_stem().and_then(|stem| stem.to_str()).unwrap_or(filename)
}

pub fn validate_filename(filename: &str) -> Result<()> {
    ensure!(!filename.is_empty(), NeedlError::invalid("missing required argument: filename"));
    ensure!(matches_pattern(filename), NeedlError::invalid("filename requirements not met"));
    Ok(())
}

pub fn validate_passkeys(passkey1: &str, passkey2: &str) -> Result<()> {
    ensure!(!passkey1.is_empty() && !passkey2.is_empty(), NeedlError::invalid("missing required argument: passkey"));
    ensure!(matches_pattern(passkey1) && matches_pattern(passkey2), NeedlError::invalid("passkey requirements not met"));
    Ok(())
}

/// The haystack needs `ndl_size * PIXELS_PER_CHAR` pixels.
pub fn validate_image_size(haystack: &Haystack, ndl_size: usize) -> Result<()> {
    let required = (ndl_size as u64).saturating_mul(PIXELS_PER_CHAR);
    ensure!(
        haystack.pixel_count() >= required,
        NeedlError::invalid(format!(
            "image too small: {}x{} holds {} pixels, {required} required for {ndl_size} characters",
            haystack.width(),
            haystack.height(),
            haystack.pixel_count()
        ))
    );
    Ok(())
}
