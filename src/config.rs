//! Global Configuration Constants
//!
//! This module contains the built-in defaults and the fixed parameters of the
//! Needl derivation scheme. The fixed parameters are part of the output format:
//! changing any of them changes every passphrase ever derived, so they are not
//! exposed as options.
//!
//! ## Layout
//!
//! - **Scheme parameters**: batch length, difference threshold, iteration cap
//! - **Option defaults**: the lowest tier of the option merge (see [`crate::options`])
//! - **Input limits**: bounds enforced by the [`crate::Needl`] facade before hashing

// === Scheme Parameters ===
// These values are baked into the derivation. Two implementations only agree
// on a passphrase if they agree on every one of these.

/// Number of walker steps allowed per fill, repairs included.
///
/// Acts as a deterministic timeout: the counter resets at the start of each
/// passphrase fill and keeps counting through the repair loop that follows.
pub const ITERATION_CAP: u32 = 1000;

/// Number of base-11 digits consumed per conversion batch.
///
/// Twelve base-11 digits with a non-zero lead always render to ten or eleven
/// hex digits, i.e. five bytes plus an optional special nibble.
pub const BATCH_LEN: usize = 12;

/// Largest absolute channel difference that still counts as signal.
///
/// Differences in `-5..=5` map onto the base-11 digits `0..=10`.
pub const DIFF_THRESHOLD: i16 = 5;

/// Length of a hex-rendered base-16 batch once the special nibble is stripped.
pub const HEX_PAIRS_LEN: usize = 10;

/// Side of the square pixel neighbourhood read around the cursor.
pub const GRID_SIDE: usize = 3;

/// Number of channels per pixel in the haystack (RGBA).
pub const CHANNELS: usize = 4;

/// Size of a SHA-256 digest in bytes.
pub const HASH_SIZE: usize = 32;

// === Option Defaults ===

/// Number of passphrases derived per run.
pub const DEFAULT_NDL_COUNT: u32 = 1;

/// Length of each passphrase in characters.
pub const DEFAULT_NDL_SIZE: usize = 128;

/// Minimum number of uppercase letters per passphrase.
pub const DEFAULT_MIN_CAPITALS: usize = 1;

/// Minimum number of decimal digits per passphrase.
pub const DEFAULT_MIN_DIGITS: usize = 1;

/// Minimum number of symbols per passphrase.
pub const DEFAULT_MIN_SYMBOLS: usize = 1;

/// Whether bytes above 127 are folded back into the ASCII range.
pub const DEFAULT_SPLIT_BYTE: bool = true;

/// Symbols accepted into a passphrase by default.
///
/// This is every printable ASCII punctuation character, so together with the
/// letters and digits the default accepted set is exactly `33..=126`.
pub const DEFAULT_SYMBOLS: &str = r##"!"#$%&'()*+,-./:;<=>?@[\]^_`{|}~"##;

// === Input Limits ===

/// Pixels required per passphrase character.
///
/// The haystack must hold at least `ndl_size * PIXELS_PER_CHAR` pixels so a
/// full fill can find enough distinct neighbourhoods without endless repairs.
pub const PIXELS_PER_CHAR: u64 = ITERATION_CAP as u64 * 9;

/// Filename and passkey pattern: an alphanumeric head followed by 7 to 64
/// characters drawn from alphanumerics, dots, spaces, underscores and dashes.
pub const INPUT_PATTERN: &str = r"^[A-Za-z0-9]+[A-Za-z0-9. _-]{7,64}$";
