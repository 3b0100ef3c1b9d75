//! Common type definitions for Needl.
//!
//! # Overview
//!
//! - [`CharClass`]: The character classes a passphrase byte can belong to
//! - [`Status`]: Lifecycle of a derivation run as seen from the facade
//! - [`Results`]: Diagnostic counters exposed by the `results` query
//! - [`Coordinate`]: A cursor position on the pixel grid

use hashbrown::HashSet;
use strum::Display;

/// Character class of an accepted passphrase byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum CharClass {
    Uppercase,
    Lowercase,
    Digit,
    Symbol,
}

impl CharClass {
    /// Classifies `byte`, returning `None` for bytes a passphrase never holds.
    ///
    /// Symbols are only recognised when they are in `symbols`.
    #[inline]
    pub fn of(byte: u8, symbols: &HashSet<u8>) -> Option<Self> {
        match byte {
            b'A'..=b'Z' => Some(Self::Uppercase),
            b'a'..=b'z' => Some(Self::Lowercase),
            b'0'..=b'9' => Some(Self::Digit),
            _ if symbols.contains(&byte) => Some(Self::Symbol),
            _ => None,
        }
    }
}

/// Where a [`crate::Needl`] is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum Status {
    /// Constructed, not yet derived.
    Pending,

    /// Every requested passphrase was produced.
    Complete,

    /// The iteration cap was hit; earlier passphrases of the batch survive.
    Aborted,
}

/// Diagnostic counters of a derivation run.
///
/// `valid` and `invalid` count channel comparisons divided by three, which
/// normalises them to a per-pixel figure.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Results {
    /// Walker steps taken over the whole run, repairs included.
    pub iterations: u64,

    /// Neighbour pixels whose difference fell inside the threshold.
    pub valid: f64,

    /// Neighbour pixels whose difference fell outside the threshold.
    pub invalid: f64,

    /// Pixels in the haystack.
    pub total_pixels: u64,

    /// Last special nibble stripped by the base converter, if any.
    pub special: Option<u8>,
}

/// A position on the pixel grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Coordinate {
    pub x: u64,
    pub y: u64,
}

impl Coordinate {
    #[inline]
    pub fn new(x: u64, y: u64) -> Self {
        Self { x, y }
    }
}
