//! Salted digest generation.
//!
//! The filename is reduced to a salt string of its ASCII letters followed by
//! its ASCII digits (and the digits of an optional date salt). The salt is
//! hashed on its own to drive the walk, and split by character parity into
//! two halves that salt each passkey before hashing. The passkey digests give
//! the starting column and row and the per-axis step increments.

use anyhow::{Result, ensure};
use sha2::{Digest, Sha256};

use crate::config::HASH_SIZE;
use crate::error::NeedlError;
use crate::secret::Passkey;
use crate::types::Coordinate;

/// Immutable seed state of one derivation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Seed {
    /// Hex SHA-256 of the salt string.
    pub salt_digest: String,
    /// Hex SHA-256 of the even-position salt half followed by passkey 1.
    pub x_digest: String,
    /// Hex SHA-256 of the odd-position salt half followed by passkey 2.
    pub y_digest: String,
    /// Sum of every decimal digit in the filename and date salt.
    pub multiplier: u64,
    /// Digest byte sums reduced modulo the canvas dimensions.
    pub start: Coordinate,
}

impl Seed {
    /// Derives the seed for a `width` x `height` canvas.
    ///
    /// # Errors
    ///
    /// [`NeedlError::InvalidInput`] if `filename` lacks an ASCII letter or an
    /// ASCII digit, or if the canvas has no pixels.
    pub fn derive(filename: &str, passkey1: &Passkey, passkey2: &Passkey, date_salt: Option<&str>, width: u32, height: u32) -> Result<Self> {
        ensure!(width > 0 && height > 0, NeedlError::invalid("canvas has no pixels"));

        let alpha: String = filename.chars().filter(char::is_ascii_alphabetic).collect();
        let digits: String = filename.chars().filter(char::is_ascii_digit).collect();
        ensure!(!alpha.is_empty(), NeedlError::invalid("filename must contain at least one letter"));
        ensure!(!digits.is_empty(), NeedlError::invalid("filename must contain at least one digit"));

        let date_digits: String = date_salt.map(|date| date.chars().filter(char::is_ascii_digit).collect()).unwrap_or_default();
        let multiplier = digit_sum(&digits) + digit_sum(&date_digits);

        let salt = format!("{alpha}{digits}{date_digits}");
        let (pk1_salt, pk2_salt) = split_parity(&salt);

        let salt_hash = sha256(salt.as_bytes());
        let x_hash = sha256(format!("{pk1_salt}{}", passkey1.expose_secret()).as_bytes());
        let y_hash = sha256(format!("{pk2_salt}{}", passkey2.expose_secret()).as_bytes());

        Ok(Self {
            salt_digest: hex::encode(salt_hash),
            x_digest: hex::encode(x_hash),
            y_digest: hex::encode(y_hash),
            multiplier,
            start: Coordinate::new(byte_sum(&x_hash) % u64::from(width), byte_sum(&y_hash) % u64::from(height)),
        })
    }
}

fn sha256(data: &[u8]) -> [u8; HASH_SIZE] {
    Sha256::digest(data).into()
}

fn byte_sum(hash: &[u8; HASH_SIZE]) -> u64 {
    hash.iter().map(|&b| u64::from(b)).sum()
}

fn digit_sum(digits: &str) -> u64 {
    digits.chars().filter_map(|c| c.to_digit(10)).map(u64::from).sum()
}

// Characters at even positions go to the first half, odd positions to the second.
fn split_parity(salt: &str) -> (String, String) {
    let mut even = String::with_capacity(salt.len() / 2 + 1);
    let mut odd = String::with_capacity(salt.len() / 2);
    for (i, ch) in salt.chars().enumerate() {
        if i % 2 == 0 { even.push(ch) } else { odd.push(ch) }
    }
    (even, odd)
}
