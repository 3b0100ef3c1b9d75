//! Base-11 to base-16 re-encoding of difference values.
//!
//! Difference values are base-11 digits. Twelve of them, with a non-zero
//! lead, form one numeral that re-renders as ten or eleven hex digits. An
//! eleventh leading digit is the special nibble; the remaining ten are five
//! candidate bytes, of which only passphrase characters are kept.

use hashbrown::HashSet;

use crate::config::{BATCH_LEN, HEX_PAIRS_LEN};
use crate::types::CharClass;

/// Five candidate bytes decoded from one batch, plus the special nibble if
/// the batch rendered to eleven hex digits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decoded {
    pub special: Option<u8>,
    pub bytes: [u8; HEX_PAIRS_LEN / 2],
}

/// Accumulates base-11 digits and turns full batches into passphrase bytes.
#[derive(Clone, Debug)]
pub struct Converter<'a> {
    pending: Vec<u8>,
    symbols: &'a HashSet<u8>,
    split_byte: bool,
    special: Option<u8>,
}

impl<'a> Converter<'a> {
    pub fn new(symbols: &'a HashSet<u8>, split_byte: bool) -> Self {
        Self { pending: Vec::with_capacity(BATCH_LEN), symbols, split_byte, special: None }
    }

    /// Queues one difference value, appending any accepted bytes to `out`.
    ///
    /// Leading zeros are dropped as they reach the front, so a batch never
    /// starts with zero.
    pub fn push(&mut self, value: u8, out: &mut Vec<u8>) {
        debug_assert!(value <= 10);
        self.pending.push(value);

        let lead = self.pending.iter().take_while(|&&v| v == 0).count();
        self.pending.drain(..lead);

        if self.pending.len() >= BATCH_LEN {
            let batch: Vec<u8> = self.pending.drain(..BATCH_LEN).collect();
            let hex = parse_base11(&batch);
            if let Some(decoded) = parse_base16(&hex) {
                if decoded.special.is_some() {
                    self.special = decoded.special;
                }
                out.extend(decoded.bytes.iter().map(|&b| self.fold(b)).filter(|&b| CharClass::of(b, self.symbols).is_some()));
            }
        }
    }

    /// Drops any partial batch.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Digits waiting for a full batch.
    #[inline]
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Last special nibble seen.
    #[inline]
    pub fn special(&self) -> Option<u8> {
        self.special
    }

    #[inline]
    fn fold(&self, byte: u8) -> u8 {
        if self.split_byte && byte > 127 { byte - 128 } else { byte }
    }
}

/// Reads `digits` (each `0..=10`) as one base-11 numeral and renders it in
/// lowercase hex without leading zeros.
pub fn parse_base11(digits: &[u8]) -> String {
    let value = digits.iter().fold(0u64, |acc, &d| acc * 11 + u64::from(d));
    format!("{value:x}")
}

/// Splits a hex rendering into the special nibble and five bytes.
///
/// Returns `None`, after logging, if the rendering is not ten digits once an
/// eleventh leading digit is stripped.
pub fn parse_base16(hex: &str) -> Option<Decoded> {
    let (special, body) = if hex.len() == HEX_PAIRS_LEN + 1 {
        let (head, rest) = hex.split_at(1);
        (u8::from_str_radix(head, 16).ok(), rest)
    } else {
        (None, hex)
    };

    if body.len() != HEX_PAIRS_LEN {
        tracing::debug!(value = hex, "incompatible value string, batch discarded");
        return None;
    }

    let mut bytes = [0u8; HEX_PAIRS_LEN / 2];
    for (i, byte) in bytes.iter_mut().enumerate() {
        *byte = u8::from_str_radix(body.get(i * 2..i * 2 + 2)?, 16).ok()?;
    }
    Some(Decoded { special, bytes })
}
