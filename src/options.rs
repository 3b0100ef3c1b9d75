//! Option tables and their merge into resolved [`Settings`].
//!
//! Options arrive in up to three tiers, merged in a fixed order where later
//! tiers win key by key:
//!
//! 1. the built-in defaults from [`crate::config`]
//! 2. the caller's options
//! 3. an override table pinned by the embedding application
//!
//! The result is validated once and never changes for the rest of the run.

use anyhow::{Result, bail, ensure};
use hashbrown::HashSet;
use serde::Deserialize;

use crate::config::{
    DEFAULT_MIN_CAPITALS, DEFAULT_MIN_DIGITS, DEFAULT_MIN_SYMBOLS, DEFAULT_NDL_COUNT, DEFAULT_NDL_SIZE, DEFAULT_SPLIT_BYTE, DEFAULT_SYMBOLS,
};
use crate::error::NeedlError;
use crate::haystack::EdgeMode;

/// A partial option table. Every key is optional; missing keys fall through
/// to the tier below.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Options {
    pub ndl_count: Option<u32>,
    pub ndl_size: Option<usize>,
    pub min_capitals: Option<usize>,
    pub min_digits: Option<usize>,
    pub min_symbols: Option<usize>,
    pub allowed_symbols: Option<String>,
    pub split_byte: Option<bool>,
    pub ndl_date: Option<String>,
    pub edge_mode: Option<EdgeMode>,
}

impl Options {
    /// Lays `upper` over `self`; keys set in `upper` win.
    #[must_use]
    pub fn layer(self, upper: &Self) -> Self {
        Self {
            ndl_count: upper.ndl_count.or(self.ndl_count),
            ndl_size: upper.ndl_size.or(self.ndl_size),
            min_capitals: upper.min_capitals.or(self.min_capitals),
            min_digits: upper.min_digits.or(self.min_digits),
            min_symbols: upper.min_symbols.or(self.min_symbols),
            allowed_symbols: upper.allowed_symbols.clone().or(self.allowed_symbols),
            split_byte: upper.split_byte.or(self.split_byte),
            ndl_date: upper.ndl_date.clone().or(self.ndl_date),
            edge_mode: upper.edge_mode.or(self.edge_mode),
        }
    }

    pub fn with_ndl_count(mut self, count: u32) -> Self {
        self.ndl_count = Some(count);
        self
    }

    pub fn with_ndl_size(mut self, size: usize) -> Self {
        self.ndl_size = Some(size);
        self
    }

    pub fn with_minimums(mut self, capitals: usize, digits: usize, symbols: usize) -> Self {
        self.min_capitals = Some(capitals);
        self.min_digits = Some(digits);
        self.min_symbols = Some(symbols);
        self
    }

    pub fn with_allowed_symbols(mut self, symbols: &str) -> Self {
        self.allowed_symbols = Some(symbols.to_owned());
        self
    }

    pub fn with_split_byte(mut self, split: bool) -> Self {
        self.split_byte = Some(split);
        self
    }

    pub fn with_ndl_date(mut self, date: &str) -> Self {
        self.ndl_date = Some(date.to_owned());
        self
    }

    pub fn with_edge_mode(mut self, mode: EdgeMode) -> Self {
        self.edge_mode = Some(mode);
        self
    }
}

/// Fully resolved, validated settings of one derivation run.
#[derive(Clone, Debug)]
pub struct Settings {
    pub ndl_count: u32,
    pub ndl_size: usize,
    pub min_capitals: usize,
    pub min_digits: usize,
    pub min_symbols: usize,
    pub symbols: HashSet<u8>,
    pub split_byte: bool,
    pub ndl_date: Option<String>,
    pub edge_mode: EdgeMode,
}

impl Settings {
    /// Merges `defaults < caller < overrides` and validates the result.
    ///
    /// The defaults tier is [`Settings::default`]; only keys set by the caller
    /// or the overrides replace it.
    ///
    /// # Errors
    ///
    /// [`NeedlError::InvalidInput`] for out-of-range values and
    /// [`NeedlError::Unsupported`] for `ndl_count == 0`.
    pub fn resolve(caller: &Options, overrides: &Options) -> Result<Self> {
        let Options { ndl_count, ndl_size, min_capitals, min_digits, min_symbols, allowed_symbols, split_byte, ndl_date, edge_mode } =
            caller.clone().layer(overrides);
        let base = Self::default();

        let settings = Self {
            ndl_count: ndl_count.unwrap_or(base.ndl_count),
            ndl_size: ndl_size.unwrap_or(base.ndl_size),
            min_capitals: min_capitals.unwrap_or(base.min_capitals),
            min_digits: min_digits.unwrap_or(base.min_digits),
            min_symbols: min_symbols.unwrap_or(base.min_symbols),
            symbols: match allowed_symbols {
                Some(allowed) => parse_symbols(&allowed)?,
                None => base.symbols,
            },
            split_byte: split_byte.unwrap_or(base.split_byte),
            ndl_date: ndl_date.or(base.ndl_date),
            edge_mode: edge_mode.unwrap_or(base.edge_mode),
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Settings built from the defaults plus `caller`.
    pub fn from_options(caller: &Options) -> Result<Self> {
        Self::resolve(caller, &Options::default())
    }

    fn validate(&self) -> Result<()> {
        if self.ndl_count == 0 {
            bail!(NeedlError::Unsupported("ndlCount = 0 (decode until terminator)"));
        }
        ensure!(self.ndl_size > 0, NeedlError::invalid("ndlSize must be greater than zero"));

        let minimums = self.min_capitals + self.min_digits + self.min_symbols;
        ensure!(minimums <= self.ndl_size, NeedlError::invalid(format!("character minimums ({minimums}) exceed ndlSize ({})", self.ndl_size)));
        ensure!(self.min_symbols == 0 || !self.symbols.is_empty(), NeedlError::invalid("minSymbols > 0 but allowedSymbols is empty"));
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ndl_count: DEFAULT_NDL_COUNT,
            ndl_size: DEFAULT_NDL_SIZE,
            min_capitals: DEFAULT_MIN_CAPITALS,
            min_digits: DEFAULT_MIN_DIGITS,
            min_symbols: DEFAULT_MIN_SYMBOLS,
            symbols: DEFAULT_SYMBOLS.bytes().collect(),
            split_byte: DEFAULT_SPLIT_BYTE,
            ndl_date: None,
            edge_mode: EdgeMode::default(),
        }
    }
}

// Symbols must be printable ASCII punctuation so every accepted byte decodes
// to exactly one character.
fn parse_symbols(allowed: &str) -> Result<HashSet<u8>> {
    let mut set = HashSet::with_capacity(allowed.len());
    for ch in allowed.chars() {
        ensure!(ch.is_ascii_punctuation(), NeedlError::invalid(format!("allowedSymbols may only hold ASCII punctuation, found {ch:?}")));
        set.insert(ch as u8);
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_resolve() {
        let settings = Settings::from_options(&Options::default()).unwrap();
        assert_eq!(settings.ndl_count, 1);
        assert_eq!(settings.ndl_size, 128);
        assert_eq!((settings.min_capitals, settings.min_digits, settings.min_symbols), (1, 1, 1));
        assert!(settings.split_byte);
        assert_eq!(settings.symbols.len(), 32);
        assert_eq!(settings.edge_mode, EdgeMode::Transparent);
    }

    #[test]
    fn test_unset_keys_fall_back_to_defaults() {
        let caller = Options::default().with_allowed_symbols("#").with_minimums(0, 2, 1);
        let settings = Settings::from_options(&caller).unwrap();
        let defaults = Settings::default();
        assert_eq!(settings.ndl_size, defaults.ndl_size);
        assert_eq!(settings.split_byte, defaults.split_byte);
        assert_eq!(settings.symbols.len(), 1);
        assert_eq!((settings.min_capitals, settings.min_digits), (0, 2));
    }

    #[test]
    fn test_later_tiers_win() {
        let caller = Options::default().with_ndl_size(16).with_split_byte(false);
        let overrides = Options::default().with_ndl_size(24);
        let settings = Settings::resolve(&caller, &overrides).unwrap();
        assert_eq!(settings.ndl_size, 24);
        assert!(!settings.split_byte);
    }

    #[test]
    fn test_layer_keeps_lower_keys() {
        let base = Options::default().with_ndl_date("2024");
        let merged = base.layer(&Options::default().with_ndl_count(3));
        assert_eq!(merged.ndl_date.as_deref(), Some("2024"));
        assert_eq!(merged.ndl_count, Some(3));
    }

    #[test]
    fn test_zero_count_is_unsupported() {
        let err = Settings::from_options(&Options::default().with_ndl_count(0)).unwrap_err();
        assert!(matches!(NeedlError::of(&err), Some(NeedlError::Unsupported(_))));
    }

    #[test]
    fn test_zero_size_is_invalid() {
        let err = Settings::from_options(&Options::default().with_ndl_size(0)).unwrap_err();
        assert!(matches!(NeedlError::of(&err), Some(NeedlError::InvalidInput(_))));
    }

    #[test]
    fn test_minimums_must_fit() {
        let options = Options::default().with_ndl_size(4).with_minimums(2, 2, 1);
        assert!(Settings::from_options(&options).is_err());
    }

    #[test]
    fn test_symbols_must_be_ascii_punctuation() {
        assert!(Settings::from_options(&Options::default().with_allowed_symbols("!a")).is_err());
        assert!(Settings::from_options(&Options::default().with_allowed_symbols("!£")).is_err());
        assert!(Settings::from_options(&Options::default().with_allowed_symbols("!@#")).is_ok());
    }

    #[test]
    fn test_empty_symbols_need_zero_minimum() {
        assert!(Settings::from_options(&Options::default().with_allowed_symbols("")).is_err());
        let options = Options::default().with_allowed_symbols("").with_minimums(1, 1, 0);
        assert!(Settings::from_options(&options).unwrap().symbols.is_empty());
    }

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{"ndlSize": 32, "minSymbols": 2, "splitByte": false, "ndlDate": "20240101", "edgeMode": "strict"}"#;
        let options: Options = serde_json::from_str(json).unwrap();
        let settings = Settings::from_options(&options).unwrap();
        assert_eq!(settings.ndl_size, 32);
        assert_eq!(settings.min_symbols, 2);
        assert!(!settings.split_byte);
        assert_eq!(settings.ndl_date.as_deref(), Some("20240101"));
        assert_eq!(settings.edge_mode, EdgeMode::Strict);
    }

    #[test]
    fn test_deserialize_rejects_unknown_keys() {
        assert!(serde_json::from_str::<Options>(r#"{"ndlLength": 32}"#).is_err());
    }
}
