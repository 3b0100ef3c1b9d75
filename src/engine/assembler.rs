//! Passphrase assembly and requirement repair.
//!
//! The assembler drives walker, sampler and converter one cycle at a time.
//! A fill runs cycles until enough bytes are buffered for one passphrase;
//! if the slice misses a character-class minimum, repair cycles patch new
//! bytes of a missing class into the candidate at `step_count % ndl_size`.
//! The patch position is part of the output format and may overwrite a
//! character that another class was relying on.

use anyhow::{Result, bail};
use strum::Display;

use crate::config::ITERATION_CAP;
use crate::engine::converter::Converter;
use crate::engine::sampler::Sampler;
use crate::engine::seed::Seed;
use crate::engine::walker::Walker;
use crate::error::NeedlError;
use crate::haystack::Haystack;
use crate::options::Settings;
use crate::types::{CharClass, Results};

/// Assembly phase of the passphrase currently being built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum Phase {
    Filling,
    Validating,
    Repairing,
    Complete,
    Aborted,
}

/// Per-class tallies of a candidate, restricted to the classes with minimums.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Tally {
    capitals: usize,
    digits: usize,
    symbols: usize,
}

/// Owns every piece of mutable state of one derivation run.
pub struct Assembler<'a> {
    haystack: &'a Haystack,
    settings: &'a Settings,
    walker: Walker<'a>,
    sampler: Sampler,
    converter: Converter<'a>,
    bytes: Vec<u8>,
    phase: Phase,
    iterations: u64,
    completed: usize,
}

impl<'a> Assembler<'a> {
    pub fn new(haystack: &'a Haystack, seed: &'a Seed, settings: &'a Settings) -> Self {
        Self {
            haystack,
            settings,
            walker: Walker::new(seed, haystack.width(), haystack.height()),
            sampler: Sampler::new(),
            converter: Converter::new(&settings.symbols, settings.split_byte),
            bytes: Vec::with_capacity(settings.ndl_size * 2),
            phase: Phase::Filling,
            iterations: 0,
            completed: 0,
        }
    }

    /// Builds the next passphrase.
    ///
    /// # Errors
    ///
    /// [`NeedlError::DerivationTimeout`] when the step counter reaches the
    /// cap, and [`NeedlError::InvalidInput`] from strict-edge sampling.
    pub fn next_needl(&mut self) -> Result<String> {
        let size = self.settings.ndl_size;
        self.walker.restart_count();
        self.phase = Phase::Filling;

        while self.bytes.len() < size {
            if self.walker.count() >= ITERATION_CAP {
                return self.abort();
            }
            self.cycle()?;
        }

        let mut candidate: Vec<u8> = self.bytes.drain(..size).collect();
        self.phase = Phase::Validating;

        while !self.satisfied(self.tally(&candidate)) {
            self.phase = Phase::Repairing;
            if self.walker.count() >= ITERATION_CAP {
                return self.abort();
            }

            let fresh = self.bytes.len();
            self.cycle()?;
            let index = self.walker.count() as usize % size;
            for i in fresh..self.bytes.len() {
                let byte = self.bytes[i];
                if self.is_short(self.tally(&candidate), byte) {
                    candidate[index] = byte;
                }
            }
            self.bytes.clear();
        }

        self.phase = Phase::Complete;
        self.completed += 1;
        self.bytes.clear();
        self.converter.clear();
        tracing::debug!(index = self.completed, steps = self.walker.count(), "passphrase complete");

        // Accepted bytes are ASCII letters, digits and ASCII punctuation.
        Ok(String::from_utf8(candidate)?)
    }

    /// Counters accumulated so far.
    #[allow(clippy::cast_precision_loss)]
    pub fn results(&self) -> Results {
        Results {
            iterations: self.iterations,
            valid: self.sampler.valid() as f64 / 3.0,
            invalid: self.sampler.invalid() as f64 / 3.0,
            total_pixels: self.haystack.pixel_count(),
            special: self.converter.special(),
        }
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn completed(&self) -> usize {
        self.completed
    }

    // One walker step, one sample, and conversion of its differences.
    fn cycle(&mut self) -> Result<()> {
        let at = self.walker.step();
        self.iterations += 1;
        let block = Sampler::sample(self.haystack, at, self.settings.edge_mode)?;
        let converter = &mut self.converter;
        let bytes = &mut self.bytes;
        self.sampler.differences(&block, |value| converter.push(value, bytes));
        Ok(())
    }

    fn abort<T>(&mut self) -> Result<T> {
        let steps = self.walker.count();
        let at = self.walker.position();
        tracing::warn!(steps, completed = self.completed, x = at.x, y = at.y, phase = %self.phase, "iteration cap reached");
        self.phase = Phase::Aborted;
        bail!(NeedlError::DerivationTimeout { completed: self.completed, steps })
    }

    fn tally(&self, candidate: &[u8]) -> Tally {
        let mut tally = Tally::default();
        for &byte in candidate {
            match CharClass::of(byte, &self.settings.symbols) {
                Some(CharClass::Uppercase) => tally.capitals += 1,
                Some(CharClass::Digit) => tally.digits += 1,
                Some(CharClass::Symbol) => tally.symbols += 1,
                Some(CharClass::Lowercase) | None => {}
            }
        }
        tally
    }

    fn satisfied(&self, tally: Tally) -> bool {
        tally.capitals >= self.settings.min_capitals && tally.digits >= self.settings.min_digits && tally.symbols >= self.settings.min_symbols
    }

    // True when `byte` belongs to a class that is still below its minimum.
    fn is_short(&self, tally: Tally, byte: u8) -> bool {
        match CharClass::of(byte, &self.settings.symbols) {
            Some(CharClass::Uppercase) => tally.capitals < self.settings.min_capitals,
            Some(CharClass::Digit) => tally.digits < self.settings.min_digits,
            Some(CharClass::Symbol) => tally.symbols < self.settings.min_symbols,
            Some(CharClass::Lowercase) | None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;
    use crate::secret::Passkey;

    fn noisy(width: u32, height: u32) -> Haystack {
        Haystack::from_fn(width, height, |x, y| {
            let r = ((x * 2 + y * 3) % 256) as u8;
            let g = (100 + (x * x + y) % 7) as u8;
            let b = (50 + (x * y) % 11) as u8;
            [r, g, b, 255]
        })
        .unwrap()
    }

    // Textured top-left corner on an otherwise flat canvas: the walk only
    // finds signal while it passes through the corner.
    fn patched(side: u32) -> Haystack {
        Haystack::from_fn(64, 64, |x, y| {
            if x < side && y < side {
                let r = (120 + (x * x * 3 + y * 7 + x * y) % 11) as u8;
                let g = (80 + (x * 5 + y * y * 2 + x * y * 3) % 11) as u8;
                let b = (40 + (x * x + y * y + x * y * 7) % 11) as u8;
                [r, g, b, 255]
            } else {
                [128, 128, 128, 255]
            }
        })
        .unwrap()
    }

    fn seed(width: u32, height: u32) -> Seed {
        Seed::derive("Photo00179", &Passkey::new("First hike with puppy!"), &Passkey::new("personal instagram123"), None, width, height).unwrap()
    }

    #[test]
    fn test_passphrase_meets_requirements() {
        let haystack = noisy(64, 64);
        let seed = seed(64, 64);
        let settings = Settings::from_options(&Options::default().with_ndl_size(16)).unwrap();
        let mut assembler = Assembler::new(&haystack, &seed, &settings);

        let needl = assembler.next_needl().unwrap();
        assert_eq!(needl.len(), 16);
        assert!(needl.bytes().any(|b| b.is_ascii_uppercase()));
        assert!(needl.bytes().any(|b| b.is_ascii_digit()));
        assert!(needl.bytes().any(|b| b.is_ascii_punctuation()));
        assert_eq!(assembler.phase(), Phase::Complete);
        assert_eq!(assembler.completed(), 1);
    }

    #[test]
    fn test_successive_passphrases_differ() {
        let haystack = noisy(64, 64);
        let seed = seed(64, 64);
        let settings = Settings::from_options(&Options::default().with_ndl_size(16)).unwrap();
        let mut assembler = Assembler::new(&haystack, &seed, &settings);

        let first = assembler.next_needl().unwrap();
        let second = assembler.next_needl().unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_flat_image_times_out() {
        // Every difference is zero, so no batch ever forms.
        let haystack = Haystack::from_fn(64, 64, |_, _| [128, 128, 128, 255]).unwrap();
        let seed = seed(64, 64);
        let settings = Settings::from_options(&Options::default().with_ndl_size(16)).unwrap();
        let mut assembler = Assembler::new(&haystack, &seed, &settings);

        let err = assembler.next_needl().unwrap_err();
        assert_eq!(NeedlError::of(&err), Some(&NeedlError::DerivationTimeout { completed: 0, steps: ITERATION_CAP }));
        assert_eq!(assembler.phase(), Phase::Aborted);
        assert_eq!(assembler.results().iterations, u64::from(ITERATION_CAP));
    }

    #[test]
    fn test_repair_times_out_when_signal_runs_dry() {
        let haystack = patched(4);
        let seed = Seed::derive("Photo3", &Passkey::new("gamma passkey"), &Passkey::new("personal instagram123"), None, 64, 64).unwrap();

        // With no minimums the fill alone settles after 314 steps, on a slice
        // holding neither a capital nor a digit.
        let relaxed = Settings::from_options(&Options::default().with_ndl_size(8).with_minimums(0, 0, 0)).unwrap();
        let mut assembler = Assembler::new(&haystack, &seed, &relaxed);
        assert_eq!(assembler.next_needl().unwrap(), r"9tz\!c+,");
        assert_eq!(assembler.results().iterations, 314);

        let settings = Settings::from_options(&Options::default().with_ndl_size(8)).unwrap();
        let mut assembler = Assembler::new(&haystack, &seed, &settings);
        let err = assembler.next_needl().unwrap_err();
        assert_eq!(NeedlError::of(&err), Some(&NeedlError::DerivationTimeout { completed: 0, steps: ITERATION_CAP }));
        assert_eq!(assembler.phase(), Phase::Aborted);
        assert_eq!(assembler.completed(), 0);
        assert_eq!(assembler.results().iterations, u64::from(ITERATION_CAP));
    }

    #[test]
    fn test_counters_cover_every_comparison() {
        let haystack = noisy(64, 64);
        let seed = seed(64, 64);
        let settings = Settings::from_options(&Options::default().with_ndl_size(16)).unwrap();
        let mut assembler = Assembler::new(&haystack, &seed, &settings);
        assembler.next_needl().unwrap();

        let results = assembler.results();
        // 24 channel comparisons per step, reported per pixel.
        assert!((results.valid + results.invalid - results.iterations as f64 * 8.0).abs() < 1e-9);
        assert_eq!(results.total_pixels, 4096);
    }

    #[test]
    fn test_tally_and_shortfall() {
        let haystack = noisy(8, 8);
        let seed = seed(8, 8);
        let settings = Settings::from_options(&Options::default().with_ndl_size(8).with_minimums(2, 1, 1)).unwrap();
        let assembler = Assembler::new(&haystack, &seed, &settings);

        let tally = assembler.tally(b"Ab1!cdeF");
        assert_eq!(tally, Tally { capitals: 2, digits: 1, symbols: 1 });
        assert!(assembler.satisfied(tally));

        let tally = assembler.tally(b"Abc!defg");
        assert!(!assembler.satisfied(tally));
        assert!(assembler.is_short(tally, b'Z'));
        assert!(assembler.is_short(tally, b'7'));
        assert!(!assembler.is_short(tally, b'#'));
        assert!(!assembler.is_short(tally, b'q'));
    }
}
