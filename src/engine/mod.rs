//! The derivation pipeline.
//!
//! ```text
//! Seed ──> Walker ──> Sampler ──> Converter ──> Assembler ──> passphrases
//!            ^                                      |
//!            └───────────── one cycle per step ─────┘
//! ```
//!
//! [`derive`] runs the whole pipeline over pre-validated inputs. Input policy
//! (patterns, minimum image size) belongs to [`crate::Needl`].

use anyhow::Result;

use crate::error::NeedlError;
use crate::haystack::Haystack;
use crate::options::Settings;
use crate::secret::Passkey;
use crate::types::{Results, Status};

pub mod assembler;
pub mod converter;
pub mod sampler;
pub mod seed;
pub mod walker;

pub use assembler::{Assembler, Phase};
pub use converter::{Converter, Decoded};
pub use sampler::Sampler;
pub use seed::Seed;
pub use walker::Walker;

/// The secret inputs of one derivation.
#[derive(Clone, Debug)]
pub struct Inputs {
    /// Filename salt, extension already stripped.
    pub filename: String,
    pub passkey1: Passkey,
    pub passkey2: Passkey,
}

impl Inputs {
    pub fn new(filename: &str, passkey1: &str, passkey2: &str) -> Self {
        Self { filename: filename.to_owned(), passkey1: Passkey::new(passkey1), passkey2: Passkey::new(passkey2) }
    }
}

/// Outcome of a derivation run.
///
/// A run that hits the iteration cap keeps the passphrases completed before
/// the cap, reports [`Status::Aborted`], and carries the timeout in `error`.
#[derive(Clone, Debug)]
pub struct Derivation {
    pub needls: Vec<String>,
    pub results: Results,
    pub status: Status,
    pub error: Option<NeedlError>,
}

impl Derivation {
    /// The passphrases, or the timeout if the run aborted.
    pub fn into_needls(self) -> Result<Vec<String>> {
        match self.error {
            Some(err) => Err(err.into()),
            None => Ok(self.needls),
        }
    }
}

/// Derives `settings.ndl_count` passphrases from `haystack`.
///
/// # Errors
///
/// Returns [`NeedlError::InvalidInput`] for a filename without letters or
/// digits and for strict-edge samples off the canvas. Timeouts are not
/// errors here; they end the run with [`Status::Aborted`].
pub fn derive(haystack: &Haystack, inputs: &Inputs, settings: &Settings) -> Result<Derivation> {
    let seed = Seed::derive(&inputs.filename, &inputs.passkey1, &inputs.passkey2, settings.ndl_date.as_deref(), haystack.width(), haystack.height())?;
    let mut assembler = Assembler::new(haystack, &seed, settings);
    let mut needls = Vec::with_capacity(settings.ndl_count as usize);

    for _ in 0..settings.ndl_count {
        match assembler.next_needl() {
            Ok(needl) => needls.push(needl),
            Err(err) => match NeedlError::of(&err) {
                Some(timeout @ NeedlError::DerivationTimeout { .. }) => {
                    let (results, error) = (assembler.results(), Some(timeout.clone()));
                    return Ok(Derivation { needls, results, status: Status::Aborted, error });
                }
                _ => return Err(err),
            },
        }
    }

    let results = assembler.results();
    tracing::info!(
        needls = needls.len(),
        iterations = results.iterations,
        valid = results.valid,
        invalid = results.invalid,
        "derivation complete"
    );
    Ok(Derivation { needls, results, status: Status::Complete, error: None })
}
