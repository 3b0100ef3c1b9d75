//! The public face of a derivation.
//!
//! [`Needl`] validates its inputs at construction, before anything is hashed,
//! then derives on demand. Construction never touches the pixels beyond the
//! size check, and the haystack is shared rather than copied so several
//! `Needl`s can read the same image at once.

use std::sync::Arc;

use anyhow::{Result, bail};
use tokio::task::JoinHandle;

use crate::engine::{self, Inputs};
use crate::error::NeedlError;
use crate::haystack::Haystack;
use crate::options::{Options, Settings};
use crate::types::{Results, Status};
use crate::validation::{strip_extension, validate_filename, validate_image_size, validate_passkeys};

pub struct Needl {
    haystack: Arc<Haystack>,
    inputs: Inputs,
    settings: Settings,
    needls: Vec<String>,
    results: Results,
    status: Status,
    error: Option<NeedlError>,
}

impl Needl {
    /// Validates the inputs and prepares a derivation.
    ///
    /// `filename` may carry a directory and an extension; both are dropped.
    ///
    /// # Errors
    ///
    /// [`NeedlError::InvalidInput`] for missing or malformed arguments, bad
    /// option values, or an image too small for the requested length.
    pub fn new(haystack: Arc<Haystack>, filename: &str, passkey1: &str, passkey2: &str, options: &Options) -> Result<Self> {
        Self::with_overrides(haystack, filename, passkey1, passkey2, options, &Options::default())
    }

    /// Like [`Needl::new`], with an override table laid over the caller's options.
    pub fn with_overrides(haystack: Arc<Haystack>, filename: &str, passkey1: &str, passkey2: &str, options: &Options, overrides: &Options) -> Result<Self> {
        let filename = strip_extension(filename);
        validate_filename(filename)?;
        validate_passkeys(passkey1, passkey2)?;

        let settings = Settings::resolve(options, overrides)?;
        validate_image_size(&haystack, settings.ndl_size)?;

        let results = Results { total_pixels: haystack.pixel_count(), ..Results::default() };
        Ok(Self {
            haystack,
            inputs: Inputs::new(filename, passkey1, passkey2),
            settings,
            needls: Vec::new(),
            results,
            status: Status::Pending,
            error: None,
        })
    }

    /// Runs the derivation, returning every passphrase.
    ///
    /// Calling it again after completion returns the stored passphrases.
    ///
    /// # Errors
    ///
    /// [`NeedlError::DerivationTimeout`] if the iteration cap was hit; the
    /// passphrases completed before it stay available through [`Needl::needl`].
    pub fn derive(&mut self) -> Result<&[String]> {
        if self.status == Status::Pending {
            let derivation = engine::derive(&self.haystack, &self.inputs, &self.settings)?;
            self.needls = derivation.needls;
            self.results = derivation.results;
            self.status = derivation.status;
            self.error = derivation.error;
        }

        match &self.error {
            Some(err) => bail!(err.clone()),
            None => Ok(self.needls.as_slice()),
        }
    }

    /// Derives on the blocking pool and resolves to the finished `Needl`.
    ///
    /// Inspect [`Needl::status`] and [`Needl::error`] on the result; an input
    /// error raised while deriving is stored as the error.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn spawn(mut self) -> JoinHandle<Self> {
        tokio::task::spawn_blocking(move || {
            let outcome = self.derive().map(|_| ());
            if let Err(err) = outcome
                && self.error.is_none()
            {
                self.status = Status::Aborted;
                self.error = Some(NeedlError::of(&err).cloned().unwrap_or_else(|| NeedlError::invalid(err.to_string())));
            }
            self
        })
    }

    /// Passphrases derived so far; `None` while the derivation is pending.
    pub fn needl(&self) -> Option<&[String]> {
        match self.status {
            Status::Pending => None,
            Status::Complete | Status::Aborted => Some(self.needls.as_slice()),
        }
    }

    /// Diagnostic counters; all zero except `total_pixels` until derived.
    pub fn results(&self) -> Results {
        self.results
    }

    /// The filename salt, extension stripped.
    pub fn filename(&self) -> &str {
        &self.inputs.filename
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn error(&self) -> Option<&NeedlError> {
        self.error.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Hiding a chosen passphrase in an image is reserved for a later version.
    pub fn encode(&mut self, _needl: &str) -> Result<()> {
        bail!(NeedlError::Unsupported("encoding a passphrase into an image"))
    }
}

impl std::fmt::Debug for Needl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Needl")
            .field("filename", &self.inputs.filename)
            .field("width", &self.haystack.width())
            .field("height", &self.haystack.height())
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn haystack(side: u32) -> Arc<Haystack> {
        Arc::new(Haystack::from_fn(side, side, |x, y| [((x * 2 + y * 3) % 256) as u8, (100 + (x * x + y) % 7) as u8, (50 + (x * y) % 11) as u8, 255]).unwrap())
    }

    fn options() -> Options {
        Options::default().with_ndl_size(16)
    }

    #[test]
    fn test_pending_until_derived() {
        let needl = Needl::new(haystack(400), "Photo00179.jpg", "firsthike puppy", "personal instagram123", &options()).unwrap();
        assert_eq!(needl.status(), Status::Pending);
        assert!(needl.needl().is_none());
        assert_eq!(needl.filename(), "Photo00179");
        assert_eq!(needl.results().total_pixels, 160_000);
        assert_eq!(needl.results().iterations, 0);
    }

    #[test]
    fn test_derive_is_idempotent() {
        let mut needl = Needl::new(haystack(400), "Photo00179", "firsthike puppy", "personal instagram123", &options()).unwrap();
        let first = needl.derive().unwrap().to_vec();
        let iterations = needl.results().iterations;
        assert_eq!(needl.derive().unwrap(), first.as_slice());
        assert_eq!(needl.results().iterations, iterations);
        assert_eq!(needl.needl(), Some(first.as_slice()));
        assert_eq!(needl.status(), Status::Complete);
    }

    #[test]
    fn test_too_small_image_rejected() {
        let err = Needl::new(haystack(64), "Photo00179", "firsthike puppy", "personal instagram123", &options()).unwrap_err();
        assert!(matches!(NeedlError::of(&err), Some(NeedlError::InvalidInput(msg)) if msg.starts_with("image too small")));
    }

    #[test]
    fn test_malformed_inputs_rejected() {
        assert!(Needl::new(haystack(400), "Photo00179", "hi", "personal instagram123", &options()).is_err());
        assert!(Needl::new(haystack(400), "Pic1", "firsthike puppy", "personal instagram123", &options()).is_err());
        assert!(Needl::new(haystack(400), "Photo00179", "firsthike puppy", "", &options()).is_err());
    }

    #[test]
    fn test_overrides_win() {
        let overrides = Options::default().with_ndl_size(12);
        let needl = Needl::with_overrides(haystack(400), "Photo00179", "firsthike puppy", "personal instagram123", &options(), &overrides).unwrap();
        assert_eq!(needl.settings().ndl_size, 12);
    }

    #[test]
    fn test_encode_is_unsupported() {
        let mut needl = Needl::new(haystack(400), "Photo00179", "firsthike puppy", "personal instagram123", &options()).unwrap();
        let err = needl.encode("anything").unwrap_err();
        assert!(matches!(NeedlError::of(&err), Some(NeedlError::Unsupported(_))));
    }

    #[test]
    fn test_timeout_is_stored() {
        // Off-canvas reads are transparent black, so a flat value within 5 of
        // zero still yields signal along the border.
        let flat = Arc::new(Haystack::from_fn(400, 400, |_, _| [7, 7, 7, 255]).unwrap());
        let mut needl = Needl::new(flat, "Photo00179", "firsthike puppy", "personal instagram123", &options()).unwrap();
        let err = needl.derive().unwrap_err();
        assert!(matches!(NeedlError::of(&err), Some(NeedlError::DerivationTimeout { completed: 0, .. })));
        assert_eq!(needl.status(), Status::Aborted);
        assert_eq!(needl.needl(), Some(&[][..]));
        assert!(matches!(needl.error(), Some(NeedlError::DerivationTimeout { .. })));
    }

    #[tokio::test]
    async fn test_spawn_completes() {
        let needl = Needl::new(haystack(400), "Photo00179", "firsthike puppy", "personal instagram123", &options()).unwrap();
        let done = needl.spawn().await.unwrap();
        assert_eq!(done.status(), Status::Complete);
        assert_eq!(done.needl().map(<[String]>::len), Some(1));
        assert!(done.error().is_none());
    }
}
