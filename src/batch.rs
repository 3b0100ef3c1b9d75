//! Parallel derivation of independent requests over one shared image.
//!
//! Every request owns its own seed, cursor, buffers and counters; only the
//! haystack is shared, read-only. Results come back in request order, and
//! no request can influence another's passphrases.

use std::sync::Arc;

use anyhow::Result;
use rayon::prelude::*;

use crate::engine::{self, Derivation, Inputs};
use crate::haystack::Haystack;
use crate::options::{Options, Settings};

/// One derivation to run in a batch.
#[derive(Clone, Debug)]
pub struct Request {
    pub inputs: Inputs,
    pub options: Options,
}

impl Request {
    pub fn new(inputs: Inputs, options: Options) -> Self {
        Self { inputs, options }
    }
}

/// Runs derivations on rayon's work-stealing pool.
pub struct Batch {
    /// Shared image, read by every request.
    haystack: Arc<Haystack>,
}

impl Batch {
    #[inline]
    pub fn new(haystack: Arc<Haystack>) -> Self {
        Self { haystack }
    }

    /// Derives every request in parallel, returning outcomes in request order.
    pub fn derive_all(&self, requests: &[Request]) -> Vec<Result<Derivation>> {
        requests.par_iter().map(|request| self.derive_one(request)).collect()
    }

    fn derive_one(&self, request: &Request) -> Result<Derivation> {
        let settings = Settings::from_options(&request.options)?;
        engine::derive(&self.haystack, &request.inputs, &settings)
    }
}
