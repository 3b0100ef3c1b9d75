//! Needl - reproducible passphrases hidden in a photo.
//!
//! Two passkeys and a filename salt steer a deterministic walk over the
//! pixels of an image. Small colour differences around each visited pixel
//! are re-encoded into characters until a passphrase of the requested
//! length and character mix is complete. The image need not be secret:
//! without the passkeys and the filename the walk cannot be retraced.
//!
//! - SHA-256 for salting and seeding the walk
//! - base-11 to base-16 re-encoding of pixel differences
//! - bounded, deterministic repair of missing character classes

pub mod batch;
pub mod config;
pub mod engine;
pub mod error;
pub mod haystack;
pub mod needl;
pub mod options;
pub mod secret;
pub mod telemetry;
pub mod types;
pub mod validation;

pub use batch::{Batch, Request};
pub use engine::{Derivation, Inputs};
pub use error::NeedlError;
pub use haystack::{EdgeMode, Haystack};
pub use needl::Needl;
pub use options::{Options, Settings};
pub use secret::Passkey;
pub use types::{CharClass, Results, Status};
