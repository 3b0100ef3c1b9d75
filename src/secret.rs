//! Passkey storage.

use secrecy::{ExposeSecret, SecretString};

/// One of the two secret passkeys of a derivation.
///
/// The text is zeroed when dropped and is only reachable through
/// [`Passkey::expose_secret`], which the seed derivation calls once per run.
pub struct Passkey(SecretString);

impl Passkey {
    pub fn new(passkey: &str) -> Self {
        Self(SecretString::from(passkey))
    }

    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for Passkey {
    fn clone(&self) -> Self {
        Self::new(self.expose_secret())
    }
}

// Neither the text nor its length is printed.
impl std::fmt::Debug for Passkey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Passkey").field(&"<redacted>").finish()
    }
}
