//! Authenticated encryption for cookie values.
//!
//! A sealed value is `base64url(nonce || ciphertext || tag)` without padding.
//! The plaintext is unreadable without the server secret, and any change to
//! the value fails the Poly1305 tag check on open.

use anyhow::{anyhow, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chacha20poly1305::{
    aead::{Aead, AeadCore, KeyInit, OsRng, Payload},
    ChaCha20Poly1305, Nonce,
};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

#[derive(Clone)]
pub struct CookieCipher {
    cipher: ChaCha20Poly1305,
    aad: &'static [u8],
}

impl CookieCipher {
    /// Derive the key from the configured secret. `aad` binds sealed values to
    /// one purpose (the cookie name), so a value minted for another cookie
    /// does not open here.
    #[must_use]
    pub fn new(secret: &SecretString, aad: &'static str) -> Self {
        let key = Sha256::digest(secret.expose_secret().as_bytes());
        Self {
            cipher: ChaCha20Poly1305::new(&key),
            aad: aad.as_bytes(),
        }
    }

    /// # Errors
    /// Returns an error if encryption fails.
    pub fn seal(&self, plaintext: &[u8]) -> Result<String> {
        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(
                &nonce,
                Payload {
                    msg: plaintext,
                    aad: self.aad,
                },
            )
            .map_err(|err| anyhow!("cookie encryption failed: {err}"))?;

        let mut combined = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        combined.extend_from_slice(&nonce);
        combined.extend_from_slice(&ciphertext);
        Ok(URL_SAFE_NO_PAD.encode(combined))
    }

    /// Return the plaintext when the value decrypts under this key, `None` otherwise.
    #[must_use]
    pub fn open(&self, value: &str) -> Option<Vec<u8>> {
        let combined = URL_SAFE_NO_PAD.decode(value).ok()?;
        if combined.len() < NONCE_LEN + TAG_LEN {
            return None;
        }
        let (nonce, ciphertext) = combined.split_at(NONCE_LEN);
        self.cipher
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: self.aad,
                },
            )
            .ok()
    }
}

impl std::fmt::Debug for CookieCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieCipher").field("key", &"***").finish()
    }
}
