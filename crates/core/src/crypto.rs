//! AES-256-GCM sealing for stored OAuth credentials.
//!
//! Tokens are encrypted at rest with an authenticated cipher. The sealed
//! form is `nonce || ciphertext` with a fresh random 12-byte nonce per
//! seal. The key is derived (SHA-256) from a secret held only by the
//! server process; plaintext tokens exist in memory only at the point of
//! use and are never logged.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Nonce length for AES-GCM (12 bytes).
const NONCE_SIZE: usize = 12;

/// Random bytes backing an OAuth CSRF state token.
const STATE_TOKEN_BYTES: usize = 24;

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("Sealing failed")]
    SealFailed,

    #[error("Sealed payload is malformed")]
    InvalidFormat,

    #[error("Opening failed: wrong key or tampered payload")]
    OpenFailed,

    #[error("Decrypted payload is not valid UTF-8")]
    InvalidUtf8,
}

/// Authenticated cipher for sealing credentials at rest.
pub struct CredentialCipher {
    cipher: Aes256Gcm,
}

impl CredentialCipher {
    /// Build a cipher from an arbitrary-length secret, derived to a
    /// 256-bit key with SHA-256.
    pub fn new(secret: &str) -> Self {
        let mut key = [0u8; 32];
        key.copy_from_slice(&Sha256::digest(secret.as_bytes()));
        Self {
            cipher: Aes256Gcm::new(&key.into()),
        }
    }

    /// Seal a plaintext token. Returns `nonce || ciphertext`.
    pub fn seal(&self, plaintext: &str) -> Result<Vec<u8>, CryptoError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| CryptoError::SealFailed)?;

        let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    /// Open a sealed token produced by [`seal`](Self::seal).
    pub fn open(&self, sealed: &[u8]) -> Result<String, CryptoError> {
        if sealed.len() < NONCE_SIZE {
            return Err(CryptoError::InvalidFormat);
        }
        let (nonce, ciphertext) = sealed.split_at(NONCE_SIZE);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CryptoError::OpenFailed)?;
        String::from_utf8(plaintext).map_err(|_| CryptoError::InvalidUtf8)
    }
}

/// Generate a random OAuth CSRF state token (URL-safe, 32 chars).
pub fn state_token() -> String {
    let mut bytes = [0u8; STATE_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_open_round_trip() {
        let cipher = CredentialCipher::new("test-secret");
        let sealed = cipher.seal("AQXdkQyF9aT-access-token").unwrap();
        assert_eq!(cipher.open(&sealed).unwrap(), "AQXdkQyF9aT-access-token");
    }

    #[test]
    fn sealed_form_is_not_plaintext() {
        let cipher = CredentialCipher::new("test-secret");
        let sealed = cipher.seal("secret-token").unwrap();
        assert!(!sealed
            .windows(12)
            .any(|w| w == b"secret-token".as_slice()));
    }

    #[test]
    fn nonces_are_fresh_per_seal() {
        let cipher = CredentialCipher::new("test-secret");
        let a = cipher.seal("same").unwrap();
        let b = cipher.seal("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_key_fails_to_open() {
        let sealed = CredentialCipher::new("key-a").seal("token").unwrap();
        let err = CredentialCipher::new("key-b").open(&sealed).unwrap_err();
        assert!(matches!(err, CryptoError::OpenFailed));
    }

    #[test]
    fn tampered_payload_fails_to_open() {
        let cipher = CredentialCipher::new("test-secret");
        let mut sealed = cipher.seal("token").unwrap();
        let last = sealed.len() - 1;
        sealed[last] ^= 0x01;
        assert!(matches!(
            cipher.open(&sealed).unwrap_err(),
            CryptoError::OpenFailed
        ));
    }

    #[test]
    fn truncated_payload_is_invalid_format() {
        let cipher = CredentialCipher::new("test-secret");
        assert!(matches!(
            cipher.open(&[0u8; 4]).unwrap_err(),
            CryptoError::InvalidFormat
        ));
    }

    #[test]
    fn state_tokens_are_unique_and_url_safe() {
        let a = state_token();
        let b = state_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
