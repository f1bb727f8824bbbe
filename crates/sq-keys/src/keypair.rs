use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use zeroize::Zeroize;

use crate::errors::{KeyError, Result};
use crate::sign::{SignedMessage, SIGNATURE_HEX_LEN};

/// Ed25519 seed / private key / public key length in bytes.
pub const KEY_LEN: usize = 32;

/// Ed25519 signature length in bytes.
pub const SIGNATURE_LEN: usize = 64;

/// An Ed25519 client identity.
///
/// The platform identifies a client by its public key; the private half
/// signs the single-use auth codes issued during authentication. The inner
/// signing key is zeroized on drop.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a fresh keypair from the OS CSPRNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Reconstruct a keypair from a 32-byte seed.
    pub fn from_seed_bytes(seed: &[u8; KEY_LEN]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Reconstruct a keypair from a base64-encoded private key.
    ///
    /// Fails if the input is not base64 or does not decode to exactly
    /// 32 bytes.
    pub fn from_base64(private_key_b64: &str) -> Result<Self> {
        let mut decoded = BASE64.decode(private_key_b64.trim())?;
        if decoded.len() != KEY_LEN {
            let actual = decoded.len();
            decoded.zeroize();
            return Err(KeyError::InvalidKeyLength { actual });
        }

        let mut seed = [0u8; KEY_LEN];
        seed.copy_from_slice(&decoded);
        decoded.zeroize();

        let keypair = Self::from_seed_bytes(&seed);
        seed.zeroize();
        Ok(keypair)
    }

    /// Sign a message with this identity.
    ///
    /// Ed25519 signing is deterministic: the same message and key always
    /// produce the same signature. The hex encoding is checked against the
    /// expected 128 characters rather than sliced to it.
    pub fn sign(&self, message: &str) -> Result<SignedMessage> {
        if message.is_empty() {
            return Err(KeyError::EmptyMessage);
        }

        let signature = self.signing_key.sign(message.as_bytes());
        let signature_hex = hex::encode(signature.to_bytes());
        if signature_hex.len() != SIGNATURE_HEX_LEN {
            return Err(KeyError::MalformedSignature {
                actual: signature_hex.len(),
            });
        }

        Ok(SignedMessage {
            signature_hex,
            public_key_base64: self.public_key_base64(),
        })
    }

    /// The Ed25519 verifying (public) key.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Raw 32-byte public key.
    pub fn public_key_bytes(&self) -> [u8; KEY_LEN] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Raw 32-byte seed. Callers are responsible for handling this
    /// securely.
    pub fn seed_bytes(&self) -> [u8; KEY_LEN] {
        self.signing_key.to_bytes()
    }

    /// Base64 (standard alphabet) public key, the form the token endpoint
    /// expects in its `key` field.
    pub fn public_key_base64(&self) -> String {
        BASE64.encode(self.public_key_bytes())
    }

    /// Base64 (standard alphabet) private key.
    pub fn private_key_base64(&self) -> String {
        BASE64.encode(self.seed_bytes())
    }

    /// Hex-encoded public key.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key_bytes())
    }

    /// Hex-encoded private key.
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.seed_bytes())
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair")
            .field("public_key", &self.public_key_base64())
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}
