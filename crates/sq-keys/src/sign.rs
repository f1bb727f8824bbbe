use crate::errors::Result;
use crate::keypair::{Keypair, SIGNATURE_LEN};

/// Hex length of an encoded Ed25519 signature.
pub const SIGNATURE_HEX_LEN: usize = SIGNATURE_LEN * 2;

/// What the token exchange submits: the hex signature over the auth code
/// and the base64 public key it verifies against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedMessage {
    pub signature_hex: String,
    pub public_key_base64: String,
}

/// Sign `message` with a base64-encoded private key.
///
/// Pure function of its inputs: no I/O, no clock, no randomness. Fails if
/// the message is empty or the key material does not decode to a 32-byte
/// Ed25519 key.
pub fn sign(message: &str, private_key_b64: &str) -> Result<SignedMessage> {
    Keypair::from_base64(private_key_b64)?.sign(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::KeyError;
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
    use ed25519_dalek::{Signature, Verifier};

    #[test]
    fn test_signature_has_expected_hex_length() {
        let kp = Keypair::generate();
        let signed = kp.sign("AC1").unwrap();
        assert_eq!(signed.signature_hex.len(), SIGNATURE_HEX_LEN);
        assert_eq!(signed.public_key_base64, kp.public_key_base64());
    }

    #[test]
    fn test_signing_is_deterministic() {
        let kp = Keypair::generate();
        let first = kp.sign("the same auth code").unwrap();
        let second = kp.sign("the same auth code").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_signature_verifies_against_public_key() {
        let kp = Keypair::generate();
        let signed = kp.sign("challenge payload").unwrap();

        let sig_bytes: [u8; SIGNATURE_LEN] = hex::decode(&signed.signature_hex)
            .unwrap()
            .try_into()
            .unwrap();
        let signature = Signature::from_bytes(&sig_bytes);

        kp.verifying_key()
            .verify(b"challenge payload", &signature)
            .expect("signature must verify");
    }

    #[test]
    fn test_free_function_matches_keypair_method() {
        let kp = Keypair::generate();
        let via_method = kp.sign("AC1").unwrap();
        let via_function = sign("AC1", &kp.private_key_base64()).unwrap();
        assert_eq!(via_method, via_function);
    }

    #[test]
    fn test_empty_message_is_rejected() {
        let kp = Keypair::generate();
        assert!(matches!(kp.sign(""), Err(KeyError::EmptyMessage)));
    }

    #[test]
    fn test_sign_rejects_undersized_key() {
        let short = BASE64.encode([1u8; 31]);
        let result = sign("AC1", &short);
        assert!(matches!(
            result,
            Err(KeyError::InvalidKeyLength { actual: 31 })
        ));
    }
}
