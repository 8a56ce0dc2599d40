//! Ed25519 signature keys.

use ed25519_dalek::SigningKey;

/// Multicodec prefix for an Ed25519 public key (`ed25519-pub`, 0xed).
pub const PUBLIC_CODEC: [u8; 2] = [0xed, 0x01];

/// Multicodec prefix for an Ed25519 private key (`ed25519-priv`, 0x1300).
pub const PRIVATE_CODEC: [u8; 2] = [0x80, 0x26];

/// Derive the verifying key for an Ed25519 secret key.
pub fn public_key(secret: &[u8; 32]) -> [u8; 32] {
    SigningKey::from_bytes(secret).verifying_key().to_bytes()
}
