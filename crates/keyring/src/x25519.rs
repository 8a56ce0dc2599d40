//! X25519 key agreement keys.

use curve25519_dalek::MontgomeryPoint;

/// Multicodec prefix for an X25519 public key (`x25519-pub`, 0xec).
pub const PUBLIC_CODEC: [u8; 2] = [0xec, 0x01];

/// Multicodec prefix for an X25519 private key (`x25519-priv`, 0x1302).
pub const PRIVATE_CODEC: [u8; 2] = [0x82, 0x26];

/// Derive the public key for an X25519 secret key. The secret is clamped per RFC 7748.
pub fn public_key(secret: &[u8; 32]) -> [u8; 32] {
    MontgomeryPoint::mul_base_clamped(*secret).to_bytes()
}
