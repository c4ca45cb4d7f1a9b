//! # Access-Key Generation
//!
//! Generates the unguessable keys behind package-access grants: 32 bytes
//! from the operating system's CSPRNG, hex-encoded. Uniqueness is
//! enforced by the database's unique index; the issuance path retries
//! generation on collision, bounded by [`MAX_KEY_ATTEMPTS`].

use rand_core::{OsRng, RngCore};

use wayfare_core::{ACCESS_KEY_BYTES, ACCESS_KEY_HEX_LEN};

/// Generation attempts before issuance fails. Collisions on a 256-bit key
/// are birthday-bounded far below any realistic grant count; the cap
/// exists so a broken index or RNG cannot loop forever.
pub const MAX_KEY_ATTEMPTS: u32 = 8;

/// Generate a fresh access key: 32 CSPRNG bytes, lowercase hex.
pub fn generate_access_key() -> String {
    let mut bytes = [0u8; ACCESS_KEY_BYTES];
    OsRng.fill_bytes(&mut bytes);
    let mut out = String::with_capacity(ACCESS_KEY_HEX_LEN);
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_has_expected_length_and_alphabet() {
        let key = generate_access_key();
        assert_eq!(key.len(), ACCESS_KEY_HEX_LEN);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(key, key.to_lowercase());
    }

    #[test]
    fn consecutive_keys_differ() {
        // Not a proof of unguessability, but catches a stuck RNG.
        let a = generate_access_key();
        let b = generate_access_key();
        assert_ne!(a, b);
    }
}
