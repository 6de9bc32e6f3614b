//! Phone number normalization and lookup hashing
//!
//! Contacts are matched on (name, phone) during bulk import. The phone side
//! of the lookup key is a SHA-256 hash of the normalized number so that
//! formatting differences ("+1 555-000-1111" vs "15550001111") resolve to the
//! same contact.

use sha2::{Digest, Sha256};

/// Strip formatting down to digits (a leading `+` is dropped; it carries no
/// information once the country code digits are kept).
pub fn normalize(number: &str) -> String {
    number.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Lookup hash of a phone number: SHA-256 over the normalized digits
pub fn lookup_hash(number: &str) -> String {
    let normalized = normalize(number);
    format!("{:x}", Sha256::digest(normalized.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_formatting() {
        assert_eq!(normalize("+1 (555) 000-1111"), "15550001111");
        assert_eq!(normalize("555.000.2222"), "5550002222");
    }

    #[test]
    fn test_normalize_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("ext."), "");
    }

    #[test]
    fn test_lookup_hash_ignores_formatting() {
        assert_eq!(lookup_hash("+1 555-000-1111"), lookup_hash("15550001111"));
        assert_ne!(lookup_hash("15550001111"), lookup_hash("15550001112"));
    }

    #[test]
    fn test_lookup_hash_is_hex_sha256() {
        let hash = lookup_hash("15550001111");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
