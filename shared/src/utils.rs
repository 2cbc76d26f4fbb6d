//! # Shared Utility Functions
//!
//! Helpers for showing (and logging) wallet addresses and bearer tokens
//! without exposing them in full.
//!
//! ```rust
//! use shared::utils::{short_address, mask_token};
//!
//! assert_eq!(short_address("0x9f2c7a1b3d4e5f60718293a4b5c6d7e8f90141aa"), "0x9f2c...41aa");
//! assert_eq!(mask_token("eyJhbGciOiJIUzI1NiJ9.payload.sig"), "eyJh…(32)");
//! ```

/// Keep the first `prefix_len` and last `suffix_len` characters of an address.
///
/// Addresses too short to shorten meaningfully are returned unchanged.
pub fn format_address(address: &str, prefix_len: usize, suffix_len: usize) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= prefix_len + suffix_len {
        return address.to_string();
    }
    let prefix: String = chars[..prefix_len].iter().collect();
    let suffix: String = chars[chars.len() - suffix_len..].iter().collect();
    format!("{}...{}", prefix, suffix)
}

/// `0x` + 4 leading and 4 trailing characters for EVM addresses, 4/4 otherwise.
pub fn short_address(address: &str) -> String {
    if address.starts_with("0x") {
        format_address(address, 6, 4)
    } else {
        format_address(address, 4, 4)
    }
}

/// First four characters of a token plus its length, for log lines.
pub fn mask_token(token: &str) -> String {
    let head: String = token.chars().take(4).collect();
    format!("{}…({})", head, token.chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_address_evm_and_plain() {
        assert_eq!(short_address("0x1234567890abcdef"), "0x1234...cdef");
        assert_eq!(short_address("8W6QginkhTTxoP2deQjq7rZ9YMwN5FH9JYuLfSKuJKAL"), "8W6Q...JKAL");
    }

    #[test]
    fn test_short_inputs_untouched() {
        assert_eq!(format_address("abc", 4, 4), "abc");
        assert_eq!(short_address(""), "");
    }

    #[test]
    fn test_mask_token_hides_body() {
        assert_eq!(mask_token("abcdefgh"), "abcd…(8)");
        assert_eq!(mask_token("ab"), "ab…(2)");
    }
}
