use rand::Rng;

/// Human-recognizable prefix on every promo code.
pub const PROMO_PREFIX: &str = "PROMO-";

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_SUFFIX_LEN: usize = 4;

/// Generate a random promo code like `PROMO-A7X3`. Uniqueness is the
/// caller's concern (retry against the store on collision).
pub fn generate_promo_code() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..CODE_SUFFIX_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect();
    format!("{PROMO_PREFIX}{suffix}")
}

/// Codes are matched case-insensitively and with surrounding whitespace
/// ignored.
pub fn normalize_promo_code(input: &str) -> String {
    input.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_promo_code_format() {
        let code = generate_promo_code();
        assert!(code.starts_with(PROMO_PREFIX));
        let suffix = &code[PROMO_PREFIX.len()..];
        assert_eq!(suffix.len(), CODE_SUFFIX_LEN);
        assert!(suffix
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
    }

    #[test]
    fn test_normalize_promo_code() {
        assert_eq!(normalize_promo_code("  promo-a7x3 "), "PROMO-A7X3");
        assert_eq!(normalize_promo_code("PROMO-A7X3"), "PROMO-A7X3");
    }

    #[test]
    fn test_generated_code_is_already_normalized() {
        let code = generate_promo_code();
        assert_eq!(normalize_promo_code(&code), code);
    }
}
