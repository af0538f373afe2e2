//! Keystroke masks for phone numbers and postal codes.
//!
//! Each formatter re-derives its output from the digits alone, so feeding an
//! already-masked value back in yields the same value.

/// Length of a complete masked postal code (`DDDDD-DDD`).
pub const POSTAL_CODE_LEN: usize = 9;

const POSTAL_CODE_DIGITS: usize = 8;
const PHONE_DIGITS: usize = 11;

pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// `01310100` → `01310-100`; five or fewer digits pass through unmasked.
pub fn format_postal_code(raw: &str) -> String {
    let digits = digits_only(raw);
    if digits.len() <= 5 {
        return digits;
    }
    let end = digits.len().min(POSTAL_CODE_DIGITS);
    format!("{}-{}", &digits[..5], &digits[5..end])
}

pub fn is_complete_postal_code(formatted: &str) -> bool {
    formatted.len() == POSTAL_CODE_LEN
}

/// Progressive Brazilian phone mask:
///
/// | digits | output            |
/// |--------|-------------------|
/// | 0–2    | `DD`              |
/// | 3–6    | `(DD) DDDD`       |
/// | 7–10   | `(DD) DDDD-DDDD`  |
/// | 11+    | `(DD) DDDDD-DDDD` |
pub fn format_phone(raw: &str) -> String {
    let digits = digits_only(raw);
    let n = digits.len();

    if n <= 2 {
        digits
    } else if n <= 6 {
        format!("({}) {}", &digits[..2], &digits[2..])
    } else if n <= 10 {
        format!("({}) {}-{}", &digits[..2], &digits[2..6], &digits[6..])
    } else {
        format!(
            "({}) {}-{}",
            &digits[..2],
            &digits[2..7],
            &digits[7..PHONE_DIGITS]
        )
    }
}
