//! # Object Identifiers
//!
//! Nxt identifies accounts, assets, currencies and transactions with 64-bit
//! values. The API prints them as *unsigned* decimal strings, so half of the
//! identifier space does not fit an `i64` textually. We keep identifiers as
//! raw `i64` bit patterns and reinterpret on the way in and out:
//!
//! ```text
//! "18446744073709551615"  ->  -1i64  ->  "18446744073709551615"
//! ```
//!
//! Accounts additionally have a checksummed human form, the Reed-Solomon
//! string `NXT-XXXX-XXXX-XXXX-XXXXX`: 13 base-32 data symbols and 4 parity
//! symbols over GF(32), shuffled into display order.

use crate::config::ACCOUNT_PREFIX;
use crate::error::NxtError;

// ---------------------------------------------------------------------------
// Decimal Form
// ---------------------------------------------------------------------------

/// Parse an identifier from its decimal text.
///
/// Accepts the unsigned form up to `u64::MAX` (reinterpreted as two's
/// complement) as well as an explicit negative `i64`. Only non-integer text
/// is rejected.
///
/// ```
/// use nxt_core::identifier::parse_id;
///
/// assert_eq!(parse_id("18446744073709551615").unwrap(), -1);
/// assert_eq!(parse_id("42").unwrap(), 42);
/// assert!(parse_id("12ab").is_err());
/// ```
pub fn parse_id(text: &str) -> Result<i64, NxtError> {
    parse_id_field("id", text)
}

pub(crate) fn parse_id_field(field: &str, text: &str) -> Result<i64, NxtError> {
    let parsed = if text.starts_with('-') {
        text.parse::<i64>().ok()
    } else {
        text.parse::<u64>().ok().map(|v| v as i64)
    };
    parsed.ok_or_else(|| NxtError::Identifier {
        field: field.to_string(),
        value: text.to_string(),
    })
}

/// Format an identifier as the unsigned decimal string the API uses.
pub fn id_string(id: i64) -> String {
    (id as u64).to_string()
}

// ---------------------------------------------------------------------------
// Reed-Solomon Form
// ---------------------------------------------------------------------------

const ALPHABET: &[u8; 32] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZ";

/// Powers of the GF(32) generator (primitive polynomial x^5 + x^2 + 1).
const GEXP: [u8; 32] = [
    1, 2, 4, 8, 16, 5, 10, 20, 13, 26, 17, 7, 14, 28, 29, 31, 27, 19, 3, 6, 12, 24, 21, 15, 30,
    25, 23, 11, 22, 9, 18, 1,
];

/// Discrete logarithms, the inverse of [`GEXP`].
const GLOG: [u8; 32] = [
    0, 0, 1, 18, 2, 5, 19, 11, 3, 29, 6, 27, 20, 8, 12, 23, 4, 10, 30, 17, 7, 22, 28, 26, 21, 25,
    9, 16, 13, 14, 24, 15,
];

/// Display position -> codeword index.
const CODEWORD_MAP: [usize; CODEWORD_LENGTH] = [3, 2, 1, 0, 7, 6, 5, 4, 13, 14, 15, 16, 12, 8, 9, 10, 11];

const DATA_SYMBOLS: usize = 13;
const CODEWORD_LENGTH: usize = 17;

fn gmult(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    let idx = (GLOG[a as usize] as usize + GLOG[b as usize] as usize) % 31;
    GEXP[idx]
}

fn codeword_is_valid(codeword: &[u8; CODEWORD_LENGTH]) -> bool {
    let mut sum = 0u8;
    for i in 1..5 {
        let mut t = 0u8;
        for j in 0..31usize {
            // The codeword is a shortened RS(31) code: positions 13..=26 are
            // implicitly zero.
            if j > 12 && j < 27 {
                continue;
            }
            let pos = if j > 26 { j - 14 } else { j };
            t ^= gmult(codeword[pos], GEXP[(i * j) % 31]);
        }
        sum |= t;
    }
    sum == 0
}

/// Append the four parity symbols and render the display string.
fn render_codeword(data: &[u8; DATA_SYMBOLS]) -> String {
    let mut codeword = [0u8; CODEWORD_LENGTH];
    codeword[..DATA_SYMBOLS].copy_from_slice(data);

    let mut p = [0u8; 4];
    for i in (0..DATA_SYMBOLS).rev() {
        let fb = codeword[i] ^ p[3];
        p[3] = p[2] ^ gmult(30, fb);
        p[2] = p[1] ^ gmult(6, fb);
        p[1] = p[0] ^ gmult(9, fb);
        p[0] = gmult(17, fb);
    }
    codeword[DATA_SYMBOLS..].copy_from_slice(&p);

    let mut out = String::with_capacity(ACCOUNT_PREFIX.len() + CODEWORD_LENGTH + 3);
    out.push_str(ACCOUNT_PREFIX);
    for (i, &index) in CODEWORD_MAP.iter().enumerate() {
        out.push(ALPHABET[codeword[index] as usize] as char);
        if i & 3 == 3 && i < DATA_SYMBOLS {
            out.push('-');
        }
    }
    out
}

/// Render an account identifier in Reed-Solomon form.
///
/// ```
/// use nxt_core::identifier::to_rs;
///
/// assert_eq!(to_rs(0), "NXT-2222-2222-2222-22222");
/// ```
pub fn to_rs(id: i64) -> String {
    let mut value = id as u64;
    let mut data = [0u8; DATA_SYMBOLS];
    for symbol in data.iter_mut() {
        *symbol = (value & 31) as u8;
        value >>= 5;
    }
    render_codeword(&data)
}

/// Parse a Reed-Solomon account string back into its identifier.
///
/// The `NXT-` prefix is optional and case is ignored. Dashes are separators.
/// Any other character outside the alphabet, a symbol count other than 17,
/// or a value beyond 64 bits is [`NxtError::MalformedAccount`]; a
/// well-formed string whose parity symbols disagree with its data is
/// [`NxtError::AccountChecksum`].
pub fn from_rs(text: &str) -> Result<i64, NxtError> {
    let upper = text.trim().to_ascii_uppercase();
    let body = upper.strip_prefix(ACCOUNT_PREFIX).unwrap_or(&upper);

    let mut codeword = [0u8; CODEWORD_LENGTH];
    let mut length = 0usize;
    for ch in body.bytes() {
        if ch == b'-' {
            continue;
        }
        let position = ALPHABET
            .iter()
            .position(|&a| a == ch)
            .ok_or_else(|| NxtError::MalformedAccount(text.to_string()))?;
        if length == CODEWORD_LENGTH {
            return Err(NxtError::MalformedAccount(text.to_string()));
        }
        codeword[CODEWORD_MAP[length]] = position as u8;
        length += 1;
    }
    if length != CODEWORD_LENGTH {
        return Err(NxtError::MalformedAccount(text.to_string()));
    }
    if !codeword_is_valid(&codeword) {
        return Err(NxtError::AccountChecksum(text.to_string()));
    }

    let value = codeword[..DATA_SYMBOLS]
        .iter()
        .rev()
        .fold(0u128, |acc, &symbol| (acc << 5) | symbol as u128);
    u64::try_from(value)
        .map(|v| v as i64)
        .map_err(|_| NxtError::MalformedAccount(text.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn unsigned_overflow_reinterprets_as_twos_complement() {
        assert_eq!(parse_id("18446744073709551615").unwrap(), -1);
        assert_eq!(
            parse_id("9223372036854775808").unwrap(),
            i64::MIN,
            "2^63 maps to i64::MIN"
        );
    }

    #[test]
    fn negative_text_is_accepted() {
        assert_eq!(parse_id("-5").unwrap(), -5);
    }

    #[test]
    fn non_integer_text_is_rejected() {
        for bad in ["", "abc", "1.5", "--1"] {
            assert!(
                matches!(parse_id(bad), Err(NxtError::Identifier { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn text_wider_than_64_bits_is_rejected() {
        assert!(parse_id("18446744073709551616").is_err());
    }

    #[test]
    fn id_string_is_unsigned() {
        assert_eq!(id_string(-1), "18446744073709551615");
        assert_eq!(id_string(12345), "12345");
    }

    #[test]
    fn zero_account_renders_all_twos() {
        assert_eq!(to_rs(0), "NXT-2222-2222-2222-22222");
        assert_eq!(from_rs("NXT-2222-2222-2222-22222").unwrap(), 0);
    }

    #[test]
    fn rs_roundtrip_random_ids() {
        let mut rng = rand::thread_rng();
        for _ in 0..500 {
            let id: i64 = rng.gen();
            let rs = to_rs(id);
            assert_eq!(from_rs(&rs).unwrap(), id, "roundtrip failed for {rs}");
        }
        for id in [1, -1, i64::MAX, i64::MIN] {
            assert_eq!(from_rs(&to_rs(id)).unwrap(), id);
        }
    }

    #[test]
    fn rs_prefix_and_case_are_optional() {
        let rs = to_rs(7_777_777);
        let bare = rs.trim_start_matches(ACCOUNT_PREFIX).to_lowercase();
        assert_eq!(from_rs(&bare).unwrap(), 7_777_777);
    }

    #[test]
    fn single_symbol_change_fails_checksum() {
        let rs = to_rs(1_234_567_890_123);
        let mut chars: Vec<char> = rs.chars().collect();
        let idx = ACCOUNT_PREFIX.len();
        chars[idx] = if chars[idx] == '2' { '3' } else { '2' };
        let corrupted: String = chars.into_iter().collect();
        assert!(matches!(
            from_rs(&corrupted),
            Err(NxtError::AccountChecksum(_))
        ));
    }

    #[test]
    fn malformed_strings_are_distinguished_from_bad_checksums() {
        // 'O' and '1' are not in the alphabet.
        assert!(matches!(
            from_rs("NXT-OOOO-2222-2222-22222"),
            Err(NxtError::MalformedAccount(_))
        ));
        assert!(matches!(
            from_rs("NXT-2222-2222-2222"),
            Err(NxtError::MalformedAccount(_))
        ));
        assert!(matches!(
            from_rs("NXT-2222-2222-2222-222222"),
            Err(NxtError::MalformedAccount(_))
        ));
    }

    #[test]
    fn valid_codeword_beyond_64_bits_is_malformed() {
        let rendered = render_codeword(&[31; DATA_SYMBOLS]);
        assert!(matches!(
            from_rs(&rendered),
            Err(NxtError::MalformedAccount(_))
        ));
    }
}
