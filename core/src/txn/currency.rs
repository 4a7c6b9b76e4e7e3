// Copyright (c) 2023 The Sia Foundation

//! Currency decoding and fixed-point formatting
//!
//! Currency values are encoded as big-endian unsigned integers of up to
//! [MAX_CURRENCY_LEN] bytes, and are converted to decimal by repeated
//! division of 64-bit limbs by ten.

use heapless::String;
use static_assertions::const_assert;

use super::error::Error;

/// Maximum currency length in bytes (~2^144)
pub const MAX_CURRENCY_LEN: usize = 18;

/// Maximum decimal digits for a currency value (2^144 has 44)
pub const MAX_DIGITS: usize = 48;

/// Maximum length of a formatted currency value
pub const MAX_FORMATTED_LEN: usize = MAX_DIGITS + 8;

/// Number of decimal places in one siacoin (1 SC = 10^24 hastings)
pub const SC_PRECISION: usize = 24;

const LIMBS: usize = (MAX_CURRENCY_LEN + 7) / 8;

/// Decimal digits of a decoded currency value
pub type Digits = String<MAX_DIGITS>;

/// Formatted currency value
pub type Formatted = String<MAX_FORMATTED_LEN>;

/// Divide the double-word `(hi, lo)` by 10, returning the quotient and remainder.
///
/// `hi` must be less than 10 so the quotient fits in a single word.
#[inline]
fn div_ww10(hi: u64, lo: u64) -> (u64, u64) {
    let n = ((hi as u128) << 64) | lo as u128;
    ((n / 10) as u64, (n % 10) as u64)
}

/// Divide a little-endian limb array by 10 in place, returning the remainder
fn quorem10(limbs: &mut [u64]) -> u64 {
    let mut r = 0;
    for l in limbs.iter_mut().rev() {
        let (q, rem) = div_ww10(r, *l);
        *l = q;
        r = rem;
    }
    r
}

/// Convert a big-endian currency value to its decimal representation
pub fn decode_currency(raw: &[u8]) -> Result<Digits, Error> {
    if raw.len() > MAX_CURRENCY_LEN {
        return Err(Error::CurrencyTooLarge);
    }

    // Load big-endian bytes into little-endian limbs
    let mut limbs = [0u64; LIMBS];
    for (i, b) in raw.iter().rev().enumerate() {
        limbs[i / 8] |= (*b as u64) << ((i % 8) * 8);
    }

    // Emit digits right-to-left
    let mut buff = [b'0'; MAX_DIGITS];
    let mut i = MAX_DIGITS;
    while limbs.iter().any(|l| *l != 0) {
        i -= 1;
        buff[i] = b'0' + quorem10(&mut limbs) as u8;
    }

    // Zero is rendered as a single digit
    if i == MAX_DIGITS {
        i -= 1;
    }

    let mut digits = Digits::new();
    for b in &buff[i..] {
        digits.push(*b as char).map_err(|_| Error::CurrencyTooLarge)?;
    }

    Ok(digits)
}

/// Siacoin unit suffix
const SC_SUFFIX: &str = " SC";

/// Siafund unit suffix
const SF_SUFFIX: &str = " SF";

// Any decoded value fits once scaled and suffixed
const_assert!(MAX_DIGITS + 1 + SC_SUFFIX.len() <= MAX_FORMATTED_LEN);
const_assert!(SC_PRECISION + 2 + SC_SUFFIX.len() <= MAX_FORMATTED_LEN);
const_assert!(MAX_DIGITS + SF_SUFFIX.len() <= MAX_FORMATTED_LEN);

/// Render decimal `digits` with a decimal point `precision` digits from
/// the right, trimming trailing fractional zeros, followed by `suffix`.
///
/// Fails with [Error::Format] if `digits` is not decimal or the untrimmed
/// result would exceed [MAX_FORMATTED_LEN].
pub fn scale_to_fixed_point(
    digits: &str,
    precision: usize,
    suffix: &str,
) -> Result<Formatted, Error> {
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::Format);
    }

    let n = if digits.len() > precision {
        digits.len() + 1
    } else {
        precision + 2
    };
    if n + suffix.len() > MAX_FORMATTED_LEN {
        return Err(Error::Format);
    }

    Ok(fixed_point(digits, precision, suffix))
}

/// Fixed-point rendering, callers ensure the result fits
fn fixed_point(digits: &str, precision: usize, suffix: &str) -> Formatted {
    let mut s = Formatted::new();

    // Integer part
    let frac_start = if digits.len() > precision {
        let _ = s.push_str(&digits[..digits.len() - precision]);
        digits.len() - precision
    } else {
        let _ = s.push('0');
        0
    };

    // Fractional part, padded with leading zeros
    let _ = s.push('.');
    for _ in digits.len()..precision {
        let _ = s.push('0');
    }
    let _ = s.push_str(&digits[frac_start..]);

    // Trim trailing zeros and dangling decimal point
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }

    let _ = s.push_str(suffix);

    s
}

/// Format a hastings value as siacoins
pub fn format_sc(digits: &Digits) -> Formatted {
    fixed_point(digits, SC_PRECISION, SC_SUFFIX)
}

/// Format a siafund value
pub fn format_sf(digits: &Digits) -> Formatted {
    let mut s = Formatted::new();
    let _ = s.push_str(digits);
    let _ = s.push_str(SF_SUFFIX);
    s
}
