//! Register and numeric literal parsing shared by the builder and encoder.
//!
//! Literals accept decimal, `0x`-prefixed hex, and `0`-prefixed octal, the
//! same base-detection convention as the C standard library's `strtoull`
//! with a base of zero. An optional leading sign is also accepted: for the
//! unsigned parser a leading `-` negates the magnitude modulo 2^64 (mirroring
//! `strtoull`'s own quirk of accepting a sign), while the signed parser
//! treats it as an ordinary negative number.

use crate::error::AssembleError;

pub fn parse_register(token: &str) -> Result<u32, AssembleError> {
    let rest = token
        .strip_prefix('r')
        .or_else(|| token.strip_prefix('R'))
        .ok_or_else(|| AssembleError::InvalidRegister(token.to_owned()))?;
    let value: i64 = rest
        .parse()
        .map_err(|_| AssembleError::InvalidRegister(token.to_owned()))?;
    if !(0..=31).contains(&value) {
        return Err(AssembleError::InvalidRegister(token.to_owned()));
    }
    Ok(value as u32)
}

fn split_sign(token: &str) -> Option<(bool, &str)> {
    if token.is_empty() {
        return None;
    }
    match token.as_bytes()[0] {
        b'-' => Some((true, &token[1..])),
        b'+' => Some((false, &token[1..])),
        _ => Some((false, token)),
    }
}

fn radix_digits(s: &str) -> Option<(u32, &str)> {
    if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some((16, rest))
    } else if s.len() > 1 && s.starts_with('0') {
        Some((8, &s[1..]))
    } else {
        Some((10, s))
    }
}

fn parse_u64_opt(token: &str) -> Option<u64> {
    let (neg, rest) = split_sign(token)?;
    if rest.is_empty() {
        return None;
    }
    let (radix, digits) = radix_digits(rest)?;
    if digits.is_empty() {
        return None;
    }
    let magnitude = u64::from_str_radix(digits, radix).ok()?;
    Some(if neg { magnitude.wrapping_neg() } else { magnitude })
}

fn parse_i64_opt(token: &str) -> Option<i64> {
    let (neg, rest) = split_sign(token)?;
    if rest.is_empty() {
        return None;
    }
    let (radix, digits) = radix_digits(rest)?;
    if digits.is_empty() {
        return None;
    }
    let magnitude = i64::from_str_radix(digits, radix).ok()?;
    Some(if neg { -magnitude } else { magnitude })
}

pub fn parse_u64(token: &str) -> Result<u64, AssembleError> {
    parse_u64_opt(token).ok_or_else(|| AssembleError::InvalidImmediate(token.to_owned()))
}

/// An unsigned 12-bit field, used raw (not sign-extended) by `addi`/`subi`/
/// `shftri`/`shftli`/`priv`/`mov`'s immediate form.
pub fn parse_u12(token: &str) -> Result<u32, AssembleError> {
    let value = parse_u64(token)?;
    if value > 0xFFF {
        return Err(AssembleError::InvalidImmediate(token.to_owned()));
    }
    Ok(value as u32)
}

/// A signed 12-bit field, used by `brr`'s immediate form and memory
/// operand offsets.
pub fn parse_i12(token: &str) -> Result<i32, AssembleError> {
    let value = parse_i64_opt(token).ok_or_else(|| AssembleError::InvalidImmediate(token.to_owned()))?;
    if !(-2048..=2047).contains(&value) {
        return Err(AssembleError::InvalidImmediate(token.to_owned()));
    }
    Ok(value as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_accept_either_case_prefix() {
        assert_eq!(parse_register("r0").unwrap(), 0);
        assert_eq!(parse_register("R31").unwrap(), 31);
    }

    #[test]
    fn registers_reject_out_of_range_index() {
        assert!(parse_register("r32").is_err());
    }

    #[test]
    fn literals_accept_decimal_hex_and_octal() {
        assert_eq!(parse_u64("42").unwrap(), 42);
        assert_eq!(parse_u64("0x2A").unwrap(), 42);
        assert_eq!(parse_u64("052").unwrap(), 42);
    }

    #[test]
    fn u12_rejects_values_above_0xfff() {
        assert!(parse_u12("0x1000").is_err());
        assert_eq!(parse_u12("0xFFF").unwrap(), 0xFFF);
    }

    #[test]
    fn i12_accepts_the_full_signed_range() {
        assert_eq!(parse_i12("-2048").unwrap(), -2048);
        assert_eq!(parse_i12("2047").unwrap(), 2047);
        assert!(parse_i12("2048").is_err());
        assert!(parse_i12("-2049").is_err());
    }
}
