//! Signed-integer payload transform shared by encode and decode.
//!
//! The wire format stores a nonzero integer as a sign-derived type code
//! plus the minimal big-endian bytes of its magnitude, one's-complemented
//! when negative. This module computes that magnitude (for both machine
//! `i64`s and arbitrary-precision [`BigInt`]s) and reverses the
//! transform on decode, including the small-vs-big promotion rule.

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::ToPrimitive;

use crate::error::{Error, Result};
use crate::marker::Marker;

/// Minimal big-endian magnitude bytes for a nonzero value, with sign.
/// `bytes` never has a leading zero byte and is always 1..=255 bytes long.
#[derive(Debug)]
pub(crate) struct Magnitude {
    pub negative: bool,
    pub bytes: Vec<u8>,
}

/// `None` for zero (callers special-case the `INT_ZERO` code separately).
pub(crate) fn magnitude_of_i64(n: i64) -> Option<Magnitude> {
    if n == 0 {
        return None;
    }
    let negative = n.is_negative();
    let mut bytes = n.unsigned_abs().to_be_bytes().to_vec();
    while bytes.len() > 1 && bytes[0] == 0 {
        bytes.remove(0);
    }
    Some(Magnitude { negative, bytes })
}

pub(crate) fn magnitude_of_bigint(n: &BigInt) -> Result<Option<Magnitude>> {
    if n.sign() == Sign::NoSign {
        return Ok(None);
    }
    let negative = n.sign() == Sign::Minus;
    let (_, bytes) = n.to_bytes_be();
    if bytes.len() > 255 {
        return Err(Error::IntegerTooLarge);
    }
    Ok(Some(Magnitude { negative, bytes }))
}

/// Write the type code and payload for a nonzero magnitude onto `out`.
pub(crate) fn encode_magnitude(out: &mut Vec<u8>, mag: &Magnitude) -> Result<()> {
    let len = mag.bytes.len();
    if len > 255 {
        return Err(Error::IntegerTooLarge);
    }
    if len <= 8 {
        out.push(
            Marker::SmallInt {
                negative: mag.negative,
                len,
            }
            .into_u8(),
        );
    } else if mag.negative {
        out.push(Marker::NegIntStart.into_u8());
        out.push(len as u8 ^ 0xFF);
    } else {
        out.push(Marker::PosIntEnd.into_u8());
        out.push(len as u8);
    }
    if mag.negative {
        out.extend(mag.bytes.iter().map(|b| !b));
    } else {
        out.extend_from_slice(&mag.bytes);
    }
    Ok(())
}

/// The result of decoding a nonzero integer's magnitude: promoted to a
/// machine `i64` when it fits, otherwise carried as a [`BigInt`].
pub(crate) enum DecodedInt {
    Small(i64),
    Big(BigInt),
}

/// `raw` is the payload exactly as it appears on the wire (already
/// one's-complemented for negative values, not yet un-inverted).
pub(crate) fn decode_magnitude(negative: bool, raw: &[u8]) -> DecodedInt {
    let unescaped: Vec<u8> = if negative {
        raw.iter().map(|b| !b).collect()
    } else {
        raw.to_vec()
    };
    let magnitude = BigUint::from_bytes_be(&unescaped);
    let signed = if negative {
        -BigInt::from(magnitude)
    } else {
        BigInt::from(magnitude)
    };
    match signed.to_i64() {
        Some(v) => DecodedInt::Small(v),
        None => DecodedInt::Big(signed),
    }
}
