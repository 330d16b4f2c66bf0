//! The element decoder: reads one tuple element at a time from a byte
//! slice, advancing a caller-owned cursor.

use byteorder::{BigEndian, ByteOrder};
use num_bigint::{BigInt, BigUint};
use uuid::Uuid;

use crate::element::Element;
use crate::error::{Error, Result};
use crate::float::{adjust_float_bytes, Float32, Float64};
use crate::integer::{self, DecodedInt};
use crate::marker::{self, Marker};
use crate::versionstamp::{UnboundVersionstamp, Versionstamp};

/// Read one element starting at `*cursor`, advancing it past the element.
///
/// `vs_hint` is the offset of a versionstamp's 10-byte transaction-version
/// field known (by the caller) to still be unbound; `strict` controls
/// whether floats carry their exact wire bytes for idempotent re-encoding.
pub(crate) fn decode(
    buf: &[u8],
    cursor: &mut usize,
    vs_hint: Option<usize>,
    strict: bool,
) -> Result<Element> {
    let code = read_byte(buf, cursor)?;
    match Marker::from_u8(code) {
        Some(Marker::Nil) => Ok(Element::Nil),
        Some(Marker::BoolFalse) => Ok(Element::Bool(false)),
        Some(Marker::BoolTrue) => Ok(Element::Bool(true)),
        Some(Marker::Bytes) => Ok(Element::Bytes(decode_escaped(buf, cursor)?)),
        Some(Marker::Text) => {
            let bytes = decode_escaped(buf, cursor)?;
            let text = String::from_utf8(bytes).map_err(|e| Error::from(e.utf8_error()))?;
            Ok(Element::Text(text))
        }
        Some(Marker::Nested) => decode_nested(buf, cursor, vs_hint, strict),
        Some(Marker::IntZero) => Ok(Element::Int(0)),
        Some(Marker::PosIntEnd) => decode_extended_int(buf, cursor, false),
        Some(Marker::NegIntStart) => decode_extended_int(buf, cursor, true),
        Some(Marker::Float32) => decode_float32(buf, cursor, strict),
        Some(Marker::Float64) => decode_float64(buf, cursor, strict),
        Some(Marker::Uuid) => decode_uuid(buf, cursor),
        Some(Marker::Versionstamp) => decode_versionstamp(buf, cursor, vs_hint),
        Some(Marker::SmallInt { negative, len }) => decode_small_int(buf, cursor, negative, len),
        None => Err(Error::InvalidTypeCode(code)),
    }
}

fn read_byte(buf: &[u8], cursor: &mut usize) -> Result<u8> {
    let b = *buf.get(*cursor).ok_or(Error::TruncatedInput)?;
    *cursor += 1;
    Ok(b)
}

fn read_bytes<'a>(buf: &'a [u8], cursor: &mut usize, n: usize) -> Result<&'a [u8]> {
    let end = cursor.checked_add(n).ok_or(Error::TruncatedInput)?;
    let slice = buf.get(*cursor..end).ok_or(Error::TruncatedInput)?;
    *cursor = end;
    Ok(slice)
}

/// Reads a null-escaped payload up to (and past) its terminator: a lone
/// `0x00` ends the payload, a `0x00 0xFF` pair decodes to a literal `0x00`.
fn decode_escaped(buf: &[u8], cursor: &mut usize) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    loop {
        let b = read_byte(buf, cursor)?;
        if b == Marker::Nil.into_u8() {
            if buf.get(*cursor) == Some(&marker::ESCAPE) {
                *cursor += 1;
                out.push(0x00);
                continue;
            }
            break;
        }
        out.push(b);
    }
    Ok(out)
}

fn decode_nested(
    buf: &[u8],
    cursor: &mut usize,
    vs_hint: Option<usize>,
    strict: bool,
) -> Result<Element> {
    let mut children = Vec::new();
    loop {
        match buf.get(*cursor) {
            None => return Err(Error::TruncatedInput),
            Some(&code) if code == Marker::Nil.into_u8() => {
                if buf.get(*cursor + 1) == Some(&marker::ESCAPE) {
                    *cursor += 2;
                    children.push(Element::Nil);
                } else {
                    *cursor += 1;
                    break;
                }
            }
            _ => children.push(decode(buf, cursor, vs_hint, strict)?),
        }
    }
    Ok(Element::Nested(children))
}

fn decode_small_int(buf: &[u8], cursor: &mut usize, negative: bool, len: usize) -> Result<Element> {
    let raw = read_bytes(buf, cursor, len)?;
    match integer::decode_magnitude(negative, raw) {
        DecodedInt::Small(v) => Ok(Element::Int(v)),
        DecodedInt::Big(v) => Ok(Element::BigInt(v)),
    }
}

/// The extended-length frame (`0x1D`/`0x0B`): length always exceeds 8, so
/// this never demotes to a machine integer.
fn decode_extended_int(buf: &[u8], cursor: &mut usize, negative: bool) -> Result<Element> {
    let len_byte = read_byte(buf, cursor)?;
    let len = if negative {
        (len_byte ^ 0xFF) as usize
    } else {
        len_byte as usize
    };
    let raw = read_bytes(buf, cursor, len)?;
    let unescaped: Vec<u8> = if negative {
        raw.iter().map(|b| !b).collect()
    } else {
        raw.to_vec()
    };
    let magnitude = BigUint::from_bytes_be(&unescaped);
    let value = if negative {
        -BigInt::from(magnitude)
    } else {
        BigInt::from(magnitude)
    };
    Ok(Element::BigInt(value))
}

fn decode_float32(buf: &[u8], cursor: &mut usize, strict: bool) -> Result<Element> {
    let raw = read_bytes(buf, cursor, 4)?;
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(raw);
    adjust_float_bytes(&mut bytes, false);
    let value = f32::from_be_bytes(bytes);
    let f = if strict {
        Float32 {
            value,
            raw_encoding: Some(bytes),
        }
    } else {
        Float32::new(value)
    };
    Ok(Element::Float32(f))
}

fn decode_float64(buf: &[u8], cursor: &mut usize, strict: bool) -> Result<Element> {
    let raw = read_bytes(buf, cursor, 8)?;
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(raw);
    adjust_float_bytes(&mut bytes, false);
    let value = f64::from_be_bytes(bytes);
    let f = if strict {
        Float64 {
            value,
            raw_encoding: Some(bytes),
        }
    } else {
        Float64::new(value)
    };
    Ok(Element::Float64(f))
}

fn decode_uuid(buf: &[u8], cursor: &mut usize) -> Result<Element> {
    let raw = read_bytes(buf, cursor, 16)?;
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(raw);
    Ok(Element::Uuid(Uuid::from_bytes(bytes)))
}

/// A versionstamp is unbound if `vs_hint` points at it, or if its
/// transaction-version bytes are the all-`0xFF` placeholder sentinel.
fn decode_versionstamp(buf: &[u8], cursor: &mut usize, vs_hint: Option<usize>) -> Result<Element> {
    let stamp_start = *cursor;
    let raw = read_bytes(buf, cursor, 12)?;
    let mut bytes = [0u8; 12];
    bytes.copy_from_slice(raw);
    let is_unbound = vs_hint == Some(stamp_start) || bytes[..10].iter().all(|&b| b == 0xFF);
    if is_unbound {
        let code = BigEndian::read_u16(&bytes[10..]);
        Ok(Element::UnboundVersionstamp(UnboundVersionstamp {
            code: Some(code),
        }))
    } else {
        Ok(Element::Versionstamp(Versionstamp::from_bytes(&bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_one(buf: &[u8]) -> Element {
        let mut cursor = 0;
        let elem = decode(buf, &mut cursor, None, false).unwrap();
        assert_eq!(cursor, buf.len());
        elem
    }

    #[test]
    fn nil_and_bool() {
        assert_eq!(decode_one(&[0x00]), Element::Nil);
        assert_eq!(decode_one(&[0x26]), Element::Bool(false));
        assert_eq!(decode_one(&[0x27]), Element::Bool(true));
    }

    #[test]
    fn bytes_unescapes_embedded_nulls() {
        let elem = decode_one(&[0x01, 0x01, 0x00, 0xff, 0x02, 0x00]);
        assert_eq!(elem, Element::Bytes(vec![0x01, 0x00, 0x02]));
    }

    #[test]
    fn text_decodes_utf8() {
        let elem = decode_one(&[0x02, b'h', b'i', 0x00]);
        assert_eq!(elem, Element::Text("hi".to_string()));
    }

    #[test]
    fn invalid_utf8_text_is_an_error() {
        let mut cursor = 0;
        let err = decode(&[0x02, 0xff, 0xfe, 0x00], &mut cursor, None, false).unwrap_err();
        assert!(matches!(err, Error::InvalidUtf8(_)));
    }

    #[test]
    fn nested_unescapes_nil_child() {
        let elem = decode_one(&[0x05, 0x00, 0xff, 0x27, 0x00]);
        assert_eq!(
            elem,
            Element::Nested(vec![Element::Nil, Element::Bool(true)])
        );
    }

    #[test]
    fn small_ints_round_trip() {
        assert_eq!(decode_one(&[0x14]), Element::Int(0));
        assert_eq!(
            decode_one(&[0x11, 0xab, 0x4b, 0x93]),
            Element::Int(-5551212)
        );
        assert_eq!(
            decode_one(&[0x1c, 0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]),
            Element::Int(0x7fffffffffffffffi64)
        );
    }

    #[test]
    fn extended_frame_always_yields_bigint() {
        let mut payload = vec![0x1D, 9];
        payload.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(decode_one(&payload), Element::BigInt(BigInt::from(1u8)));
    }

    #[test]
    fn truncated_input_is_an_error() {
        let mut cursor = 0;
        let err = decode(&[0x01, b'h'], &mut cursor, None, false).unwrap_err();
        assert_eq!(err, Error::TruncatedInput);
    }

    #[test]
    fn unrecognized_code_is_an_error() {
        let mut cursor = 0;
        let err = decode(&[0x99], &mut cursor, None, false).unwrap_err();
        assert_eq!(err, Error::InvalidTypeCode(0x99));
    }

    #[test]
    fn strict_float_preserves_nan_bit_pattern() {
        let payload = [0x21, 0x00, 0x07, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff];
        let mut cursor = 0;
        let elem = decode(&payload, &mut cursor, None, true).unwrap();
        match &elem {
            Element::Float64(f) => assert!(f.value.is_nan()),
            _ => panic!("expected a float"),
        }
        let mut out = crate::buffer::Buffer::new();
        let mut vs = crate::element::VsState::default();
        crate::element::encode(&mut out, &elem, 0, &mut vs).unwrap();
        assert_eq!(out.finish(), payload);
    }

    #[test]
    fn uuid_round_trips() {
        let bytes = [0xAB; 16];
        let mut payload = vec![0x30];
        payload.extend_from_slice(&bytes);
        assert_eq!(decode_one(&payload), Element::Uuid(Uuid::from_bytes(bytes)));
    }

    #[test]
    fn all_ff_versionstamp_is_unbound_without_a_hint() {
        let mut payload = vec![0x33];
        payload.extend_from_slice(&[0xFF; 10]);
        payload.extend_from_slice(&[0x00, 0x05]);
        let elem = decode_one(&payload);
        assert_eq!(
            elem,
            Element::UnboundVersionstamp(UnboundVersionstamp { code: Some(5) })
        );
    }

    #[test]
    fn bound_versionstamp_decodes_as_such() {
        let mut payload = vec![0x33];
        payload.extend_from_slice(&[1; 10]);
        payload.extend_from_slice(&[0, 2]);
        let elem = decode_one(&payload);
        assert_eq!(
            elem,
            Element::Versionstamp(Versionstamp::new([1; 10], [0, 2]))
        );
    }
}
