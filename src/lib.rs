//! Order-preserving tuple encoding compatible with the FoundationDB tuple
//! layer.
//!
//! A [`Element`] is one value in a heterogeneous, ordered sequence. Packing
//! a sequence of elements ([`pack`]) produces a byte string whose unsigned
//! lexicographic order matches the logical order of the tuples it encodes —
//! this is what makes the format suitable as a key encoding for an ordered
//! key-value store. [`unpack`] reverses the process.
//!
//! ```
//! use fdb_tuple::Element;
//!
//! let bytes = fdb_tuple::pack(&[Element::from("hi"), Element::from(5i64)]).unwrap();
//! let elements = fdb_tuple::unpack(&bytes, false).unwrap();
//! assert_eq!(elements, vec![Element::from("hi"), Element::from(5i64)]);
//! ```

mod buffer;
mod decode;
mod element;
mod error;
mod float;
mod integer;
mod marker;
mod versionstamp;

pub use element::Element;
pub use error::{Error, Result};
pub use float::{Float32, Float64};
pub use versionstamp::{UnboundVersionstamp, Versionstamp};

use buffer::Buffer;
use element::VsState;

/// Pack a sequence of elements into its wire encoding.
///
/// Fails with [`Error::IncompleteVersionstamp`] if `elements` contains an
/// [`Element::UnboundVersionstamp`] — use [`pack_unbound_versionstamp`] for
/// those instead.
pub fn pack(elements: &[Element]) -> Result<Vec<u8>> {
    let (buf, vs) = pack_inner(elements)?;
    if vs.stamp_offset.is_some() {
        return Err(Error::IncompleteVersionstamp);
    }
    Ok(buf.finish())
}

/// The result of packing a tuple that contains exactly one unbound
/// versionstamp: the buffer, the offset of its 10-byte transaction-version
/// field, and — if the placeholder didn't carry its own user code — the
/// offset of the 2-byte user-version field still waiting to be filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedWithVersionstamp {
    pub data: Vec<u8>,
    pub stamp_offset: usize,
    pub code_offset: Option<usize>,
}

/// Pack a sequence of elements containing exactly one
/// [`Element::UnboundVersionstamp`], returning the offsets needed to bake
/// in the transaction's committed version later (see
/// [`bake_versionstamp`]).
///
/// Fails with [`Error::UnexpectedVersionstamp`] if no unbound versionstamp
/// is present, or [`Error::DuplicateVersionstamp`] if more than one is.
pub fn pack_unbound_versionstamp(elements: &[Element]) -> Result<PackedWithVersionstamp> {
    let (buf, vs) = pack_inner(elements)?;
    let stamp_offset = vs.stamp_offset.ok_or(Error::UnexpectedVersionstamp)?;
    Ok(PackedWithVersionstamp {
        data: buf.finish(),
        stamp_offset,
        code_offset: vs.code_offset,
    })
}

fn pack_inner(elements: &[Element]) -> Result<(Buffer, VsState)> {
    let mut buf = Buffer::new();
    let mut vs = VsState::default();
    for elem in elements {
        element::encode(&mut buf, elem, 0, &mut vs)?;
    }
    Ok((buf, vs))
}

/// Unpack a byte string into its sequence of elements.
///
/// In `strict` mode, floats retain their exact wire bytes so that
/// re-packing the result reproduces `buf` byte-for-byte, even across NaN
/// payloads and negative zero. Fails with [`Error::TruncatedInput`] if
/// `buf` ends mid-element, [`Error::InvalidTypeCode`] for an unassigned
/// type byte, or [`Error::InvalidUtf8`] for a malformed `Text` payload.
pub fn unpack(buf: &[u8], strict: bool) -> Result<Vec<Element>> {
    let mut cursor = 0;
    let mut elements = Vec::new();
    while cursor < buf.len() {
        elements.push(decode::decode(buf, &mut cursor, None, strict)?);
    }
    Ok(elements)
}

/// The half-open byte range `[begin, end)` of every key whose tuple
/// encoding starts with `prefix`.
pub struct Range {
    pub begin: Vec<u8>,
    pub end: Vec<u8>,
}

/// Compute the key range covering every tuple with `prefix` as a prefix:
/// `begin = pack(prefix) ++ 0x00`, `end = pack(prefix) ++ 0xFF`.
pub fn range(prefix: &[Element]) -> Result<Range> {
    let packed = pack(prefix)?;
    let mut begin = packed.clone();
    begin.push(0x00);
    let mut end = packed;
    end.push(0xFF);
    Ok(Range { begin, end })
}

/// Rewrite every [`Element::UnboundVersionstamp`] in `elements` (including
/// ones nested inside [`Element::Nested`]) to a bound [`Element::Versionstamp`]
/// carrying `transaction_version`. Each placeholder's own user code wins if
/// it has one; otherwise `default_code` is used.
///
/// Fails with [`Error::MissingCode`] if a placeholder has no code and
/// `default_code` is `None`.
pub fn bake_versionstamp(
    elements: &mut [Element],
    transaction_version: [u8; 10],
    default_code: Option<[u8; 2]>,
) -> Result<()> {
    versionstamp::bake(elements, transaction_version, default_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    #[test]
    fn pack_then_unpack_round_trips_a_mixed_tuple() {
        let elements = vec![
            Element::from("hi"),
            Element::Nil,
            Element::from("\u{1F47E}"),
            Element::Int(321),
            Element::Int(0),
            Element::Int(-100),
        ];
        let packed = pack(&elements).unwrap();
        assert_eq!(unpack(&packed, false).unwrap(), elements);
    }

    #[test]
    fn pack_is_prefix_composable() {
        let a = [Element::Bool(true)];
        let b = [Element::Int(5)];
        let combined: Vec<Element> = a.iter().chain(b.iter()).cloned().collect();
        let mut expected = pack(&a).unwrap();
        expected.extend(pack(&b).unwrap());
        assert_eq!(pack(&combined).unwrap(), expected);
    }

    #[test]
    fn range_of_a_single_element_prefix() {
        let r = range(&[Element::from("x")]).unwrap();
        assert_eq!(r.begin, vec![0x02, b'x', 0x00, 0x00]);
        assert_eq!(r.end, vec![0x02, b'x', 0x00, 0xff]);
    }

    #[test]
    fn pack_rejects_an_unbound_versionstamp() {
        let elements = vec![Element::unbound_versionstamp(Some(1))];
        let err = pack(&elements).unwrap_err();
        assert_eq!(err, Error::IncompleteVersionstamp);
    }

    #[test]
    fn pack_unbound_versionstamp_reports_offsets() {
        let elements = vec![Element::from("k"), Element::unbound_versionstamp(None)];
        let result = pack_unbound_versionstamp(&elements).unwrap();
        // "k" -> 0x02 0x6b 0x00 (3 bytes), then 0x33 marker, then the 10 stamp bytes.
        assert_eq!(result.stamp_offset, 4);
        assert_eq!(result.code_offset, Some(14));
        assert_eq!(&result.data[result.stamp_offset..result.stamp_offset + 10], &[0xFF; 10]);
    }

    #[test]
    fn pack_unbound_versionstamp_errors_without_one() {
        let elements = vec![Element::Int(1)];
        let err = pack_unbound_versionstamp(&elements).unwrap_err();
        assert_eq!(err, Error::UnexpectedVersionstamp);
    }

    #[test]
    fn bake_versionstamp_then_pack_matches_a_directly_bound_one() {
        let mut elements = vec![Element::unbound_versionstamp(Some(7))];
        bake_versionstamp(&mut elements, [3; 10], None).unwrap();
        let baked = pack(&elements).unwrap();

        let direct = pack(&[Element::Versionstamp(Versionstamp::new([3; 10], [0, 7]))]).unwrap();
        assert_eq!(baked, direct);
    }

    #[test]
    fn strict_unpack_then_pack_reproduces_the_original_buffer() {
        let buf = [0x21u8, 0x00, 0x07, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff];
        let elements = unpack(&buf, true).unwrap();
        assert_eq!(pack(&elements).unwrap(), buf);
    }

    #[test]
    fn big_integers_pack_and_unpack_through_the_public_api() {
        let big: BigInt = BigInt::from(1u8) << 100;
        let elements = vec![Element::BigInt(big.clone())];
        let packed = pack(&elements).unwrap();
        assert_eq!(unpack(&packed, false).unwrap(), vec![Element::BigInt(big)]);
    }
}
