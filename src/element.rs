//! The tuple element type and its encoder.

use byteorder::{BigEndian, ByteOrder};
use num_bigint::BigInt;
use uuid::Uuid;

use crate::buffer::Buffer;
use crate::error::{Error, Result};
use crate::float::{adjust_float_bytes, Float32, Float64};
use crate::integer;
use crate::marker::{self, Marker};
use crate::versionstamp::{UnboundVersionstamp, Versionstamp};

/// A single value in a tuple. Variants mirror the closed set of types the
/// wire format can carry; see the crate docs for the byte layout of each.
#[derive(Clone, Debug, PartialEq)]
pub enum Element {
    Nil,
    Bool(bool),
    Bytes(Vec<u8>),
    Text(String),
    Nested(Vec<Element>),
    Int(i64),
    BigInt(BigInt),
    Float32(Float32),
    Float64(Float64),
    Uuid(Uuid),
    Versionstamp(Versionstamp),
    UnboundVersionstamp(UnboundVersionstamp),
}

impl Element {
    pub fn nil() -> Self {
        Element::Nil
    }

    /// An unbound versionstamp placeholder. `code` supplies the 2-byte user
    /// code up front; when absent, it must be supplied later by the caller
    /// driving [`crate::pack_unbound_versionstamp`].
    pub fn unbound_versionstamp(code: Option<u16>) -> Self {
        Element::UnboundVersionstamp(UnboundVersionstamp { code })
    }
}

impl From<bool> for Element {
    fn from(b: bool) -> Self {
        Element::Bool(b)
    }
}

impl From<&str> for Element {
    fn from(s: &str) -> Self {
        Element::Text(s.to_owned())
    }
}

impl From<String> for Element {
    fn from(s: String) -> Self {
        Element::Text(s)
    }
}

impl From<&[u8]> for Element {
    fn from(b: &[u8]) -> Self {
        Element::Bytes(b.to_vec())
    }
}

impl From<Vec<u8>> for Element {
    fn from(b: Vec<u8>) -> Self {
        Element::Bytes(b)
    }
}

impl From<i64> for Element {
    fn from(n: i64) -> Self {
        Element::Int(n)
    }
}

impl From<BigInt> for Element {
    fn from(n: BigInt) -> Self {
        Element::BigInt(n)
    }
}

impl From<f32> for Element {
    fn from(v: f32) -> Self {
        Element::Float32(Float32::new(v))
    }
}

impl From<f64> for Element {
    fn from(v: f64) -> Self {
        Element::Float64(Float64::new(v))
    }
}

impl From<Uuid> for Element {
    fn from(u: Uuid) -> Self {
        Element::Uuid(u)
    }
}

/// Tracks where the (at most one) unbound versionstamp landed while
/// encoding a top-level tuple, so the caller can bake its committed value
/// in later without re-walking the element tree.
#[derive(Default)]
pub(crate) struct VsState {
    pub stamp_offset: Option<usize>,
    pub code_offset: Option<usize>,
}

/// Write `elem`'s bytes onto `out`. `depth` is 0 at the top level and
/// incremented for each level of `Nested` — only used to decide whether a
/// `Nil` child needs the extra escape byte.
pub(crate) fn encode(out: &mut Buffer, elem: &Element, depth: usize, vs: &mut VsState) -> Result<()> {
    match elem {
        Element::Nil => {
            out.append_byte(Marker::Nil.into_u8());
            if depth > 0 {
                out.append_byte(marker::ESCAPE);
            }
        }
        Element::Bool(false) => out.append_byte(Marker::BoolFalse.into_u8()),
        Element::Bool(true) => out.append_byte(Marker::BoolTrue.into_u8()),
        Element::Bytes(b) => {
            out.append_byte(Marker::Bytes.into_u8());
            encode_escaped(out, b);
        }
        Element::Text(s) => {
            out.append_byte(Marker::Text.into_u8());
            encode_escaped(out, s.as_bytes());
        }
        Element::Nested(children) => {
            out.append_byte(Marker::Nested.into_u8());
            for child in children {
                encode(out, child, depth + 1, vs)?;
            }
            out.append_byte(Marker::Nil.into_u8());
        }
        Element::Int(n) => match integer::magnitude_of_i64(*n) {
            None => out.append_byte(Marker::IntZero.into_u8()),
            Some(mag) => {
                let mut payload = Vec::new();
                integer::encode_magnitude(&mut payload, &mag)?;
                out.append_bytes(&payload);
            }
        },
        Element::BigInt(n) => match integer::magnitude_of_bigint(n)? {
            None => out.append_byte(Marker::IntZero.into_u8()),
            Some(mag) => {
                let mut payload = Vec::new();
                integer::encode_magnitude(&mut payload, &mag)?;
                out.append_bytes(&payload);
            }
        },
        Element::Float32(f) => {
            out.append_byte(Marker::Float32.into_u8());
            let mut bytes = f.be_bytes();
            adjust_float_bytes(&mut bytes, true);
            out.append_bytes(&bytes);
        }
        Element::Float64(f) => {
            out.append_byte(Marker::Float64.into_u8());
            let mut bytes = f.be_bytes();
            adjust_float_bytes(&mut bytes, true);
            out.append_bytes(&bytes);
        }
        Element::Uuid(u) => {
            out.append_byte(Marker::Uuid.into_u8());
            out.append_bytes(u.as_bytes());
        }
        Element::Versionstamp(stamp) => {
            out.append_byte(Marker::Versionstamp.into_u8());
            out.append_bytes(&stamp.to_bytes());
        }
        Element::UnboundVersionstamp(placeholder) => {
            if vs.stamp_offset.is_some() {
                return Err(Error::DuplicateVersionstamp);
            }
            out.append_byte(Marker::Versionstamp.into_u8());
            vs.stamp_offset = Some(out.len());
            let window = out.reserve(10);
            window.fill(0xFF);
            match placeholder.code {
                Some(code) => {
                    let mut code_bytes = [0u8; 2];
                    BigEndian::write_u16(&mut code_bytes, code);
                    out.append_bytes(&code_bytes);
                }
                None => {
                    vs.code_offset = Some(out.len());
                    out.reserve(2);
                }
            }
        }
    }
    Ok(())
}

/// Null-escape `payload` (`0x00` -> `0x00 0xFF`) and append the terminator.
fn encode_escaped(out: &mut Buffer, payload: &[u8]) {
    for &b in payload {
        out.append_byte(b);
        if b == 0x00 {
            out.append_byte(marker::ESCAPE);
        }
    }
    out.append_byte(Marker::Nil.into_u8());
}

/// Generates every `Element` variant. `quickcheck::Gen` drives the plain
/// derived fields (bool/bytes/text/int); `rand` drives the ones that need
/// exact control quickcheck's derived impls don't give us — float bit
/// patterns (including NaN payloads), big-integer magnitudes guaranteed to
/// exceed the machine-int range, and versionstamp byte layout. `Nested`
/// recursion is bounded by `Gen::size()` so generated trees stay shallow.
#[cfg(test)]
impl quickcheck::Arbitrary for Element {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        arbitrary_element(g, g.size().min(4))
    }
}

#[cfg(test)]
fn arbitrary_element(g: &mut quickcheck::Gen, depth: usize) -> Element {
    use quickcheck::Arbitrary as _;
    use rand::Rng;

    let variant_count = if depth == 0 { 10 } else { 11 };
    match rand::thread_rng().gen_range(0..variant_count) {
        0 => Element::Nil,
        1 => Element::Bool(bool::arbitrary(g)),
        2 => Element::Bytes(Vec::<u8>::arbitrary(g)),
        3 => Element::Text(String::arbitrary(g)),
        4 => Element::Int(i64::arbitrary(g)),
        5 => Element::BigInt(arbitrary_bigint()),
        6 => Element::Float32(Float32::new(f32::from_bits(rand::thread_rng().gen()))),
        7 => Element::Float64(Float64::new(f64::from_bits(rand::thread_rng().gen()))),
        8 => Element::Uuid(Uuid::from_bytes(rand::thread_rng().gen())),
        9 => arbitrary_versionstamp_element(),
        _ => {
            let len = rand::thread_rng().gen_range(0..3);
            Element::Nested((0..len).map(|_| arbitrary_element(g, depth - 1)).collect())
        }
    }
}

/// A magnitude that always needs more than 8 bytes, so it can never be
/// promoted to `Int` on decode and round-trips exactly as `BigInt`.
#[cfg(test)]
fn arbitrary_bigint() -> BigInt {
    use num_bigint::BigUint;
    use rand::Rng;

    let mut rng = rand::thread_rng();
    let len = rng.gen_range(9..=32);
    let mut bytes = vec![0u8; len];
    rng.fill(bytes.as_mut_slice());
    bytes[0] |= 0x01; // keep the leading byte nonzero so `len` is the real magnitude length
    let magnitude = BigUint::from_bytes_be(&bytes);
    if rng.gen_bool(0.5) {
        -BigInt::from(magnitude)
    } else {
        BigInt::from(magnitude)
    }
}

/// A bound versionstamp never has an all-`0xFF` transaction version, which
/// decode reserves as the unbound sentinel.
#[cfg(test)]
fn arbitrary_versionstamp_element() -> Element {
    use rand::Rng;

    let mut rng = rand::thread_rng();
    if rng.gen_bool(0.5) {
        let mut transaction_version: [u8; 10] = rng.gen();
        if transaction_version == [0xFF; 10] {
            transaction_version[0] = 0;
        }
        let user_version: [u8; 2] = rng.gen();
        Element::Versionstamp(Versionstamp::new(transaction_version, user_version))
    } else {
        let code = rng.gen_bool(0.8).then(|| rng.gen::<u16>());
        Element::UnboundVersionstamp(UnboundVersionstamp { code })
    }
}
