//! Tuple type codes. For internal use only.
//!
//! Every encoded element begins with one of these bytes. The layout below
//! is bit-exact: it must match the FoundationDB tuple layer so that byte
//! strings produced by this crate interoperate with other language
//! bindings of the same format.

const NEG_INT_START_CODE: u8 = 0x0B;
const INT_ZERO_CODE: u8 = 0x14;
const POS_INT_END_CODE: u8 = 0x1D;

/// The byte that escapes a literal `0x00` inside bytes/text/nested payloads.
/// Not a type code itself, so it isn't a `Marker` variant.
pub(crate) const ESCAPE: u8 = 0xFF;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Marker {
    Nil,
    Bytes,
    Text,
    Nested,
    NegIntStart,
    /// A fixed-width integer code in `0x0C..=0x13` or `0x15..=0x1C`.
    /// `negative` selects which side of `IntZero`; `len` is its byte count.
    SmallInt { negative: bool, len: usize },
    IntZero,
    PosIntEnd,
    Float32,
    Float64,
    BoolFalse,
    BoolTrue,
    Uuid,
    Versionstamp,
}

impl Marker {
    /// Construct a marker from a single byte. `None` for an unassigned code.
    pub(crate) fn from_u8(n: u8) -> Option<Marker> {
        match n {
            0x00 => Some(Marker::Nil),
            0x01 => Some(Marker::Bytes),
            0x02 => Some(Marker::Text),
            0x05 => Some(Marker::Nested),
            NEG_INT_START_CODE => Some(Marker::NegIntStart),
            c if (NEG_INT_START_CODE + 1..INT_ZERO_CODE).contains(&c) => Some(Marker::SmallInt {
                negative: true,
                len: (INT_ZERO_CODE - c) as usize,
            }),
            INT_ZERO_CODE => Some(Marker::IntZero),
            c if (INT_ZERO_CODE + 1..POS_INT_END_CODE).contains(&c) => Some(Marker::SmallInt {
                negative: false,
                len: (c - INT_ZERO_CODE) as usize,
            }),
            POS_INT_END_CODE => Some(Marker::PosIntEnd),
            0x20 => Some(Marker::Float32),
            0x21 => Some(Marker::Float64),
            0x26 => Some(Marker::BoolFalse),
            0x27 => Some(Marker::BoolTrue),
            0x30 => Some(Marker::Uuid),
            0x33 => Some(Marker::Versionstamp),
            _ => None,
        }
    }

    /// Converts a marker back into its single-byte representation.
    pub(crate) fn into_u8(self) -> u8 {
        match self {
            Marker::Nil => 0x00,
            Marker::Bytes => 0x01,
            Marker::Text => 0x02,
            Marker::Nested => 0x05,
            Marker::NegIntStart => NEG_INT_START_CODE,
            Marker::SmallInt {
                negative: true,
                len,
            } => INT_ZERO_CODE - len as u8,
            Marker::IntZero => INT_ZERO_CODE,
            Marker::SmallInt {
                negative: false,
                len,
            } => INT_ZERO_CODE + len as u8,
            Marker::PosIntEnd => POS_INT_END_CODE,
            Marker::Float32 => 0x20,
            Marker::Float64 => 0x21,
            Marker::BoolFalse => 0x26,
            Marker::BoolTrue => 0x27,
            Marker::Uuid => 0x30,
            Marker::Versionstamp => 0x33,
        }
    }
}

impl From<u8> for Marker {
    /// Panics on an unassigned code; callers that need to reject unknown
    /// input use `from_u8` directly and turn `None` into `Error::InvalidTypeCode`.
    fn from(n: u8) -> Marker {
        Marker::from_u8(n).expect("unassigned type code")
    }
}

impl From<Marker> for u8 {
    fn from(m: Marker) -> u8 {
        m.into_u8()
    }
}
