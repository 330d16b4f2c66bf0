//! Library error types.
use std::fmt;
use std::str::Utf8Error;

/// An `fdb-tuple` `Result`, normally returning a [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An error encountered while packing or unpacking a tuple.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// An element variant isn't supported by the encoder, an absent
    /// element was encountered in a sequence, or a `Uuid` element didn't
    /// carry exactly 16 bytes.
    InvalidInput(String),
    /// A big integer's magnitude needs more than 255 bytes to represent.
    IntegerTooLarge,
    /// More than one unbound versionstamp was found across a single
    /// top-level pack, including nested occurrences.
    DuplicateVersionstamp,
    /// `pack` was used on a tuple containing an unbound versionstamp; the
    /// caller must use [`crate::pack_unbound_versionstamp`] instead.
    IncompleteVersionstamp,
    /// `pack_unbound_versionstamp` was used on a tuple that contains no
    /// unbound versionstamp.
    UnexpectedVersionstamp,
    /// The decoder reached the end of the buffer in the middle of an
    /// element.
    TruncatedInput,
    /// The decoder encountered a type code that isn't assigned to any
    /// element variant.
    InvalidTypeCode(u8),
    /// A `Text` element's payload was not well-formed UTF-8.
    InvalidUtf8(Utf8Error),
    /// Baking an unbound versionstamp failed because neither the element
    /// nor the caller supplied a 2-byte user code.
    MissingCode,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidInput(msg) => write!(f, "invalid tuple element: {msg}"),
            Error::IntegerTooLarge => {
                write!(f, "integer magnitude requires more than 255 bytes")
            }
            Error::DuplicateVersionstamp => {
                write!(f, "tuple contains more than one unbound versionstamp")
            }
            Error::IncompleteVersionstamp => write!(
                f,
                "tuple contains an unbound versionstamp; use pack_unbound_versionstamp"
            ),
            Error::UnexpectedVersionstamp => write!(
                f,
                "pack_unbound_versionstamp called on a tuple with no unbound versionstamp"
            ),
            Error::TruncatedInput => write!(f, "buffer ended in the middle of an element"),
            Error::InvalidTypeCode(code) => write!(f, "unrecognized type code 0x{code:02x}"),
            Error::InvalidUtf8(err) => write!(f, "text element was not valid UTF-8: {err}"),
            Error::MissingCode => write!(
                f,
                "cannot bake versionstamp: no user code supplied by element or caller"
            ),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidUtf8(err) => Some(err),
            _ => None,
        }
    }
}

impl From<Utf8Error> for Error {
    fn from(err: Utf8Error) -> Self {
        Error::InvalidUtf8(err)
    }
}
