//! Versionstamp elements: a resolved 12-byte value, and the unresolved
//! placeholder that stands in for one until a transaction commits.

use crate::element::Element;
use crate::error::{Error, Result};

const TR_VERSION_LEN: usize = 10;
const USER_VERSION_LEN: usize = 2;

/// A fully resolved versionstamp: a 10-byte commit version plus a 2-byte
/// user code, in the order they appear on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Versionstamp {
    pub transaction_version: [u8; TR_VERSION_LEN],
    pub user_version: [u8; USER_VERSION_LEN],
}

impl Versionstamp {
    pub fn new(transaction_version: [u8; TR_VERSION_LEN], user_version: [u8; USER_VERSION_LEN]) -> Self {
        Versionstamp {
            transaction_version,
            user_version,
        }
    }

    pub(crate) fn to_bytes(self) -> [u8; 12] {
        let mut out = [0u8; 12];
        out[..10].copy_from_slice(&self.transaction_version);
        out[10..].copy_from_slice(&self.user_version);
        out
    }

    pub(crate) fn from_bytes(bytes: &[u8; 12]) -> Self {
        let mut transaction_version = [0u8; 10];
        let mut user_version = [0u8; 2];
        transaction_version.copy_from_slice(&bytes[..10]);
        user_version.copy_from_slice(&bytes[10..]);
        Versionstamp {
            transaction_version,
            user_version,
        }
    }
}

/// A placeholder for a versionstamp whose transaction version isn't known
/// yet. `code`, when present, supplies the 2-byte user version up front;
/// otherwise it's filled in by whoever bakes the final value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnboundVersionstamp {
    pub code: Option<u16>,
}

/// Rewrite every `UnboundVersionstamp` in `elements` (recursing into
/// `Nested`) to a bound `Versionstamp` carrying `transaction_version`. Each
/// placeholder's own code wins if it has one; otherwise `default_code` is
/// used. Fails [`Error::MissingCode`] if neither is present.
pub(crate) fn bake(
    elements: &mut [Element],
    transaction_version: [u8; TR_VERSION_LEN],
    default_code: Option<[u8; USER_VERSION_LEN]>,
) -> Result<()> {
    for elem in elements {
        match elem {
            Element::UnboundVersionstamp(placeholder) => {
                let user_version = match (placeholder.code, default_code) {
                    (Some(code), _) => code.to_be_bytes(),
                    (None, Some(code)) => code,
                    (None, None) => return Err(Error::MissingCode),
                };
                *elem = Element::Versionstamp(Versionstamp::new(transaction_version, user_version));
            }
            Element::Nested(children) => bake(children, transaction_version, default_code)?,
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_bytes() {
        let stamp = Versionstamp::new([1; 10], [2, 3]);
        let bytes = stamp.to_bytes();
        assert_eq!(Versionstamp::from_bytes(&bytes), stamp);
    }

    #[test]
    fn bake_prefers_element_code_over_default() {
        let mut elems = vec![Element::UnboundVersionstamp(UnboundVersionstamp {
            code: Some(0x0102),
        })];
        bake(&mut elems, [9; 10], Some([0xAA, 0xBB])).unwrap();
        match &elems[0] {
            Element::Versionstamp(v) => {
                assert_eq!(v.transaction_version, [9; 10]);
                assert_eq!(v.user_version, [0x01, 0x02]);
            }
            _ => panic!("expected a bound versionstamp"),
        }
    }

    #[test]
    fn bake_recurses_into_nested_tuples() {
        let mut elems = vec![Element::Nested(vec![Element::UnboundVersionstamp(
            UnboundVersionstamp { code: None },
        )])];
        bake(&mut elems, [0; 10], Some([1, 2])).unwrap();
        match &elems[0] {
            Element::Nested(children) => assert!(matches!(children[0], Element::Versionstamp(_))),
            _ => panic!("expected nested"),
        }
    }

    #[test]
    fn bake_without_any_code_fails() {
        let mut elems = vec![Element::UnboundVersionstamp(UnboundVersionstamp { code: None })];
        let err = bake(&mut elems, [0; 10], None).unwrap_err();
        assert_eq!(err, Error::MissingCode);
    }
}
