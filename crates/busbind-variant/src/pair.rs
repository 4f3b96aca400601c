//! Fixed two-element composite decoding.
//!
//! Several wire properties expose lists of fixed pairs (capability
//! combinations, mode preference tuples). The pair itself is untyped and
//! positional; narrowing `left`/`right` is the caller's job via the
//! [`crate::decode`] assertions.

use zvariant::{OwnedValue, Value};

use crate::decode::{type_name, unwrap_variant};
use crate::error::{DecodeError, Result};

/// An untyped two-element tuple with positional accessors.
#[derive(Debug)]
pub struct Pair {
    pub left: OwnedValue,
    pub right: OwnedValue,
}

fn composite_elements<'a, 'v>(
    property: &str,
    value: &'a Value<'v>,
) -> Result<&'a [Value<'v>]> {
    match value {
        Value::Structure(s) => Ok(s.fields()),
        Value::Array(a) => Ok(&a[..]),
        other => Err(DecodeError::TypeMismatch {
            property: property.to_owned(),
            expected: "2-element structure or array",
            found: type_name(other),
        }),
    }
}

fn to_owned(property: &str, value: &Value<'_>) -> Result<OwnedValue> {
    value.try_to_owned().map_err(|source| DecodeError::Value {
        property: property.to_owned(),
        source,
    })
}

/// Decodes a composite with exactly two elements into a [`Pair`].
///
/// Any other element count is [`DecodeError::Arity`]. No type constraint is
/// placed on either element. A variant wrapper around the composite (an
/// `av` list entry, say) is peeled first.
pub fn decode_pair(property: &str, value: &Value<'_>) -> Result<Pair> {
    let elements = composite_elements(property, unwrap_variant(value))?;
    if elements.len() != 2 {
        return Err(DecodeError::Arity {
            property: property.to_owned(),
            expected: 2,
            found: elements.len(),
        });
    }
    Ok(Pair {
        left: to_owned(property, &elements[0])?,
        right: to_owned(property, &elements[1])?,
    })
}

/// Decodes a list of fixed two-element composites.
pub fn decode_pair_list(property: &str, value: &Value<'_>) -> Result<Vec<Pair>> {
    match value {
        Value::Array(a) => a.iter().map(|v| decode_pair(property, v)).collect(),
        other => Err(DecodeError::TypeMismatch {
            property: property.to_owned(),
            expected: "array of pairs",
            found: type_name(other),
        }),
    }
}
