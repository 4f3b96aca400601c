use std::collections::HashMap;

use zvariant::{OwnedObjectPath, OwnedValue, Value};

use crate::error::{DecodeError, Result};

/// A short human-readable tag for a value's runtime shape, used in
/// [`DecodeError::TypeMismatch`] messages.
pub fn type_name(value: &Value<'_>) -> &'static str {
    match value {
        Value::U8(_) => "u8",
        Value::Bool(_) => "bool",
        Value::I16(_) => "i16",
        Value::U16(_) => "u16",
        Value::I32(_) => "i32",
        Value::U32(_) => "u32",
        Value::I64(_) => "i64",
        Value::U64(_) => "u64",
        Value::F64(_) => "f64",
        Value::Str(_) => "string",
        Value::Signature(_) => "signature",
        Value::ObjectPath(_) => "object path",
        Value::Value(_) => "variant",
        Value::Array(_) => "array",
        Value::Dict(_) => "dict",
        Value::Structure(_) => "structure",
        #[cfg(unix)]
        Value::Fd(_) => "fd",
    }
}

/// Peels nested variant wrappers.
///
/// Dictionary entries with a `v` value signature arrive as `Value::Value`;
/// callers narrowing such entries apply this first.
pub fn unwrap_variant<'a, 'v>(mut value: &'a Value<'v>) -> &'a Value<'v> {
    while let Value::Value(inner) = value {
        value = inner;
    }
    value
}

fn mismatch(property: &str, expected: &'static str, value: &Value<'_>) -> DecodeError {
    DecodeError::TypeMismatch {
        property: property.to_owned(),
        expected,
        found: type_name(value),
    }
}

macro_rules! expect_scalar {
    ($(#[$meta:meta])* $name:ident, $variant:ident, $ty:ty, $label:expr) => {
        $(#[$meta])*
        pub fn $name(property: &str, value: &Value<'_>) -> Result<$ty> {
            match value {
                Value::$variant(v) => Ok(*v),
                other => Err(mismatch(property, $label, other)),
            }
        }
    };
}

expect_scalar!(
    /// Narrows a value to `bool`.
    expect_bool, Bool, bool, "bool");
expect_scalar!(expect_u8, U8, u8, "u8");
expect_scalar!(expect_i16, I16, i16, "i16");
expect_scalar!(expect_u16, U16, u16, "u16");
expect_scalar!(expect_i32, I32, i32, "i32");
expect_scalar!(expect_u32, U32, u32, "u32");
expect_scalar!(expect_i64, I64, i64, "i64");
expect_scalar!(expect_u64, U64, u64, "u64");
expect_scalar!(expect_f64, F64, f64, "f64");

/// Narrows a value to an owned string.
pub fn expect_str(property: &str, value: &Value<'_>) -> Result<String> {
    match value {
        Value::Str(s) => Ok(s.as_str().to_owned()),
        other => Err(mismatch(property, "string", other)),
    }
}

/// Narrows a value to an object path.
pub fn expect_object_path(property: &str, value: &Value<'_>) -> Result<OwnedObjectPath> {
    match value {
        Value::ObjectPath(p) => Ok(p.clone().into()),
        other => Err(mismatch(property, "object path", other)),
    }
}

// List narrowing peels a variant wrapper off each element before the
// per-element assertion, so an `av`-typed source behaves like its typed
// counterpart and a mismatch names the inner type, not "variant".
fn expect_elements<'a, 'v>(
    property: &str,
    expected: &'static str,
    value: &'a Value<'v>,
) -> Result<&'a [Value<'v>]> {
    match value {
        Value::Array(a) => Ok(&a[..]),
        other => Err(mismatch(property, expected, other)),
    }
}

/// Narrows a value to a list of strings (`as` or `av` of strings).
pub fn expect_string_list(property: &str, value: &Value<'_>) -> Result<Vec<String>> {
    expect_elements(property, "string array", value)?
        .iter()
        .map(|v| expect_str(property, unwrap_variant(v)))
        .collect()
}

/// Narrows a value to a list of object paths (`ao`).
pub fn expect_path_list(property: &str, value: &Value<'_>) -> Result<Vec<OwnedObjectPath>> {
    expect_elements(property, "object path array", value)?
        .iter()
        .map(|v| expect_object_path(property, unwrap_variant(v)))
        .collect()
}

/// Narrows a value to a list of `u32` (`au`).
pub fn expect_u32_list(property: &str, value: &Value<'_>) -> Result<Vec<u32>> {
    expect_elements(property, "u32 array", value)?
        .iter()
        .map(|v| expect_u32(property, unwrap_variant(v)))
        .collect()
}

/// Narrows a value to a list of `u32` lists (`aau`).
pub fn expect_u32_matrix(property: &str, value: &Value<'_>) -> Result<Vec<Vec<u32>>> {
    expect_elements(property, "array of u32 arrays", value)?
        .iter()
        .map(|v| expect_u32_list(property, unwrap_variant(v)))
        .collect()
}

/// Narrows a value to a byte string (`ay`).
pub fn expect_byte_list(property: &str, value: &Value<'_>) -> Result<Vec<u8>> {
    expect_elements(property, "byte array", value)?
        .iter()
        .map(|v| expect_u8(property, unwrap_variant(v)))
        .collect()
}

/// Narrows a value to a list of byte strings (`aay`).
pub fn expect_byte_matrix(property: &str, value: &Value<'_>) -> Result<Vec<Vec<u8>>> {
    expect_elements(property, "array of byte arrays", value)?
        .iter()
        .map(|v| expect_byte_list(property, unwrap_variant(v)))
        .collect()
}

/// Narrows a value to a string-keyed map with untyped values (`a{s*}`).
///
/// Entry values stay generic; with a `a{sv}` source each entry is still
/// variant-wrapped — apply [`unwrap_variant`] before narrowing further.
pub fn expect_dict(property: &str, value: &Value<'_>) -> Result<HashMap<String, OwnedValue>> {
    if !matches!(value, Value::Dict(_)) {
        return Err(mismatch(property, "dict", value));
    }
    HashMap::try_from(value.clone()).map_err(|source| DecodeError::Value {
        property: property.to_owned(),
        source,
    })
}

/// Narrows a value to a list of string-keyed maps (`aa{sv}`).
pub fn expect_dict_list(
    property: &str,
    value: &Value<'_>,
) -> Result<Vec<HashMap<String, OwnedValue>>> {
    expect_elements(property, "array of dicts", value)?
        .iter()
        .map(|v| expect_dict(property, unwrap_variant(v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u32_narrows_exactly() {
        assert_eq!(expect_u32("State", &Value::U32(11)).unwrap(), 11);
    }

    #[test]
    fn u32_rejects_string_naming_property() {
        let err = expect_u32("State", &Value::new("11")).unwrap_err();
        match err {
            DecodeError::TypeMismatch {
                property,
                expected,
                found,
            } => {
                assert_eq!(property, "State");
                assert_eq!(expected, "u32");
                assert_eq!(found, "string");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn no_widening_between_integer_types() {
        // An i32 on the wire must not satisfy a u32 request, and vice versa.
        assert!(matches!(
            expect_u32("Signal", &Value::I32(-3)),
            Err(DecodeError::TypeMismatch { .. })
        ));
        assert!(matches!(
            expect_i32("Signal", &Value::U32(3)),
            Err(DecodeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn string_list_narrows_each_element() {
        let value = Value::new(vec!["gsm", "cdma"]);
        assert_eq!(
            expect_string_list("Drivers", &value).unwrap(),
            vec!["gsm".to_owned(), "cdma".to_owned()]
        );
    }

    #[test]
    fn string_list_rejects_mixed_elements() {
        // A heterogeneous vec of Values encodes as `av`; the mismatch must
        // still name the inner type.
        let value = Value::new(vec![Value::new("gsm"), Value::U32(7)]);
        assert!(matches!(
            expect_string_list("Drivers", &value),
            Err(DecodeError::TypeMismatch { found: "u32", .. })
        ));
    }

    #[test]
    fn variant_wrapped_list_elements_are_peeled() {
        let value = Value::new(vec![Value::new("gsm"), Value::new("cdma")]);
        assert_eq!(
            expect_string_list("Drivers", &value).unwrap(),
            vec!["gsm".to_owned(), "cdma".to_owned()]
        );
    }

    #[test]
    fn byte_list_narrows() {
        let value = Value::new(vec![0x01u8, 0x02, 0x03]);
        assert_eq!(expect_byte_list("Data", &value).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn u32_matrix_narrows() {
        let value = Value::new(vec![vec![1u32, 2], vec![3u32]]);
        assert_eq!(
            expect_u32_matrix("SupportedCapabilities", &value).unwrap(),
            vec![vec![1, 2], vec![3]]
        );
    }

    #[test]
    fn dict_keeps_values_generic() {
        let mut entries = HashMap::new();
        entries.insert("State", Value::U32(8));
        let value = Value::new(entries);
        let dict = expect_dict("Properties", &value).unwrap();
        assert_eq!(
            expect_u32("State", unwrap_variant(&dict["State"])).unwrap(),
            8
        );
    }

    #[test]
    fn dict_rejects_non_dict() {
        assert!(matches!(
            expect_dict("Properties", &Value::U32(0)),
            Err(DecodeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn unwrap_variant_peels_nesting() {
        let wrapped = Value::Value(Box::new(Value::Value(Box::new(Value::U32(5)))));
        assert_eq!(expect_u32("Mode", unwrap_variant(&wrapped)).unwrap(), 5);
    }

    #[test]
    fn object_path_narrows() {
        let value = Value::new(zvariant::ObjectPath::try_from("/org/test/Modem/0").unwrap());
        assert_eq!(
            expect_object_path("Sim", &value).unwrap().as_str(),
            "/org/test/Modem/0"
        );
    }
}
