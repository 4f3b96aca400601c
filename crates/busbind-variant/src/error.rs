/// Errors produced when narrowing an untyped wire value.
///
/// Every variant names the property (or positional field) being decoded so a
/// failure is diagnosable from the message alone.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The value's runtime shape does not match the requested type.
    #[error("unexpected variant type for '{property}': expected {expected}, found {found}")]
    TypeMismatch {
        property: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A fixed-arity composite has the wrong element count.
    #[error("wrong element count for '{property}': expected {expected}, found {found}")]
    Arity {
        property: String,
        expected: usize,
        found: usize,
    },

    /// The value matched the requested shape but could not be converted
    /// into an owned representation.
    #[error("value for '{property}' could not be converted: {source}")]
    Value {
        property: String,
        source: zvariant::Error,
    },
}

impl DecodeError {
    /// The name of the property or field that failed to decode.
    pub fn property(&self) -> &str {
        match self {
            DecodeError::TypeMismatch { property, .. }
            | DecodeError::Arity { property, .. }
            | DecodeError::Value { property, .. } => property,
        }
    }
}

pub type Result<T> = std::result::Result<T, DecodeError>;
