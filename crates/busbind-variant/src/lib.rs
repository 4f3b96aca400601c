//! Typed narrowing of untyped D-Bus wire values.
//!
//! The bus hands every property and signal argument over as a tagged
//! [`zvariant::Value`]. This crate turns those into concrete Rust types with
//! a runtime shape assertion per target type: the assertion either succeeds
//! exactly or fails with an error naming the offending property. There is no
//! coercion — an `i32` on the wire never satisfies a `u32` request.
//!
//! Composite values (maps, lists of maps) are narrowed only to generic
//! containers; flattening them into domain structs is the caller's job.

pub mod decode;
pub mod error;
pub mod pair;

pub use decode::{
    expect_bool, expect_byte_list, expect_byte_matrix, expect_dict, expect_dict_list, expect_f64,
    expect_i16, expect_i32, expect_i64, expect_object_path, expect_path_list, expect_str,
    expect_string_list, expect_u16, expect_u32, expect_u32_list, expect_u32_matrix, expect_u64,
    expect_u8, type_name, unwrap_variant,
};
pub use error::{DecodeError, Result};
pub use pair::{decode_pair, decode_pair_list, Pair};
