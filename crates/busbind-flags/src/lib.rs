//! Bitmask <-> ordered flag list codec.
//!
//! The remote service exports sets of flags as 32-bit words. Each flag type
//! declares a canonical flag order; that order, not the flag's own
//! discriminant, decides which bit a flag occupies. Both codec directions
//! are total: unknown bits and unknown flags are dropped, never errors.

pub mod codec;

pub use codec::{from_bitmask, to_bitmask, FlagSet};
