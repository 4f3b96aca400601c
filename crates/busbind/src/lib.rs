//! Typed D-Bus marshaling and notification core for service bindings.
//!
//! busbind is the generic layer that per-interface wrappers of a D-Bus
//! service (modems, bearers, SIMs, messages, calls, ...) build on: typed
//! narrowing of untyped wire values, a bitmask <-> ordered-flag codec,
//! fixed-pair decoding, per-object signal subscriptions over one shared
//! connection, and managed-object enumeration.
//!
//! # Crate Structure
//!
//! - [`variant`] — Runtime shape assertions over tagged wire values
//! - [`flags`] — Bitmask <-> canonical flag list codec
//! - [`proxy`] — Remote object binding, property reads, signal dispatch,
//!   child enumeration

/// Re-export wire value narrowing.
pub mod variant {
    pub use busbind_variant::*;
}

/// Re-export the flag codec.
pub mod flags {
    pub use busbind_flags::*;
}

/// Re-export remote object types.
pub mod proxy {
    pub use busbind_proxy::*;
}
