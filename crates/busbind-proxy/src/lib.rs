//! Remote object binding, typed property reads and signal dispatch.
//!
//! This is the layer the per-interface wrappers of a D-Bus service build on.
//! A [`RemoteObject`] pairs one shared bus connection with one (service,
//! interface, path) triple and exposes:
//!
//! - method invocation with typed replies,
//! - property reads narrowed through `busbind-variant`,
//! - at most one live signal subscription per object, delivered through a
//!   bounded [`SignalQueue`],
//! - managed-object child enumeration.
//!
//! Calls suspend until the remote replies; no timeout is imposed here —
//! callers that need one wrap the future themselves.

pub mod bus;
pub mod enumerate;
pub mod error;
pub mod object;
pub mod signals;
pub mod subscription;

pub use bus::system_bus;
pub use enumerate::list_children;
pub use error::{ProxyError, Result};
pub use object::RemoteObject;
pub use signals::{
    parse_interfaces_added, parse_interfaces_removed, parse_properties_changed,
    parse_state_changed, InterfacesAdded, InterfacesRemoved, ParseError, PropertiesChanged,
    StateChange,
};
pub use subscription::{NotificationEvent, SignalQueue, SIGNAL_QUEUE_CAPACITY};
