use busbind_variant::DecodeError;

/// Errors surfaced by remote object operations.
///
/// Variants are deliberately distinguishable by failure kind: a caller can
/// tell "could not reach the service" from "call rejected" from "property
/// present but wrong shape" and decide whether to retry, reconfigure or
/// abort.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// The shared bus connection could not be established. Fatal to every
    /// subsequent operation until a later bind attempt succeeds.
    #[error("failed to connect to the bus: {0}")]
    Connection(#[source] zbus::Error),

    /// A service name, interface name or object path failed validation at
    /// bind time.
    #[error("invalid remote object address: {0}")]
    Address(#[source] zbus::Error),

    /// A specific method invocation failed or the remote returned an error
    /// reply.
    #[error("method call '{method}' failed: {source}")]
    Call {
        method: String,
        source: zbus::Error,
    },

    /// A property was unreadable, absent, or its reply undecodable.
    #[error("property '{property}' unavailable: {source}")]
    Property {
        property: String,
        source: zbus::Error,
    },

    /// A decoded value's runtime shape did not match the requested type.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A signal match rule could not be installed.
    #[error("failed to install match rule '{rule}': {source}")]
    Subscribe {
        rule: String,
        source: zbus::Error,
    },

    /// The managed-object introspection call failed.
    #[error("enumeration under '{root}' failed: {source}")]
    Enumeration {
        root: String,
        source: zbus::Error,
    },
}

pub type Result<T> = std::result::Result<T, ProxyError>;
