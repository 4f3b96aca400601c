//! Pure parsers, one per signal shape.
//!
//! Each parser validates the body's arity and then every positional type
//! before returning; any mismatch names the signal and the positional field
//! that failed. Parsers never touch the bus — they only re-shape an already
//! delivered [`NotificationEvent`].

use std::collections::HashMap;

use busbind_variant::{decode, DecodeError};
use zvariant::{OwnedObjectPath, OwnedValue};

use crate::subscription::NotificationEvent;

/// Errors produced while re-parsing a delivered signal.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The raw body could not be decoded at all.
    #[error("signal body could not be decoded: {0}")]
    Body(#[source] zbus::Error),

    /// The body has the wrong number of positional arguments.
    #[error("signal '{signal}' has {found} arguments, expected {expected}")]
    Arity {
        signal: &'static str,
        expected: usize,
        found: usize,
    },

    /// A positional argument has the wrong type; the source names the field.
    #[error("signal '{signal}': {source}")]
    Field {
        signal: &'static str,
        source: DecodeError,
    },
}

fn expect_arity(
    signal: &'static str,
    args: &[OwnedValue],
    expected: usize,
) -> Result<(), ParseError> {
    if args.len() != expected {
        return Err(ParseError::Arity {
            signal,
            expected,
            found: args.len(),
        });
    }
    Ok(())
}

fn field(signal: &'static str) -> impl Fn(DecodeError) -> ParseError {
    move |source| ParseError::Field { signal, source }
}

/// Body of a `StateChanged` signal (`iiu`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub old_state: i32,
    pub new_state: i32,
    pub reason: u32,
}

/// Parses a `StateChanged` signal body.
pub fn parse_state_changed(event: &NotificationEvent) -> Result<StateChange, ParseError> {
    const SIGNAL: &str = "StateChanged";
    let args = event.args()?;
    expect_arity(SIGNAL, &args, 3)?;
    Ok(StateChange {
        old_state: decode::expect_i32("old_state", &args[0]).map_err(field(SIGNAL))?,
        new_state: decode::expect_i32("new_state", &args[1]).map_err(field(SIGNAL))?,
        reason: decode::expect_u32("reason", &args[2]).map_err(field(SIGNAL))?,
    })
}

/// Body of a standard `PropertiesChanged` signal (`sa{sv}as`).
#[derive(Debug)]
pub struct PropertiesChanged {
    pub interface: String,
    pub changed: HashMap<String, OwnedValue>,
    pub invalidated: Vec<String>,
}

/// Parses a `org.freedesktop.DBus.Properties.PropertiesChanged` body.
pub fn parse_properties_changed(
    event: &NotificationEvent,
) -> Result<PropertiesChanged, ParseError> {
    const SIGNAL: &str = "PropertiesChanged";
    let args = event.args()?;
    expect_arity(SIGNAL, &args, 3)?;
    Ok(PropertiesChanged {
        interface: decode::expect_str("interface", &args[0]).map_err(field(SIGNAL))?,
        changed: decode::expect_dict("changed_properties", &args[1]).map_err(field(SIGNAL))?,
        invalidated: decode::expect_string_list("invalidated_properties", &args[2])
            .map_err(field(SIGNAL))?,
    })
}

/// Body of an ObjectManager `InterfacesAdded` signal, reduced to the child
/// path and the names of the interfaces it grew.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfacesAdded {
    pub path: OwnedObjectPath,
    pub interfaces: Vec<String>,
}

/// Parses an `org.freedesktop.DBus.ObjectManager.InterfacesAdded` body.
///
/// The per-interface property maps are dropped; watchers that need them
/// re-read the properties from the new object. Interface names are sorted.
pub fn parse_interfaces_added(event: &NotificationEvent) -> Result<InterfacesAdded, ParseError> {
    const SIGNAL: &str = "InterfacesAdded";
    let args = event.args()?;
    expect_arity(SIGNAL, &args, 2)?;
    let path = decode::expect_object_path("object_path", &args[0]).map_err(field(SIGNAL))?;
    let properties =
        decode::expect_dict("interfaces_and_properties", &args[1]).map_err(field(SIGNAL))?;
    let mut interfaces: Vec<String> = properties.into_keys().collect();
    interfaces.sort();
    Ok(InterfacesAdded { path, interfaces })
}

/// Body of an ObjectManager `InterfacesRemoved` signal (`oas`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfacesRemoved {
    pub path: OwnedObjectPath,
    pub interfaces: Vec<String>,
}

/// Parses an `org.freedesktop.DBus.ObjectManager.InterfacesRemoved` body.
pub fn parse_interfaces_removed(
    event: &NotificationEvent,
) -> Result<InterfacesRemoved, ParseError> {
    const SIGNAL: &str = "InterfacesRemoved";
    let args = event.args()?;
    expect_arity(SIGNAL, &args, 2)?;
    Ok(InterfacesRemoved {
        path: decode::expect_object_path("object_path", &args[0]).map_err(field(SIGNAL))?,
        interfaces: decode::expect_string_list("interfaces", &args[1]).map_err(field(SIGNAL))?,
    })
}

#[cfg(test)]
mod tests {
    use zbus::message::Message;
    use zvariant::Value;

    use super::*;

    fn event(message: Message) -> NotificationEvent {
        NotificationEvent::from_message(message)
    }

    #[test]
    fn state_changed_parses() {
        let message = Message::signal("/org/test/Modem/0", "org.test.Modem", "StateChanged")
            .unwrap()
            .build(&(7i32, 8i32, 1u32))
            .unwrap();
        let change = parse_state_changed(&event(message)).unwrap();
        assert_eq!(
            change,
            StateChange {
                old_state: 7,
                new_state: 8,
                reason: 1
            }
        );
    }

    #[test]
    fn state_changed_rejects_wrong_arity() {
        let message = Message::signal("/org/test/Modem/0", "org.test.Modem", "StateChanged")
            .unwrap()
            .build(&(7i32, 8i32))
            .unwrap();
        assert!(matches!(
            parse_state_changed(&event(message)),
            Err(ParseError::Arity {
                signal: "StateChanged",
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn state_changed_names_the_bad_field() {
        let message = Message::signal("/org/test/Modem/0", "org.test.Modem", "StateChanged")
            .unwrap()
            .build(&(7i32, "eight", 1u32))
            .unwrap();
        let err = parse_state_changed(&event(message)).unwrap_err();
        match err {
            ParseError::Field { signal, source } => {
                assert_eq!(signal, "StateChanged");
                assert_eq!(source.property(), "new_state");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn properties_changed_parses() {
        let mut changed = HashMap::new();
        changed.insert("State", Value::U32(11));
        let message = Message::signal(
            "/org/test/Modem/0",
            "org.freedesktop.DBus.Properties",
            "PropertiesChanged",
        )
        .unwrap()
        .build(&("org.test.Modem", changed, vec!["Bearers"]))
        .unwrap();

        let parsed = parse_properties_changed(&event(message)).unwrap();
        assert_eq!(parsed.interface, "org.test.Modem");
        assert_eq!(parsed.invalidated, vec!["Bearers".to_owned()]);
        let state = &parsed.changed["State"];
        assert_eq!(
            busbind_variant::expect_u32("State", busbind_variant::unwrap_variant(state)).unwrap(),
            11
        );
    }

    #[test]
    fn interfaces_added_reduces_to_names() {
        let mut gained: HashMap<&str, HashMap<&str, Value<'_>>> = HashMap::new();
        gained.insert("org.test.Modem.Voice", HashMap::new());
        gained.insert("org.test.Modem.Messaging", HashMap::new());
        let message = Message::signal(
            "/org/test",
            "org.freedesktop.DBus.ObjectManager",
            "InterfacesAdded",
        )
        .unwrap()
        .build(&(
            zvariant::ObjectPath::try_from("/org/test/Modem/1").unwrap(),
            gained,
        ))
        .unwrap();

        let parsed = parse_interfaces_added(&event(message)).unwrap();
        assert_eq!(parsed.path.as_str(), "/org/test/Modem/1");
        assert_eq!(
            parsed.interfaces,
            vec![
                "org.test.Modem.Messaging".to_owned(),
                "org.test.Modem.Voice".to_owned()
            ]
        );
    }

    #[test]
    fn interfaces_removed_parses() {
        let message = Message::signal(
            "/org/test",
            "org.freedesktop.DBus.ObjectManager",
            "InterfacesRemoved",
        )
        .unwrap()
        .build(&(
            zvariant::ObjectPath::try_from("/org/test/Modem/1").unwrap(),
            vec!["org.test.Modem"],
        ))
        .unwrap();

        let parsed = parse_interfaces_removed(&event(message)).unwrap();
        assert_eq!(parsed.path.as_str(), "/org/test/Modem/1");
        assert_eq!(parsed.interfaces, vec!["org.test.Modem".to_owned()]);
    }
}
