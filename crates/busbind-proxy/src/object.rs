use std::collections::HashMap;

use busbind_variant::{decode, pair, Pair};
use serde::ser::Serialize;
use tracing::{debug, trace};
use zbus::names::{OwnedBusName, OwnedInterfaceName};
use zbus::{Connection, MatchRule, MessageStream};
use zvariant::{DynamicType, OwnedObjectPath, OwnedValue, Type, Value};

use crate::bus::system_bus;
use crate::error::{ProxyError, Result};
use crate::subscription::{SignalQueue, SignalSlot, SIGNAL_QUEUE_CAPACITY};

const PROPERTIES_INTERFACE: &str = "org.freedesktop.DBus.Properties";

/// One addressable remote entity: a shared connection plus a (service,
/// interface, path) triple.
///
/// Binding performs no bus traffic beyond the shared connection's own
/// handshake; the remote side is first touched by the first call. The
/// handle is immutable after creation apart from its subscription slot and
/// is safe to share across tasks.
#[derive(Debug)]
pub struct RemoteObject {
    connection: Connection,
    service: OwnedBusName,
    interface: OwnedInterfaceName,
    path: OwnedObjectPath,
    subscription: SignalSlot,
}

impl RemoteObject {
    /// Binds a remote object on an explicit connection.
    ///
    /// All three names are validated eagerly so a typo fails here rather
    /// than on the first call.
    pub fn bind(
        connection: Connection,
        service: &str,
        interface: &str,
        path: &str,
    ) -> Result<Self> {
        let service = OwnedBusName::try_from(service)
            .map_err(|e| ProxyError::Address(e.into()))?;
        let interface = OwnedInterfaceName::try_from(interface)
            .map_err(|e| ProxyError::Address(e.into()))?;
        let path = OwnedObjectPath::try_from(path)
            .map_err(|e| ProxyError::Address(e.into()))?;
        trace!(%service, %interface, %path, "bound remote object");
        Ok(Self {
            connection,
            service,
            interface,
            path,
            subscription: SignalSlot::default(),
        })
    }

    /// Binds a remote object on the shared system bus connection,
    /// establishing that connection if this is the first bind.
    pub async fn bind_system(service: &str, interface: &str, path: &str) -> Result<Self> {
        let connection = system_bus().await?;
        Self::bind(connection, service, interface, path)
    }

    /// The object path this handle is bound to.
    pub fn path(&self) -> &str {
        self.path.as_str()
    }

    /// The interface this handle addresses.
    pub fn interface(&self) -> &str {
        self.interface.as_str()
    }

    /// The owning service's bus name.
    pub fn service(&self) -> &str {
        self.service.as_str()
    }

    /// The underlying shared connection.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    async fn call_on<B>(
        &self,
        interface: &str,
        method: &str,
        body: &B,
    ) -> Result<zbus::message::Message>
    where
        B: Serialize + DynamicType,
    {
        trace!(interface, method, path = %self.path, "method call");
        self.connection
            .call_method(
                Some(self.service.as_str()),
                self.path.as_str(),
                Some(interface),
                method,
                body,
            )
            .await
            .map_err(|source| ProxyError::Call {
                method: method.to_owned(),
                source,
            })
    }

    /// Invokes a method on the bound interface, discarding the reply body.
    ///
    /// Suspends until the reply or a transport error arrives; no timeout is
    /// imposed here.
    pub async fn invoke<B>(&self, method: &str, body: &B) -> Result<()>
    where
        B: Serialize + DynamicType,
    {
        self.call_on(self.interface.as_str(), method, body).await?;
        Ok(())
    }

    /// Invokes a method and deserializes the typed reply payload.
    ///
    /// Multi-value replies deserialize into tuples.
    pub async fn invoke_with_reply<R, B>(&self, method: &str, body: &B) -> Result<R>
    where
        R: for<'de> serde::de::Deserialize<'de> + Type,
        B: Serialize + DynamicType,
    {
        let reply = self.call_on(self.interface.as_str(), method, body).await?;
        reply
            .body()
            .deserialize()
            .map_err(|source| ProxyError::Call {
                method: method.to_owned(),
                source,
            })
    }

    /// Reads one property as a raw tagged value.
    ///
    /// One synchronous round trip per call; nothing is cached locally.
    pub async fn read_property(&self, property: &str) -> Result<OwnedValue> {
        let reply = self
            .call_on(
                PROPERTIES_INTERFACE,
                "Get",
                &(self.interface.as_str(), property),
            )
            .await
            .map_err(|e| e.into_property_error(property))?;
        reply
            .body()
            .deserialize()
            .map_err(|source| ProxyError::Property {
                property: property.to_owned(),
                source,
            })
    }

    /// Writes one property.
    pub async fn write_property<'v, V>(&self, property: &str, value: V) -> Result<()>
    where
        V: Into<Value<'v>>,
    {
        self.call_on(
            PROPERTIES_INTERFACE,
            "Set",
            &(self.interface.as_str(), property, value.into()),
        )
        .await
        .map_err(|e| e.into_property_error(property))?;
        Ok(())
    }

    /// Subscribes to one signal member emitted by this object.
    ///
    /// Installs a match rule scoped by the bound interface, the exact
    /// object path and `member`, and starts routing matching notifications
    /// into a new bounded [`SignalQueue`]. Idempotent while live: a second
    /// call returns the same queue and installs no duplicate rule.
    pub async fn subscribe(&self, member: &str) -> Result<std::sync::Arc<SignalQueue>> {
        let rule = MatchRule::builder()
            .msg_type(zbus::message::Type::Signal)
            .interface(self.interface.as_str())
            .map_err(ProxyError::Address)?
            .path(self.path.as_str())
            .map_err(ProxyError::Address)?
            .member(member)
            .map_err(ProxyError::Address)?
            .build();
        self.subscribe_rule(rule.into()).await
    }

    /// Subscribes to signals under a path-namespace prefix, optionally
    /// filtered to one member.
    ///
    /// Used with the managed-object root to watch the whole device tree
    /// (hotplug, property churn) through a single queue. Shares the same
    /// one-subscription slot as [`subscribe`](Self::subscribe).
    pub async fn subscribe_namespace(
        &self,
        namespace: &str,
        member: Option<&str>,
    ) -> Result<std::sync::Arc<SignalQueue>> {
        let mut builder = MatchRule::builder()
            .msg_type(zbus::message::Type::Signal)
            .path_namespace(namespace)
            .map_err(ProxyError::Address)?;
        if let Some(member) = member {
            builder = builder.member(member).map_err(ProxyError::Address)?;
        }
        self.subscribe_rule(builder.build().into()).await
    }

    async fn subscribe_rule(
        &self,
        rule: zbus::OwnedMatchRule,
    ) -> Result<std::sync::Arc<SignalQueue>> {
        self.subscription
            .get_or_install(move || async move {
                let stream = MessageStream::for_match_rule(
                    rule.clone(),
                    &self.connection,
                    Some(SIGNAL_QUEUE_CAPACITY),
                )
                .await
                .map_err(|source| ProxyError::Subscribe {
                    rule: rule.to_string(),
                    source,
                })?;
                // OwnedMatchRule itself has no Display; format the inner rule.
                debug!(rule = %*rule, "signal match installed");
                Ok(SignalQueue::spawn(stream, rule))
            })
            .await
    }

    /// Ends the live subscription, if any.
    ///
    /// Closes the queue (unblocking a waiting consumer and deregistering
    /// the match rule) and returns the state machine to unsubscribed, so a
    /// later [`subscribe`](Self::subscribe) installs a fresh rule.
    /// Idempotent.
    pub async fn unsubscribe(&self) {
        if let Some(queue) = self.subscription.clear().await {
            debug!(rule = %**queue.rule(), "signal match removed");
            queue.close();
        }
    }

    // Typed property readers. Each fetches the raw value once and applies a
    // single runtime shape assertion; a mismatch names the property.

    /// Reads a `b` property.
    pub async fn read_bool(&self, property: &str) -> Result<bool> {
        let value = self.read_property(property).await?;
        Ok(decode::expect_bool(property, &value)?)
    }

    /// Reads a `y` property.
    pub async fn read_u8(&self, property: &str) -> Result<u8> {
        let value = self.read_property(property).await?;
        Ok(decode::expect_u8(property, &value)?)
    }

    /// Reads an `n` property.
    pub async fn read_i16(&self, property: &str) -> Result<i16> {
        let value = self.read_property(property).await?;
        Ok(decode::expect_i16(property, &value)?)
    }

    /// Reads a `q` property.
    pub async fn read_u16(&self, property: &str) -> Result<u16> {
        let value = self.read_property(property).await?;
        Ok(decode::expect_u16(property, &value)?)
    }

    /// Reads an `i` property.
    pub async fn read_i32(&self, property: &str) -> Result<i32> {
        let value = self.read_property(property).await?;
        Ok(decode::expect_i32(property, &value)?)
    }

    /// Reads a `u` property.
    pub async fn read_u32(&self, property: &str) -> Result<u32> {
        let value = self.read_property(property).await?;
        Ok(decode::expect_u32(property, &value)?)
    }

    /// Reads an `x` property.
    pub async fn read_i64(&self, property: &str) -> Result<i64> {
        let value = self.read_property(property).await?;
        Ok(decode::expect_i64(property, &value)?)
    }

    /// Reads a `t` property.
    pub async fn read_u64(&self, property: &str) -> Result<u64> {
        let value = self.read_property(property).await?;
        Ok(decode::expect_u64(property, &value)?)
    }

    /// Reads a `d` property.
    pub async fn read_f64(&self, property: &str) -> Result<f64> {
        let value = self.read_property(property).await?;
        Ok(decode::expect_f64(property, &value)?)
    }

    /// Reads an `s` property.
    pub async fn read_string(&self, property: &str) -> Result<String> {
        let value = self.read_property(property).await?;
        Ok(decode::expect_str(property, &value)?)
    }

    /// Reads an `o` property.
    pub async fn read_object_path(&self, property: &str) -> Result<OwnedObjectPath> {
        let value = self.read_property(property).await?;
        Ok(decode::expect_object_path(property, &value)?)
    }

    /// Reads an `as` property.
    pub async fn read_string_list(&self, property: &str) -> Result<Vec<String>> {
        let value = self.read_property(property).await?;
        Ok(decode::expect_string_list(property, &value)?)
    }

    /// Reads an `ao` property.
    pub async fn read_path_list(&self, property: &str) -> Result<Vec<OwnedObjectPath>> {
        let value = self.read_property(property).await?;
        Ok(decode::expect_path_list(property, &value)?)
    }

    /// Reads an `au` property.
    pub async fn read_u32_list(&self, property: &str) -> Result<Vec<u32>> {
        let value = self.read_property(property).await?;
        Ok(decode::expect_u32_list(property, &value)?)
    }

    /// Reads an `aau` property.
    pub async fn read_u32_matrix(&self, property: &str) -> Result<Vec<Vec<u32>>> {
        let value = self.read_property(property).await?;
        Ok(decode::expect_u32_matrix(property, &value)?)
    }

    /// Reads an `ay` property.
    pub async fn read_byte_list(&self, property: &str) -> Result<Vec<u8>> {
        let value = self.read_property(property).await?;
        Ok(decode::expect_byte_list(property, &value)?)
    }

    /// Reads an `aay` property.
    pub async fn read_byte_matrix(&self, property: &str) -> Result<Vec<Vec<u8>>> {
        let value = self.read_property(property).await?;
        Ok(decode::expect_byte_matrix(property, &value)?)
    }

    /// Reads an `a{sv}` property as a generic map; flattening into a domain
    /// struct is the caller's job.
    pub async fn read_dict(&self, property: &str) -> Result<HashMap<String, OwnedValue>> {
        let value = self.read_property(property).await?;
        Ok(decode::expect_dict(property, &value)?)
    }

    /// Reads an `aa{sv}` property.
    pub async fn read_dict_list(
        &self,
        property: &str,
    ) -> Result<Vec<HashMap<String, OwnedValue>>> {
        let value = self.read_property(property).await?;
        Ok(decode::expect_dict_list(property, &value)?)
    }

    /// Reads a property holding a list of fixed two-element composites.
    pub async fn read_pair_list(&self, property: &str) -> Result<Vec<Pair>> {
        let value = self.read_property(property).await?;
        Ok(pair::decode_pair_list(property, &value)?)
    }
}

impl ProxyError {
    /// Re-labels a failed properties-interface call as a property failure,
    /// so callers can tell "property unavailable" from an ordinary method
    /// rejection.
    fn into_property_error(self, property: &str) -> Self {
        match self {
            ProxyError::Call { source, .. } => ProxyError::Property {
                property: property.to_owned(),
                source,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Bind itself needs a live connection, but the name validation it
    // performs is exactly these conversions.

    #[test]
    fn address_validation_rejects_bad_interface() {
        assert!(OwnedInterfaceName::try_from("not an interface").is_err());
        assert!(OwnedInterfaceName::try_from("org.test.Modem").is_ok());
    }

    #[test]
    fn address_validation_rejects_bad_path() {
        assert!(OwnedObjectPath::try_from("relative/path").is_err());
        assert!(OwnedObjectPath::try_from("/org/test/Modem/0").is_ok());
    }

    #[test]
    fn address_validation_rejects_bad_service_name() {
        assert!(OwnedBusName::try_from("").is_err());
        assert!(OwnedBusName::try_from("org.test.Service").is_ok());
    }
}
