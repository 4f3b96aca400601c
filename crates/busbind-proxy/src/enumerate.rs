use tracing::debug;
use zbus::fdo::ManagedObjects;
use zbus::Connection;
use zvariant::OwnedObjectPath;

use crate::error::{ProxyError, Result};

const OBJECT_MANAGER_INTERFACE: &str = "org.freedesktop.DBus.ObjectManager";

/// Lists the child objects currently attached under `root`.
///
/// One `GetManagedObjects` round trip; only the key set of the returned
/// path -> interface -> property map is consumed. Does not recurse beyond
/// one level and does not cache — callers wanting freshness re-invoke. The
/// result is sorted so repeated enumerations are comparable.
pub async fn list_children(
    connection: &Connection,
    service: &str,
    root: &str,
) -> Result<Vec<OwnedObjectPath>> {
    let reply = connection
        .call_method(
            Some(service),
            root,
            Some(OBJECT_MANAGER_INTERFACE),
            "GetManagedObjects",
            &(),
        )
        .await
        .map_err(|source| ProxyError::Enumeration {
            root: root.to_owned(),
            source,
        })?;
    let objects: ManagedObjects =
        reply
            .body()
            .deserialize()
            .map_err(|source| ProxyError::Enumeration {
                root: root.to_owned(),
                source,
            })?;

    let mut children: Vec<OwnedObjectPath> = objects.into_keys().collect();
    sort_paths(&mut children);
    debug!(root, count = children.len(), "enumerated managed objects");
    Ok(children)
}

// OwnedObjectPath carries no Ord; order by the textual form.
fn sort_paths(children: &mut [OwnedObjectPath]) {
    children.sort_by(|a, b| a.as_str().cmp(b.as_str()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumeration_order_is_deterministic() {
        let mut paths: Vec<OwnedObjectPath> =
            ["/org/test/Modem/2", "/org/test/Modem/0", "/org/test/Modem/10"]
                .iter()
                .map(|p| OwnedObjectPath::try_from(*p).unwrap())
                .collect();
        sort_paths(&mut paths);
        let ordered: Vec<&str> = paths.iter().map(|p| p.as_str()).collect();
        assert_eq!(
            ordered,
            vec!["/org/test/Modem/0", "/org/test/Modem/10", "/org/test/Modem/2"]
        );
    }
}
