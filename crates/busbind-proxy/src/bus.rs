use tokio::sync::OnceCell;
use tracing::debug;
use zbus::Connection;

use crate::error::{ProxyError, Result};

static SYSTEM_BUS: OnceCell<Connection> = OnceCell::const_new();

/// Returns the process-wide system bus connection, establishing it on first
/// use.
///
/// The handle is a cheap clone of one shared connection and is safe for
/// concurrent use by every bound object. A failed attempt leaves the cell
/// empty, so a later call performs a fresh handshake; there is no retry
/// loop here.
pub async fn system_bus() -> Result<Connection> {
    let connection = SYSTEM_BUS
        .get_or_try_init(|| async {
            let connection = Connection::system().await?;
            debug!(name = ?connection.unique_name(), "system bus connection established");
            Ok::<_, zbus::Error>(connection)
        })
        .await
        .map_err(ProxyError::Connection)?;
    Ok(connection.clone())
}
