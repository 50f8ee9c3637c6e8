// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unix-domain socket setup.

use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use tokio::net::{UnixListener, UnixStream};

use crate::peer::ProtocolError;

/// Bind a listening socket at `path`, replacing any stale file.
///
/// The socket is chmod 0666 so a peer process running under a different
/// Unix user may connect.
pub fn bind_socket(path: &Path) -> Result<UnixListener, ProtocolError> {
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let listener = UnixListener::bind(path)?;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o666))?;
    Ok(listener)
}

/// Connect to a listening socket.
pub async fn connect_socket(path: &Path) -> Result<UnixStream, ProtocolError> {
    Ok(UnixStream::connect(path).await?)
}
