// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line codec: one JSON-RPC message per newline-terminated UTF-8 line.

use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::message::RpcMessage;
use crate::peer::ProtocolError;

/// Serialize a message to its single-line wire form (no trailing newline).
pub fn encode(message: &RpcMessage) -> String {
    message.to_value().to_string()
}

/// Parse a single wire line.
pub fn decode(line: &str) -> Result<RpcMessage, ProtocolError> {
    let value: serde_json::Value =
        serde_json::from_str(line).map_err(|source| ProtocolError::Malformed {
            line: line.to_string(),
            detail: source.to_string(),
        })?;
    RpcMessage::from_value(value).ok_or_else(|| ProtocolError::Malformed {
        line: line.to_string(),
        detail: "not a JSON-RPC 2.0 message".to_string(),
    })
}

/// Write one message and flush. Writes are best-effort with respect to
/// back-pressure: both peers consume eagerly, so this only suspends on the
/// kernel buffer.
pub async fn write_message<W>(writer: &mut W, message: &RpcMessage) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    let mut line = encode(message);
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Read the next message, skipping empty lines. Returns
/// `ConnectionClosed` on EOF.
pub async fn read_message<R>(reader: &mut BufReader<R>) -> Result<RpcMessage, ProtocolError>
where
    R: tokio::io::AsyncRead + Unpin,
{
    loop {
        let mut line = String::new();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            return Err(ProtocolError::ConnectionClosed);
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        return decode(trimmed);
    }
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
