// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! RPC transport between the daemon and its executors.
//!
//! Wire format: UTF-8 newline-delimited JSON-RPC 2.0, one message per
//! line, over a Unix-domain socket. The channel is symmetric: either peer
//! may issue requests, responses, or notifications.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod codec;
mod message;
mod methods;
mod peer;
mod socket;

pub use codec::{decode, encode, read_message, write_message};
pub use message::{RpcError, RpcMessage, ERROR_HANDLER, ERROR_INTERNAL, ERROR_UNKNOWN_METHOD};
pub use methods::{
    method, notification, DaemonCommand, DaemonCommandParams, ExecutePromptParams,
    ExecutePromptResult, ExecuteStatus, GetApiKeyParams, GetApiKeyResult,
    PermissionResolvedParams, PingResult, ReportMessageParams, RequestPermissionParams,
    RequestPermissionResult, RpcErrorBody, ShutdownParams, TaskStopAckParams, TaskStopParams,
    TaskStoppedCompleteParams, TokenUsage,
};
pub use peer::{NoopHandler, ProtocolError, RpcHandler, RpcPeer};
pub use socket::{bind_socket, connect_socket};

#[cfg(test)]
mod property_tests;
