// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! agor-storage: in-memory materialized state for the control plane.
//!
//! The write-side invariants live here: status transitions must be legal
//! edges, terminal tasks accept no further writes, and the task writer can
//! never touch a session's `ready_for_prompt` flag.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod snapshot;
mod state;

pub use snapshot::{load_snapshot, save_snapshot, SnapshotError};
pub use state::{MaterializedState, SessionPatch, StorageError};
