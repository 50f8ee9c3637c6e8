// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Codec round-trip properties.

use proptest::prelude::*;

use crate::codec::{decode, encode};
use crate::message::{RpcError, RpcMessage};

fn arb_params() -> impl Strategy<Value = serde_json::Value> {
    prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::from),
        any::<i64>().prop_map(serde_json::Value::from),
        "[a-zA-Z0-9 '\"\\\\$&|;]{0,64}".prop_map(serde_json::Value::from),
    ]
}

fn arb_message() -> impl Strategy<Value = RpcMessage> {
    prop_oneof![
        ("[a-z0-9-]{1,36}", "[a-z_]{1,20}", arb_params()).prop_map(|(id, method, params)| {
            RpcMessage::Request { id, method, params }
        }),
        ("[a-z0-9-]{1,36}", arb_params())
            .prop_map(|(id, value)| RpcMessage::Response { id, result: Ok(value) }),
        ("[a-z0-9-]{1,36}", any::<i64>(), ".{0,40}").prop_map(|(id, code, message)| {
            RpcMessage::Response {
                id,
                result: Err(RpcError { code, message, data: None }),
            }
        }),
        ("[a-z_]{1,20}", arb_params())
            .prop_map(|(method, params)| RpcMessage::Notification { method, params }),
    ]
}

proptest! {
    #[test]
    fn encode_decode_round_trips(message in arb_message()) {
        let line = encode(&message);
        prop_assert!(!line.contains('\n'));
        let decoded = decode(&line).unwrap();
        prop_assert_eq!(decoded, message);
    }

    #[test]
    fn decode_never_panics_on_arbitrary_input(line in ".{0,200}") {
        let _ = decode(&line);
    }
}
