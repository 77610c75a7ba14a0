//! JSON-RPC envelope and the remote method vocabulary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// Reply of a healthy server to [`method::PING`].
pub const PONG: &str = "pong";

/// Method names understood by the on-device automation server.
pub mod method {
    pub const PING: &str = "ping";
    pub const DEVICE_INFO: &str = "deviceInfo";
    pub const CLICK: &str = "click";
    pub const SWIPE: &str = "swipe";
    pub const DRAG: &str = "drag";
    pub const DUMP_WINDOW_HIERARCHY: &str = "dumpWindowHierarchy";
    pub const TAKE_SCREENSHOT: &str = "takeScreenshot";
    pub const FREEZE_ROTATION: &str = "freezeRotation";
    pub const SET_ORIENTATION: &str = "setOrientation";
    pub const GET_LAST_TRAVERSED_TEXT: &str = "getLastTraversedText";
    pub const CLEAR_LAST_TRAVERSED_TEXT: &str = "clearLastTraversedText";
    pub const OPEN_NOTIFICATION: &str = "openNotification";
    pub const OPEN_QUICK_SETTINGS: &str = "openQuickSettings";
    pub const HAS_WATCHER_TRIGGERED: &str = "hasWatcherTriggered";
    pub const PRESS_KEY: &str = "pressKey";
    pub const PRESS_KEY_CODE: &str = "pressKeyCode";
    pub const WAKE_UP: &str = "wakeUp";
    pub const SLEEP: &str = "sleep";
    pub const WAIT_FOR_IDLE: &str = "waitForIdle";
    pub const WAIT_FOR_WINDOW_UPDATE: &str = "waitForWindowUpdate";

    pub const EXIST: &str = "exist";
    pub const OBJ_INFO: &str = "objInfo";
    pub const SET_TEXT: &str = "setText";
    pub const CLEAR_TEXT_FIELD: &str = "clearTextField";
    pub const CLICK_AND_WAIT_FOR_NEW_WINDOW: &str = "clickAndWaitForNewWindow";
    pub const LONG_CLICK: &str = "longClick";
    pub const DRAG_TO: &str = "dragTo";
    pub const GESTURE: &str = "gesture";
    pub const PINCH_IN: &str = "pinchIn";
    pub const PINCH_OUT: &str = "pinchOut";
    pub const FLING_FORWARD: &str = "flingForward";
    pub const FLING_BACKWARD: &str = "flingBackward";
    pub const FLING_TO_BEGINNING: &str = "flingToBeginning";
    pub const FLING_TO_END: &str = "flingToEnd";
    pub const SCROLL_FORWARD: &str = "scrollForward";
    pub const SCROLL_BACKWARD: &str = "scrollBackward";
    pub const SCROLL_TO_BEGINNING: &str = "scrollToBeginning";
    pub const SCROLL_TO_END: &str = "scrollToEnd";
    pub const SCROLL_TO: &str = "scrollTo";
    pub const WAIT_FOR_EXISTS: &str = "waitForExists";
    pub const WAIT_UNTIL_GONE: &str = "waitUntilGone";
}

/// A JSON-RPC 2.0 call with positional parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Vec<Value>,
    pub id: String,
}

impl RpcRequest {
    pub fn new(id: impl Into<String>, method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.into(),
            params,
            id: id.into(),
        }
    }
}

/// Error object of a failed call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A JSON-RPC 2.0 reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorObject>,
}

impl RpcResponse {
    pub fn success(id: impl Into<String>, result: Value) -> Self {
        Self {
            id: Some(Value::String(id.into())),
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: impl Into<String>, error: RpcErrorObject) -> Self {
        Self {
            id: Some(Value::String(id.into())),
            result: None,
            error: Some(error),
        }
    }

    /// Unwrap the reply for `method`.
    ///
    /// A reply carrying neither `result` nor `error` is a void call and maps
    /// to `null`.
    pub fn into_result(self, method: &str) -> Result<Value, ApiError> {
        match (self.error, self.result) {
            (Some(err), _) => Err(ApiError::rpc_remote(method, err.code, &err.message)),
            (None, Some(result)) => Ok(result),
            (None, None) => Ok(Value::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;

    #[test]
    fn test_request_wire_shape() {
        let req = RpcRequest::new("1", method::CLICK, vec![json!(10), json!(20)]);
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({"jsonrpc": "2.0", "method": "click", "params": [10, 20], "id": "1"})
        );
    }

    #[test]
    fn test_response_result() {
        let resp: RpcResponse =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":"1","result":"pong"}"#).unwrap();
        assert_eq!(resp.into_result(method::PING).unwrap(), json!(PONG));
    }

    #[test]
    fn test_response_error_maps_to_rpc_error() {
        let resp: RpcResponse = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":"1","error":{"code":-32001,"message":"not found"}}"#,
        )
        .unwrap();
        assert_eq!(
            resp,
            RpcResponse::failure(
                "1",
                RpcErrorObject {
                    code: -32001,
                    message: "not found".into(),
                    data: None,
                },
            )
        );
        let err = resp.into_result(method::OBJ_INFO).unwrap_err();
        assert_eq!(err.code, ErrorCode::RpcError);
        assert!(err.message.contains("objInfo"));
        assert!(err.message.contains("not found"));
    }

    #[test]
    fn test_void_response_is_null() {
        let resp: RpcResponse = serde_json::from_str(r#"{"jsonrpc":"2.0","id":"1"}"#).unwrap();
        assert_eq!(resp.into_result(method::WAKE_UP).unwrap(), Value::Null);
    }

    #[test]
    fn test_success_constructor() {
        let resp = RpcResponse::success("7", json!(true));
        assert_eq!(resp.into_result(method::EXIST).unwrap(), json!(true));
    }
}
