//! Response envelopes produced by the dispatcher.

use crate::case::value_keys_to_camel_case;
use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde_json::{json, Value};

/// Flatten an action result to its wire form: plain data with camelCase keys.
/// Idempotent: applying it twice yields the same value.
pub fn plain(mut value: Value) -> Value {
    value_keys_to_camel_case(&mut value);
    value
}

/// `200 {"success": true, "data": ...}`
pub fn success(data: Value) -> Response {
    (
        StatusCode::OK,
        Json(json!({ "success": true, "data": plain(data) })),
    )
        .into_response()
}

/// `404 {"success": false}`: an action resolved to nothing.
pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "success": false }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_is_idempotent() {
        let v = json!({ "user_id": 1, "user": { "created_at": "t" } });
        let once = plain(v);
        assert_eq!(plain(once.clone()), once);
        assert_eq!(once, json!({ "userId": 1, "user": { "createdAt": "t" } }));
    }
}
