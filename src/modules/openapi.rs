//! Small builders for the OpenAPI fragments each module publishes.

use serde_json::{json, Value};

/// A 2xx response wrapped in the `{status, data}` envelope.
pub fn data_envelope(description: &str, data: Value) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": {
                    "type": "object",
                    "properties": {
                        "status": { "type": "integer" },
                        "data": data
                    },
                    "required": ["status", "data"]
                }
            }
        }
    })
}

pub fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

pub fn id_parameter(description: &str) -> Value {
    json!({
        "name": "id",
        "in": "path",
        "required": true,
        "description": description,
        "schema": { "type": "integer", "format": "int64", "minimum": 0 }
    })
}
