//! JSON schema the generator must satisfy. Mirrors `AutofillResult` field for field.

use serde_json::{json, Value};

use crate::llm_client::JsonSchemaFormat;

pub const SCHEMA_NAME: &str = "autofill_prep";

/// Object schema where every listed property is a required string.
fn string_object(fields: &[&str]) -> Value {
    let properties: serde_json::Map<String, Value> = fields
        .iter()
        .map(|f| (f.to_string(), json!({ "type": "string" })))
        .collect();
    json!({
        "type": "object",
        "additionalProperties": false,
        "properties": properties,
        "required": fields,
    })
}

pub fn autofill_schema() -> JsonSchemaFormat {
    let string_array = json!({ "type": "array", "items": { "type": "string" } });

    let schema = json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "company": string_object(&[
                "oneLiner",
                "productMarket",
                "motivation",
                "researchChecklist",
                "links",
            ]),
            "role": string_object(&["summary", "requirements", "fit"]),
            "jd": {
                "type": "object",
                "additionalProperties": false,
                "properties": { "keywords": string_array },
                "required": ["keywords"],
            },
            "sources": string_object(&["jobUrl", "companyUrl"]),
            "warnings": string_array,
        },
        "required": ["company", "role", "jd", "sources", "warnings"],
    });

    JsonSchemaFormat::strict(SCHEMA_NAME, schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Walks every object node and checks that all properties are required and
    /// nothing extra is allowed.
    fn assert_closed(node: &Value, path: &str) {
        if node["type"] == "object" {
            assert_eq!(node["additionalProperties"], false, "{path} allows extras");
            let props = node["properties"].as_object().unwrap();
            let required: Vec<&str> = node["required"]
                .as_array()
                .unwrap()
                .iter()
                .map(|v| v.as_str().unwrap())
                .collect();
            for (key, child) in props {
                assert!(required.contains(&key.as_str()), "{path}.{key} not required");
                assert_closed(child, &format!("{path}.{key}"));
            }
        }
    }

    #[test]
    fn test_schema_is_closed_and_fully_required() {
        let format = autofill_schema();
        assert_eq!(format.name, "autofill_prep");
        assert!(format.strict);
        assert_closed(&format.schema, "$");
    }

    #[test]
    fn test_schema_keywords_is_string_array() {
        let format = autofill_schema();
        let keywords = &format.schema["properties"]["jd"]["properties"]["keywords"];
        assert_eq!(keywords["type"], "array");
        assert_eq!(keywords["items"]["type"], "string");
    }

    #[test]
    fn test_schema_top_level_keys() {
        let format = autofill_schema();
        let props = format.schema["properties"].as_object().unwrap();
        let mut keys: Vec<&String> = props.keys().collect();
        keys.sort();
        assert_eq!(keys, ["company", "jd", "role", "sources", "warnings"]);
    }
}
