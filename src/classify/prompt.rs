// src/classify/prompt.rs
use serde_json::{json, Value};

use super::types::ANALYSIS_FIELDS;

/// Sorting policy handed to the model as its system instruction.
pub const SYSTEM_INSTRUCTION: &str = "\
You are an expert Waste Management Assistant. Analyze the image and classify the waste based on these STRICT rules:
- GREEN (Recycle): Clean plastic bottles, Metal cans, Clean cardboard.
- YELLOW (Compost): Food waste, Organic waste, Paper/cardboard with food or grease (e.g. dirty pizza box).
- RED (Hazard): Batteries, Electronics, Chemicals, Medical waste. Hazard overrides all other rules.
- GREY (Trash): Soft plastics (wrappers), unrecognizable items, or anything not clearly fitting GREEN, YELLOW, or RED.

Priority: Hazard (RED) > Compost (YELLOW) > Recycle (GREEN) > Trash (GREY).
If grease/food is present, it MUST be YELLOW.
If unsure, default to GREY.

Provide labels and explanations in both English and Urdu.";

/// Text part sent alongside the image.
pub const USER_PROMPT: &str = "Classify this item for disposal. Return as JSON.";

/// Structured-output schema: an object with six required string properties.
pub fn response_schema() -> Value {
    let mut properties = serde_json::Map::new();
    for field in ANALYSIS_FIELDS {
        let property = if field == "category" {
            json!({ "type": "STRING", "description": "GREEN, YELLOW, RED, or GREY" })
        } else {
            json!({ "type": "STRING" })
        };
        properties.insert(field.to_string(), property);
    }

    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": ANALYSIS_FIELDS,
    })
}
