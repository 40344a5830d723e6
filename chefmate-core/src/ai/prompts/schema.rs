//! Output schema handed to the model (Gemini OpenAPI-subset format).

use serde_json::{json, Value};

use crate::types::VariantKind;

fn ingredient_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "item": { "type": "STRING" },
            "amount": { "type": "NUMBER" },
            "unit": { "type": "STRING" },
            "category": {
                "type": "STRING",
                "description": "Kategorie wie Gemüse, Milchprodukte, Fleisch, Vorrat, Gewürze"
            }
        },
        "required": ["item", "amount", "unit"]
    })
}

fn variant_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "prepTime": { "type": "STRING" },
            "ingredients": { "type": "ARRAY", "items": ingredient_schema() },
            "steps": { "type": "ARRAY", "items": { "type": "STRING" } },
            "tips": { "type": "STRING" },
            "calories": { "type": "NUMBER" }
        },
        "required": ["title", "prepTime", "ingredients", "steps", "tips"]
    })
}

/// Schema for `{ originalName, versions: { student, profi, airfryer } }`.
pub fn recipe_response_schema() -> Value {
    let variants: serde_json::Map<String, Value> = VariantKind::ALL
        .iter()
        .map(|kind| (kind.as_str().to_string(), variant_schema()))
        .collect();
    let required: Vec<&str> = VariantKind::ALL.iter().map(VariantKind::as_str).collect();

    json!({
        "type": "OBJECT",
        "properties": {
            "originalName": { "type": "STRING" },
            "versions": {
                "type": "OBJECT",
                "properties": variants,
                "required": required
            }
        },
        "required": ["originalName", "versions"]
    })
}
