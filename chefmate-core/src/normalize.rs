//! Coercion of untrusted model output into a fully populated [`NormalizedRecipe`].
//!
//! The model is asked for a fixed JSON schema but nothing guarantees it complies.
//! Every field is read from an untyped [`serde_json::Value`] and replaced by a fixed
//! default when missing, `null`, blank, or of the wrong type. Fields are handled
//! independently, so one broken field never affects its siblings.
//!
//! Only structural problems can fail: a root that is not an object, and (in
//! [`NormalizePolicy::Strict`]) a missing `versions` container or variant key.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::{Ingredient, NormalizedRecipe, RecipeVariant, RecipeVariantSet, VariantKind};

pub const DEFAULT_ORIGINAL_NAME: &str = "Unbenanntes Gericht";
pub const DEFAULT_TITLE: &str = "Version";
pub const DEFAULT_PREP_TIME: &str = "30 min";
pub const DEFAULT_ITEM: &str = "Zutat";
pub const DEFAULT_UNIT: &str = "Stk";
pub const DEFAULT_CATEGORY: &str = "Sonstiges";
pub const DEFAULT_STEP: &str = "Zubereitungsschritte fehlen.";

/// How to treat structurally incomplete responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizePolicy {
    /// Synthesize fully defaulted variants for anything missing.
    #[default]
    Lenient,
    /// Reject a response without `versions` or without one of the variant keys.
    Strict,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("Invalid AI response: not an object")]
    NotAnObject,

    #[error("Invalid AI response: missing versions")]
    MissingVersions,

    #[error("Invalid AI response: missing variant '{0}'")]
    MissingVariant(VariantKind),
}

/// Normalize a parsed model response.
pub fn normalize_recipe(
    data: &Value,
    policy: NormalizePolicy,
) -> Result<NormalizedRecipe, NormalizeError> {
    let root = data.as_object().ok_or(NormalizeError::NotAnObject)?;

    let original_name = text_or(root.get("originalName"), DEFAULT_ORIGINAL_NAME);

    let versions = match root.get("versions").and_then(Value::as_object) {
        Some(versions) => Some(versions),
        None if policy == NormalizePolicy::Strict => return Err(NormalizeError::MissingVersions),
        None => None,
    };

    let variant = |kind: VariantKind| -> Result<RecipeVariant, NormalizeError> {
        let raw = versions
            .and_then(|v| v.get(kind.as_str()))
            .filter(|v| !v.is_null());
        if raw.is_none() && policy == NormalizePolicy::Strict {
            return Err(NormalizeError::MissingVariant(kind));
        }
        Ok(normalize_variant(raw))
    };

    Ok(NormalizedRecipe {
        original_name,
        versions: RecipeVariantSet {
            student: variant(VariantKind::Student)?,
            profi: variant(VariantKind::Profi)?,
            airfryer: variant(VariantKind::Airfryer)?,
        },
    })
}

/// Normalize a single variant. Anything that is not an object yields all defaults.
pub fn normalize_variant(raw: Option<&Value>) -> RecipeVariant {
    let empty = Map::new();
    let fields = raw.and_then(Value::as_object).unwrap_or(&empty);

    let ingredients = match fields.get("ingredients") {
        Some(Value::Array(items)) => items.iter().map(normalize_ingredient).collect(),
        _ => Vec::new(),
    };

    let mut steps: Vec<String> = match fields.get("steps") {
        Some(Value::Array(items)) => items.iter().filter_map(non_blank).collect(),
        _ => Vec::new(),
    };
    if steps.is_empty() {
        steps.push(DEFAULT_STEP.to_string());
    }

    RecipeVariant {
        title: text_or(fields.get("title"), DEFAULT_TITLE),
        prep_time: text_or(fields.get("prepTime"), DEFAULT_PREP_TIME),
        ingredients,
        steps,
        tips: text_or(fields.get("tips"), ""),
        calories: non_negative_number(fields.get("calories")),
    }
}

/// Normalize one ingredient element.
///
/// A bare string is taken as the item name; any other non-object yields all defaults.
pub fn normalize_ingredient(raw: &Value) -> Ingredient {
    if let Some(item) = non_blank(raw) {
        return Ingredient {
            item,
            amount: 0.0,
            unit: DEFAULT_UNIT.to_string(),
            category: DEFAULT_CATEGORY.to_string(),
        };
    }

    let empty = Map::new();
    let fields = raw.as_object().unwrap_or(&empty);

    Ingredient {
        item: text_or(fields.get("item"), DEFAULT_ITEM),
        amount: non_negative_number(fields.get("amount")),
        unit: text_or(fields.get("unit"), DEFAULT_UNIT),
        category: text_or(fields.get("category"), DEFAULT_CATEGORY),
    }
}

/// A trimmed string if the value is a string with visible content.
fn non_blank(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn text_or(value: Option<&Value>, default: &str) -> String {
    value
        .and_then(non_blank)
        .unwrap_or_else(|| default.to_string())
}

/// Read a quantity. Numeric strings are accepted, including a decimal comma.
fn non_negative_number(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(n) if n.is_finite() && n > 0.0 => n,
        _ => 0.0,
    }
}
