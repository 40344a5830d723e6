//! Attach identity and provenance to a normalized recipe.

use chrono::Utc;
use uuid::Uuid;

use crate::types::{NormalizedRecipe, Recipe, SourceType};

/// Build the final [`Recipe`] record: fresh id, current timestamp, caller's source type.
pub fn assemble_recipe(normalized: NormalizedRecipe, source_type: SourceType) -> Recipe {
    Recipe {
        recipe_id: Uuid::new_v4(),
        original_name: normalized.original_name,
        versions: normalized.versions,
        source_type,
        created_at: Utc::now().timestamp_millis(),
        image_url: None,
    }
}
