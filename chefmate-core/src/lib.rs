pub mod ai;
pub mod assemble;
pub mod error;
pub mod generate;
pub mod image;
pub mod normalize;
pub mod planner;
pub mod shopping;
pub mod types;

pub use assemble::assemble_recipe;
pub use error::GenerateError;
pub use generate::{GenerateParams, RecipeGenerator};
pub use image::{validate_image, ImageInput, MAX_FILE_SIZE};
pub use normalize::{normalize_recipe, NormalizeError, NormalizePolicy};
pub use planner::{MealSlot, PlannedMeal, PlannerDay, PlannerError, WeekPlan};
pub use shopping::{ShoppingItem, ShoppingList};
pub use types::{
    Ingredient, NormalizedRecipe, Recipe, RecipeVariant, RecipeVariantSet, SourceType,
    VariantKind,
};
