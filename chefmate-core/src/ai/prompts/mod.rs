//! AI prompt templates.

pub mod recipe;
pub mod schema;

pub use recipe::{build_parts, build_request, render_user_prompt, SYSTEM_INSTRUCTION};
pub use schema::recipe_response_schema;
