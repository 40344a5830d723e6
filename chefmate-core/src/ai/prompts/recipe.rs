//! Prompt for generating the three recipe variants.

use crate::ai::types::{GenerateRequest, Part};
use crate::image::ImageInput;
use crate::types::SourceType;

use super::schema::recipe_response_schema;

/// Fixed persona, language, and structure rules.
pub const SYSTEM_INSTRUCTION: &str = "Du bist ChefMate, eine erstklassige Koch-KI. \
Du adaptierst Rezepte in 3 spezifische Stile: Student (schnell, billig, einfach), \
Profi (authentisch, hohe Technik, Premium-Zutaten) und Airfryer (optimiert für Heißluft/Geräte). \
Sprache: Deutsch, metrische Einheiten. \
Kategorisiere Zutaten immer konsistent auf Deutsch (z.B. Gemüse, Milchprodukte, Fleisch, Vorrat, Gewürze) \
und fülle das Feld 'category' immer aus. \
Gib IMMER exakt JSON im vorgegebenen Schema zurück, ohne Prosa oder Erklärungen.";

/// Instruction used for photo input; the user text is not part of it.
pub const SCAN_PROMPT: &str = "Analysiere dieses Menü oder Essensbild. \
Identifiziere das Gericht und erstelle 3 Versionen: Student, Profi und Airfryer. \
Gib das Ergebnis auf Deutsch zurück.";

/// Render the user-facing instruction for a request.
pub fn render_user_prompt(source_type: SourceType, user_text: &str) -> String {
    let text = user_text.trim();

    match source_type {
        SourceType::Pantry => format!(
            "Erstelle ein stimmiges Gericht aus diesen Zutaten: {text}. \
Erstelle 3 Versionen: Student (einfach/günstig), Profi (authentisch/Gourmet) \
und Airfryer (falls anwendbar oder für Küchengeräte optimiert). \
Gib das Ergebnis auf Deutsch zurück."
        ),
        SourceType::Scan => SCAN_PROMPT.to_string(),
        SourceType::Search | SourceType::Social => format!(
            "Erstelle 3 Versionen des Gerichts \"{text}\": Student (einfach/günstig), \
Profi (authentisch/Gourmet) und Airfryer (geräteoptimiert). \
Gib das Ergebnis auf Deutsch zurück."
        ),
    }
}

/// Ordered content parts: the image first (if any), then the instruction.
pub fn build_parts(
    source_type: SourceType,
    user_text: &str,
    image: Option<&ImageInput>,
) -> Vec<Part> {
    let mut parts = Vec::with_capacity(2);

    if let Some(image) = image {
        parts.push(Part::inline_data(image.mime_type(), image.data().to_vec()));
    }
    parts.push(Part::text(render_user_prompt(source_type, user_text)));

    parts
}

/// Full structured-generation request for a recipe.
pub fn build_request(
    source_type: SourceType,
    user_text: &str,
    image: Option<&ImageInput>,
) -> GenerateRequest {
    GenerateRequest {
        system_instruction: Some(SYSTEM_INSTRUCTION.to_string()),
        parts: build_parts(source_type, user_text, image),
        response_schema: Some(recipe_response_schema()),
        temperature: Some(0.7),
        max_output_tokens: Some(8192),
    }
}
