use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a generation request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Free-text dish name.
    Search,
    /// List of ingredients the user has at home.
    Pantry,
    /// Photo of a dish or menu.
    Scan,
    /// Reference to a social media post.
    Social,
}

impl SourceType {
    pub const ALL: &'static [SourceType] = &[
        SourceType::Search,
        SourceType::Pantry,
        SourceType::Scan,
        SourceType::Social,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Search => "search",
            SourceType::Pantry => "pantry",
            SourceType::Scan => "scan",
            SourceType::Social => "social",
        }
    }

    /// Parse a wire string. `text` is accepted as an alias for `search`.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "search" | "text" => Some(SourceType::Search),
            "pantry" => Some(SourceType::Pantry),
            "scan" => Some(SourceType::Scan),
            "social" => Some(SourceType::Social),
            _ => None,
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three fixed recipe styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum VariantKind {
    /// Quick, cheap, simple.
    Student,
    /// Authentic, premium ingredients, advanced technique.
    Profi,
    /// Optimized for an air fryer or similar appliance.
    Airfryer,
}

impl VariantKind {
    /// All variants in canonical order.
    pub const ALL: &'static [VariantKind] = &[
        VariantKind::Student,
        VariantKind::Profi,
        VariantKind::Airfryer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VariantKind::Student => "student",
            VariantKind::Profi => "profi",
            VariantKind::Airfryer => "airfryer",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "student" => Some(VariantKind::Student),
            "profi" => Some(VariantKind::Profi),
            "airfryer" => Some(VariantKind::Airfryer),
            _ => None,
        }
    }
}

impl std::fmt::Display for VariantKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Ingredient {
    pub item: String,
    pub amount: f64,
    pub unit: String,
    /// Grocery aisle label, e.g. "Gemüse" or "Milchprodukte".
    pub category: String,
}

/// One stylistic take on a dish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RecipeVariant {
    pub title: String,
    pub prep_time: String,
    pub ingredients: Vec<Ingredient>,
    /// Never empty once normalized.
    pub steps: Vec<String>,
    pub tips: String,
    pub calories: f64,
}

/// Exactly one variant per [`VariantKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RecipeVariantSet {
    pub student: RecipeVariant,
    pub profi: RecipeVariant,
    pub airfryer: RecipeVariant,
}

impl RecipeVariantSet {
    pub fn get(&self, kind: VariantKind) -> &RecipeVariant {
        match kind {
            VariantKind::Student => &self.student,
            VariantKind::Profi => &self.profi,
            VariantKind::Airfryer => &self.airfryer,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (VariantKind, &RecipeVariant)> {
        VariantKind::ALL.iter().map(move |&kind| (kind, self.get(kind)))
    }
}

/// Model output after normalization, before identity is attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRecipe {
    pub original_name: String,
    pub versions: RecipeVariantSet,
}

/// A generated recipe with its three variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub recipe_id: Uuid,
    pub original_name: String,
    pub versions: RecipeVariantSet,
    pub source_type: SourceType,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}
