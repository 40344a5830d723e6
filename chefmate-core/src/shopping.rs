//! Aggregated shopping list built from planned recipe variants.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::types::{Ingredient, Recipe, VariantKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ShoppingItem {
    #[serde(flatten)]
    pub ingredient: Ingredient,
    pub checked: bool,
    /// Recipes that contributed to this item, each listed once.
    pub recipe_ids: Vec<Uuid>,
}

impl ShoppingItem {
    fn matches(&self, ingredient: &Ingredient) -> bool {
        self.ingredient.item.to_lowercase() == ingredient.item.to_lowercase()
            && self.ingredient.unit == ingredient.unit
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ShoppingList {
    pub items: Vec<ShoppingItem>,
}

impl ShoppingList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge the ingredients of one variant of `recipe` into the list.
    pub fn add_recipe(&mut self, recipe: &Recipe, version: VariantKind) {
        for ingredient in &recipe.versions.get(version).ingredients {
            self.add_ingredient(ingredient, recipe.recipe_id);
        }
    }

    /// Items match on case-insensitive name and identical unit.
    pub fn add_ingredient(&mut self, ingredient: &Ingredient, recipe_id: Uuid) {
        match self.items.iter_mut().find(|item| item.matches(ingredient)) {
            Some(existing) => {
                existing.ingredient.amount += ingredient.amount;
                if !existing.recipe_ids.contains(&recipe_id) {
                    existing.recipe_ids.push(recipe_id);
                }
            }
            None => self.items.push(ShoppingItem {
                ingredient: ingredient.clone(),
                checked: false,
                recipe_ids: vec![recipe_id],
            }),
        }
    }

    /// Flip the checked state; returns the new state, or None for a bad index.
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        let item = self.items.get_mut(index)?;
        item.checked = !item.checked;
        Some(item.checked)
    }

    pub fn open_count(&self) -> usize {
        self.items.iter().filter(|item| !item.checked).count()
    }

    /// Drop checked items, returning how many were removed.
    pub fn clear_checked(&mut self) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !item.checked);
        before - self.items.len()
    }

    /// Items with their list index, grouped by category; categories sorted, items in
    /// insertion order.
    pub fn by_category(&self) -> BTreeMap<&str, Vec<(usize, &ShoppingItem)>> {
        let mut groups: BTreeMap<&str, Vec<(usize, &ShoppingItem)>> = BTreeMap::new();
        for (index, item) in self.items.iter().enumerate() {
            groups
                .entry(item.ingredient.category.as_str())
                .or_default()
                .push((index, item));
        }
        groups
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::assemble_recipe;
    use crate::normalize::{normalize_recipe, NormalizePolicy};
    use crate::types::SourceType;
    use serde_json::json;

    fn recipe(student_ingredients: serde_json::Value) -> Recipe {
        let data = json!({
            "originalName": "Test",
            "versions": { "student": { "ingredients": student_ingredients } }
        });
        let normalized = normalize_recipe(&data, NormalizePolicy::Lenient).unwrap();
        assemble_recipe(normalized, SourceType::Search)
    }

    #[test]
    fn merges_same_item_and_unit() {
        let a = recipe(json!([
            {"item": "Zwiebel", "amount": 1, "unit": "Stk", "category": "Gemüse"},
            {"item": "Milch", "amount": 200, "unit": "ml", "category": "Milchprodukte"}
        ]));
        let b = recipe(json!([
            {"item": "zwiebel", "amount": 2, "unit": "Stk", "category": "Gemüse"},
            {"item": "Milch", "amount": 1, "unit": "l", "category": "Milchprodukte"}
        ]));

        let mut list = ShoppingList::new();
        list.add_recipe(&a, VariantKind::Student);
        list.add_recipe(&b, VariantKind::Student);

        assert_eq!(list.len(), 3);
        let onion = &list.items[0];
        assert_eq!(onion.ingredient.item, "Zwiebel");
        assert_eq!(onion.ingredient.amount, 3.0);
        assert_eq!(onion.recipe_ids, vec![a.recipe_id, b.recipe_id]);
    }

    #[test]
    fn same_recipe_is_listed_once() {
        let a = recipe(json!([{"item": "Reis", "amount": 100, "unit": "g"}]));

        let mut list = ShoppingList::new();
        list.add_recipe(&a, VariantKind::Student);
        list.add_recipe(&a, VariantKind::Student);

        assert_eq!(list.items[0].ingredient.amount, 200.0);
        assert_eq!(list.items[0].recipe_ids, vec![a.recipe_id]);
    }

    #[test]
    fn toggle_and_clear_checked() {
        let a = recipe(json!([
            {"item": "Reis", "amount": 100, "unit": "g"},
            {"item": "Ei", "amount": 2, "unit": "Stk"}
        ]));
        let mut list = ShoppingList::new();
        list.add_recipe(&a, VariantKind::Student);

        assert_eq!(list.open_count(), 2);
        assert_eq!(list.toggle(0), Some(true));
        assert_eq!(list.open_count(), 1);
        assert_eq!(list.toggle(5), None);

        assert_eq!(list.clear_checked(), 1);
        assert_eq!(list.len(), 1);
        assert_eq!(list.items[0].ingredient.item, "Ei");
    }

    #[test]
    fn groups_by_sorted_category() {
        let a = recipe(json!([
            {"item": "Tomate", "amount": 2, "unit": "Stk", "category": "Gemüse"},
            {"item": "Salz", "amount": 1, "unit": "Prise", "category": "Gewürze"},
            {"item": "Paprika", "amount": 1, "unit": "Stk", "category": "Gemüse"},
            {"item": "Wasser", "amount": 1, "unit": "l"}
        ]));
        let mut list = ShoppingList::new();
        list.add_recipe(&a, VariantKind::Student);

        let groups = list.by_category();
        let categories: Vec<&str> = groups.keys().copied().collect();
        assert_eq!(categories, vec!["Gemüse", "Gewürze", "Sonstiges"]);

        let vegetables: Vec<(usize, &str)> = groups["Gemüse"]
            .iter()
            .map(|(index, item)| (*index, item.ingredient.item.as_str()))
            .collect();
        assert_eq!(vegetables, vec![(0, "Tomate"), (2, "Paprika")]);
    }

    #[test]
    fn serializes_flat() {
        let a = recipe(json!([{"item": "Reis", "amount": 100, "unit": "g"}]));
        let mut list = ShoppingList::new();
        list.add_recipe(&a, VariantKind::Student);

        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(json["items"][0]["item"], "Reis");
        assert_eq!(json["items"][0]["checked"], false);
        assert_eq!(json["items"][0]["recipeIds"][0], a.recipe_id.to_string());
    }
}
