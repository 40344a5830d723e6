use anyhow::{Context, Result};
use chefmate_core::{Recipe, ShoppingList, VariantKind};
use std::fmt::Write;
use std::path::PathBuf;

/// Split `FILE[:variant]`; the variant defaults to student.
fn parse_recipe_arg(arg: &str) -> (PathBuf, VariantKind) {
    if let Some((path, suffix)) = arg.rsplit_once(':') {
        if let Some(kind) = VariantKind::from_str(suffix) {
            return (PathBuf::from(path), kind);
        }
    }
    (PathBuf::from(arg), VariantKind::Student)
}

fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{}", amount as i64)
    } else {
        format!("{:.2}", amount)
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

fn render(list: &ShoppingList) -> String {
    let mut out = String::new();
    for (category, items) in list.by_category() {
        let _ = writeln!(out, "## {}", category);
        for (_, item) in items {
            let ingredient = &item.ingredient;
            let quantity = match (ingredient.amount > 0.0, ingredient.unit.is_empty()) {
                (false, _) => String::new(),
                (true, true) => format!("{} ", format_amount(ingredient.amount)),
                (true, false) => format!(
                    "{} {} ",
                    format_amount(ingredient.amount),
                    ingredient.unit
                ),
            };
            let _ = writeln!(out, "[ ] {}{}", quantity, ingredient.item);
        }
        out.push('\n');
    }
    let _ = write!(out, "{} Artikel", list.len());
    out
}

pub fn shopping_list(args: &[String]) -> Result<()> {
    let mut list = ShoppingList::new();

    for arg in args {
        let (path, version) = parse_recipe_arg(arg);
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let recipe: Recipe = serde_json::from_str(&contents)
            .with_context(|| format!("{} is not a recipe", path.display()))?;

        tracing::debug!(recipe = %recipe.original_name, %version, "Adding recipe");
        list.add_recipe(&recipe, version);
    }

    println!("{}", render(&list));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chefmate_core::Ingredient;
    use uuid::Uuid;

    #[test]
    fn parses_variant_suffix() {
        assert_eq!(
            parse_recipe_arg("pho.json:profi"),
            (PathBuf::from("pho.json"), VariantKind::Profi)
        );
        assert_eq!(
            parse_recipe_arg("pho.json"),
            (PathBuf::from("pho.json"), VariantKind::Student)
        );
        // An unknown suffix is part of the path
        assert_eq!(
            parse_recipe_arg("C:pho.json"),
            (PathBuf::from("C:pho.json"), VariantKind::Student)
        );
    }

    #[test]
    fn formats_amounts() {
        assert_eq!(format_amount(200.0), "200");
        assert_eq!(format_amount(0.5), "0.5");
        assert_eq!(format_amount(1.25), "1.25");
    }

    #[test]
    fn renders_grouped_list() {
        let mut list = ShoppingList::new();
        let id = Uuid::new_v4();
        for (item, amount, unit, category) in [
            ("Zwiebel", 2.0, "Stk", "Gemüse"),
            ("Salz", 0.0, "", "Gewürze"),
            ("Karotte", 300.0, "g", "Gemüse"),
        ] {
            list.add_ingredient(
                &Ingredient {
                    item: item.to_string(),
                    amount,
                    unit: unit.to_string(),
                    category: category.to_string(),
                },
                id,
            );
        }

        assert_eq!(
            render(&list),
            "## Gemüse\n[ ] 2 Stk Zwiebel\n[ ] 300 g Karotte\n\n## Gewürze\n[ ] Salz\n\n3 Artikel"
        );
    }
}
