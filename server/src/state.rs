//! In-memory application state. Everything is lost on restart.

use chefmate_core::{Recipe, RecipeGenerator, ShoppingList, WeekPlan};
use tokio::sync::RwLock;
use uuid::Uuid;

pub struct ServerState {
    pub generator: RecipeGenerator,
    pub store: RwLock<Store>,
}

impl ServerState {
    pub fn new(generator: RecipeGenerator) -> Self {
        Self {
            generator,
            store: RwLock::new(Store::default()),
        }
    }
}

#[derive(Debug)]
pub struct Store {
    /// Generated recipes, oldest first.
    pub recipes: Vec<Recipe>,
    pub planner: WeekPlan,
    pub shopping_list: ShoppingList,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            recipes: Vec::new(),
            planner: WeekPlan::current(),
            shopping_list: ShoppingList::new(),
        }
    }
}

impl Store {
    pub fn recipe(&self, id: Uuid) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.recipe_id == id)
    }
}
