//! Meal plan recipe catalog
//!
//! Static menus for the eating window. The program rotates through the menus, so
//! day 1 and day 3 share a menu, as do day 2 and day 4. Ingredients carry stable ids
//! that the shopping cart merges on.

use crate::cart::CartItem;
use serde::Serialize;
use std::collections::HashSet;

/// Meal within the eating window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
}

/// Shopping aisle an ingredient belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngredientCategory {
    Protein,
    Vegetables,
    Carbs,
    Fats,
    Spices,
    Fruit,
    Other,
}

impl IngredientCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngredientCategory::Protein => "protein",
            IngredientCategory::Vegetables => "vegetables",
            IngredientCategory::Carbs => "carbs",
            IngredientCategory::Fats => "fats",
            IngredientCategory::Spices => "spices",
            IngredientCategory::Fruit => "fruit",
            IngredientCategory::Other => "other",
        }
    }
}

/// Grams per serving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Macros {
    pub protein_g: u32,
    pub carbs_g: u32,
    pub fat_g: u32,
    pub fiber_g: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ingredient {
    pub id: &'static str,
    pub name: &'static str,
    /// Free-form amount, e.g. `"1/2"` or `"to taste"`
    pub amount: &'static str,
    pub unit: &'static str,
    pub category: IngredientCategory,
}

impl From<&Ingredient> for CartItem {
    fn from(ingredient: &Ingredient) -> Self {
        let optional = |value: &str| (!value.is_empty()).then(|| value.to_string());
        CartItem {
            id: ingredient.id.to_string(),
            name: ingredient.name.to_string(),
            amount: optional(ingredient.amount),
            unit: optional(ingredient.unit),
            category: Some(ingredient.category.as_str().to_string()),
            quantity: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Recipe {
    pub id: &'static str,
    pub name: &'static str,
    pub slot: MealSlot,
    pub image_url: &'static str,
    /// Suggested time of the meal, `HH:MM`
    pub serve_at: &'static str,
    pub prep_minutes: u32,
    pub servings: u32,
    pub calories: u32,
    pub macros: Macros,
    pub ingredients: &'static [Ingredient],
    pub instructions: &'static [&'static str],
    pub tips: &'static [&'static str],
}

impl Recipe {
    /// Shopping cart lines for every ingredient of the recipe
    pub fn cart_items(&self) -> Vec<CartItem> {
        self.ingredients.iter().map(CartItem::from).collect()
    }
}

/// The three meals of one menu day
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayMenu {
    pub breakfast: Recipe,
    pub lunch: Recipe,
    pub dinner: Recipe,
}

impl DayMenu {
    pub fn recipes(&self) -> [&Recipe; 3] {
        [&self.breakfast, &self.lunch, &self.dinner]
    }

    pub fn calories(&self) -> u32 {
        self.recipes().iter().map(|r| r.calories).sum()
    }
}

const fn ingredient(
    id: &'static str,
    name: &'static str,
    amount: &'static str,
    unit: &'static str,
    category: IngredientCategory,
) -> Ingredient {
    Ingredient {
        id,
        name,
        amount,
        unit,
        category,
    }
}

use IngredientCategory::{Carbs, Fats, Fruit, Other, Protein, Spices, Vegetables};

pub static MENUS: [DayMenu; 2] = [
    DayMenu {
        breakfast: Recipe {
            id: "breakfast_1",
            name: "Boiled eggs with vegetables",
            slot: MealSlot::Breakfast,
            image_url: "https://images.unsplash.com/photo-1506084868230-bb9d95c24759?w=400&h=300&fit=crop",
            serve_at: "12:00",
            prep_minutes: 15,
            servings: 1,
            calories: 350,
            macros: Macros {
                protein_g: 28,
                carbs_g: 15,
                fat_g: 18,
                fiber_g: 8,
            },
            ingredients: &[
                ingredient("eggs", "Eggs", "2", "pieces", Protein),
                ingredient("spinach", "Fresh spinach", "100", "g", Vegetables),
                ingredient("tomato", "Tomato", "1", "medium", Vegetables),
                ingredient("bread", "Brown bread", "1/4", "loaf", Carbs),
                ingredient("olive_oil", "Olive oil", "1", "tbsp", Fats),
                ingredient("salt", "Salt", "to taste", "", Spices),
                ingredient("pepper", "Black pepper", "to taste", "", Spices),
            ],
            instructions: &[
                "Boil the eggs for 8-10 minutes",
                "Wash and chop the spinach",
                "Slice the tomato",
                "Saute the spinach in olive oil",
                "Add the tomato, salt and pepper",
                "Serve the eggs with the vegetables and brown bread",
            ],
            tips: &[
                "Add avocado for extra healthy fats",
                "Eat slowly to feel full",
                "Drink a glass of water 30 minutes before the meal",
            ],
        },
        lunch: Recipe {
            id: "lunch_1",
            name: "Grilled chicken with brown rice",
            slot: MealSlot::Lunch,
            image_url: "https://images.unsplash.com/photo-1598515213692-d1f8134b8b78?w=400&h=300&fit=crop",
            serve_at: "15:00",
            prep_minutes: 30,
            servings: 1,
            calories: 450,
            macros: Macros {
                protein_g: 35,
                carbs_g: 40,
                fat_g: 12,
                fiber_g: 4,
            },
            ingredients: &[
                ingredient("chicken_breast", "Chicken breast", "150", "g", Protein),
                ingredient("brown_rice", "Brown rice", "1/2", "cup (cooked)", Carbs),
                ingredient("mixed_vegetables", "Mixed vegetables", "100", "g", Vegetables),
                ingredient("almonds", "Almonds", "10", "pieces", Fats),
                ingredient("garlic", "Garlic", "2", "cloves", Spices),
                ingredient("lemon", "Lemon", "1/2", "piece", Other),
                ingredient("oregano", "Oregano", "1", "tsp", Spices),
                ingredient("olive_oil", "Olive oil", "1", "tsp", Fats),
            ],
            instructions: &[
                "Season the chicken with garlic, oregano, salt and pepper",
                "Let it marinate for 15 minutes",
                "Cook the brown rice",
                "Grill the chicken on both sides until cooked through",
                "Cook the mixed vegetables in the same pan",
                "Serve the chicken with the rice and vegetables",
                "Finish with lemon juice and chopped almonds",
            ],
            tips: &[
                "Make sure the chicken is fully cooked",
                "Turmeric gives the rice more flavour",
                "Drink water with the meal to help digestion",
            ],
        },
        dinner: Recipe {
            id: "dinner_1",
            name: "Grilled fish with vegetables",
            slot: MealSlot::Dinner,
            image_url: "https://images.unsplash.com/photo-1544943910-4c1dc44aab44?w=400&h=300&fit=crop",
            serve_at: "19:00",
            prep_minutes: 25,
            servings: 1,
            calories: 300,
            macros: Macros {
                protein_g: 30,
                carbs_g: 20,
                fat_g: 10,
                fiber_g: 6,
            },
            ingredients: &[
                ingredient("fish_fillet", "Fish fillet", "120", "g", Protein),
                ingredient("broccoli", "Broccoli", "100", "g", Vegetables),
                ingredient("carrots", "Carrots", "50", "g", Vegetables),
                ingredient("apple", "Apple", "1", "medium", Fruit),
                ingredient("lemon", "Lemon", "1/2", "piece", Other),
                ingredient("dill", "Dill", "1", "tbsp", Spices),
                ingredient("olive_oil", "Olive oil", "1", "tsp", Fats),
            ],
            instructions: &[
                "Clean the fish and season with salt, pepper and dill",
                "Cut the broccoli and carrots into medium pieces",
                "Grill the fish with a little olive oil",
                "Steam the vegetables",
                "Squeeze lemon over the fish before serving",
                "Serve with the vegetables and the apple as dessert",
            ],
            tips: &[
                "Fresh fish tastes best",
                "Do not overcook the fish or it dries out",
                "The apple helps digestion and keeps you full",
            ],
        },
    },
    DayMenu {
        breakfast: Recipe {
            id: "breakfast_2",
            name: "Oats with milk and berries",
            slot: MealSlot::Breakfast,
            image_url: "https://images.unsplash.com/photo-1571115764595-644a1f56a55c?w=400&h=300&fit=crop",
            serve_at: "12:00",
            prep_minutes: 10,
            servings: 1,
            calories: 380,
            macros: Macros {
                protein_g: 15,
                carbs_g: 55,
                fat_g: 12,
                fiber_g: 8,
            },
            ingredients: &[
                ingredient("oats", "Oats", "1/2", "cup", Carbs),
                ingredient("low_fat_milk", "Low-fat milk", "1", "cup", Protein),
                ingredient("honey", "Honey", "1", "tbsp", Other),
                ingredient("blueberries", "Blueberries", "1/2", "cup", Fruit),
                ingredient("walnuts", "Walnuts", "1", "tbsp", Fats),
                ingredient("cinnamon", "Cinnamon", "1/2", "tsp", Spices),
            ],
            instructions: &[
                "Cook the oats with the milk over medium heat",
                "Stir until creamy",
                "Add the cinnamon and honey",
                "Simmer for 5 minutes",
                "Serve topped with blueberries and walnuts",
            ],
            tips: &[
                "Cook the oats in water for fewer calories",
                "Add the fruit last so it keeps its texture",
                "Oats keep you full for a long time",
            ],
        },
        lunch: Recipe {
            id: "lunch_2",
            name: "Beef with boiled potatoes",
            slot: MealSlot::Lunch,
            image_url: "https://images.unsplash.com/photo-1546833999-b9f581a1996d?w=400&h=300&fit=crop",
            serve_at: "15:00",
            prep_minutes: 35,
            servings: 1,
            calories: 420,
            macros: Macros {
                protein_g: 32,
                carbs_g: 35,
                fat_g: 14,
                fiber_g: 5,
            },
            ingredients: &[
                ingredient("beef", "Beef", "120", "g", Protein),
                ingredient("potato", "Potato", "1", "medium", Carbs),
                ingredient("mixed_salad", "Mixed salad", "150", "g", Vegetables),
                ingredient("onion", "Onion", "1/2", "piece", Vegetables),
                ingredient("garlic", "Garlic", "2", "cloves", Spices),
                ingredient("rosemary", "Rosemary", "1", "tsp", Spices),
                ingredient("olive_oil", "Olive oil", "1", "tbsp", Fats),
            ],
            instructions: &[
                "Cut the beef into medium pieces and season",
                "Boil the potato in salted water until tender",
                "Brown the beef with the onion and garlic",
                "Add the rosemary and let the beef finish cooking",
                "Dress the salad with olive oil",
                "Serve the beef with the potato and salad",
            ],
            tips: &[
                "Pick lean cuts",
                "Do not overcook the beef",
                "The salad adds vitamins and helps digestion",
            ],
        },
        dinner: Recipe {
            id: "dinner_2",
            name: "Vegetable omelette",
            slot: MealSlot::Dinner,
            image_url: "https://images.unsplash.com/photo-1550147760-44c9966d6bc7?w=400&h=300&fit=crop",
            serve_at: "19:00",
            prep_minutes: 15,
            servings: 1,
            calories: 320,
            macros: Macros {
                protein_g: 20,
                carbs_g: 18,
                fat_g: 18,
                fiber_g: 4,
            },
            ingredients: &[
                ingredient("eggs", "Eggs", "2", "pieces", Protein),
                ingredient("bell_pepper", "Bell pepper", "1/2", "piece", Vegetables),
                ingredient("zucchini", "Zucchini", "50", "g", Vegetables),
                ingredient("whole_wheat_bread", "Brown bread", "1", "slice", Carbs),
                ingredient("low_fat_yogurt", "Low-fat yogurt", "100", "g", Protein),
                ingredient("olive_oil", "Olive oil", "1", "tsp", Fats),
                ingredient("herbs", "Mixed herbs", "1", "tbsp", Spices),
            ],
            instructions: &[
                "Dice the pepper and zucchini",
                "Cook the vegetables in a little olive oil",
                "Whisk the eggs with salt, pepper and herbs",
                "Pour the eggs over the vegetables",
                "Let the omelette set, then flip it",
                "Serve with the bread and yogurt",
            ],
            tips: &[
                "Do not overcook the omelette",
                "A little low-fat cheese adds flavour",
                "Yogurt helps digestion and adds protein",
            ],
        },
    },
];

/// Menu for program day `day` (1-based). Menus rotate; day 0 maps to the first menu.
pub fn recipes_for_day(day: u32) -> &'static DayMenu {
    let index = day.saturating_sub(1) as usize % MENUS.len();
    &MENUS[index]
}

/// Look up a recipe by id across every menu
pub fn recipe(id: &str) -> Option<&'static Recipe> {
    MENUS
        .iter()
        .flat_map(|menu| menu.recipes())
        .find(|recipe| recipe.id == id)
}

/// Every ingredient in the catalog, first occurrence per id, in menu order
pub fn all_ingredients() -> Vec<&'static Ingredient> {
    let mut seen = HashSet::new();
    MENUS
        .iter()
        .flat_map(|menu| menu.recipes())
        .flat_map(|recipe| recipe.ingredients.iter())
        .filter(|ingredient| seen.insert(ingredient.id))
        .collect()
}
