//! Example recipes used to populate an empty collection on first start.

use crate::storage::types::Recipe;

/// The built-in example dataset
pub fn example_recipes() -> Vec<Recipe> {
    vec![
        Recipe::new("Classic Pancakes", 4)
            .ingredient("Flour", 200.0, "g")
            .ingredient("Milk", 300.0, "ml")
            .ingredient("Eggs", 2.0, "pcs")
            .ingredient("Sugar", 1.0, "tbsp")
            .ingredient("Salt", 0.5, "tsp")
            .instructions(
                "Whisk flour, sugar and salt. Beat in eggs and milk until smooth. \
                 Rest 10 minutes, then fry ladlefuls in a buttered pan until golden.",
            ),
        Recipe::new("Tomato Soup", 4)
            .ingredient("Tomatoes", 800.0, "g")
            .ingredient("Onion", 1.0, "pcs")
            .ingredient("Vegetable stock", 500.0, "ml")
            .ingredient("Olive oil", 2.0, "tbsp")
            .ingredient("Salt", 1.0, "tsp")
            .instructions(
                "Soften the chopped onion in olive oil. Add tomatoes and stock, \
                 simmer 20 minutes, blend and season with salt.",
            ),
        Recipe::new("Guacamole", 2)
            .ingredient("Avocado", 2.0, "pcs")
            .ingredient("Lime juice", 1.0, "tbsp")
            .ingredient("Red onion", 0.25, "pcs")
            .ingredient("Salt", 0.5, "tsp")
            .instructions("Mash the avocados, stir in lime juice, diced onion and salt."),
        Recipe::new("Spaghetti Aglio e Olio", 2)
            .ingredient("Spaghetti", 200.0, "g")
            .ingredient("Garlic", 4.0, "cloves")
            .ingredient("Olive oil", 60.0, "ml")
            .ingredient("Chili flakes", 0.5, "tsp")
            .instructions(
                "Cook the spaghetti. Gently fry sliced garlic and chili in the oil, \
                 then toss with the drained pasta and a splash of cooking water.",
            ),
        Recipe::new("Overnight Oats", 1)
            .ingredient("Rolled oats", 50.0, "g")
            .ingredient("Milk", 120.0, "ml")
            .ingredient("Honey", 1.0, "tsp")
            .instructions("Stir everything together in a jar and refrigerate overnight."),
    ]
}
