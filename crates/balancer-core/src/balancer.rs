//! Recipe balancing.
//!
//! Scales a recipe to the combined area of a pan set and splits the scaled
//! dough across the individual pans.
//!
//! # Model
//!
//! ```text
//! total dough weight  = total area / DOUGH_AREA_RATIO
//! dough ratio         = (weight + weight * percent variation / 100) / 100
//! topping ratio       = total area / topping reference area
//! per-pan ratio       = pan area / total area
//! ```
//!
//! Dough amounts are baker's percentages, so the dough ratio is a weight per
//! percentage point. Topping amounts are absolute quantities for the
//! reference area. Every scaled amount is rounded to one decimal on its own;
//! per-pan amounts are not adjusted to sum back to the balanced total.
//!
//! Zero divisors are not guarded. A zero topping reference area or a
//! non-finite input yields IEEE infinities or NaN in the affected amounts.

use crate::error::{BalanceError, BalanceResult};
use crate::types::{Dough, Ingredient, Pans, Recipe, RecipeAggregate, SplitIngredients, Topping};

/// Pan area units per unit of dough weight.
pub const DOUGH_AREA_RATIO: f64 = 2.0;

/// Baker's percentages are expressed against this total.
pub const TOTAL_PERCENTAGE: f64 = 100.0;

/// Balances recipes against pan sets.
///
/// Stateless; one instance can serve any number of concurrent callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Balancer;

impl Balancer {
    pub fn new() -> Self {
        Self
    }

    /// See [`balance`].
    pub fn balance(&self, recipe: &Recipe, pans: &Pans) -> BalanceResult<RecipeAggregate> {
        balance(recipe, pans)
    }
}

/// Scale `recipe` to `pans` and split the dough per pan.
///
/// Fails with [`BalanceError::InvalidDoughWeight`] when the total area is not
/// positive or the first dough ingredient is missing or not positive.
pub fn balance(recipe: &Recipe, pans: &Pans) -> BalanceResult<RecipeAggregate> {
    if !(pans.total_area > 0.0) || !(first_ingredient_amount(&recipe.dough.ingredients) > 0.0) {
        return Err(BalanceError::InvalidDoughWeight);
    }

    let dough = balance_dough(&recipe.dough, pans.total_area);
    let topping = balance_topping(&recipe.topping, pans.total_area);
    let split_dough = split_dough(&dough, pans);

    Ok(RecipeAggregate {
        recipe: Recipe {
            dough,
            topping,
            ..recipe.clone()
        },
        split_ingredients: SplitIngredients {
            split_dough,
            split_topping: Vec::new(),
        },
    })
}

/// Dough weight the pan area calls for, before the percent variation.
pub fn total_dough_weight(total_area: f64) -> f64 {
    total_area / DOUGH_AREA_RATIO
}

/// Weight per baker's-percentage point, including the percent variation.
pub fn dough_conversion_ratio(total_area: f64, percent_variation: f64) -> f64 {
    let weight = total_dough_weight(total_area);
    let variation = weight * percent_variation / 100.0;
    (weight + variation) / TOTAL_PERCENTAGE
}

/// Multiplier from the topping's reference area to the target area.
pub fn topping_conversion_ratio(total_area: f64, reference_area: f64) -> f64 {
    total_area / reference_area
}

/// Scale a dough of baker's percentages to the total pan area.
pub fn balance_dough(dough: &Dough, total_area: f64) -> Dough {
    let ratio = dough_conversion_ratio(total_area, dough.percent_variation);
    Dough {
        name: dough.name.clone(),
        percent_variation: dough.percent_variation,
        ingredients: scale_ingredients(&dough.ingredients, ratio),
    }
}

/// Scale a topping from its reference area to the total pan area.
pub fn balance_topping(topping: &Topping, total_area: f64) -> Topping {
    let ratio = topping_conversion_ratio(total_area, topping.reference_area);
    Topping {
        name: topping.name.clone(),
        reference_area: topping.reference_area,
        ingredients: scale_ingredients(&topping.ingredients, ratio),
    }
}

/// Apportion a balanced dough across `pans` by each pan's share of the
/// total area. One dough per pan, named after it, in pan order.
pub fn split_dough(balanced: &Dough, pans: &Pans) -> Vec<Dough> {
    pans.pans
        .iter()
        .map(|pan| Dough {
            name: pan.name.clone(),
            percent_variation: 0.0,
            ingredients: scale_ingredients(&balanced.ingredients, pan.area / pans.total_area),
        })
        .collect()
}

/// Multiply every amount by `ratio` and round to one decimal, keeping order
/// and names.
pub fn scale_ingredients(ingredients: &[Ingredient], ratio: f64) -> Vec<Ingredient> {
    ingredients
        .iter()
        .map(|ingredient| Ingredient {
            name: ingredient.name.clone(),
            amount: round_tenth(ingredient.amount * ratio),
        })
        .collect()
}

/// Round to one decimal place, ties away from zero.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn first_ingredient_amount(ingredients: &[Ingredient]) -> f64 {
    ingredients.first().map_or(0.0, |i| i.amount)
}
