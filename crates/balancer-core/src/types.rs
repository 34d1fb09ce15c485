//! Recipe and pan types shared across the balancer crates.
//!
//! Every type here is plain value data: built per request, handed to the
//! balancer by reference, and dropped afterwards. Field names are camelCase
//! on the wire.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named ingredient quantity.
///
/// For dough the amount is a baker's percentage of the total dough weight;
/// for topping it is an absolute quantity for the topping's reference area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub amount: f64,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, amount: f64) -> Self {
        Self {
            name: name.into(),
            amount,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dough {
    #[serde(default)]
    pub name: String,
    /// Signed safety margin in percent (`10.0` adds 10% to the dough weight).
    #[serde(default)]
    pub percent_variation: f64,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topping {
    #[serde(default)]
    pub name: String,
    /// Area the ingredient amounts are written for, in pan-area units.
    #[serde(default)]
    pub reference_area: f64,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
}

/// A preparation step. Carried through balancing untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub step_number: u32,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub uuid: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub dough: Dough,
    #[serde(default)]
    pub topping: Topping,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Shape-specific pan dimensions, in centimetres.
///
/// Each shape carries exactly the dimensions its area formula needs.
/// `Unspecified` keeps the shape label of a pan that arrived without
/// usable dimensions; such a pan can still be balanced (its area is
/// supplied by the caller) but cannot be measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum PanMeasures {
    Round { diameter: u32 },
    Square { edge: u32 },
    Rectangular { width: u32, length: u32 },
    Unspecified { label: String },
}

impl PanMeasures {
    /// Shape label as used on the wire.
    pub fn shape(&self) -> &str {
        match self {
            PanMeasures::Round { .. } => "round",
            PanMeasures::Square { .. } => "square",
            PanMeasures::Rectangular { .. } => "rectangular",
            PanMeasures::Unspecified { label } => label,
        }
    }

    /// Build measures from a shape label and the flat optional dimension
    /// fields the transport carries.
    ///
    /// Dimensions that do not belong to the shape are dropped. A known shape
    /// missing one of its dimensions, or an unknown label, yields
    /// `Unspecified`.
    pub fn from_parts(
        shape: &str,
        diameter: Option<u32>,
        edge: Option<u32>,
        width: Option<u32>,
        length: Option<u32>,
    ) -> Self {
        match (shape, diameter, edge, width, length) {
            ("round", Some(diameter), _, _, _) => PanMeasures::Round { diameter },
            ("square", _, Some(edge), _, _) => PanMeasures::Square { edge },
            ("rectangular", _, _, Some(width), Some(length)) => {
                PanMeasures::Rectangular { width, length }
            }
            _ => PanMeasures::Unspecified {
                label: shape.to_string(),
            },
        }
    }
}

/// A target pan with its pre-computed area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pan {
    pub name: String,
    pub measures: PanMeasures,
    pub area: f64,
}

impl Pan {
    pub fn shape(&self) -> &str {
        self.measures.shape()
    }
}

/// A set of pans and their combined area.
///
/// `total_area` is authoritative: the balancer never re-sums `pans`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pans {
    #[serde(default)]
    pub pans: Vec<Pan>,
    #[serde(default)]
    pub total_area: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitIngredients {
    /// One dough per input pan, in pan order.
    pub split_dough: Vec<Dough>,
    /// Always empty: topping is balanced for the whole pan set only.
    pub split_topping: Vec<Topping>,
}

/// Result of balancing a recipe against a pan set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeAggregate {
    /// The input recipe with dough and topping replaced by balanced versions.
    pub recipe: Recipe,
    pub split_ingredients: SplitIngredients,
}
