//! Pan area calculation.
//!
//! Turns shape dimensions into the areas the balancer consumes.

use std::f64::consts::PI;

use crate::error::GeometryError;
use crate::types::{Pan, PanMeasures, Pans};

impl PanMeasures {
    /// Surface area in square centimetres.
    pub fn area(&self) -> Result<f64, GeometryError> {
        match self {
            PanMeasures::Round { diameter } => {
                let d = positive("round", "diameter", *diameter)?;
                Ok(PI * (d / 2.0).powi(2))
            }
            PanMeasures::Square { edge } => {
                let e = positive("square", "edge", *edge)?;
                Ok(e * e)
            }
            PanMeasures::Rectangular { width, length } => {
                let w = positive("rectangular", "width", *width)?;
                let l = positive("rectangular", "length", *length)?;
                Ok(w * l)
            }
            PanMeasures::Unspecified { label } => Err(GeometryError::UnsupportedShape(label.clone())),
        }
    }

    /// Display name, e.g. `"round 24 cm"` or `"rectangular 30 x 40 cm"`.
    pub fn display_name(&self) -> String {
        match self {
            PanMeasures::Round { diameter } => format!("round {diameter} cm"),
            PanMeasures::Square { edge } => format!("square {edge} cm"),
            PanMeasures::Rectangular { width, length } => {
                format!("rectangular {width} x {length} cm")
            }
            PanMeasures::Unspecified { label } => label.clone(),
        }
    }
}

/// Compute every pan's area and the set's total.
///
/// The first pan that cannot be measured fails the whole call.
pub fn measure_pans(measures: &[PanMeasures]) -> Result<Pans, GeometryError> {
    let mut result = Pans::default();
    for m in measures {
        let area = m.area()?;
        result.pans.push(Pan {
            name: m.display_name(),
            measures: m.clone(),
            area,
        });
        result.total_area += area;
    }
    Ok(result)
}

fn positive(shape: &'static str, dimension: &'static str, value: u32) -> Result<f64, GeometryError> {
    if value == 0 {
        return Err(GeometryError::InvalidMeasure { shape, dimension });
    }
    Ok(f64::from(value))
}
