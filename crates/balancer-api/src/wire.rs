//! Wire representations of pans.
//!
//! On the wire a pan carries its shape as a string and every dimension as
//! an optional field. The domain keeps only the dimensions the shape uses.
//! Recipes and balance results have no separate wire form; their domain
//! types serialize directly.

use serde::{Deserialize, Serialize};

use balancer_core::{Pan, PanMeasures, Pans};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasuresMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diameter: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
}

impl From<&PanMeasures> for MeasuresMessage {
    fn from(m: &PanMeasures) -> Self {
        match m {
            PanMeasures::Round { diameter } => Self {
                diameter: Some(*diameter),
                ..Self::default()
            },
            PanMeasures::Square { edge } => Self {
                edge: Some(*edge),
                ..Self::default()
            },
            PanMeasures::Rectangular { width, length } => Self {
                width: Some(*width),
                length: Some(*length),
                ..Self::default()
            },
            PanMeasures::Unspecified { .. } => Self::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanMessage {
    pub shape: String,
    #[serde(default)]
    pub measures: MeasuresMessage,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub area: f64,
}

impl PanMessage {
    pub fn to_measures(&self) -> PanMeasures {
        PanMeasures::from_parts(
            &self.shape,
            self.measures.diameter,
            self.measures.edge,
            self.measures.width,
            self.measures.length,
        )
    }
}

impl From<PanMessage> for Pan {
    fn from(msg: PanMessage) -> Self {
        Pan {
            measures: msg.to_measures(),
            name: msg.name,
            area: msg.area,
        }
    }
}

impl From<&Pan> for PanMessage {
    fn from(pan: &Pan) -> Self {
        PanMessage {
            shape: pan.shape().to_string(),
            measures: MeasuresMessage::from(&pan.measures),
            name: pan.name.clone(),
            area: pan.area,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PansMessage {
    #[serde(default)]
    pub pans: Vec<PanMessage>,
    #[serde(default)]
    pub total_area: f64,
}

impl From<PansMessage> for Pans {
    fn from(msg: PansMessage) -> Self {
        Pans {
            pans: msg.pans.into_iter().map(Pan::from).collect(),
            total_area: msg.total_area,
        }
    }
}

impl From<&Pans> for PansMessage {
    fn from(pans: &Pans) -> Self {
        PansMessage {
            pans: pans.pans.iter().map(PanMessage::from).collect(),
            total_area: pans.total_area,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_present_and_absent_measures() {
        let msg: PanMessage = serde_json::from_str(
            r#"{"shape": "square", "measures": {"edge": 20}, "name": "square 20 cm", "area": 400}"#,
        )
        .unwrap();
        assert_eq!(msg.measures.edge, Some(20));
        assert_eq!(msg.measures.diameter, None);

        let pan = Pan::from(msg);
        assert_eq!(pan.measures, PanMeasures::Square { edge: 20 });
        assert_eq!(pan.area, 400.0);
    }

    #[test]
    fn missing_measures_keep_shape_label() {
        let msg: PanMessage = serde_json::from_str(r#"{"shape": "round", "area": 500}"#).unwrap();
        let pan = Pan::from(msg);
        assert_eq!(pan.shape(), "round");
        assert!(matches!(pan.measures, PanMeasures::Unspecified { .. }));
    }

    #[test]
    fn encodes_only_shape_dimensions() {
        let pan = Pan {
            name: "rect".to_string(),
            measures: PanMeasures::Rectangular {
                width: 30,
                length: 40,
            },
            area: 1200.0,
        };
        let json = serde_json::to_value(PanMessage::from(&pan)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "shape": "rectangular",
                "measures": {"width": 30, "length": 40},
                "name": "rect",
                "area": 1200.0
            })
        );
    }

    #[test]
    fn pans_keep_order_and_total() {
        let msg: PansMessage = serde_json::from_str(
            r#"{"pans": [{"shape": "round", "name": "a", "area": 1}, {"shape": "round", "name": "b", "area": 2}], "totalArea": 10}"#,
        )
        .unwrap();
        let pans = Pans::from(msg);
        assert_eq!(pans.total_area, 10.0);
        assert_eq!(pans.pans[0].name, "a");
        assert_eq!(pans.pans[1].name, "b");
        assert_eq!(PansMessage::from(&pans).pans.len(), 2);
    }
}
