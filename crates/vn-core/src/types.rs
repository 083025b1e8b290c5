use serde::{Deserialize, Serialize};

/// A rendered choice bound to the scene it leads to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceControl {
    pub index: usize,
    pub label: String,
    pub target: String,
}

/// One of the two background layers used for crossfading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerSlot {
    Primary,
    Secondary,
}

impl LayerSlot {
    pub const ALL: [LayerSlot; 2] = [LayerSlot::Primary, LayerSlot::Secondary];

    pub fn index(self) -> usize {
        match self {
            Self::Primary => 0,
            Self::Secondary => 1,
        }
    }

    pub fn other(self) -> Self {
        match self {
            Self::Primary => Self::Secondary,
            Self::Secondary => Self::Primary,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }
}

/// Effect and music volumes, both in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MixLevels {
    pub effect: f64,
    pub music: f64,
}

/// Camera origin for the entrance animation, in percent of the layer size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FocalPoint {
    pub x_percent: f64,
    pub y_percent: f64,
}

impl FocalPoint {
    pub const CENTER: FocalPoint = FocalPoint {
        x_percent: 50.0,
        y_percent: 50.0,
    };
}

#[cfg(test)]
mod types_tests {
    use super::*;

    #[test]
    fn layer_slots_alternate() {
        assert_eq!(LayerSlot::Primary.other(), LayerSlot::Secondary);
        assert_eq!(LayerSlot::Secondary.other().other(), LayerSlot::Secondary);
        assert_eq!(LayerSlot::Secondary.index(), 1);
    }
}
