use serde::{Deserialize, Serialize};

/// Standard reference projectile (drag function family)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DragModel {
    G1,
    G2,
    G3,
    G4,
    G5,
    G6,
    G7,
    G8,
    /// Ingalls
    GI,
    /// British
    GS,
}

impl DragModel {
    /// Every selectable drag model, including those without a populated table
    pub const ALL: [DragModel; 10] = [
        DragModel::G1,
        DragModel::G2,
        DragModel::G3,
        DragModel::G4,
        DragModel::G5,
        DragModel::G6,
        DragModel::G7,
        DragModel::G8,
        DragModel::GI,
        DragModel::GS,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "G1" => Some(DragModel::G1),
            "G2" => Some(DragModel::G2),
            "G3" => Some(DragModel::G3),
            "G4" => Some(DragModel::G4),
            "G5" => Some(DragModel::G5),
            "G6" => Some(DragModel::G6),
            "G7" => Some(DragModel::G7),
            "G8" => Some(DragModel::G8),
            "GI" | "I" | "INGALLS" => Some(DragModel::GI),
            "GS" | "B" | "BRITISH" => Some(DragModel::GS),
            _ => None,
        }
    }

    /// Long-form name as printed in reports
    pub fn name(&self) -> &'static str {
        match self {
            DragModel::GI => "Ingalls",
            DragModel::GS => "British",
            DragModel::G1 => "G1",
            DragModel::G2 => "G2",
            DragModel::G3 => "G3",
            DragModel::G4 => "G4",
            DragModel::G5 => "G5",
            DragModel::G6 => "G6",
            DragModel::G7 => "G7",
            DragModel::G8 => "G8",
        }
    }
}

impl std::str::FromStr for DragModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DragModel::from_str(s).ok_or_else(|| format!("unknown drag model: {s}"))
    }
}

impl std::fmt::Display for DragModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
