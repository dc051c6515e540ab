//! Drag retardation from the standard piecewise power-law drag functions
use std::collections::HashMap;
use once_cell::sync::Lazy;
use tracing::trace;
use crate::DragModel;
use crate::constants::MAX_DRAG_VELOCITY_FPS;
use crate::error::BallisticsError;

/// One power-law segment: above `velocity_threshold` ft/s, retardation is `a * v^m`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSegment {
    pub velocity_threshold: f64,
    pub a: f64,
    pub m: f64,
}

impl DragSegment {
    /// Retardation in ft/s² for the standard projectile (ballistic coefficient 1.0)
    pub fn standard_retardation(&self, velocity: f64) -> f64 {
        self.a * velocity.powf(self.m)
    }
}

/// Segments of one drag function, ordered by strictly descending threshold.
/// The last segment has threshold 0 and catches every positive velocity.
#[derive(Debug, Clone)]
pub struct DragTable {
    segments: Vec<DragSegment>,
}

impl DragTable {
    fn from_rows(rows: &[(f64, f64, f64)]) -> Self {
        let segments = rows
            .iter()
            .map(|&(velocity_threshold, a, m)| DragSegment { velocity_threshold, a, m })
            .collect();
        Self { segments }
    }

    pub fn segments(&self) -> &[DragSegment] {
        &self.segments
    }

    /// First segment (highest threshold first) whose threshold lies strictly below `velocity`
    pub fn segment_for(&self, velocity: f64) -> Option<&DragSegment> {
        self.segments.iter().find(|s| velocity > s.velocity_threshold)
    }
}

const G1_SEGMENTS: &[(f64, f64, f64)] = &[
    (4230.0, 1.477404177730177e-04, 1.9565),
    (3680.0, 1.920339268755614e-04, 1.925),
    (3450.0, 2.894751026819746e-04, 1.875),
    (3295.0, 4.349905111115636e-04, 1.825),
    (3130.0, 6.520421871892662e-04, 1.775),
    (2960.0, 9.748073694078696e-04, 1.725),
    (2830.0, 1.453721560187286e-03, 1.675),
    (2680.0, 2.162887202930376e-03, 1.625),
    (2460.0, 3.209559783129881e-03, 1.575),
    (2225.0, 3.904368218691249e-03, 1.55),
    (2015.0, 3.222942271262336e-03, 1.575),
    (1890.0, 2.203329542297809e-03, 1.625),
    (1810.0, 1.511001028891904e-03, 1.675),
    (1730.0, 8.609957592468259e-04, 1.75),
    (1595.0, 4.086146797305117e-04, 1.85),
    (1520.0, 1.954473210037398e-04, 1.95),
    (1420.0, 5.431896266462351e-05, 2.125),
    (1360.0, 8.847742581674416e-06, 2.375),
    (1315.0, 1.456922328720298e-06, 2.625),
    (1280.0, 2.419485191895565e-07, 2.875),
    (1220.0, 1.657956321067612e-08, 3.25),
    (1185.0, 4.745469537157371e-10, 3.75),
    (1150.0, 1.379746590025088e-11, 4.25),
    (1100.0, 4.070157961147882e-13, 4.75),
    (1060.0, 2.938236954847331e-14, 5.125),
    (1025.0, 1.228597370774746e-14, 5.25),
    (980.0, 2.916938264100495e-14, 5.125),
    (945.0, 3.855099424807451e-13, 4.75),
    (905.0, 1.185097045689854e-11, 4.25),
    (860.0, 3.566129470974951e-10, 3.75),
    (810.0, 1.045513263966272e-08, 3.25),
    (780.0, 1.291159200846216e-07, 2.875),
    (750.0, 6.824429329105383e-07, 2.625),
    (700.0, 3.569169672385163e-06, 2.375),
    (640.0, 1.839015095899579e-05, 2.125),
    (600.0, 5.71117468873424e-05, 1.95),
    (550.0, 9.226557091973427e-05, 1.875),
    (250.0, 9.337991957131389e-05, 1.875),
    (100.0, 7.225247327590413e-05, 1.925),
    (65.0, 5.792684957074546e-05, 1.975),
    (0.0, 5.206214107320588e-05, 2.0),
];

const G2_SEGMENTS: &[(f64, f64, f64)] = &[
    (1674.0, 0.0079470052136733, 1.36999902851493),
    (1172.0, 1.00419763721974e-03, 1.65392237010294),
    (1060.0, 7.15571228255369e-23, 7.91913562392361),
    (949.0, 1.39589807205091e-10, 3.81439537623717),
    (670.0, 2.34364342818625e-04, 1.71869536324748),
    (335.0, 1.77962438921838e-04, 1.76877550388679),
    (0.0, 5.18033561289704e-05, 1.98160270524632),
];

const G5_SEGMENTS: &[(f64, f64, f64)] = &[
    (1730.0, 7.24854775171929e-03, 1.41538574492812),
    (1228.0, 3.50563361516117e-05, 2.13077307854948),
    (1116.0, 1.84029481181151e-13, 4.81927320350395),
    (1004.0, 1.34713064017409e-22, 7.8100555281422),
    (837.0, 1.03965974081168e-07, 2.84204791809926),
    (335.0, 1.09301593869823e-04, 1.81096361579504),
    (0.0, 3.51963178524273e-05, 2.00477856801111),
];

const G6_SEGMENTS: &[(f64, f64, f64)] = &[
    (3236.0, 0.0455384883480781, 1.15997674041274),
    (2065.0, 0.07167261849653769, 1.10704436538885),
    (1311.0, 0.00166676386084348, 1.60085100195952),
    (1144.0, 1.01482730119215e-07, 2.9569674731838),
    (1004.0, 4.31542773103552e-18, 6.34106317069757),
    (670.0, 2.04835650496866e-05, 2.11688446325998),
    (0.0, 7.50912466084823e-05, 1.92031057847052),
];

const G7_SEGMENTS: &[(f64, f64, f64)] = &[
    (4200.0, 1.29081656775919e-09, 3.24121295355962),
    (3000.0, 0.0171422231434847, 1.27907168025204),
    (1470.0, 2.33355948302505e-03, 1.52693913274526),
    (1260.0, 7.97592111627665e-04, 1.67688974440324),
    (1110.0, 5.71086414289273e-12, 4.3212826264889),
    (960.0, 3.02865108244904e-17, 5.99074203776707),
    (670.0, 7.52285155782535e-06, 2.1738019851075),
    (540.0, 1.31766281225189e-05, 2.08774690257991),
    (0.0, 1.34504843776525e-05, 2.08702306738884),
];

const G8_SEGMENTS: &[(f64, f64, f64)] = &[
    (3571.0, 0.0112263766252305, 1.33207346655961),
    (1841.0, 0.0167252613732636, 1.28662041261785),
    (1120.0, 2.20172456619625e-03, 1.55636358091189),
    (1088.0, 2.0538037167098e-16, 5.80410776994789),
    (976.0, 5.92182174254121e-12, 4.29275576134191),
    (0.0, 4.3917343795117e-05, 1.99978116283334),
];

const GI_SEGMENTS: &[(f64, f64, f64)] = &[
    (2600.0, 4.0648825e-03, 1.55),
    (1800.0, 1.2479524e-03, 1.70),
    (1370.0, 1.3160125e-04, 2.00),
    (1230.0, 9.5697809e-08, 3.00),
    (970.0, 6.3368148e-14, 5.00),
    (790.0, 5.9353046e-08, 3.00),
    (0.0, 4.6761777e-05, 2.00),
];

const GS_SEGMENTS: &[(f64, f64, f64)] = &[
    (2600.0, 15366e-07, 1.67),
    (2000.0, 58495e-07, 1.50),
    (1460.0, 59814e-08, 1.80),
    (1190.0, 95408e-12, 3.00),
    (1040.0, 23385e-22, 6.45),
    (840.0, 59939e-12, 3.00),
    (0.0, 74422e-08, 1.60),
];
/// Populated drag tables, built once. G3 and G4 are selectable but have no data.
static DRAG_TABLES: Lazy<HashMap<DragModel, DragTable>> = Lazy::new(|| {
    let mut tables = HashMap::new();
    tables.insert(DragModel::G1, DragTable::from_rows(G1_SEGMENTS));
    tables.insert(DragModel::G2, DragTable::from_rows(G2_SEGMENTS));
    tables.insert(DragModel::G5, DragTable::from_rows(G5_SEGMENTS));
    tables.insert(DragModel::G6, DragTable::from_rows(G6_SEGMENTS));
    tables.insert(DragModel::G7, DragTable::from_rows(G7_SEGMENTS));
    tables.insert(DragModel::G8, DragTable::from_rows(G8_SEGMENTS));
    tables.insert(DragModel::GI, DragTable::from_rows(GI_SEGMENTS));
    tables.insert(DragModel::GS, DragTable::from_rows(GS_SEGMENTS));
    tables
});

/// Drag table for a model, or `None` for the unpopulated G3/G4 functions
pub fn drag_table(drag_model: DragModel) -> Option<&'static DragTable> {
    DRAG_TABLES.get(&drag_model)
}

pub fn has_drag_table(drag_model: DragModel) -> bool {
    drag_table(drag_model).is_some()
}

/// Drag retardation in ft/s² for a projectile of the given ballistic coefficient.
///
/// `velocity` must lie strictly inside (0, 10000) ft/s. The ballistic coefficient
/// is the caller's responsibility and is only used as a divisor.
pub fn retardation(
    drag_model: DragModel,
    ballistic_coefficient: f64,
    velocity: f64,
) -> Result<f64, BallisticsError> {
    let invalid = || BallisticsError::InvalidDragLookup { model: drag_model, velocity };

    if !(velocity > 0.0 && velocity < MAX_DRAG_VELOCITY_FPS) {
        return Err(invalid());
    }

    let segment = drag_table(drag_model)
        .and_then(|table| table.segment_for(velocity))
        .ok_or_else(invalid)?;

    let value = segment.standard_retardation(velocity) / ballistic_coefficient;
    trace!(model = %drag_model, a = segment.a, m = segment.m, velocity, value, "drag retardation");

    Ok(value)
}
