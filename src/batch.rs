//! Independent runs evaluated in parallel.
//!
//! Every solver call is a pure function of its inputs, so a batch is a plain
//! parallel map with results returned in input order.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use crate::DragModel;
use crate::drag::has_drag_table;
use crate::error::BallisticsError;
use crate::inputs::{Projectile, ShotConditions};
use crate::point_blank::{solve_point_blank_range_with, PointBlankRangeResult};
use crate::search::SearchLimits;
use crate::trajectory::{generate_table, TrajectoryTable};
use crate::zero::solve_zero_angle_with;

/// Size the global rayon pool. Falls back to rayon's default sizing if the
/// pool was already built.
pub fn configure_thread_pool(num_threads: usize) {
    if num_threads == 0 {
        return;
    }
    if let Err(e) = rayon::ThreadPoolBuilder::new().num_threads(num_threads).build_global() {
        warn!(num_threads, error = %e, "could not size thread pool, using default threading");
    }
}

/// Generate one table per (projectile, conditions) pair
pub fn generate_tables(runs: &[(Projectile, ShotConditions)]) -> Vec<Result<TrajectoryTable, BallisticsError>> {
    debug!(runs = runs.len(), "generating tables in parallel");
    runs.par_iter()
        .map(|(projectile, conditions)| generate_table(projectile, conditions))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelComparison {
    pub drag_model: DragModel,
    pub zero_angle_deg: f64,
    pub point_blank: PointBlankRangeResult,
}

/// Zero angle and point-blank range for the same projectile under every drag
/// model that has a table. Models fail independently.
pub fn compare_drag_models(
    base: &Projectile,
    zero_range_yards: f64,
    vital_zone_inches: f64,
    limits: &SearchLimits,
) -> Vec<(DragModel, Result<ModelComparison, BallisticsError>)> {
    let models: Vec<DragModel> = DragModel::ALL.into_iter().filter(|&m| has_drag_table(m)).collect();

    models
        .into_par_iter()
        .map(|drag_model| {
            let projectile = Projectile { drag_model, ..*base };
            let comparison = solve_zero_angle_with(&projectile, zero_range_yards, 0.0, limits, &|| false).and_then(|zero| {
                let point_blank = solve_point_blank_range_with(&projectile, vital_zone_inches, limits, &|| false)?;
                Ok(ModelComparison { drag_model, zero_angle_deg: zero.angle_deg, point_blank })
            });
            (drag_model, comparison)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_match_sequential_runs() {
        let runs = vec![
            (Projectile::default(), ShotConditions::default()),
            (Projectile { drag_model: DragModel::G7, ballistic_coefficient: 0.25, ..Default::default() }, ShotConditions::level(0.1)),
            (Projectile { drag_model: DragModel::G4, ..Default::default() }, ShotConditions::default()),
        ];
        let results = generate_tables(&runs);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap(), &generate_table(&runs[0].0, &runs[0].1).unwrap());
        assert_eq!(results[1].as_ref().unwrap(), &generate_table(&runs[1].0, &runs[1].1).unwrap());
        assert!(matches!(results[2], Err(BallisticsError::InvalidDragLookup { .. })));
    }

    #[test]
    fn test_compare_covers_populated_models() {
        let results = compare_drag_models(&Projectile::default(), 100.0, 10.0, &SearchLimits::default());

        let models: Vec<DragModel> = results.iter().map(|(m, _)| *m).collect();
        assert_eq!(models.len(), 8);
        assert!(!models.contains(&DragModel::G3));
        assert!(!models.contains(&DragModel::G4));

        for (model, result) in &results {
            let comparison = result.as_ref().unwrap_or_else(|e| panic!("{model}: {e}"));
            assert_eq!(comparison.drag_model, *model);
            assert!(comparison.zero_angle_deg > 0.0);
            assert!(comparison.point_blank.far_zero > comparison.point_blank.near_zero);
        }
    }

    #[test]
    fn test_compare_applies_limits_to_every_model() {
        let limits = SearchLimits { max_steps_per_trial: 10, ..Default::default() };
        let results = compare_drag_models(&Projectile::default(), 100.0, 10.0, &limits);

        assert_eq!(results.len(), 8);
        for (model, result) in &results {
            assert!(matches!(result, Err(BallisticsError::NumericalDegeneracy(_))), "{model}: {result:?}");
        }
    }

    #[test]
    fn test_zero_threads_is_a_no_op() {
        configure_thread_pool(0);
    }
}
