//! Pareto front utilities for minimized objective vectors.
//!
//! Every objective handled by the orchestrator is minimized, so these helpers
//! take plain value vectors without per-objective directions.
//!
//! | Function | Purpose |
//! |---|---|
//! | [`dominates`] | Pareto dominance between two vectors |
//! | [`pareto_front_indices`] | Indices of the non-dominated vectors |
//! | [`hypervolume`] | Volume dominated by a front, bounded by a reference point |
//! | [`normalized_hypervolume`] | Hypervolume of a front inside the min-max box of a population |
//!
//! ```
//! use trial_orchestrator::pareto::{hypervolume, pareto_front_indices};
//!
//! let points = vec![
//!     vec![1.0, 5.0], // Pareto-optimal
//!     vec![5.0, 1.0], // Pareto-optimal
//!     vec![3.0, 3.0], // Pareto-optimal
//!     vec![4.0, 4.0], // Dominated by (3, 3)
//! ];
//!
//! let mut front = pareto_front_indices(&points);
//! front.sort_unstable();
//! assert_eq!(front, vec![0, 1, 2]);
//!
//! let front_values: Vec<_> = front.iter().map(|&i| points[i].clone()).collect();
//! assert!(hypervolume(&front_values, &[6.0, 6.0]) > 0.0);
//! ```

/// Returns `true` if `a` Pareto-dominates `b`: no worse in every objective
/// and strictly better in at least one.
#[must_use]
pub fn dominates(a: &[f64], b: &[f64]) -> bool {
    debug_assert_eq!(a.len(), b.len());

    let mut strictly_better = false;
    for (&av, &bv) in a.iter().zip(b) {
        if av > bv {
            return false;
        }
        if av < bv {
            strictly_better = true;
        }
    }
    strictly_better
}

/// Indices of the non-dominated vectors, in input order.
///
/// Duplicated vectors are all kept. Vectors containing NaN are never part of
/// the front.
#[must_use]
pub fn pareto_front_indices(values: &[Vec<f64>]) -> Vec<usize> {
    let valid: Vec<usize> = (0..values.len())
        .filter(|&i| !values[i].iter().any(|v| v.is_nan()))
        .collect();
    valid
        .iter()
        .copied()
        .filter(|&i| {
            !valid
                .iter()
                .any(|&j| j != i && dominates(&values[j], &values[i]))
        })
        .collect()
}

/// Compute the hypervolume indicator of a front.
///
/// The hypervolume is the volume of objective space dominated by the front
/// and bounded by `reference_point`. Points that do not strictly dominate the
/// reference point contribute nothing.
///
/// Uses recursive slicing on the last objective.
#[must_use]
pub fn hypervolume(front: &[Vec<f64>], reference_point: &[f64]) -> f64 {
    let d = reference_point.len();
    debug_assert!(front.iter().all(|p| p.len() == d));

    let filtered: Vec<Vec<f64>> = front
        .iter()
        .filter(|p| p.iter().zip(reference_point).all(|(&pv, &rv)| pv < rv))
        .cloned()
        .collect();

    if filtered.is_empty() || d == 0 {
        return 0.0;
    }

    hv_recursive(&filtered, reference_point)
}

/// Hypervolume of `front` after min-max normalizing every objective over
/// `population`, with the reference point at the normalized nadir `(1, …, 1)`.
///
/// The unit box has volume 1, so the result lies in `[0, 1]`. An objective
/// whose values are all equal gives no information about progress and is
/// treated as fully covered.
#[must_use]
pub fn normalized_hypervolume(front: &[Vec<f64>], population: &[Vec<f64>]) -> f64 {
    let Some(first) = population.first() else {
        return 0.0;
    };
    let d = first.len();

    let mut ideal = vec![f64::INFINITY; d];
    let mut nadir = vec![f64::NEG_INFINITY; d];
    for point in population {
        for (k, &v) in point.iter().enumerate() {
            ideal[k] = ideal[k].min(v);
            nadir[k] = nadir[k].max(v);
        }
    }

    let informative: Vec<usize> = (0..d).filter(|&k| nadir[k] > ideal[k]).collect();
    if informative.is_empty() {
        return 1.0;
    }

    let normalized: Vec<Vec<f64>> = front
        .iter()
        .map(|p| {
            informative
                .iter()
                .map(|&k| (p[k] - ideal[k]) / (nadir[k] - ideal[k]))
                .collect()
        })
        .collect();

    hypervolume(&normalized, &vec![1.0; informative.len()]).clamp(0.0, 1.0)
}

/// Recursive hypervolume via slicing on the last objective.
///
/// All points are dominated by `reference`.
fn hv_recursive(points: &[Vec<f64>], reference: &[f64]) -> f64 {
    let d = reference.len();

    if d == 1 {
        let min_val = points.iter().map(|p| p[0]).fold(f64::INFINITY, f64::min);
        return (reference[0] - min_val).max(0.0);
    }

    if points.len() == 1 {
        return points[0]
            .iter()
            .zip(reference)
            .map(|(&p, &r)| (r - p).max(0.0))
            .product();
    }

    let mut sorted: Vec<&Vec<f64>> = points.iter().collect();
    sorted.sort_by(|a, b| a[d - 1].total_cmp(&b[d - 1]));

    let sub_ref = &reference[..d - 1];
    let mut result = 0.0;

    for i in 0..sorted.len() {
        let height = if i + 1 < sorted.len() {
            sorted[i + 1][d - 1] - sorted[i][d - 1]
        } else {
            reference[d - 1] - sorted[i][d - 1]
        };

        if height <= 0.0 {
            continue;
        }

        // Slab [sorted[i], next) is covered by the projections of points 0..=i.
        let projected: Vec<Vec<f64>> = sorted[..=i].iter().map(|p| p[..d - 1].to_vec()).collect();
        let front: Vec<Vec<f64>> = pareto_front_indices(&projected)
            .into_iter()
            .map(|j| projected[j].clone())
            .collect();

        if !front.is_empty() {
            result += height * hv_recursive(&front, sub_ref);
        }
    }

    result
}
