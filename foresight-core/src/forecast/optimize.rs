//! Bounded Nelder-Mead simplex minimiser.
//!
//! Box constraints are enforced by clamping every candidate vertex into its
//! per-coordinate `(lower, upper)` interval; an infinite bound leaves that
//! side open. Non-finite objective values rank worse than any finite value.
//! The search is fully deterministic: same objective, same start, same result.

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;
const INITIAL_STEP: f64 = 0.1;
/// Relative first step for coordinates with an open side.
const RELATIVE_STEP: f64 = 0.05;
const ZERO_STEP: f64 = 0.00025;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NelderMead {
    pub tolerance: f64,
    pub max_iterations: usize,
    pub lower: f64,
    pub upper: f64,
}

/// Best point found by a minimisation.
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    pub point: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    pub converged: bool,
}

impl NelderMead {
    pub fn new(tolerance: f64, max_iterations: usize) -> Self {
        Self {
            tolerance,
            max_iterations,
            lower: 0.0,
            upper: 1.0,
        }
    }

    /// Minimise with every coordinate held in `[self.lower, self.upper]`.
    pub fn minimize<F>(&self, objective: F, start: &[f64]) -> Minimum
    where
        F: Fn(&[f64]) -> f64,
    {
        let bounds = vec![(self.lower, self.upper); start.len()];
        self.minimize_within(objective, start, &bounds)
    }

    /// Minimise with coordinate `i` held in `bounds[i]`.
    ///
    /// `bounds` must be as long as `start`. Use `f64::NEG_INFINITY` or
    /// `f64::INFINITY` for an open side.
    pub fn minimize_within<F>(
        &self,
        objective: F,
        start: &[f64],
        bounds: &[(f64, f64)],
    ) -> Minimum
    where
        F: Fn(&[f64]) -> f64,
    {
        debug_assert_eq!(start.len(), bounds.len());
        let dim = start.len();
        let eval = |x: &[f64]| {
            let v = objective(x);
            if v.is_finite() {
                v
            } else {
                f64::INFINITY
            }
        };

        let origin = clamp(start.to_vec(), bounds);
        let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(dim + 1);
        simplex.push((origin.clone(), eval(&origin)));
        for i in 0..dim {
            let mut vertex = origin.clone();
            let (_, upper) = bounds[i];
            let step = initial_step(vertex[i], bounds[i]);
            // Step down instead when stepping up would leave the box.
            vertex[i] = if vertex[i] + step <= upper {
                vertex[i] + step
            } else {
                vertex[i] - step
            };
            let vertex = clamp(vertex, bounds);
            let value = eval(&vertex);
            simplex.push((vertex, value));
        }

        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iterations {
            simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
            if self.has_converged(&simplex) {
                converged = true;
                break;
            }
            iterations += 1;

            let worst = dim;
            let centroid = centroid(&simplex[..worst], dim);

            let reflected = along(&centroid, &simplex[worst].0, -REFLECTION, bounds);
            let f_reflected = eval(&reflected);

            if f_reflected < simplex[0].1 {
                let expanded = along(&centroid, &simplex[worst].0, -EXPANSION, bounds);
                let f_expanded = eval(&expanded);
                simplex[worst] = if f_expanded < f_reflected {
                    (expanded, f_expanded)
                } else {
                    (reflected, f_reflected)
                };
                continue;
            }

            if f_reflected < simplex[worst - 1].1 {
                simplex[worst] = (reflected, f_reflected);
                continue;
            }

            let (contracted, f_contracted) = if f_reflected < simplex[worst].1 {
                let outside = along(&centroid, &simplex[worst].0, -CONTRACTION, bounds);
                let f = eval(&outside);
                (outside, f)
            } else {
                let inside = along(&centroid, &simplex[worst].0, CONTRACTION, bounds);
                let f = eval(&inside);
                (inside, f)
            };

            if f_contracted < simplex[worst].1.min(f_reflected) {
                simplex[worst] = (contracted, f_contracted);
                continue;
            }

            let best = simplex[0].0.clone();
            for vertex in simplex.iter_mut().skip(1) {
                let shrunk: Vec<f64> = best
                    .iter()
                    .zip(&vertex.0)
                    .map(|(b, v)| b + SHRINK * (v - b))
                    .collect();
                let shrunk = clamp(shrunk, bounds);
                let value = eval(&shrunk);
                *vertex = (shrunk, value);
            }
        }

        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
        let (point, value) = simplex.swap_remove(0);
        Minimum {
            point,
            value,
            iterations,
            converged,
        }
    }

    fn has_converged(&self, sorted: &[(Vec<f64>, f64)]) -> bool {
        let best = sorted[0].1;
        let worst = sorted[sorted.len() - 1].1;
        if !best.is_finite() {
            return false;
        }
        let value_spread = (worst - best).abs();
        let point_spread = sorted
            .iter()
            .skip(1)
            .flat_map(|(p, _)| p.iter().zip(&sorted[0].0).map(|(a, b)| (a - b).abs()))
            .fold(0.0_f64, f64::max);
        value_spread <= self.tolerance || point_spread <= self.tolerance
    }
}

/// Absolute step inside a closed box, relative step otherwise.
fn initial_step(x: f64, (lower, upper): (f64, f64)) -> f64 {
    if lower.is_finite() && upper.is_finite() {
        INITIAL_STEP
    } else if x != 0.0 {
        RELATIVE_STEP * x.abs()
    } else {
        ZERO_STEP
    }
}

/// `centroid + coef * (vertex - centroid)`, clamped into the box.
fn along(centroid: &[f64], vertex: &[f64], coef: f64, bounds: &[(f64, f64)]) -> Vec<f64> {
    let point = centroid
        .iter()
        .zip(vertex)
        .map(|(c, v)| c + coef * (v - c))
        .collect();
    clamp(point, bounds)
}

fn clamp(mut point: Vec<f64>, bounds: &[(f64, f64)]) -> Vec<f64> {
    for (x, &(lower, upper)) in point.iter_mut().zip(bounds) {
        *x = x.clamp(lower, upper);
    }
    point
}

fn centroid(vertices: &[(Vec<f64>, f64)], dim: usize) -> Vec<f64> {
    let mut c = vec![0.0; dim];
    for (point, _) in vertices {
        for (ci, xi) in c.iter_mut().zip(point) {
            *ci += xi;
        }
    }
    let n = vertices.len() as f64;
    c.iter_mut().for_each(|ci| *ci /= n);
    c
}
