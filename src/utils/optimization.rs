//! Derivative-free minimization for conditional least squares.

/// Configuration for [`nelder_mead`].
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations.
    pub max_iter: usize,
    /// Convergence tolerance on the simplex value spread.
    pub tolerance: f64,
    /// Relative size of the initial simplex.
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-8,
            initial_step: 0.05,
        }
    }
}

/// Result of a [`nelder_mead`] run.
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    pub optimal_point: Vec<f64>,
    pub optimal_value: f64,
    pub iterations: usize,
    pub converged: bool,
}

// Standard simplex coefficients: reflection, expansion, contraction, shrink.
const ALPHA: f64 = 1.0;
const GAMMA: f64 = 2.0;
const RHO: f64 = 0.5;
const SIGMA: f64 = 0.5;

/// Minimize `objective` with the Nelder-Mead simplex method.
///
/// `bounds`, when given, clamp every candidate point per dimension. The
/// method is derivative-free, which suits the non-smooth conditional
/// sum-of-squares surfaces that ARIMA estimation produces.
pub fn nelder_mead<F>(
    objective: F,
    initial: &[f64],
    bounds: Option<&[(f64, f64)]>,
    config: NelderMeadConfig,
) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    if n == 0 {
        return NelderMeadResult {
            optimal_point: Vec::new(),
            optimal_value: f64::NAN,
            iterations: 0,
            converged: false,
        };
    }

    let clamp = |point: &mut Vec<f64>| {
        if let Some(bounds) = bounds {
            for (x, &(lo, hi)) in point.iter_mut().zip(bounds) {
                *x = x.clamp(lo, hi);
            }
        }
    };

    // Initial simplex: the start point plus one perturbed vertex per
    // dimension.
    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    simplex.push(initial.to_vec());
    for i in 0..n {
        let mut vertex = initial.to_vec();
        let step = if initial[i].abs() > 1e-10 {
            config.initial_step * initial[i].abs()
        } else {
            config.initial_step
        };
        vertex[i] += step;
        clamp(&mut vertex);
        simplex.push(vertex);
    }
    let mut values: Vec<f64> = simplex.iter().map(|v| objective(v)).collect();

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;

        // Order vertices best to worst.
        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(std::cmp::Ordering::Equal));
        simplex = order.iter().map(|&i| simplex[i].clone()).collect();
        values = order.iter().map(|&i| values[i]).collect();

        if (values[n] - values[0]).abs() < config.tolerance {
            converged = true;
            break;
        }

        // Centroid of all but the worst vertex.
        let mut centroid = vec![0.0; n];
        for vertex in &simplex[..n] {
            for (c, x) in centroid.iter_mut().zip(vertex) {
                *c += x / n as f64;
            }
        }

        let worst = values[n];
        let mut reflected: Vec<f64> = centroid
            .iter()
            .zip(&simplex[n])
            .map(|(c, w)| c + ALPHA * (c - w))
            .collect();
        clamp(&mut reflected);
        let reflected_value = objective(&reflected);

        if reflected_value < values[0] {
            // Try expanding past the reflection.
            let mut expanded: Vec<f64> = centroid
                .iter()
                .zip(&reflected)
                .map(|(c, r)| c + GAMMA * (r - c))
                .collect();
            clamp(&mut expanded);
            let expanded_value = objective(&expanded);
            if expanded_value < reflected_value {
                simplex[n] = expanded;
                values[n] = expanded_value;
            } else {
                simplex[n] = reflected;
                values[n] = reflected_value;
            }
            continue;
        }

        if reflected_value < values[n - 1] {
            simplex[n] = reflected;
            values[n] = reflected_value;
            continue;
        }

        // Contract toward the better of worst/reflected.
        let toward = if reflected_value < worst {
            &reflected
        } else {
            &simplex[n]
        };
        let mut contracted: Vec<f64> = centroid
            .iter()
            .zip(toward)
            .map(|(c, x)| c + RHO * (x - c))
            .collect();
        clamp(&mut contracted);
        let contracted_value = objective(&contracted);

        if contracted_value < worst.min(reflected_value) {
            simplex[n] = contracted;
            values[n] = contracted_value;
            continue;
        }

        // Shrink everything toward the best vertex.
        let best = simplex[0].clone();
        for (vertex, value) in simplex.iter_mut().zip(values.iter_mut()).skip(1) {
            for (x, b) in vertex.iter_mut().zip(&best) {
                *x = b + SIGMA * (*x - b);
            }
            clamp(vertex);
            *value = objective(vertex);
        }
    }

    let best = values
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0);

    NelderMeadResult {
        optimal_point: simplex[best].clone(),
        optimal_value: values[best],
        iterations,
        converged,
    }
}
