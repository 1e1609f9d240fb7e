use serde::Serialize;

/// Bisection search for the smallest value in `[search_min, search_max]` that
/// satisfies a monotone predicate.
#[derive(Debug, Clone, Copy)]
pub struct SolveConfig {
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveIteration {
    pub iteration: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub candidate_value: f64,
    pub satisfied: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveResult {
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub solved_value: Option<f64>,
    #[serde(skip)]
    pub iterations: Vec<SolveIteration>,
    pub converged: bool,
    pub feasible: bool,
    pub message: String,
}

/// `satisfies` must be monotone: once true for some value it stays true for
/// every larger one.
pub fn solve_minimum<F>(config: SolveConfig, mut satisfies: F) -> Result<SolveResult, String>
where
    F: FnMut(f64) -> bool,
{
    validate_config(config)?;

    let mut iterations = Vec::with_capacity(config.max_iterations as usize);
    let mut solved_value = None;
    let mut converged = false;
    let feasible;
    let message;

    if satisfies(config.search_min) {
        solved_value = Some(config.search_min);
        converged = true;
        feasible = true;
        message = "Already meets target at lower bound.".to_string();
    } else if !satisfies(config.search_max) {
        feasible = false;
        message = "No feasible value found within the search bounds.".to_string();
    } else {
        let mut lo = config.search_min;
        let mut hi = config.search_max;
        let mut it = 0;
        while it < config.max_iterations {
            it += 1;
            let mid = (lo + hi) * 0.5;
            let satisfied = satisfies(mid);
            iterations.push(SolveIteration {
                iteration: it,
                lower_bound: lo,
                upper_bound: hi,
                candidate_value: mid,
                satisfied,
            });

            if satisfied {
                hi = mid;
            } else {
                lo = mid;
            }

            if (hi - lo).abs() <= config.tolerance {
                converged = true;
                break;
            }
        }
        // `hi` always satisfies the predicate.
        solved_value = Some(hi);
        feasible = true;
        message = if converged {
            "Solved minimum value.".to_string()
        } else {
            "Reached max iterations before tolerance was met; returning best estimate.".to_string()
        };
    }

    Ok(SolveResult {
        search_min: config.search_min,
        search_max: config.search_max,
        tolerance: config.tolerance,
        solved_value,
        iterations,
        converged,
        feasible,
        message,
    })
}

fn validate_config(config: SolveConfig) -> Result<(), String> {
    if !config.search_min.is_finite() || !config.search_max.is_finite() {
        return Err("search bounds must be finite".to_string());
    }
    if config.search_max <= config.search_min {
        return Err("search_max must be greater than search_min".to_string());
    }
    if !config.tolerance.is_finite() || config.tolerance <= 0.0 {
        return Err("tolerance must be > 0".to_string());
    }
    if config.max_iterations == 0 {
        return Err("max_iterations must be > 0".to_string());
    }
    Ok(())
}
