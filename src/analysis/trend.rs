//! LOWESS smoothing for the year-over-year scatter.
//!
//! Locally weighted linear regression with a tricube distance kernel,
//! followed by bisquare robustness passes driven by the median absolute
//! residual.

/// Share of the points used for each local fit.
pub const DEFAULT_FRACTION: f64 = 2.0 / 3.0;
/// Robustness passes after the initial fit.
pub const DEFAULT_ITERATIONS: usize = 3;

const MIN_NEIGHBOURS: usize = 3;

/// Smooth `points` (`[x, y]` pairs) and return `[x, fitted_y]`, sorted by x.
///
/// Fewer than three points are returned unchanged (sorted).
pub fn lowess(points: &[[f64; 2]], fraction: f64, iterations: usize) -> Vec<[f64; 2]> {
    let mut sorted: Vec<[f64; 2]> = points
        .iter()
        .copied()
        .filter(|[x, y]| x.is_finite() && y.is_finite())
        .collect();
    sorted.sort_by(|a, b| a[0].total_cmp(&b[0]));

    let n = sorted.len();
    if n < MIN_NEIGHBOURS {
        return sorted;
    }

    let xs: Vec<f64> = sorted.iter().map(|p| p[0]).collect();
    let ys: Vec<f64> = sorted.iter().map(|p| p[1]).collect();
    let k = ((fraction * n as f64 + 1e-10).floor() as usize).clamp(MIN_NEIGHBOURS, n);
    let scale = 1.0 + ys.iter().map(|y| y.abs()).sum::<f64>() / n as f64;

    let mut robustness = vec![1.0; n];
    let mut fitted = local_fits(&xs, &ys, &robustness, k);

    for _ in 0..iterations {
        let residuals: Vec<f64> = ys.iter().zip(&fitted).map(|(y, f)| y - f).collect();
        let s = median_abs(&residuals);
        if s <= 1e-12 * scale {
            break;
        }
        for (w, r) in robustness.iter_mut().zip(&residuals) {
            *w = bisquare(r / (6.0 * s));
        }
        fitted = local_fits(&xs, &ys, &robustness, k);
    }

    xs.into_iter().zip(fitted).map(|(x, y)| [x, y]).collect()
}

fn local_fits(xs: &[f64], ys: &[f64], robustness: &[f64], k: usize) -> Vec<f64> {
    let mut distances = vec![0.0; xs.len()];
    xs.iter()
        .enumerate()
        .map(|(i, &x0)| {
            for (d, &x) in distances.iter_mut().zip(xs) {
                *d = (x - x0).abs();
            }
            let h = kth_smallest(&distances, k);

            // Sums are taken on x - x0 so the fit is evaluated at zero.
            let mut sw = 0.0;
            let mut swx = 0.0;
            let mut swy = 0.0;
            let mut swxx = 0.0;
            let mut swxy = 0.0;
            for j in 0..xs.len() {
                let kernel = if h > 0.0 {
                    tricube(distances[j] / h)
                } else if distances[j] == 0.0 {
                    1.0
                } else {
                    0.0
                };
                let w = kernel * robustness[j];
                let dx = xs[j] - x0;
                sw += w;
                swx += w * dx;
                swy += w * ys[j];
                swxx += w * dx * dx;
                swxy += w * dx * ys[j];
            }

            if sw <= 0.0 {
                return ys[i];
            }
            let mean_x = swx / sw;
            let mean_y = swy / sw;
            let var_x = swxx / sw - mean_x * mean_x;
            if var_x <= 1e-12 * (1.0 + swxx / sw) {
                return mean_y;
            }
            let slope = (swxy / sw - mean_x * mean_y) / var_x;
            mean_y - slope * mean_x
        })
        .collect()
}

/// k-th smallest value, 1-based.
fn kth_smallest(values: &[f64], k: usize) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted[k - 1]
}

fn median_abs(values: &[f64]) -> f64 {
    let mut abs: Vec<f64> = values.iter().map(|v| v.abs()).collect();
    abs.sort_by(f64::total_cmp);
    let n = abs.len();
    if n % 2 == 0 {
        (abs[n / 2 - 1] + abs[n / 2]) / 2.0
    } else {
        abs[n / 2]
    }
}

fn tricube(u: f64) -> f64 {
    let u = u.abs();
    if u < 1.0 {
        (1.0 - u * u * u).powi(3)
    } else {
        0.0
    }
}

fn bisquare(u: f64) -> f64 {
    if u.abs() < 1.0 {
        (1.0 - u * u).powi(2)
    } else {
        0.0
    }
}
