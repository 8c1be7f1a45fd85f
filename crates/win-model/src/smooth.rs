//! Sparse-cell smoothing for one move-bin slice of the outcome table.
//!
//! Cells at or below the sample threshold are never trusted as-is: boundary
//! cells are forced to the extreme-evaluation prior, interior cells are
//! linearly interpolated from well-sampled neighbors, and a slice with no
//! well-sampled cell at all degenerates to a defined fallback. None of these
//! conditions is an error.

/// Fill used when not a single cell in the slice meets the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceFallback {
    /// Equal thirds per outcome.
    Uniform,
    /// Hard step at evaluation zero: winning above, losing at or below.
    StepAtZero,
}

const FORCED_LOW: [f64; 3] = [0.0, 5.0, 95.0];
const FORCED_HIGH: [f64; 3] = [95.0, 5.0, 0.0];

/// Smooth one slice in place. `xs` are the representative x-coordinates of
/// the cells; `counts` the raw per-cell sample counts.
pub fn smooth_slice(
    win: &mut [f64],
    draw: &mut [f64],
    loss: &mut [f64],
    counts: &[u64],
    xs: &[f64],
    min_samples: u64,
    fallback: SliceFallback,
) {
    let n = win.len();
    debug_assert!(n == draw.len() && n == loss.len() && n == counts.len() && n == xs.len());
    if n == 0 {
        return;
    }

    if counts.iter().all(|&c| c <= min_samples) {
        match fallback {
            SliceFallback::Uniform => {
                for i in 0..n {
                    win[i] = 100.0 / 3.0;
                    draw[i] = 100.0 / 3.0;
                    loss[i] = 100.0 / 3.0;
                }
            }
            SliceFallback::StepAtZero => {
                for i in 0..n {
                    let [w, d, l] = if xs[i] > 0.0 { FORCED_HIGH } else { FORCED_LOW };
                    win[i] = w;
                    draw[i] = d;
                    loss[i] = l;
                }
            }
        }
        return;
    }

    // Extreme evaluations strongly favor one side, so under-sampled boundary
    // cells get the monotone prior and then anchor the interpolation.
    let mut counts = counts.to_vec();
    if counts[0] <= min_samples {
        [win[0], draw[0], loss[0]] = FORCED_LOW;
        counts[0] = min_samples + 1;
    }
    if counts[n - 1] <= min_samples {
        [win[n - 1], draw[n - 1], loss[n - 1]] = FORCED_HIGH;
        counts[n - 1] = min_samples + 1;
    }

    let anchors: Vec<usize> = (0..n).filter(|&i| counts[i] > min_samples).collect();
    for row in [win, draw, loss] {
        interpolate_row(row, &anchors, xs);
    }
}

/// Replace every non-anchor cell by linear interpolation between its
/// nearest anchors, clamping to the outermost anchor beyond the ends.
fn interpolate_row(row: &mut [f64], anchors: &[usize], xs: &[f64]) {
    for i in 0..row.len() {
        if anchors.binary_search(&i).is_ok() {
            continue;
        }
        let next = anchors.partition_point(|&a| a < i);
        row[i] = match (next.checked_sub(1).map(|p| anchors[p]), anchors.get(next)) {
            (Some(left), Some(&right)) => {
                let span = xs[right] - xs[left];
                if span.abs() < f64::EPSILON {
                    row[left]
                } else {
                    let t = (xs[i] - xs[left]) / span;
                    row[left] + t * (row[right] - row[left])
                }
            }
            (None, Some(&right)) => row[right],
            (Some(left), None) => row[left],
            (None, None) => unreachable!("anchors checked non-empty"),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_rows_sum_100(win: &[f64], draw: &[f64], loss: &[f64]) {
        for i in 0..win.len() {
            let sum = win[i] + draw[i] + loss[i];
            assert!((sum - 100.0).abs() < 1e-9, "cell {i} sums to {sum}");
        }
    }

    #[test]
    fn test_under_sampled_cell_is_interpolated() {
        let xs = vec![0.0, 0.0, 1.0, 2.0, 3.0];
        // middle cell has 40 samples: below the threshold, not trusted
        let counts = vec![500, 500, 40, 500, 500];
        let mut win = vec![10.0, 20.0, 99.0, 40.0, 50.0];
        let mut draw = vec![30.0, 30.0, 1.0, 30.0, 30.0];
        let mut loss = vec![60.0, 50.0, 0.0, 30.0, 20.0];
        smooth_slice(&mut win, &mut draw, &mut loss, &counts, &xs, 100, SliceFallback::Uniform);

        // its raw 99% is replaced by the midpoint of its neighbors
        assert!((win[2] - 30.0).abs() < 1e-9);
        assert!((draw[2] - 30.0).abs() < 1e-9);
        assert!((loss[2] - 40.0).abs() < 1e-9);
        assert_rows_sum_100(&win, &draw, &loss);
    }

    #[test]
    fn test_boundary_forcing() {
        let xs = vec![-1.0, -1.0, 0.0, 1.0];
        let counts = vec![3, 500, 500, 7];
        let mut win = vec![77.0, 20.0, 30.0, 1.0];
        let mut draw = vec![3.0, 40.0, 40.0, 1.0];
        let mut loss = vec![20.0, 40.0, 30.0, 98.0];
        smooth_slice(&mut win, &mut draw, &mut loss, &counts, &xs, 100, SliceFallback::Uniform);

        assert_eq!([win[0], draw[0], loss[0]], [0.0, 5.0, 95.0]);
        assert_eq!([win[3], draw[3], loss[3]], [95.0, 5.0, 0.0]);
        // well-sampled interior cells are untouched
        assert_eq!(win[1], 20.0);
        assert_eq!(win[2], 30.0);
    }

    #[test]
    fn test_empty_slice_uniform_fallback() {
        let xs = vec![-1.0, -1.0, 1.0];
        let counts = vec![0, 99, 12];
        let mut win = vec![0.0; 3];
        let mut draw = vec![0.0; 3];
        let mut loss = vec![0.0; 3];
        smooth_slice(&mut win, &mut draw, &mut loss, &counts, &xs, 100, SliceFallback::Uniform);
        assert_rows_sum_100(&win, &draw, &loss);
        assert!((win[1] - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_slice_step_fallback() {
        let xs = vec![-1.0, -1.0, 0.0, 1.0];
        let counts = vec![0, 0, 0, 0];
        let mut win = vec![0.0; 4];
        let mut draw = vec![0.0; 4];
        let mut loss = vec![0.0; 4];
        smooth_slice(&mut win, &mut draw, &mut loss, &counts, &xs, 100, SliceFallback::StepAtZero);
        assert_eq!(win, vec![0.0, 0.0, 0.0, 95.0]);
        assert_eq!(loss, vec![95.0, 95.0, 95.0, 0.0]);
        assert_rows_sum_100(&win, &draw, &loss);
    }

    #[test]
    fn test_interpolation_between_sparse_anchors() {
        let xs = vec![0.0, 0.0, 1.0, 2.0, 3.0];
        // only one interior anchor; boundary cells get forced, the rest clamp
        let counts = vec![500, 10, 500, 10, 500];
        let mut win = vec![5.0, 0.0, 50.0, 0.0, 90.0];
        let mut draw = vec![5.0, 0.0, 10.0, 0.0, 5.0];
        let mut loss = vec![90.0, 0.0, 40.0, 0.0, 5.0];
        smooth_slice(&mut win, &mut draw, &mut loss, &counts, &xs, 100, SliceFallback::Uniform);
        assert_rows_sum_100(&win, &draw, &loss);
        // cell 1 interpolates between cell 0 (x=0) and cell 2 (x=1) at x=0
        assert!((win[1] - 5.0).abs() < 1e-9);
        // cell 3 interpolates between cell 2 (x=1) and cell 4 (x=3) at x=2
        assert!((win[3] - 70.0).abs() < 1e-9);
    }
}
