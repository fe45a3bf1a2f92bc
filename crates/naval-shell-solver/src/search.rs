//! Peak search and distance inversion over a sweep's distance column.

/// Index of the maximum of a unimodal sequence by binary search.
///
/// Returns `None` for an empty slice. A leading run of equal values (the
/// zero-distance rows of launch angles at or below the horizontal) is
/// skipped, and the search starts at its last element. If the sequence is
/// monotone the matching end is returned.
#[allow(clippy::float_cmp)]
pub fn peak_index(d: &[f64]) -> Option<usize> {
    let first = *d.first()?;
    let start = d.iter().position(|&x| x != first).map_or(d.len() - 1, |i| i.saturating_sub(1));
    Some(start + peak_from_start(&d[start..]))
}

fn peak_from_start(d: &[f64]) -> usize {
    let n = d.len();
    match n {
        1 => return 0,
        2 => return usize::from(d[1] >= d[0]),
        _ => {}
    }
    if d[0] >= d[1] {
        return 0;
    }
    if d[n - 1] >= d[n - 2] {
        return n - 1;
    }

    // d[lo - 1] < d[lo] and d[hi] >= d[hi + 1] hold throughout
    let (mut lo, mut hi) = (1, n - 2);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if d[mid] < d[mid + 1] {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

/// True when `d` rises (weakly) to a single maximum and falls (weakly) after.
pub fn is_unimodal(d: &[f64]) -> bool {
    let mut falling = false;
    for w in d.windows(2) {
        if w[1] > w[0] {
            if falling {
                return false;
            }
        } else if w[1] < w[0] {
            falling = true;
        }
    }
    true
}

/// Inverse lookup: the `values` entry matching `query` on the ascending
/// `distances[..=peak]`, linearly interpolated between the bracketing rows.
///
/// `None` when the query is not finite or lies outside the prefix.
#[allow(clippy::float_cmp)]
pub fn interpolate_prefix(distances: &[f64], values: &[f64], peak: usize, query: f64) -> Option<f64> {
    if !query.is_finite() || distances.is_empty() {
        return None;
    }
    let prefix = &distances[..=peak.min(distances.len() - 1)];
    let (first, last) = (prefix[0], prefix[prefix.len() - 1]);
    if query < first || query > last {
        return None;
    }

    let upper = prefix.partition_point(|&d| d < query);
    if prefix[upper] == query || upper == 0 {
        return Some(values[upper]);
    }
    let lower = upper - 1;
    let span = prefix[upper] - prefix[lower];
    if span <= 0.0 {
        return Some(values[upper]);
    }
    let t = (query - prefix[lower]) / span;
    Some(values[lower] + t * (values[upper] - values[lower]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn peak_of_short_inputs() {
        assert_eq!(peak_index(&[]), None);
        assert_eq!(peak_index(&[3.0]), Some(0));
        assert_eq!(peak_index(&[1.0, 2.0]), Some(1));
        assert_eq!(peak_index(&[2.0, 1.0]), Some(0));
        assert_eq!(peak_index(&[2.0, 2.0]), Some(1));
    }

    #[test]
    fn peak_of_monotone_inputs() {
        assert_eq!(peak_index(&[1.0, 2.0, 3.0, 4.0]), Some(3));
        assert_eq!(peak_index(&[4.0, 3.0, 2.0, 1.0]), Some(0));
    }

    #[test]
    fn interior_peak() {
        let d = [0.0, 5.0, 9.0, 12.0, 13.0, 11.0, 6.0];
        assert_eq!(peak_index(&d), Some(4));
        for p in 1..40 {
            let d: Vec<f64> = (0..41).map(|i| -f64::from(i - p).powi(2)).collect();
            #[allow(clippy::cast_sign_loss)]
            let expected = p as usize;
            assert_eq!(peak_index(&d), Some(expected));
        }
    }

    #[test]
    fn leading_flat_rows_are_skipped() {
        let d = [0.0, 0.0, 0.0, 2_100.0, 4_000.0, 5_200.0, 4_800.0];
        assert_eq!(peak_index(&d), Some(5));
        assert_eq!(peak_index(&[0.0, 0.0, 3.0]), Some(2));
        assert_eq!(peak_index(&[0.0, 0.0, 0.0]), Some(2));

        let v = [-2.0, -1.0, 0.0, 1.0, 2.0, 3.0, 4.0];
        assert_eq!(interpolate_prefix(&d, &v, 5, 0.0), Some(-2.0));
        assert_relative_eq!(interpolate_prefix(&d, &v, 5, 1_050.0).unwrap(), 0.5);
        assert_relative_eq!(interpolate_prefix(&d, &v, 5, 4_600.0).unwrap(), 2.5);
    }

    #[test]
    fn plateau_peak_has_no_larger_neighbor() {
        let d = [0.0, 4.0, 7.0, 7.0, 3.0];
        let p = peak_index(&d).unwrap();
        assert_eq!(d[p], 7.0);
    }

    #[test]
    fn unimodality_check() {
        assert!(is_unimodal(&[0.0, 1.0, 3.0, 3.0, 2.0]));
        assert!(is_unimodal(&[]));
        assert!(!is_unimodal(&[0.0, 3.0, 1.0, 4.0, 2.0]));
    }

    #[test]
    fn interpolation_on_prefix() {
        let d = [0.0, 100.0, 300.0, 600.0, 500.0];
        let v = [10.0, 20.0, 40.0, 70.0, 90.0];
        assert_eq!(interpolate_prefix(&d, &v, 3, 300.0), Some(40.0));
        assert_eq!(interpolate_prefix(&d, &v, 3, 0.0), Some(10.0));
        assert_relative_eq!(interpolate_prefix(&d, &v, 3, 200.0).unwrap(), 30.0);
        assert_relative_eq!(interpolate_prefix(&d, &v, 3, 450.0).unwrap(), 55.0);
        assert_eq!(interpolate_prefix(&d, &v, 3, 600.0), Some(70.0));
        assert_eq!(interpolate_prefix(&d, &v, 3, 601.0), None);
        assert_eq!(interpolate_prefix(&d, &v, 3, -1.0), None);
        assert_eq!(interpolate_prefix(&d, &v, 3, f64::NAN), None);
        assert_eq!(interpolate_prefix(&[], &[], 0, 1.0), None);
    }
}
