//! Descriptive statistics over the columns of the relation.

use std::fmt::Display;

use crate::config::{BinLayout, RelationRow};

/// The present values of a column. Missing values and NaN are dropped.
pub fn column_values(rows: &[RelationRow], column: impl Fn(&RelationRow) -> Option<f64>) -> Vec<f64> {
    rows.iter()
        .filter_map(column)
        .filter(|x| !x.is_nan())
        .collect()
}

/// Counts the values falling in each bin.
///
/// Bins are half-open `[lo, hi)` except the last one, which also holds its
/// upper edge. Values outside the edges are not counted.
pub fn histogram(values: &[f64], layout: &BinLayout) -> Vec<u64> {
    let edges = layout.edges();
    let mut counts: Vec<u64> = vec![0; layout.count];
    if layout.count == 0 {
        return counts;
    }
    let (first, last) = (edges[0], edges[layout.count]);
    for &v in values.iter() {
        if v.is_nan() || v < first || v > last {
            continue;
        }
        let mut idx = (((v - first) / layout.width).floor() as usize).min(layout.count - 1);
        // Guard against rounding in the division.
        while idx > 0 && v < edges[idx] {
            idx -= 1;
        }
        while idx + 1 < layout.count && v >= edges[idx + 1] {
            idx += 1;
        }
        counts[idx] += 1;
    }
    counts
}

/// Summary statistics of a column.
#[derive(PartialEq, Debug, Clone)]
pub struct Describe {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation. Not defined for fewer than two values.
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

/// Describes a set of values, or returns `None` if it is empty.
pub fn describe(values: &[f64]) -> Option<Describe> {
    let mut sorted: Vec<f64> = values.iter().cloned().filter(|x| !x.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let std = if n > 1 {
        let ss: f64 = sorted.iter().map(|x| (x - mean) * (x - mean)).sum();
        Some((ss / (n - 1) as f64).sqrt())
    } else {
        None
    };
    Some(Describe {
        count: n,
        mean,
        std,
        min: sorted[0],
        q25: quantile(&sorted, 0.25),
        q50: quantile(&sorted, 0.5),
        q75: quantile(&sorted, 0.75),
        max: sorted[n - 1],
    })
}

// Linear interpolation between the closest ranks. `sorted` is not empty.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

impl Display for Describe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "count {:>14}", self.count)?;
        writeln!(f, "mean  {:>14.6}", self.mean)?;
        match self.std {
            Some(s) => writeln!(f, "std   {:>14.6}", s)?,
            None => writeln!(f, "std   {:>14}", "NaN")?,
        }
        writeln!(f, "min   {:>14.6}", self.min)?;
        writeln!(f, "25%   {:>14.6}", self.q25)?;
        writeln!(f, "50%   {:>14.6}", self.q50)?;
        writeln!(f, "75%   {:>14.6}", self.q75)?;
        write!(f, "max   {:>14.6}", self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_bins_like_numpy() {
        let layout = BinLayout {
            start: 0.0,
            width: 1.0,
            count: 3,
        };
        let values = [-0.5, 0.0, 0.5, 1.0, 2.999, 3.0, 3.5, f64::NAN];
        assert_eq!(histogram(&values, &layout), vec![2, 1, 2]);
    }

    #[test]
    fn default_layouts() {
        let edges = BinLayout::MP_PARTY_DIFF.edges();
        assert_eq!(edges.first(), Some(&-12000.0));
        assert_eq!(edges.last(), Some(&12800.0));
        let edges = BinLayout::ERROR_PER_STATION.edges();
        assert_eq!(edges.first(), Some(&-30.0));
        assert_eq!(edges.last(), Some(&49.0));

        let counts = histogram(&[-12000.0, -11801.0, 0.0, 12800.0], &BinLayout::MP_PARTY_DIFF);
        assert_eq!(counts[0], 2);
        assert_eq!(counts[60], 1);
        assert_eq!(counts[123], 1);
        assert_eq!(counts.iter().sum::<u64>(), 4);
    }

    #[test]
    fn describe_values() {
        assert_eq!(describe(&[]), None);
        let d = describe(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(d.count, 4);
        assert_eq!(d.mean, 2.5);
        assert_eq!(d.min, 1.0);
        assert_eq!(d.q25, 1.75);
        assert_eq!(d.q50, 2.5);
        assert_eq!(d.q75, 3.25);
        assert_eq!(d.max, 4.0);
        let std = d.std.unwrap();
        assert!((std - 1.290_994_448_735_805_6).abs() < 1e-12);

        let single = describe(&[7.0]).unwrap();
        assert_eq!(single.std, None);
        assert_eq!(single.q75, 7.0);
    }

    #[test]
    fn column_values_drop_missing() {
        let rows = vec![
            RelationRow {
                mp_party_error_per_station: Some(1.5),
                ..RelationRow::default()
            },
            RelationRow::default(),
            RelationRow {
                mp_party_error_per_station: Some(f64::NAN),
                ..RelationRow::default()
            },
        ];
        assert_eq!(
            column_values(&rows, |r| r.mp_party_error_per_station),
            vec![1.5]
        );
    }
}
