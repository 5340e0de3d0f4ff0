use super::model::{Dataset, Region, Sex, Smoker};

// ---------------------------------------------------------------------------
// Histograms
// ---------------------------------------------------------------------------

/// Default bin count for continuous variables (charges, age, bmi).
pub const CONTINUOUS_BINS: usize = 20;
/// Default bin count for the children count.
pub const CHILDREN_BINS: usize = 5;

/// One equal-width histogram bin over `[lo, hi)` (the last bin is closed).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub lo: f64,
    pub hi: f64,
    pub count: usize,
}

impl HistogramBin {
    /// Bin midpoint, used as the bar's x position.
    pub fn center(&self) -> f64 {
        (self.lo + self.hi) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.hi - self.lo
    }
}

/// Equal-width histogram over the observed `[min, max]` of `values`.
///
/// Empty input yields no bins; a degenerate range (all values equal) yields
/// a single bin holding every value.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if range.abs() < f64::EPSILON {
        return vec![HistogramBin {
            lo: min,
            hi: max,
            count: values.len(),
        }];
    }

    let width = range / bins as f64;
    let mut counts = vec![0usize; bins];
    for &v in values {
        // max lands in the last bin
        let i = (((v - min) / width) as usize).min(bins - 1);
        counts[i] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lo: min + i as f64 * width,
            hi: min + (i + 1) as f64 * width,
            count,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Categorical frequencies
// ---------------------------------------------------------------------------

/// Frequency of each sex in enum declaration order.
pub fn sex_counts(dataset: &Dataset) -> Vec<(Sex, usize)> {
    Sex::ALL
        .iter()
        .map(|s| (*s, dataset.records().iter().filter(|r| r.sex == *s).count()))
        .collect()
}

/// Frequency of each smoker status in enum declaration order.
pub fn smoker_counts(dataset: &Dataset) -> Vec<(Smoker, usize)> {
    Smoker::ALL
        .iter()
        .map(|s| {
            (*s, dataset.records().iter().filter(|r| r.smoker == *s).count())
        })
        .collect()
}

/// Frequency of each region in enum declaration order.
pub fn region_counts(dataset: &Dataset) -> Vec<(Region, usize)> {
    Region::ALL
        .iter()
        .map(|g| {
            (*g, dataset.records().iter().filter(|r| r.region == *g).count())
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;
    use crate::data::model::SchemaVariant;

    #[test]
    fn histogram_counts_sum_to_input_length() {
        let values: Vec<f64> = (0..137).map(|i| (i as f64).sin() * 50.0).collect();
        let bins = histogram(&values, CONTINUOUS_BINS);
        assert_eq!(bins.len(), CONTINUOUS_BINS);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), values.len());
    }

    #[test]
    fn histogram_edges_span_observed_range() {
        let values = [3.0, 7.0, 11.0, 19.0];
        let bins = histogram(&values, 4);
        assert_eq!(bins.first().unwrap().lo, 3.0);
        assert_eq!(bins.last().unwrap().hi, 19.0);
        // the maximum falls into the last bin, not past it
        assert_eq!(bins.last().unwrap().count, 1);
    }

    #[test]
    fn histogram_of_nothing_is_empty() {
        assert!(histogram(&[], 20).is_empty());
    }

    #[test]
    fn degenerate_range_collapses_to_one_bin() {
        let bins = histogram(&[5.0; 10], 20);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 10);
    }

    #[test]
    fn category_counts_follow_declaration_order() {
        let ds = Dataset::from_records(
            vec![
                record(20, Sex::Male, Smoker::Yes, Region::Southeast, 100.0),
                record(30, Sex::Male, Smoker::No, Region::Southeast, 100.0),
                record(40, Sex::Female, Smoker::No, Region::Northwest, 100.0),
            ],
            SchemaVariant::Raw,
        );
        assert_eq!(sex_counts(&ds), vec![(Sex::Female, 1), (Sex::Male, 2)]);
        assert_eq!(smoker_counts(&ds), vec![(Smoker::No, 2), (Smoker::Yes, 1)]);
        let regions = region_counts(&ds);
        assert_eq!(regions[1], (Region::Northwest, 1));
        assert_eq!(regions[2], (Region::Southeast, 2));
    }
}
