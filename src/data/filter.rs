use std::collections::BTreeSet;

use thiserror::Error;

use super::model::{Dataset, Record, Region, Sex, Smoker};

// ---------------------------------------------------------------------------
// Criteria – the user's current filter selections
// ---------------------------------------------------------------------------

/// Tri-state sex restriction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SexFilter {
    #[default]
    All,
    Male,
    Female,
}

impl SexFilter {
    fn matches(&self, sex: Sex) -> bool {
        match self {
            SexFilter::All => true,
            SexFilter::Male => sex == Sex::Male,
            SexFilter::Female => sex == Sex::Female,
        }
    }
}

/// Tri-state smoker restriction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmokerFilter {
    #[default]
    All,
    Smoker,
    NonSmoker,
}

impl SmokerFilter {
    fn matches(&self, smoker: Smoker) -> bool {
        match self {
            SmokerFilter::All => true,
            SmokerFilter::Smoker => smoker == Smoker::Yes,
            SmokerFilter::NonSmoker => smoker == Smoker::No,
        }
    }
}

/// The full set of restrictions collected from the filter panel.
///
/// An empty `regions` set means "no region restriction", not "no rows".
/// Ranges are inclusive on both ends. Constructed fresh from UI state on
/// every interaction; carries no identity of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub sex: SexFilter,
    pub smoker: SmokerFilter,
    pub regions: BTreeSet<Region>,
    pub age_range: (u32, u32),
    pub bmi_range: (f64, f64),
    pub children_range: (u32, u32),
}

impl FilterCriteria {
    /// The identity filter for a dataset: no categorical restriction and
    /// ranges spanning the observed extremes. Filtering with it returns
    /// every row.
    pub fn identity(dataset: &Dataset) -> Self {
        let b = dataset.bounds();
        FilterCriteria {
            sex: SexFilter::All,
            smoker: SmokerFilter::All,
            regions: BTreeSet::new(),
            age_range: b.age,
            bmi_range: b.bmi,
            children_range: b.children,
        }
    }

    /// Reject inverted ranges before any filtering runs. The sliders keep
    /// bounds ordered, but the filter must not silently misbehave if they
    /// do not.
    pub fn validate(&self) -> Result<(), CriteriaError> {
        if self.age_range.0 > self.age_range.1 {
            return Err(CriteriaError::InvalidRange {
                field: "age",
                lo: self.age_range.0 as f64,
                hi: self.age_range.1 as f64,
            });
        }
        if self.bmi_range.0 > self.bmi_range.1 {
            return Err(CriteriaError::InvalidRange {
                field: "bmi",
                lo: self.bmi_range.0,
                hi: self.bmi_range.1,
            });
        }
        if self.children_range.0 > self.children_range.1 {
            return Err(CriteriaError::InvalidRange {
                field: "children",
                lo: self.children_range.0 as f64,
                hi: self.children_range.1 as f64,
            });
        }
        Ok(())
    }

    fn matches(&self, r: &Record) -> bool {
        self.sex.matches(r.sex)
            && self.smoker.matches(r.smoker)
            && (self.regions.is_empty() || self.regions.contains(&r.region))
            && (self.age_range.0..=self.age_range.1).contains(&r.age)
            && (self.bmi_range.0..=self.bmi_range.1).contains(&r.bmi)
            && (self.children_range.0..=self.children_range.1).contains(&r.children)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum CriteriaError {
    #[error("invalid {field} range: lower bound {lo} exceeds upper bound {hi}")]
    InvalidRange {
        field: &'static str,
        lo: f64,
        hi: f64,
    },
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Return a new dataset containing only the rows satisfying every predicate
/// in `criteria`, preserving the original relative row order.
///
/// Pure in-memory transform: the source dataset is never mutated, and a
/// criteria combination matching nothing yields a valid empty dataset.
pub fn filter(dataset: &Dataset, criteria: &FilterCriteria) -> Result<Dataset, CriteriaError> {
    criteria.validate()?;

    let matching: Vec<Record> = dataset
        .records()
        .iter()
        .filter(|r| criteria.matches(r))
        .cloned()
        .collect();

    Ok(Dataset::from_records(matching, dataset.variant()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;
    use crate::data::model::SchemaVariant;

    fn sample() -> Dataset {
        Dataset::from_records(
            vec![
                record(18, Sex::Female, Smoker::No, Region::Northeast, 2_000.0),
                record(25, Sex::Male, Smoker::Yes, Region::Southwest, 32_000.0),
                record(40, Sex::Male, Smoker::No, Region::Southeast, 9_500.0),
                record(64, Sex::Female, Smoker::Yes, Region::Northwest, 28_000.0),
            ],
            SchemaVariant::Raw,
        )
    }

    #[test]
    fn identity_filter_returns_dataset_unchanged() {
        let ds = sample();
        let out = filter(&ds, &FilterCriteria::identity(&ds)).unwrap();
        assert_eq!(out.records(), ds.records());
    }

    #[test]
    fn age_range_is_inclusive() {
        // ages [18, 25, 40, 64]; [20, 50] keeps exactly 25 and 40
        let ds = sample();
        let criteria = FilterCriteria {
            age_range: (20, 50),
            ..FilterCriteria::identity(&ds)
        };
        let out = filter(&ds, &criteria).unwrap();
        let ages: Vec<u32> = out.records().iter().map(|r| r.age).collect();
        assert_eq!(ages, vec![25, 40]);
    }

    #[test]
    fn predicates_combine_conjunctively() {
        let ds = sample();
        let criteria = FilterCriteria {
            sex: SexFilter::Male,
            smoker: SmokerFilter::NonSmoker,
            ..FilterCriteria::identity(&ds)
        };
        let out = filter(&ds, &criteria).unwrap();
        assert_eq!(out.len(), 1);
        let r = &out.records()[0];
        assert_eq!(r.sex, Sex::Male);
        assert_eq!(r.smoker, Smoker::No);
    }

    #[test]
    fn empty_regions_means_no_restriction() {
        let ds = sample();
        let criteria = FilterCriteria::identity(&ds);
        assert!(criteria.regions.is_empty());
        assert_eq!(filter(&ds, &criteria).unwrap().len(), ds.len());
    }

    #[test]
    fn region_membership_matches_any_selected() {
        let ds = sample();
        let mut criteria = FilterCriteria::identity(&ds);
        criteria.regions.insert(Region::Northeast);
        criteria.regions.insert(Region::Northwest);
        let out = filter(&ds, &criteria).unwrap();
        let regions: Vec<Region> = out.records().iter().map(|r| r.region).collect();
        assert_eq!(regions, vec![Region::Northeast, Region::Northwest]);
    }

    #[test]
    fn zero_matches_yield_empty_dataset_not_error() {
        let ds = sample();
        let criteria = FilterCriteria {
            age_range: (90, 99),
            ..FilterCriteria::identity(&ds)
        };
        let out = filter(&ds, &criteria).unwrap();
        assert!(out.is_empty());
        assert_eq!(out.variant(), ds.variant());
    }

    #[test]
    fn inverted_range_is_rejected() {
        let ds = sample();
        let criteria = FilterCriteria {
            bmi_range: (30.0, 20.0),
            ..FilterCriteria::identity(&ds)
        };
        let err = filter(&ds, &criteria).unwrap_err();
        assert!(matches!(err, CriteriaError::InvalidRange { field: "bmi", .. }));
    }

    #[test]
    fn filtering_is_idempotent() {
        let ds = sample();
        let criteria = FilterCriteria {
            smoker: SmokerFilter::Smoker,
            ..FilterCriteria::identity(&ds)
        };
        let once = filter(&ds, &criteria).unwrap();
        let twice = filter(&once, &criteria).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn output_rows_are_a_subset_in_source_order() {
        let ds = sample();
        let criteria = FilterCriteria {
            sex: SexFilter::Female,
            ..FilterCriteria::identity(&ds)
        };
        let out = filter(&ds, &criteria).unwrap();
        let mut source = ds.records().iter();
        for row in out.records() {
            // every output row appears in the source, after the previous one
            assert!(source.any(|r| r == row));
        }
    }
}
