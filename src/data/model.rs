use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Categorical fields – fixed enumerations
// ---------------------------------------------------------------------------

/// Subscriber sex. Encoded form: 0 = female, 1 = male.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    pub const ALL: [Sex; 2] = [Sex::Female, Sex::Male];

    /// Parse the raw string form (`"female"` / `"male"`).
    pub fn from_label(s: &str) -> Option<Sex> {
        match s {
            "female" => Some(Sex::Female),
            "male" => Some(Sex::Male),
            _ => None,
        }
    }

    /// Parse the preprocessed 0/1 form.
    pub fn from_code(code: u8) -> Option<Sex> {
        match code {
            0 => Some(Sex::Female),
            1 => Some(Sex::Male),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Sex::Female => 0,
            Sex::Male => 1,
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Female => write!(f, "female"),
            Sex::Male => write!(f, "male"),
        }
    }
}

/// Smoker status. Encoded form: 0 = no, 1 = yes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Smoker {
    No,
    Yes,
}

impl Smoker {
    pub const ALL: [Smoker; 2] = [Smoker::No, Smoker::Yes];

    pub fn from_label(s: &str) -> Option<Smoker> {
        match s {
            "no" => Some(Smoker::No),
            "yes" => Some(Smoker::Yes),
            _ => None,
        }
    }

    pub fn from_code(code: u8) -> Option<Smoker> {
        match code {
            0 => Some(Smoker::No),
            1 => Some(Smoker::Yes),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Smoker::No => 0,
            Smoker::Yes => 1,
        }
    }
}

impl fmt::Display for Smoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Smoker::No => write!(f, "no"),
            Smoker::Yes => write!(f, "yes"),
        }
    }
}

/// US census region of the subscriber. One-hot encoded in the
/// preprocessed schema (`region_northeast` … `region_southwest`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    Northeast,
    Northwest,
    Southeast,
    Southwest,
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::Northeast,
        Region::Northwest,
        Region::Southeast,
        Region::Southwest,
    ];

    pub fn from_label(s: &str) -> Option<Region> {
        match s {
            "northeast" => Some(Region::Northeast),
            "northwest" => Some(Region::Northwest),
            "southeast" => Some(Region::Southeast),
            "southwest" => Some(Region::Southwest),
            _ => None,
        }
    }

    /// Name of the one-hot indicator column in the encoded schema.
    pub fn column(&self) -> &'static str {
        match self {
            Region::Northeast => "region_northeast",
            Region::Northwest => "region_northwest",
            Region::Southeast => "region_southeast",
            Region::Southwest => "region_southwest",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::Northeast => write!(f, "northeast"),
            Region::Northwest => write!(f, "northwest"),
            Region::Southeast => write!(f, "southeast"),
            Region::Southwest => write!(f, "southwest"),
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the dataset
// ---------------------------------------------------------------------------

/// Cost threshold above which a subscriber counts as "high cost" for the
/// binary classification target.
pub const CHARGES_THRESHOLD: f64 = 10_000.0;

/// One insured subscriber (one row of the source CSV).
///
/// The source data overloads the `charges` column: the raw file carries the
/// continuous cost, the preprocessed file binarizes it in place. Here the two
/// meanings get distinct fields: `charges_value` is always the continuous
/// cost, `charges_label` always the derived `> $10,000` target.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub age: u32,
    pub sex: Sex,
    pub bmi: f64,
    pub children: u32,
    pub smoker: Smoker,
    pub region: Region,
    pub charges_value: f64,
    pub charges_label: bool,
}

impl Record {
    /// Derive the binary target from a continuous cost.
    pub fn label_for(charges: f64) -> bool {
        charges > CHARGES_THRESHOLD
    }
}

// ---------------------------------------------------------------------------
// Schema variants
// ---------------------------------------------------------------------------

/// Which column layout the dataset was parsed from. Both variants carry the
/// same semantic fields; they differ in how categoricals are represented and
/// therefore in the natural column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaVariant {
    /// `age,sex,bmi,children,smoker,region,charges` with string categoricals.
    Raw,
    /// Numeric sex/smoker plus one-hot region columns, as used for training.
    Encoded,
}

/// Column order of the raw CSV.
pub const RAW_COLUMNS: [&str; 7] =
    ["age", "sex", "bmi", "children", "smoker", "region", "charges"];

/// Column order of the preprocessed CSV. This is also the training-time
/// feature order of the model artifact (minus the trailing target), so it
/// must never be reordered.
pub const ENCODED_COLUMNS: [&str; 10] = [
    "age",
    "bmi",
    "children",
    "sex",
    "smoker",
    "region_northeast",
    "region_northwest",
    "region_southeast",
    "region_southwest",
    "charges",
];

/// Columns excluded from the feature set: the continuous cost and the
/// derived binary target.
const TARGET_COLUMNS: [&str; 2] = ["charges", "charges_bin"];

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// Observed min/max per numeric field, computed once at load time. Drives
/// the range-slider limits in the filter panel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NumericBounds {
    pub age: (u32, u32),
    pub bmi: (f64, f64),
    pub children: (u32, u32),
}

/// Immutable ordered collection of [`Record`]s sharing one schema variant.
///
/// Datasets are never mutated after construction; filtering produces a new
/// `Dataset` containing clones of the matching rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
    variant: SchemaVariant,
    bounds: NumericBounds,
}

impl Dataset {
    /// Build a dataset from parsed rows, computing the numeric bounds.
    pub fn from_records(records: Vec<Record>, variant: SchemaVariant) -> Self {
        let bounds = Self::compute_bounds(&records);
        Dataset {
            records,
            variant,
            bounds,
        }
    }

    fn compute_bounds(records: &[Record]) -> NumericBounds {
        let mut it = records.iter();
        let Some(first) = it.next() else {
            return NumericBounds::default();
        };
        let mut b = NumericBounds {
            age: (first.age, first.age),
            bmi: (first.bmi, first.bmi),
            children: (first.children, first.children),
        };
        for r in it {
            b.age = (b.age.0.min(r.age), b.age.1.max(r.age));
            b.bmi = (b.bmi.0.min(r.bmi), b.bmi.1.max(r.bmi));
            b.children = (b.children.0.min(r.children), b.children.1.max(r.children));
        }
        b
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn variant(&self) -> SchemaVariant {
        self.variant
    }

    pub fn bounds(&self) -> NumericBounds {
        self.bounds
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Natural column order of this schema variant.
    pub fn columns(&self) -> &'static [&'static str] {
        match self.variant {
            SchemaVariant::Raw => &RAW_COLUMNS,
            SchemaVariant::Encoded => &ENCODED_COLUMNS,
        }
    }

    /// Columns usable as model features: everything except the continuous
    /// cost and the binary target, in natural column order.
    ///
    /// The order is load-bearing: the model artifact was trained on exactly
    /// this sequence, and tree splits address features by position.
    pub fn feature_columns(&self) -> Vec<&'static str> {
        self.columns()
            .iter()
            .copied()
            .filter(|c| !TARGET_COLUMNS.contains(c))
            .collect()
    }

    /// Numeric value of one feature column for one record.
    fn feature_value(record: &Record, column: &str) -> f64 {
        match column {
            "age" => record.age as f64,
            "bmi" => record.bmi,
            "children" => record.children as f64,
            "sex" => record.sex.code() as f64,
            "smoker" => record.smoker.code() as f64,
            "region_northeast" => (record.region == Region::Northeast) as u8 as f64,
            "region_northwest" => (record.region == Region::Northwest) as u8 as f64,
            "region_southeast" => (record.region == Region::Southeast) as u8 as f64,
            "region_southwest" => (record.region == Region::Southwest) as u8 as f64,
            // Raw variant only: the category index stands in for the label.
            "region" => Region::ALL.iter().position(|r| *r == record.region).unwrap_or(0) as f64,
            other => unreachable!("unknown feature column {other}"),
        }
    }

    /// Feature matrix in [`Dataset::feature_columns`] order, one row per
    /// record.
    pub fn feature_matrix(&self) -> Vec<Vec<f64>> {
        let columns = self.feature_columns();
        self.records
            .iter()
            .map(|r| columns.iter().map(|c| Self::feature_value(r, c)).collect())
            .collect()
    }

    /// Binary target vector (`charges_label` as 0/1).
    pub fn labels(&self) -> Vec<u8> {
        self.records.iter().map(|r| r.charges_label as u8).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(
        age: u32,
        sex: Sex,
        smoker: Smoker,
        region: Region,
        charges: f64,
    ) -> Record {
        Record {
            age,
            sex,
            bmi: 25.0,
            children: 0,
            smoker,
            region,
            charges_value: charges,
            charges_label: Record::label_for(charges),
        }
    }

    #[test]
    fn label_threshold_is_strict() {
        assert!(!Record::label_for(10_000.0));
        assert!(Record::label_for(10_000.01));
        assert!(!Record::label_for(500.0));
    }

    #[test]
    fn feature_columns_exclude_targets() {
        let ds = Dataset::from_records(
            vec![record(30, Sex::Male, Smoker::No, Region::Southwest, 4000.0)],
            SchemaVariant::Encoded,
        );
        let features = ds.feature_columns();
        assert!(!features.contains(&"charges"));
        assert!(!features.contains(&"charges_bin"));
        assert_eq!(features.len(), ENCODED_COLUMNS.len() - 1);
        assert_eq!(features[0], "age");
        assert_eq!(features.last(), Some(&"region_southwest"));
    }

    #[test]
    fn feature_matrix_encodes_categoricals() {
        let ds = Dataset::from_records(
            vec![record(42, Sex::Male, Smoker::Yes, Region::Southeast, 22_000.0)],
            SchemaVariant::Encoded,
        );
        let x = ds.feature_matrix();
        assert_eq!(x.len(), 1);
        // age, bmi, children, sex, smoker, ne, nw, se, sw
        assert_eq!(x[0], vec![42.0, 25.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0]);
        assert_eq!(ds.labels(), vec![1]);
    }

    #[test]
    fn bounds_track_observed_extremes() {
        let ds = Dataset::from_records(
            vec![
                record(18, Sex::Female, Smoker::No, Region::Northeast, 2000.0),
                record(64, Sex::Male, Smoker::Yes, Region::Southwest, 40_000.0),
            ],
            SchemaVariant::Raw,
        );
        assert_eq!(ds.bounds().age, (18, 64));
    }

    #[test]
    fn enum_codes_match_preprocessing_recode() {
        // 0 = female, 1 = male; 0 = no, 1 = yes
        assert_eq!(Sex::from_code(0), Some(Sex::Female));
        assert_eq!(Sex::from_code(1), Some(Sex::Male));
        assert_eq!(Smoker::from_code(0), Some(Smoker::No));
        assert_eq!(Smoker::from_code(1), Some(Smoker::Yes));
        assert_eq!(Sex::from_label("male"), Some(Sex::Male));
        assert_eq!(Smoker::from_label("yes"), Some(Smoker::Yes));
        assert_eq!(Region::from_label("spacewest"), None);
    }
}
