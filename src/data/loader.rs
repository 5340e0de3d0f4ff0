use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::SystemTime;

use anyhow::{bail, Context, Result};
use thiserror::Error;

use super::model::{
    Dataset, Record, Region, SchemaVariant, Sex, Smoker, ENCODED_COLUMNS, RAW_COLUMNS,
};
use crate::classify::RandomForest;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Load failure surfaced to the user. Source files are static build
/// artifacts, so there is no retry path.
#[derive(Debug, Error)]
#[error("data unavailable ({}): {reason}", .path.display())]
pub struct DataError {
    pub path: PathBuf,
    pub reason: String,
}

impl DataError {
    fn new(path: &Path, err: anyhow::Error) -> Self {
        DataError {
            path: path.to_path_buf(),
            reason: format!("{err:#}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Memoized entry points
// ---------------------------------------------------------------------------

/// Load the raw dataset (`insurance.csv`): string categoricals, continuous
/// charges, binary label derived at the $10,000 threshold.
pub fn load_raw(path: &Path) -> Result<Arc<Dataset>, DataError> {
    load_cached(path, SchemaVariant::Raw, parse_raw)
}

/// Load the preprocessed dataset (`insurance_preprocessed.csv`): 0/1
/// sex/smoker, one-hot regions. The binary label is recomputed from the
/// continuous charges by the same threshold as the raw loader.
pub fn load_preprocessed(path: &Path) -> Result<Arc<Dataset>, DataError> {
    load_cached(path, SchemaVariant::Encoded, parse_encoded)
}

/// Deserialize the trained classifier artifact. Loaded once per session and
/// treated as read-only; no cache entry is kept for it here.
pub fn load_model(path: &Path) -> Result<RandomForest, DataError> {
    let read = || -> Result<RandomForest> {
        let text = std::fs::read_to_string(path).context("reading model file")?;
        let model: RandomForest =
            serde_json::from_str(&text).context("parsing model JSON")?;
        if model.trees().is_empty() {
            bail!("model has no trees");
        }
        Ok(model)
    };
    read().map_err(|e| {
        log::error!("failed to load model from {}: {e:#}", path.display());
        DataError::new(path, e)
    })
}

// ---------------------------------------------------------------------------
// Cache – replaces the original app's per-function memo decorator
// ---------------------------------------------------------------------------

struct CacheEntry {
    mtime: SystemTime,
    dataset: Arc<Dataset>,
}

type Cache = Mutex<HashMap<(PathBuf, SchemaVariant), CacheEntry>>;

fn cache() -> &'static Cache {
    static CACHE: OnceLock<Cache> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Memoize on (canonical path, schema variant), invalidated when the file's
/// mtime changes. Files are static artifacts, so no TTL is needed; an
/// unchanged file is never re-read.
fn load_cached(
    path: &Path,
    variant: SchemaVariant,
    parse: fn(&Path) -> Result<Dataset>,
) -> Result<Arc<Dataset>, DataError> {
    let run = || -> Result<Arc<Dataset>> {
        let canonical = path.canonicalize().context("resolving path")?;
        let mtime = std::fs::metadata(&canonical)
            .and_then(|m| m.modified())
            .context("reading file mtime")?;

        let key = (canonical.clone(), variant);
        let mut map = cache().lock().expect("loader cache poisoned");

        if let Some(entry) = map.get(&key) {
            if entry.mtime == mtime {
                log::debug!("cache hit for {}", canonical.display());
                return Ok(Arc::clone(&entry.dataset));
            }
            log::debug!("cache stale for {}, reloading", canonical.display());
        }

        let dataset = Arc::new(parse(&canonical)?);
        log::info!(
            "loaded {} rows ({:?} schema) from {}",
            dataset.len(),
            variant,
            canonical.display()
        );
        map.insert(key, CacheEntry {
            mtime,
            dataset: Arc::clone(&dataset),
        });
        Ok(dataset)
    };
    run().map_err(|e| {
        log::error!("failed to load {}: {e:#}", path.display());
        DataError::new(path, e)
    })
}

// ---------------------------------------------------------------------------
// CSV parsers
// ---------------------------------------------------------------------------

fn read_headers(reader: &mut csv::Reader<std::fs::File>) -> Result<Vec<String>> {
    Ok(reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect())
}

fn column_index(headers: &[String], name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .with_context(|| format!("CSV missing '{name}' column"))
}

fn parse_f64(record: &csv::StringRecord, idx: usize, row: usize, col: &str) -> Result<f64> {
    let raw = record.get(idx).unwrap_or("").trim();
    raw.parse::<f64>()
        .with_context(|| format!("row {row}, {col}: '{raw}' is not a number"))
}

fn parse_count(record: &csv::StringRecord, idx: usize, row: usize, col: &str) -> Result<u32> {
    let v = parse_f64(record, idx, row, col)?;
    if !v.is_finite() || v < 0.0 || v.fract() != 0.0 {
        bail!("row {row}, {col}: {v} is not a non-negative integer");
    }
    Ok(v as u32)
}

fn parse_code(record: &csv::StringRecord, idx: usize, row: usize, col: &str) -> Result<u8> {
    let v = parse_count(record, idx, row, col)?;
    u8::try_from(v).with_context(|| format!("row {row}, {col}: {v} out of range"))
}

fn parse_raw(path: &Path) -> Result<Dataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers = read_headers(&mut reader)?;
    if headers != RAW_COLUMNS {
        bail!("unexpected raw schema {headers:?}, expected {RAW_COLUMNS:?}");
    }

    // headers match RAW_COLUMNS exactly, so positions are fixed
    let idx: HashMap<&str, usize> = RAW_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, c)| (*c, i))
        .collect();

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let rec = result.with_context(|| format!("CSV row {row}"))?;
        let field = |col: &str| rec.get(idx[col]).unwrap_or("").trim().to_ascii_lowercase();

        let sex = Sex::from_label(&field("sex"))
            .with_context(|| format!("row {row}: unknown sex '{}'", field("sex")))?;
        let smoker = Smoker::from_label(&field("smoker"))
            .with_context(|| format!("row {row}: unknown smoker '{}'", field("smoker")))?;
        let region = Region::from_label(&field("region"))
            .with_context(|| format!("row {row}: unknown region '{}'", field("region")))?;
        let charges = parse_f64(&rec, idx["charges"], row, "charges")?;

        records.push(Record {
            age: parse_count(&rec, idx["age"], row, "age")?,
            sex,
            bmi: parse_f64(&rec, idx["bmi"], row, "bmi")?,
            children: parse_count(&rec, idx["children"], row, "children")?,
            smoker,
            region,
            charges_value: charges,
            charges_label: Record::label_for(charges),
        });
    }

    Ok(Dataset::from_records(records, SchemaVariant::Raw))
}

fn parse_encoded(path: &Path) -> Result<Dataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers = read_headers(&mut reader)?;

    // Columns are looked up by name; extra columns in the file are ignored,
    // missing ones are a schema mismatch.
    let idx: HashMap<&str, usize> = ENCODED_COLUMNS
        .iter()
        .map(|c| column_index(&headers, c).map(|i| (*c, i)))
        .collect::<Result<_>>()?;

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let rec = result.with_context(|| format!("CSV row {row}"))?;

        let sex = Sex::from_code(parse_code(&rec, idx["sex"], row, "sex")?)
            .with_context(|| format!("row {row}: sex code is not 0/1"))?;
        let smoker = Smoker::from_code(parse_code(&rec, idx["smoker"], row, "smoker")?)
            .with_context(|| format!("row {row}: smoker code is not 0/1"))?;

        let mut region = None;
        for r in Region::ALL {
            if parse_code(&rec, idx[r.column()], row, r.column())? == 1 {
                if region.replace(r).is_some() {
                    bail!("row {row}: more than one region indicator set");
                }
            }
        }
        let region =
            region.with_context(|| format!("row {row}: no region indicator set"))?;

        let charges = parse_f64(&rec, idx["charges"], row, "charges")?;

        records.push(Record {
            age: parse_count(&rec, idx["age"], row, "age")?,
            sex,
            bmi: parse_f64(&rec, idx["bmi"], row, "bmi")?,
            children: parse_count(&rec, idx["children"], row, "children")?,
            smoker,
            region,
            charges_value: charges,
            charges_label: Record::label_for(charges),
        });
    }

    Ok(Dataset::from_records(records, SchemaVariant::Encoded))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fixture(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "insurascope-{}-{name}",
            std::process::id()
        ));
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    const RAW_CSV: &str = "\
age,sex,bmi,children,smoker,region,charges
19,female,27.9,0,yes,southwest,16884.924
33,male,22.705,0,no,northwest,21984.47061
18,male,33.77,1,no,southeast,1725.5523
";

    const ENCODED_CSV: &str = "\
age,bmi,children,sex,smoker,region_northeast,region_northwest,region_southeast,region_southwest,charges
19,27.9,0,0,1,0,0,0,1,16884.924
18,33.77,1,1,0,0,0,1,0,1725.5523
";

    #[test]
    fn raw_loader_parses_and_derives_label() {
        let path = fixture("raw.csv", RAW_CSV);
        let ds = load_raw(&path).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.variant(), SchemaVariant::Raw);

        let first = &ds.records()[0];
        assert_eq!(first.age, 19);
        assert_eq!(first.sex, Sex::Female);
        assert_eq!(first.region, Region::Southwest);
        assert!(first.charges_label);
        assert!(!ds.records()[2].charges_label);
    }

    #[test]
    fn encoded_loader_decodes_one_hot_region() {
        let path = fixture("encoded.csv", ENCODED_CSV);
        let ds = load_preprocessed(&path).unwrap();
        assert_eq!(ds.variant(), SchemaVariant::Encoded);
        assert_eq!(ds.records()[0].region, Region::Southwest);
        assert_eq!(ds.records()[1].region, Region::Southeast);
        // continuous value survives alongside the recomputed label
        assert!((ds.records()[0].charges_value - 16884.924).abs() < 1e-9);
        assert_eq!(ds.labels(), vec![1, 0]);
    }

    #[test]
    fn missing_file_is_unavailable() {
        let err = load_raw(Path::new("/nonexistent/insurance.csv")).unwrap_err();
        assert!(err.reason.contains("resolving path"));
    }

    #[test]
    fn schema_mismatch_is_unavailable() {
        let path = fixture("wrong-schema.csv", "a,b,c\n1,2,3\n");
        assert!(load_raw(&path).is_err());
        assert!(load_preprocessed(&path).is_err());
    }

    #[test]
    fn unknown_category_is_unavailable() {
        let path = fixture(
            "bad-region.csv",
            "age,sex,bmi,children,smoker,region,charges\n19,female,27.9,0,yes,midwest,100.0\n",
        );
        let err = load_raw(&path).unwrap_err();
        assert!(err.reason.contains("midwest"));
    }

    #[test]
    fn repeated_loads_share_the_cached_dataset() {
        let path = fixture("cached.csv", RAW_CSV);
        let a = load_raw(&path).unwrap();
        let b = load_raw(&path).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
