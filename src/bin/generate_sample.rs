//! Generate synthetic demo inputs: `data/insurance.csv`,
//! `data/insurance_preprocessed.csv`, and a small demo forest at
//! `models/random_forest.json`, so the dashboard runs without the
//! original Kaggle download.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;

const N_ROWS: usize = 400;

const SEXES: [&str; 2] = ["female", "male"];
const SMOKERS: [&str; 2] = ["no", "yes"];
const REGIONS: [&str; 4] = ["northeast", "northwest", "southeast", "southwest"];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    /// Uniform float in [0, 1).
    fn uniform(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform integer in [0, n).
    fn below(&mut self, n: usize) -> usize {
        (self.uniform() * n as f64) as usize
    }

    /// Box-Muller gaussian.
    fn gauss(&mut self, mu: f64, sigma: f64) -> f64 {
        let u1 = self.uniform().max(f64::MIN_POSITIVE);
        let u2 = self.uniform();
        let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
        mu + sigma * z
    }
}

struct Subscriber {
    age: u32,
    sex: usize,
    bmi: f64,
    children: u32,
    smoker: usize,
    region: usize,
    charges: f64,
}

fn sample_subscriber(rng: &mut SimpleRng) -> Subscriber {
    let age = 18 + rng.below(47) as u32;
    let sex = rng.below(2);
    let bmi = rng.gauss(30.5, 6.0).clamp(16.0, 52.0);
    let children = rng.below(6) as u32;
    let smoker = (rng.uniform() < 0.2) as usize;
    let region = rng.below(4);

    // Rough shape of the real data: smoking dominates, age and excess BMI
    // push the cost up, plus multiplicative noise.
    let base = 2200.0
        + 255.0 * age as f64
        + 330.0 * (bmi - 25.0).max(0.0)
        + 470.0 * children as f64
        + 23_500.0 * smoker as f64;
    let charges = (base * (1.0 + rng.gauss(0.0, 0.12))).max(1_100.0);

    Subscriber {
        age,
        sex,
        bmi,
        children,
        smoker,
        region,
        charges,
    }
}

fn write_raw(path: &Path, rows: &[Subscriber]) -> Result<()> {
    let mut w = csv::Writer::from_path(path).context("creating raw CSV")?;
    w.write_record(["age", "sex", "bmi", "children", "smoker", "region", "charges"])?;
    for s in rows {
        w.write_record([
            s.age.to_string(),
            SEXES[s.sex].to_string(),
            format!("{:.3}", s.bmi),
            s.children.to_string(),
            SMOKERS[s.smoker].to_string(),
            REGIONS[s.region].to_string(),
            format!("{:.4}", s.charges),
        ])?;
    }
    w.flush()?;
    Ok(())
}

fn write_preprocessed(path: &Path, rows: &[Subscriber]) -> Result<()> {
    let mut w = csv::Writer::from_path(path).context("creating preprocessed CSV")?;
    w.write_record([
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
    ])?;
    for s in rows {
        let one_hot: Vec<String> = (0..4).map(|i| ((s.region == i) as u8).to_string()).collect();
        w.write_record([
            s.age.to_string(),
            format!("{:.3}", s.bmi),
            s.children.to_string(),
            s.sex.to_string(),
            s.smoker.to_string(),
            one_hot[0].clone(),
            one_hot[1].clone(),
            one_hot[2].clone(),
            one_hot[3].clone(),
            format!("{:.4}", s.charges),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// A hand-specified demo forest over the encoded feature order
/// (age, bmi, children, sex, smoker, region_*). Smoker splits dominate,
/// age and BMI refine the non-smoker branch, mirroring the real model's
/// behaviour closely enough for demonstration.
fn write_model(path: &Path) -> Result<()> {
    let leaf = |proba: f64| json!({ "Leaf": { "proba": proba } });
    let split = |feature: usize, threshold: f64, left: serde_json::Value, right: serde_json::Value| {
        json!({ "Split": {
            "feature": feature,
            "threshold": threshold,
            "left": left,
            "right": right,
        }})
    };

    let trees = vec![
        // smoker, then age
        split(
            4,
            0.5,
            split(0, 47.0, leaf(0.06), leaf(0.72)),
            leaf(0.97),
        ),
        // smoker, then bmi
        split(
            4,
            0.5,
            split(1, 34.0, leaf(0.10), leaf(0.38)),
            leaf(0.93),
        ),
        // age, then smoker on the young branch
        split(
            0,
            51.0,
            split(4, 0.5, leaf(0.08), leaf(0.95)),
            split(2, 2.5, leaf(0.64), leaf(0.81)),
        ),
    ];

    let n_trees = trees.len();
    let model = json!({
        "feature_names": [
            "age", "bmi", "children", "sex", "smoker",
            "region_northeast", "region_northwest",
            "region_southeast", "region_southwest"
        ],
        "trees": trees,
        "feature_importances": [
            0.22, 0.09, 0.04, 0.01, 0.58, 0.015, 0.015, 0.015, 0.015
        ],
        "params": {
            "n_trees": n_trees,
            "min_samples_split": 2,
            "min_samples_leaf": 1,
            "max_features": 3,
            "max_depth": null,
        },
    });

    std::fs::write(path, serde_json::to_string_pretty(&model)?)
        .context("writing model JSON")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    std::fs::create_dir_all("data").context("creating data/")?;
    std::fs::create_dir_all("models").context("creating models/")?;

    let mut rng = SimpleRng::new(20_240_817);
    let rows: Vec<Subscriber> = (0..N_ROWS).map(|_| sample_subscriber(&mut rng)).collect();

    write_raw(Path::new("data/insurance.csv"), &rows)?;
    write_preprocessed(Path::new("data/insurance_preprocessed.csv"), &rows)?;
    write_model(Path::new("models/random_forest.json"))?;

    let high = rows.iter().filter(|s| s.charges > 10_000.0).count();
    log::info!("wrote {} rows ({high} high-cost) and the demo model", rows.len());
    println!("Generated data/insurance.csv, data/insurance_preprocessed.csv, models/random_forest.json");
    Ok(())
}
