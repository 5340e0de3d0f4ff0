use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::classify::RandomForest;
use crate::data::filter::{filter, FilterCriteria};
use crate::data::loader;
use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// The dashboard's pages, in navigation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Home,
    Preprocessing,
    Eda,
    Performance,
    Explanation,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Home,
        Page::Preprocessing,
        Page::Eda,
        Page::Performance,
        Page::Explanation,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Preprocessing => "Preprocessing",
            Page::Eda => "EDA",
            Page::Performance => "Performance",
            Page::Explanation => "Explanation",
        }
    }

    /// Whether the filter side panel applies on this page.
    pub fn uses_filters(&self) -> bool {
        matches!(self, Page::Eda | Page::Performance)
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// Every widget change flows through here: criteria are rebuilt from the
/// panel, `refilter` recomputes the cached subsets, and the pages read the
/// results on the next frame. Loaded datasets are immutable; only the
/// filtered copies are replaced.
#[derive(Default)]
pub struct AppState {
    /// Folder holding `data/` and `models/` (default: working directory).
    pub root: PathBuf,

    /// Raw dataset (None until loaded).
    pub raw: Option<Arc<Dataset>>,
    /// Preprocessed dataset used for model input.
    pub encoded: Option<Arc<Dataset>>,
    /// Trained classifier artifact.
    pub model: Option<RandomForest>,

    /// Current filter selections; None until a dataset provides bounds.
    pub criteria: Option<FilterCriteria>,
    /// Filtered copies, recomputed on every criteria change.
    pub filtered_raw: Option<Dataset>,
    pub filtered_encoded: Option<Dataset>,

    pub page: Page,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn raw_path(&self) -> PathBuf {
        self.root.join("data").join("insurance.csv")
    }

    pub fn encoded_path(&self) -> PathBuf {
        self.root.join("data").join("insurance_preprocessed.csv")
    }

    pub fn model_path(&self) -> PathBuf {
        self.root.join("models").join("random_forest.json")
    }

    /// (Re)load both datasets and the model from `root`, resetting the
    /// criteria to the identity filter. Loaders are memoized, so calling
    /// this with unchanged files is cheap.
    pub fn load_all(&mut self, root: &Path) {
        self.root = root.to_path_buf();
        self.status_message = None;

        match loader::load_raw(&self.raw_path()) {
            Ok(ds) => self.raw = Some(ds),
            Err(e) => {
                log::error!("{e}");
                self.status_message = Some(e.to_string());
            }
        }
        match loader::load_preprocessed(&self.encoded_path()) {
            Ok(ds) => self.encoded = Some(ds),
            Err(e) => {
                log::error!("{e}");
                self.status_message = Some(e.to_string());
            }
        }
        match loader::load_model(&self.model_path()) {
            Ok(m) => {
                log::info!(
                    "loaded forest with {} trees over {:?}",
                    m.trees().len(),
                    m.feature_names()
                );
                self.model = Some(m);
            }
            Err(e) => {
                log::error!("{e}");
                self.status_message = Some(e.to_string());
            }
        }

        // Slider bounds come from the raw dataset; both files describe the
        // same subscribers, so the observed extremes agree.
        if let Some(ds) = self.raw.as_ref().or(self.encoded.as_ref()) {
            self.criteria = Some(FilterCriteria::identity(ds));
        }
        self.refilter();
    }

    /// Recompute the filtered copies after a criteria change.
    pub fn refilter(&mut self) {
        let Some(criteria) = &self.criteria else {
            return;
        };
        for (source, target) in [
            (&self.raw, &mut self.filtered_raw),
            (&self.encoded, &mut self.filtered_encoded),
        ] {
            if let Some(ds) = source {
                match filter(ds, criteria) {
                    Ok(subset) => *target = Some(subset),
                    Err(e) => {
                        // sliders keep bounds ordered, but surface it anyway
                        log::warn!("filter rejected criteria: {e}");
                        self.status_message = Some(e.to_string());
                        return;
                    }
                }
            }
        }
    }

    /// Reset the filter panel to the identity criteria.
    pub fn reset_criteria(&mut self) {
        if let Some(ds) = self.raw.as_ref().or(self.encoded.as_ref()) {
            self.criteria = Some(FilterCriteria::identity(ds));
            self.refilter();
        }
    }
}
