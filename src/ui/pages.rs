use eframe::egui::{RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::{Dataset, SchemaVariant};
use crate::data::stats::{
    self, histogram, CHILDREN_BINS, CONTINUOUS_BINS,
};
use crate::eval::{evaluate, EvalError};
use crate::state::{AppState, Page};
use crate::ui::plot;

/// Rows shown in the table previews.
const PREVIEW_ROWS: usize = 100;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Render the currently selected page into the central panel.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match state.page {
            Page::Home => home(ui),
            Page::Preprocessing => preprocessing(ui, state),
            Page::Eda => eda(ui, state),
            Page::Performance => performance(ui, state),
            Page::Explanation => explanation(ui, state),
        });
}

// ---------------------------------------------------------------------------
// Home
// ---------------------------------------------------------------------------

fn home(ui: &mut Ui) {
    ui.heading("Insurance cost explorer");
    ui.add_space(8.0);
    ui.label(
        "Explore a medical-insurance dataset, inspect the preprocessing \
         applied for model training, and evaluate a pre-trained classifier \
         on any demographic subset.",
    );
    ui.add_space(8.0);
    ui.label(
        "The dataset (derived from the Kaggle medical-cost data) holds one \
         row per insured subscriber: age, sex, body mass index, number of \
         children, smoker status, US census region, and the billed insurance \
         cost. The classification target is whether the cost exceeds $10,000.",
    );
    ui.add_space(8.0);
    ui.label(
        "Use the tabs above to navigate. The EDA and Performance pages react \
         to the filter panel on the left: every change recomputes the \
         selected subset immediately.",
    );
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

fn preprocessing(ui: &mut Ui, state: &AppState) {
    ui.heading("Data preprocessing");
    ui.add_space(8.0);

    let Some(raw) = &state.raw else {
        ui.label("No dataset loaded (File → Open data folder…).");
        return;
    };

    ui.label(format!("Original dataset ({} examples):", raw.len()));
    dataset_table(ui, "raw_preview", raw);
    ui.add_space(12.0);

    ui.label("Conducted preprocessing steps:");
    ui.label("  • Discretize the charges variable at the $10,000 threshold for binary classification");
    ui.label("  • One-hot encode the region variable");
    ui.label("  • Recode sex: 0 = female, 1 = male");
    ui.label("  • Recode smoker: 0 = no, 1 = yes");
    ui.add_space(12.0);

    if let Some(encoded) = &state.encoded {
        ui.label(format!(
            "Dataset used for training models ({} examples, {} features):",
            encoded.len(),
            encoded.feature_columns().len()
        ));
        dataset_table(ui, "encoded_preview", encoded);
    }
}

// ---------------------------------------------------------------------------
// EDA
// ---------------------------------------------------------------------------

fn eda(ui: &mut Ui, state: &AppState) {
    ui.heading("Explorative data analysis");
    ui.add_space(8.0);

    let Some(raw) = &state.raw else {
        ui.label("No dataset loaded (File → Open data folder…).");
        return;
    };

    ui.strong("Distribution of target variable");
    match &state.filtered_raw {
        Some(subset) if !subset.is_empty() => {
            ui.label(format!(
                "Target variable distribution based on {} selected examples:",
                subset.len()
            ));
            let charges: Vec<f64> =
                subset.records().iter().map(|r| r.charges_value).collect();
            plot::histogram_plot(
                ui,
                "charges_hist",
                "Insurance cost",
                &histogram(&charges, CONTINUOUS_BINS),
            );
        }
        _ => {
            ui.label("No examples match the current filters.");
        }
    }
    ui.add_space(12.0);

    ui.strong("Distribution of input variables");
    ui.add_space(4.0);
    ui.label("Continuous variables (full dataset):");

    let ages: Vec<f64> = raw.records().iter().map(|r| r.age as f64).collect();
    plot::histogram_plot(ui, "age_hist", "Age", &histogram(&ages, CONTINUOUS_BINS));

    let bmis: Vec<f64> = raw.records().iter().map(|r| r.bmi).collect();
    plot::histogram_plot(
        ui,
        "bmi_hist",
        "Body mass index",
        &histogram(&bmis, CONTINUOUS_BINS),
    );

    let children: Vec<f64> = raw.records().iter().map(|r| r.children as f64).collect();
    plot::histogram_plot(
        ui,
        "children_hist",
        "Number of children",
        &histogram(&children, CHILDREN_BINS),
    );

    ui.add_space(4.0);
    ui.label("Categorical variables (full dataset):");
    plot::frequency_plot(ui, "sex_freq", "Sex", &stats::sex_counts(raw));
    plot::frequency_plot(ui, "smoker_freq", "Smoker", &stats::smoker_counts(raw));
    plot::frequency_plot(ui, "region_freq", "Region", &stats::region_counts(raw));
}

// ---------------------------------------------------------------------------
// Performance
// ---------------------------------------------------------------------------

fn performance(ui: &mut Ui, state: &AppState) {
    ui.heading("Model evaluation");
    ui.add_space(8.0);

    let Some(model) = &state.model else {
        ui.label("No model loaded (File → Open data folder…).");
        return;
    };

    ui.strong("1. Model information");
    let p = model.params();
    ui.label("Task: predict whether a subscriber incurs insurance cost above $10,000");
    ui.label("Model: random forest");
    ui.label(format!("  • Number of trees: {}", p.n_trees));
    ui.label(format!("  • Minimum samples for split: {}", p.min_samples_split));
    ui.label(format!("  • Minimum samples per leaf: {}", p.min_samples_leaf));
    ui.label(format!("  • Maximum features per tree: {}", p.max_features));
    ui.label(format!(
        "  • Maximum depth: {}",
        p.max_depth.map_or("none".to_string(), |d| d.to_string())
    ));
    ui.add_space(12.0);

    ui.strong("2. Selected subset");
    let Some(subset) = &state.filtered_encoded else {
        ui.label("No preprocessed dataset loaded.");
        return;
    };
    ui.label(format!(
        "{} examples were found based on your selection.",
        subset.len()
    ));
    ui.add_space(12.0);

    ui.strong("3. Model performance on subset");
    match evaluate(subset, model) {
        Ok(result) => {
            ui.label(format!("Accuracy: {:.4}", result.accuracy));
            ui.label(format!("ROC AUC score: {:.4}", result.roc_auc));
            ui.label(format!(
                "({} of {} examples are high-cost)",
                result.n_positive, result.n_examples
            ));
            ui.add_space(4.0);
            ui.label("ROC curve for selected subset:");
            plot::roc_plot(ui, &result);
        }
        Err(e @ (EvalError::Empty | EvalError::SingleClass { .. })) => {
            ui.label(RichText::new(format!("Metrics not computable: {e}")).italics());
        }
        Err(e) => {
            log::error!("evaluation failed: {e}");
            ui.label(RichText::new(format!("Evaluation failed: {e}")).italics());
        }
    }
}

// ---------------------------------------------------------------------------
// Explanation
// ---------------------------------------------------------------------------

fn explanation(ui: &mut Ui, state: &AppState) {
    ui.heading("Model explanation");
    ui.add_space(8.0);

    let Some(model) = &state.model else {
        ui.label("No model loaded (File → Open data folder…).");
        return;
    };

    ui.label(
        "Feature importances measure how much each input contributed to the \
         forest's split decisions during training, normalized to sum to one. \
         They describe the model's behaviour over the whole training set, \
         not any individual prediction.",
    );
    ui.add_space(8.0);
    plot::importance_plot(ui, &model.feature_importance_map());
    ui.add_space(8.0);
    ui.label(
        "Smoker status typically dominates: smokers incur high costs almost \
         regardless of the remaining attributes, while age and BMI refine \
         the prediction for non-smokers.",
    );
}

// ---------------------------------------------------------------------------
// Table preview
// ---------------------------------------------------------------------------

/// Render the first rows of a dataset as a striped table, one column per
/// schema column. The encoded variant shows the binarized charges target,
/// matching the table the training pipeline consumed.
fn dataset_table(ui: &mut Ui, id_salt: &str, dataset: &Dataset) {
    let columns = dataset.columns();

    ui.push_id(id_salt, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .columns(Column::auto().resizable(true), columns.len())
            .header(20.0, |mut header| {
                for col in columns {
                    header.col(|ui| {
                        ui.strong(*col);
                    });
                }
            })
            .body(|mut body| {
                for record in dataset.records().iter().take(PREVIEW_ROWS) {
                    body.row(18.0, |mut row| {
                        for col in columns {
                            row.col(|ui| {
                                ui.label(cell_text(dataset.variant(), record, col));
                            });
                        }
                    });
                }
            });
    });

    if dataset.len() > PREVIEW_ROWS {
        ui.label(format!(
            "… {} further rows not shown",
            dataset.len() - PREVIEW_ROWS
        ));
    }
}

fn cell_text(
    variant: SchemaVariant,
    record: &crate::data::model::Record,
    column: &str,
) -> String {
    use crate::data::model::Region;

    match (variant, column) {
        (_, "age") => record.age.to_string(),
        (_, "bmi") => format!("{:.3}", record.bmi),
        (_, "children") => record.children.to_string(),
        (SchemaVariant::Raw, "sex") => record.sex.to_string(),
        (SchemaVariant::Raw, "smoker") => record.smoker.to_string(),
        (SchemaVariant::Raw, "region") => record.region.to_string(),
        (SchemaVariant::Raw, "charges") => format!("{:.2}", record.charges_value),
        (SchemaVariant::Encoded, "sex") => record.sex.code().to_string(),
        (SchemaVariant::Encoded, "smoker") => record.smoker.code().to_string(),
        (SchemaVariant::Encoded, "charges") => (record.charges_label as u8).to_string(),
        (SchemaVariant::Encoded, col) => Region::ALL
            .iter()
            .find(|r| r.column() == col)
            .map(|r| ((record.region == *r) as u8).to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}
