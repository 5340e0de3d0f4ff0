use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, Ui};

use crate::data::filter::{SexFilter, SmokerFilter};
use crate::data::model::Region;
use crate::state::{AppState, Page};

// ---------------------------------------------------------------------------
// Top bar – navigation and data folder
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open data folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                let root = state.root.clone();
                state.load_all(&root);
                ui.close_menu();
            }
        });

        ui.separator();

        for page in Page::ALL {
            if ui
                .selectable_label(state.page == page, page.title())
                .clicked()
            {
                state.page = page;
            }
        }

        ui.separator();

        if let Some(ds) = &state.raw {
            let visible = state
                .filtered_raw
                .as_ref()
                .map(|f| f.len())
                .unwrap_or(ds.len());
            ui.label(format!("{} examples loaded, {visible} selected", ds.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – filter criteria
// ---------------------------------------------------------------------------

/// Render the filter panel. Every widget edits `state.criteria` directly;
/// any change triggers a refilter, so the pages always see the subset
/// matching the current selections.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let bounds = match state.raw.as_ref().or(state.encoded.as_ref()) {
        Some(ds) => ds.bounds(),
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };
    let Some(criteria) = state.criteria.as_mut() else {
        ui.label("No dataset loaded.");
        return;
    };

    let mut changed = false;
    let mut reset = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Sex");
            for (value, label) in [
                (SexFilter::All, "All"),
                (SexFilter::Male, "Male"),
                (SexFilter::Female, "Female"),
            ] {
                changed |= ui
                    .radio_value(&mut criteria.sex, value, label)
                    .changed();
            }
            ui.separator();

            ui.strong("Smoker");
            for (value, label) in [
                (SmokerFilter::All, "All"),
                (SmokerFilter::Smoker, "Smoker"),
                (SmokerFilter::NonSmoker, "Non-smoker"),
            ] {
                changed |= ui
                    .radio_value(&mut criteria.smoker, value, label)
                    .changed();
            }
            ui.separator();

            // No region checked means "no restriction", matching the
            // original multiselect semantics.
            ui.strong("Region");
            for region in Region::ALL {
                let mut selected = criteria.regions.contains(&region);
                if ui.checkbox(&mut selected, region.to_string()).changed() {
                    if selected {
                        criteria.regions.insert(region);
                    } else {
                        criteria.regions.remove(&region);
                    }
                    changed = true;
                }
            }
            ui.separator();

            ui.strong("Age");
            changed |= range_sliders_u32(ui, &mut criteria.age_range, bounds.age);
            ui.separator();

            ui.strong("BMI");
            changed |= range_sliders_f64(ui, &mut criteria.bmi_range, bounds.bmi);
            ui.separator();

            ui.strong("Children");
            changed |= range_sliders_u32(ui, &mut criteria.children_range, bounds.children);
            ui.separator();

            reset = ui.button("Reset filters").clicked();
        });

    if reset {
        state.reset_criteria();
    } else if changed {
        state.refilter();
    }
}

/// Min/max slider pair clamped to the observed bounds. Pushing one handle
/// past the other drags the other along so the range stays ordered.
fn range_sliders_u32(ui: &mut Ui, range: &mut (u32, u32), bounds: (u32, u32)) -> bool {
    let mut changed = false;
    changed |= ui
        .add(Slider::new(&mut range.0, bounds.0..=bounds.1).text("min"))
        .changed();
    changed |= ui
        .add(Slider::new(&mut range.1, bounds.0..=bounds.1).text("max"))
        .changed();
    if range.0 > range.1 {
        range.1 = range.0;
    }
    changed
}

fn range_sliders_f64(ui: &mut Ui, range: &mut (f64, f64), bounds: (f64, f64)) -> bool {
    let mut changed = false;
    changed |= ui
        .add(Slider::new(&mut range.0, bounds.0..=bounds.1).text("min"))
        .changed();
    changed |= ui
        .add(Slider::new(&mut range.1, bounds.0..=bounds.1).text("max"))
        .changed();
    if range.0 > range.1 {
        range.1 = range.0;
    }
    changed
}

// ---------------------------------------------------------------------------
// Folder dialog
// ---------------------------------------------------------------------------

pub fn open_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Open folder containing data/ and models/")
        .pick_folder();

    if let Some(root) = folder {
        log::info!("loading data from {}", root.display());
        state.load_all(&root);
    }
}
