use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, Ui};
use rusty_estate::data::Bounds;
use rusty_estate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };
    let Some((price_lo, price_hi)) = dataset.price_bounds() else {
        ui.label("The dataset has no records.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Cities ----
            let n_selected = state.criteria.cities.len();
            let n_total = dataset.cities().len();
            egui::CollapsingHeader::new(RichText::new(format!("City  ({n_selected}/{n_total})")).strong())
                .id_salt("cities")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            state.select_all_cities();
                        }
                        if ui.small_button("Clear").clicked() {
                            state.clear_cities();
                        }
                    });
                    if !state.criteria.city_filter_active() {
                        ui.label(RichText::new("No city ticked: showing every city.").italics());
                    }

                    for city in dataset.cities() {
                        let mut checked = state.criteria.cities.contains(city);
                        if ui.checkbox(&mut checked, city.as_str()).changed() {
                            state.toggle_city(city);
                        }
                    }
                });
            ui.separator();

            // ---- Price ----
            ui.strong("Price ($)");
            let mut lo = state.criteria.price.min;
            let mut hi = state.criteria.price.max;
            let lo_changed = ui
                .add(Slider::new(&mut lo, price_lo..=price_hi).text("min").integer())
                .changed();
            let hi_changed = ui
                .add(Slider::new(&mut hi, price_lo..=price_hi).text("max").integer())
                .changed();
            if lo_changed || hi_changed {
                state.set_price_range(lo, hi);
            }
            ui.separator();

            // ---- Bedrooms ----
            let beds = dataset.bedroom_counts();
            let (Some(&beds_lo), Some(&beds_hi)) = (beds.first(), beds.last()) else {
                return;
            };
            let mut limit = state.criteria.bedrooms.is_some();
            if ui.checkbox(&mut limit, RichText::new("Bedrooms").strong()).changed() {
                state.set_bedrooms(limit.then(|| Bounds::new(beds_lo, beds_hi)));
            }
            if let Some(current) = state.criteria.bedrooms {
                let mut b = current;
                let changed = ui.add(Slider::new(&mut b.min, beds_lo..=beds_hi).text("min")).changed()
                    | ui.add(Slider::new(&mut b.max, beds_lo..=beds_hi).text("max")).changed();
                if changed {
                    state.set_bedrooms(Some(b));
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(view)) = (&state.dataset, &state.view) {
            let report = ds.report();
            ui.label(format!(
                "{} records loaded, {} matching",
                ds.len(),
                view.summary.count
            ));
            if report.rows_skipped > 0 || report.rows_below_min_price > 0 {
                ui.label(
                    RichText::new(format!(
                        "({} unparseable, {} below minimum price dropped)",
                        report.rows_skipped, report.rows_below_min_price
                    ))
                    .weak(),
                );
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open housing data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        if state.open(&path) {
            log::info!("Opened {}", path.display());
        }
    }
}
