use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};
use rusty_estate::data::{Dataset, FilteredView};
use rusty_estate::state::AppState;

// ---------------------------------------------------------------------------
// Central panel – metrics, aggregate tables and the record table
// ---------------------------------------------------------------------------

pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    let (Some(dataset), Some(view)) = (&state.dataset, &state.view) else {
        ui.centered_and_justified(|ui: &mut Ui| match &state.status_message {
            Some(msg) => {
                ui.label(RichText::new(msg).color(Color32::RED).heading());
            }
            None => {
                ui.heading("Open a file to explore sales  (File → Open…)");
            }
        });
        return;
    };

    ui.heading("Filtered homes");
    metrics(ui, view);
    ui.separator();

    if view.is_empty() {
        ui.label(RichText::new("No homes match the selected filters.").color(Color32::YELLOW));
        return;
    }

    ScrollArea::vertical()
        .id_salt("aggregates")
        .max_height(ui.available_height() * 0.6)
        .show(ui, |ui: &mut Ui| {
            aggregates(ui, dataset, view);
        });

    ui.separator();
    ui.checkbox(&mut state.show_records, "Show matching records");
    if state.show_records {
        record_table(ui, dataset, view);
    }
}

fn metrics(ui: &mut Ui, view: &FilteredView) {
    let summary = view.summary;
    ui.columns(3, |cols| {
        metric(&mut cols[0], "Homes", thousands(summary.count as f64));
        metric(&mut cols[1], "Mean price", format!("${}", thousands(summary.mean_price)));
        metric(&mut cols[2], "Mean living area", format!("{} sqft", thousands(summary.mean_sqft_living)));
    });
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(label).weak());
        ui.label(RichText::new(value).size(24.0).strong());
    });
}

fn aggregates(ui: &mut Ui, dataset: &Dataset, view: &FilteredView) {
    egui::CollapsingHeader::new("Mean price by month")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new("by_month").striped(true).num_columns(3).show(ui, |ui: &mut Ui| {
                ui.strong("Month");
                ui.strong("Sales");
                ui.strong("Mean price");
                ui.end_row();
                for group in &view.monthly {
                    ui.label(group.key.to_string());
                    ui.label(group.count().to_string());
                    ui.label(format!("${}", thousands(group.mean_price)));
                    ui.end_row();
                }
            });
        });

    egui::CollapsingHeader::new("Mean price by bedrooms")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new("by_bedrooms").striped(true).num_columns(3).show(ui, |ui: &mut Ui| {
                ui.strong("Bedrooms");
                ui.strong("Sales");
                ui.strong("Mean price");
                ui.end_row();
                for group in &view.by_bedrooms {
                    ui.label(group.key.to_string());
                    ui.label(group.count().to_string());
                    ui.label(format!("${}", thousands(group.mean_price)));
                    ui.end_row();
                }
            });
        });

    egui::CollapsingHeader::new("Most and least expensive")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.columns(2, |cols| {
                ranking_list(&mut cols[0], "top_prices", "Most expensive", dataset, &view.ranking.highest);
                ranking_list(&mut cols[1], "bottom_prices", "Least expensive", dataset, &view.ranking.lowest);
            });
        });

    egui::CollapsingHeader::new("Price distribution")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new("histogram").striped(true).num_columns(2).show(ui, |ui: &mut Ui| {
                ui.strong("Price range");
                ui.strong("Homes");
                ui.end_row();
                for bin in view.histogram.iter().filter(|b| b.count > 0) {
                    ui.label(format!("${} – ${}", thousands(bin.lower), thousands(bin.upper)));
                    ui.label(bin.count.to_string());
                    ui.end_row();
                }
            });
        });

    egui::CollapsingHeader::new("Correlation")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            let fields = view.correlation.fields();
            egui::Grid::new("correlation")
                .striped(true)
                .num_columns(fields.len() + 1)
                .show(ui, |ui: &mut Ui| {
                    ui.label("");
                    for f in fields {
                        ui.strong(f.label());
                    }
                    ui.end_row();
                    for &a in fields {
                        ui.strong(a.label());
                        for &b in fields {
                            ui.label(view.correlation.cell(a, b).to_string());
                        }
                        ui.end_row();
                    }
                });
        });
}

fn ranking_list(ui: &mut Ui, id: &str, title: &str, dataset: &Dataset, indices: &[usize]) {
    ui.strong(title);
    egui::Grid::new(id).striped(true).num_columns(3).show(ui, |ui: &mut Ui| {
        for &i in indices {
            let rec = &dataset.records()[i];
            ui.label(format!("${}", thousands(rec.price)));
            ui.label(rec.city.as_str());
            ui.label(rec.date.to_string());
            ui.end_row();
        }
    });
}

const RECORD_HEADERS: [&str; 10] = [
    "date",
    "city",
    "price",
    "bedrooms",
    "bathrooms",
    "sqft_living",
    "sqft_lot",
    "floors",
    "condition",
    "yr_built",
];

fn record_table(ui: &mut Ui, dataset: &Dataset, view: &FilteredView) {
    ui.label(format!("Showing {} records", view.indices.len()));
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .columns(Column::auto().at_least(60.0), RECORD_HEADERS.len())
        .header(20.0, |mut header| {
            for title in RECORD_HEADERS {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, view.indices.len(), |mut row| {
                let rec = &dataset.records()[view.indices[row.index()]];
                let cells = [
                    rec.date.to_string(),
                    rec.city.clone(),
                    thousands(rec.price),
                    rec.bedrooms.to_string(),
                    rec.bathrooms.to_string(),
                    rec.sqft_living.to_string(),
                    rec.sqft_lot.to_string(),
                    rec.floors.to_string(),
                    rec.condition.to_string(),
                    rec.yr_built.to_string(),
                ];
                for text in cells {
                    row.col(|ui| {
                        ui.label(text);
                    });
                }
            });
        });
}

/// Round to a whole number and group digits: `1234567.8` → `1,234,568`.
fn thousands(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
