use chrono::Datelike;
use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::DatePickerButton;

use crate::state::{AppState, DataSource};

// ---------------------------------------------------------------------------
// Left side panel – data source and date selection
// ---------------------------------------------------------------------------

/// Render the left settings panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Settings");
    ui.separator();

    if ui.button("Upload weather data (CSV)…").clicked() {
        open_file_dialog(state);
    }
    if matches!(state.source, Some(DataSource::Uploaded(_)))
        && ui.button("Back to default dataset").clicked()
    {
        state.load_default();
    }
    ui.add_space(4.0);

    let Some(source) = &state.source else {
        ui.label("No dataset loaded.");
        return;
    };
    let (prefix, color) = match source {
        DataSource::Uploaded(_) => ("Using uploaded file", Color32::DARK_GREEN),
        DataSource::Bundled(_) => ("Using default dataset", Color32::GRAY),
    };
    ui.label(RichText::new(format!("{prefix} {}", file_name(source.path()))).color(color));

    let Some((first, last)) = state.date_range() else {
        return;
    };
    ui.label(format!("Data period: {first} ~ {last}"));
    if let Some(station) = state.series.as_ref().and_then(|s| s.station.as_deref()) {
        ui.label(format!("Station: {station}"));
    }
    ui.separator();

    // ---- Date to analyse ----
    ui.strong("Date to analyse");
    // The picker's year list is fixed relative to today, so the year is
    // chosen with a DragValue bounded by the data instead.
    if let Some(years) = state.year_range() {
        let mut year = state.selected_date.year();
        ui.horizontal(|ui: &mut Ui| {
            ui.label("Year");
            if ui
                .add(egui::DragValue::new(&mut year).range(years))
                .changed()
            {
                state.set_year(year);
            }
        });
    }
    let mut date = state.selected_date;
    ui.add(
        DatePickerButton::new(&mut date)
            .id_salt("target_date")
            .combo_boxes(false),
    );
    if date != state.selected_date {
        state.set_date(date);
    }
    ui.separator();

    // ---- Target temperature ----
    let mut use_hypothetical = state.use_hypothetical;
    if ui
        .checkbox(&mut use_hypothetical, "Use a hypothetical temperature")
        .changed()
    {
        state.set_use_hypothetical(use_hypothetical);
    }
    ui.add_enabled_ui(state.use_hypothetical, |ui: &mut Ui| {
        let mut temperature = state.hypothetical_temperature;
        let response = ui.add(
            egui::DragValue::new(&mut temperature)
                .speed(0.1)
                .fixed_decimals(1)
                .range(-60.0..=60.0)
                .suffix(" °C"),
        );
        if response.changed() {
            state.set_hypothetical_temperature(temperature);
        }
    });
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
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
            if ui.button("Default dataset").clicked() {
                state.load_default();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(series) = &state.series {
            ui.label(format!("{} daily observations loaded", series.len()));
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
        .set_title("Open weather station data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_upload(&path);
    }
}
