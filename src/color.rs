use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Fixed chart colours
// ---------------------------------------------------------------------------

/// Selected date: histogram marker and highlighted scatter point.
pub const SELECTED: Color32 = Color32::RED;
/// Every other year in the scatter.
pub const HISTORY: Color32 = Color32::from_rgb(135, 206, 235);
/// Histogram bars (#bdc3c7 at 70 % opacity).
pub const HISTOGRAM_BAR: Color32 = Color32::from_rgba_premultiplied(132, 137, 139, 179);
/// Same-day mean marker.
pub const MEAN_LINE: Color32 = Color32::BLUE;
pub const TREND: Color32 = Color32::GRAY;

/// Departure at which [`anomaly_color`] reaches full saturation, in °C.
const ANOMALY_SATURATION_AT: f64 = 5.0;

// ---------------------------------------------------------------------------
// Anomaly colouring
// ---------------------------------------------------------------------------

/// Colour for a departure from the same-day mean.
///
/// Warmer than normal is red, colder is blue, and the saturation grows with
/// the size of the departure.
pub fn anomaly_color(difference: f64) -> Color32 {
    let hue: f32 = if difference >= 0.0 { 0.0 } else { 220.0 };
    let strength = (difference.abs() / ANOMALY_SATURATION_AT).min(1.0) as f32;
    hsl_to_color32(Hsl::new(hue, 0.25 + 0.6 * strength, 0.45))
}

fn hsl_to_color32(hsl: Hsl) -> Color32 {
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}
