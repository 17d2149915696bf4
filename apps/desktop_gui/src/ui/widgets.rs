//! Small shared widgets for the wizard screens.

use eframe::egui;
use shared::domain::{human_readable_bytes, Step};

pub const ACCENT: egui::Color32 = egui::Color32::from_rgb(0x8E, 0x24, 0xAA);
pub const ERROR_RED: egui::Color32 = egui::Color32::from_rgb(0xDC, 0x26, 0x26);
pub const WARNING_AMBER: egui::Color32 = egui::Color32::from_rgb(0xD9, 0x77, 0x06);
pub const MUTED: egui::Color32 = egui::Color32::from_rgb(0x6B, 0x72, 0x80);

/// Upload help text. `None` means the size limit is switched off.
pub fn accepted_files_hint(limit_bytes: Option<u64>) -> String {
    let formats = "Accepted formats: PDF, DOC, DOCX, TXT, MD.";
    match limit_bytes {
        Some(limit) => format!(
            "{formats} Maximum file size: {} per file.",
            human_readable_bytes(limit)
        ),
        None => formats.to_string(),
    }
}

pub fn field_label(ui: &mut egui::Ui, label: &str) {
    ui.label(egui::RichText::new(label).strong());
}

pub fn field_error(ui: &mut egui::Ui, message: Option<&str>) {
    if let Some(message) = message {
        ui.colored_label(ERROR_RED, message);
    }
}

pub fn hint(ui: &mut egui::Ui, text: &str) {
    ui.label(egui::RichText::new(text).small().color(MUTED));
}

/// Step circles with the active step highlighted, plus the compact "Step N of 3" bar.
pub fn progress_header(ui: &mut egui::Ui, current: Step) {
    ui.horizontal(|ui| {
        for (index, step) in Step::ALL.into_iter().enumerate() {
            let (marker, color) = if step < current {
                ("✔", ACCENT)
            } else if step == current {
                ("●", ACCENT)
            } else {
                ("○", MUTED)
            };
            ui.colored_label(color, format!("{marker} {}", step.title()));
            if index + 1 < Step::ALL.len() {
                ui.colored_label(if step < current { ACCENT } else { MUTED }, "──");
            }
        }
    });

    let total = Step::ALL.len();
    let fraction = f32::from(current.number()) / total as f32;
    ui.add(
        egui::ProgressBar::new(fraction)
            .text(format!(
                "Step {} of {total}: {}",
                current.number(),
                current.title()
            ))
            .fill(ACCENT),
    );
}

#[cfg(test)]
mod tests {
    use super::accepted_files_hint;

    #[test]
    fn upload_hint_formats_configured_limit() {
        assert_eq!(
            accepted_files_hint(Some(10 * 1024 * 1024)),
            "Accepted formats: PDF, DOC, DOCX, TXT, MD. Maximum file size: 10 MB per file."
        );
        assert!(accepted_files_hint(Some(256 * 1024)).contains("256 KB per file"));
        assert!(!accepted_files_hint(None).contains("Maximum"));
    }
}
