//! Step screens. Each one receives the controller explicitly from the app shell.

use std::path::PathBuf;

use chrono::Local;
use eframe::egui;
use shared::{
    domain::{
        human_readable_bytes, FieldId, Genre, SubmissionType, ACCEPTED_EXTENSIONS,
        SYNOPSIS_MAX_CHARS,
    },
    error::WorkflowError,
    protocol::{FieldUpdate, FileCandidate},
};
use submission_core::{files, validation::synopsis_len, WorkflowController};

use super::widgets::{self, field_error, field_label, hint, ACCENT, MUTED};

pub fn details_step(ui: &mut egui::Ui, controller: &mut WorkflowController) {
    let draft = controller.draft().clone();

    ui.columns(2, |columns| {
        field_label(&mut columns[0], "Story Title");
        text_input(
            &mut columns[0],
            controller,
            FieldId::Title,
            &draft.title,
            "Enter your story title",
            false,
            FieldUpdate::Title,
        );
        field_error(&mut columns[0], controller.visible_error(FieldId::Title).as_deref());

        field_label(&mut columns[1], "Author Name");
        text_input(
            &mut columns[1],
            controller,
            FieldId::Author,
            &draft.author,
            "Your pen name or real name",
            false,
            FieldUpdate::Author,
        );
        field_error(&mut columns[1], controller.visible_error(FieldId::Author).as_deref());
    });
    ui.add_space(10.0);

    field_label(ui, "Genre");
    let mut genre = draft.genre;
    egui::ComboBox::from_id_salt("genre")
        .selected_text(genre.map(Genre::label).unwrap_or("Select a genre"))
        .width(260.0)
        .show_ui(ui, |ui| {
            for option in Genre::ALL {
                ui.selectable_value(&mut genre, Some(option), option.label());
            }
        });
    if genre != draft.genre {
        apply(controller, FieldUpdate::Genre(genre));
    }
    field_error(ui, controller.visible_error(FieldId::Genre).as_deref());
    ui.add_space(10.0);

    field_label(ui, "Submission Type");
    let mut submission_type = draft.submission_type;
    ui.horizontal(|ui| {
        for option in [SubmissionType::Story, SubmissionType::Chapter] {
            ui.radio_value(&mut submission_type, Some(option), option.label());
        }
    });
    if submission_type != draft.submission_type {
        apply(controller, FieldUpdate::SubmissionType(submission_type));
    }
    field_error(
        ui,
        controller.visible_error(FieldId::SubmissionType).as_deref(),
    );
    ui.add_space(10.0);

    field_label(ui, "Synopsis");
    text_input(
        ui,
        controller,
        FieldId::Synopsis,
        &draft.synopsis,
        "Briefly describe your story (max 500 characters)",
        true,
        FieldUpdate::Synopsis,
    );
    let synopsis = &controller.draft().synopsis;
    let counter = format!("{} / {SYNOPSIS_MAX_CHARS} characters", synopsis_len(synopsis));
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(counter).small().color(MUTED));
        match controller.visible_error(FieldId::Synopsis) {
            Some(message) => field_error(ui, Some(message.as_str())),
            None => hint(ui, "Be concise but descriptive"),
        }
    });
}

/// Text edits are forwarded on change; losing focus marks the field touched.
fn text_input(
    ui: &mut egui::Ui,
    controller: &mut WorkflowController,
    field: FieldId,
    current: &str,
    hint_text: &str,
    multiline: bool,
    to_update: fn(String) -> FieldUpdate,
) {
    let mut value = current.to_string();
    let edit = if multiline {
        egui::TextEdit::multiline(&mut value).desired_rows(4)
    } else {
        egui::TextEdit::singleline(&mut value)
    };
    let response = ui.add(edit.hint_text(hint_text).desired_width(f32::INFINITY));

    if response.changed() {
        log_refusal(controller.update_field(to_update(value)));
    }
    if response.lost_focus() {
        log_refusal(controller.mark_touched(field));
    }
}

/// Choice widgets have no blur, so a change counts as an interaction.
fn apply(controller: &mut WorkflowController, update: FieldUpdate) {
    let field = update.field();
    log_refusal(controller.update_field(update));
    log_refusal(controller.mark_touched(field));
}

fn log_refusal(result: Result<(), WorkflowError>) {
    if let Err(err) = result {
        tracing::debug!("ignored form input: {err}");
    }
}

pub fn files_step(
    ui: &mut egui::Ui,
    controller: &mut WorkflowController,
    notice: &mut Option<String>,
) {
    hint(
        ui,
        &widgets::accepted_files_hint(controller.settings().attachment_limit()),
    );
    ui.add_space(8.0);

    let dragging = ui.ctx().input(|i| !i.raw.hovered_files.is_empty());
    let has_error = controller.visible_error(FieldId::Attachments).is_some();
    let stroke_color = if dragging {
        ACCENT
    } else if has_error {
        widgets::ERROR_RED
    } else {
        MUTED
    };

    egui::Frame::group(ui.style())
        .stroke(egui::Stroke::new(1.5, stroke_color))
        .inner_margin(egui::Margin::same(24))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new("⬆").size(28.0).color(stroke_color));
                ui.horizontal(|ui| {
                    ui.label("Drag and drop your files here, or");
                    if ui.link("browse").clicked() {
                        browse_for_files(controller, notice);
                    }
                });
                hint(ui, "You can upload multiple files");
            });
        });

    if let Some(message) = controller.visible_error(FieldId::Attachments) {
        ui.colored_label(widgets::ERROR_RED, format!("⚠ {message}"));
    }
    if let Some(message) = notice.as_deref() {
        ui.colored_label(widgets::WARNING_AMBER, message);
    }

    let attachments = controller.draft().attachments.clone();
    if attachments.is_empty() {
        return;
    }

    ui.add_space(12.0);
    ui.label(egui::RichText::new(format!("Files Ready for Upload ({})", attachments.len())).strong());
    let mut remove_index = None;
    for (index, attachment) in attachments.iter().enumerate() {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(attachment.media_kind().label()).color(ACCENT));
            ui.label(attachment.name());
            ui.label(
                egui::RichText::new(human_readable_bytes(attachment.size_bytes()))
                    .small()
                    .color(MUTED),
            );
            if ui.small_button("✕").on_hover_text("Remove file").clicked() {
                remove_index = Some(index);
            }
        });
    }
    if let Some(index) = remove_index {
        if let Err(err) = controller.remove_attachment(index) {
            tracing::debug!("ignored attachment removal: {err}");
        }
    }
}

fn browse_for_files(controller: &mut WorkflowController, notice: &mut Option<String>) {
    let Some(paths) = rfd::FileDialog::new()
        .add_filter("Manuscripts", &ACCEPTED_EXTENSIONS)
        .pick_files()
    else {
        return;
    };
    admit_paths(controller, paths, notice);
}

pub fn admit_paths(
    controller: &mut WorkflowController,
    paths: Vec<PathBuf>,
    notice: &mut Option<String>,
) {
    let mut candidates = Vec::with_capacity(paths.len());
    let mut problems = Vec::new();
    for path in paths {
        match files::candidate_from_path(&path) {
            Ok(candidate) => candidates.push(candidate),
            Err(err) => problems.push(format!("{err:#}")),
        }
    }
    admit_candidates(controller, candidates, problems, notice);
}

/// Admits a batch and replaces the transient notice with whatever went wrong.
pub fn admit_candidates(
    controller: &mut WorkflowController,
    candidates: Vec<FileCandidate>,
    mut problems: Vec<String>,
    notice: &mut Option<String>,
) {
    if candidates.is_empty() && problems.is_empty() {
        return;
    }
    match controller.admit_files(candidates) {
        Ok(report) => {
            if let Some(warning) = report.warning() {
                problems.insert(0, warning);
            }
        }
        Err(err) => problems.push(err.to_string()),
    }
    *notice = (!problems.is_empty()).then(|| problems.join("\n"));
}

pub fn review_step(ui: &mut egui::Ui, controller: &WorkflowController) {
    let draft = controller.draft();
    hint(ui, "Please review your story details below before submitting.");
    ui.add_space(8.0);

    egui::Grid::new("review_grid")
        .num_columns(2)
        .spacing([24.0, 8.0])
        .show(ui, |ui| {
            field_label(ui, "Story Title");
            ui.label(draft.title.as_str());
            ui.end_row();

            field_label(ui, "Author");
            ui.label(draft.author.as_str());
            ui.end_row();

            field_label(ui, "Genre");
            ui.label(draft.genre.map(Genre::label).unwrap_or("-"));
            ui.end_row();

            field_label(ui, "Submission Type");
            ui.label(
                draft
                    .submission_type
                    .map(SubmissionType::label)
                    .unwrap_or("-"),
            );
            ui.end_row();
        });

    ui.add_space(8.0);
    field_label(ui, "Synopsis");
    ui.label(draft.synopsis.as_str());

    ui.add_space(8.0);
    field_label(ui, &format!("Files ({})", draft.attachments.len()));
    for attachment in &draft.attachments {
        ui.horizontal(|ui| {
            ui.label(attachment.name());
            ui.label(
                egui::RichText::new(human_readable_bytes(attachment.size_bytes()))
                    .small()
                    .color(MUTED),
            );
        });
    }

    ui.add_space(12.0);
    hint(
        ui,
        "By submitting, you confirm that this is your original work and agree to our terms and conditions.",
    );
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessAction {
    Stay,
    SubmitAnother,
    Close,
}

pub fn success_screen(ui: &mut egui::Ui, controller: &WorkflowController) -> SuccessAction {
    let mut action = SuccessAction::Stay;
    let draft = controller.draft();

    ui.vertical_centered(|ui| {
        ui.add_space(24.0);
        ui.label(egui::RichText::new("✔").size(40.0).color(ACCENT));
        ui.heading("Submission Successful!");
        ui.add_space(8.0);
        ui.label(format!(
            "Thank you for submitting \"{}\"! Your story has been received and is now in our review queue. \
             Our editorial team will carefully review your submission and get back to you within 5-7 business days.",
            draft.title
        ));
        ui.add_space(12.0);

        egui::Grid::new("receipt_grid")
            .num_columns(2)
            .spacing([24.0, 6.0])
            .show(ui, |ui| {
                field_label(ui, "Title");
                ui.label(draft.title.as_str());
                ui.end_row();

                field_label(ui, "Author");
                ui.label(draft.author.as_str());
                ui.end_row();

                if let Some(receipt) = controller.receipt() {
                    field_label(ui, "Submitted");
                    ui.label(
                        receipt
                            .accepted_at
                            .with_timezone(&Local)
                            .format("%Y-%m-%d")
                            .to_string(),
                    );
                    ui.end_row();

                    field_label(ui, "Reference");
                    ui.label(receipt.reference.to_string());
                    ui.end_row();
                }
            });

        ui.add_space(16.0);
        ui.horizontal(|ui| {
            if ui.button("Submit Another Story ➡").clicked() {
                action = SuccessAction::SubmitAnother;
            }
            if ui.button("Close").clicked() {
                action = SuccessAction::Close;
            }
        });
    });

    action
}
