use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::{
    domain::{Step, SubmissionPhase},
    error::WorkflowError,
};
use submission_core::{files, WorkflowController};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{err_label, UiError, UiErrorContext, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;

use super::steps::{self, SuccessAction};
use super::widgets::{self, progress_header, ACCENT};

const CONTENT_MAX_WIDTH: f32 = 760.0;

/// App shell. Holds the only controller of the session and hands it to each screen.
pub struct DesktopWizardApp {
    controller: WorkflowController,
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    status: String,
    show_error_summary: bool,
    file_notice: Option<String>,
    last_error: Option<UiError>,
}

impl DesktopWizardApp {
    pub fn new(
        controller: WorkflowController,
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
    ) -> Self {
        Self {
            controller,
            cmd_tx,
            ui_rx,
            status: "Starting submission worker...".to_string(),
            show_error_summary: false,
            file_notice: None,
            last_error: None,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::SubmissionFinished { ticket, outcome } => {
                    let outcome = outcome.map_err(anyhow::Error::msg);
                    match self.controller.complete_submission(ticket, outcome) {
                        Ok(receipt) => {
                            self.status = format!("Submission {} accepted", receipt.reference);
                            self.last_error = None;
                        }
                        Err(WorkflowError::StaleSubmission { .. }) => {}
                        Err(err) => {
                            self.report(UiErrorContext::Submission, err.to_string());
                        }
                    }
                }
                UiEvent::Error(err) => {
                    self.status = format!("{} error: {}", err_label(err.category()), err.message());
                    self.last_error = Some(err);
                }
            }
        }
    }

    fn report(&mut self, context: UiErrorContext, message: String) {
        let err = UiError::from_message(context, message);
        tracing::warn!(context = ?err.context(), category = ?err.category(), "{}", err.message());
        self.status = format!("{} error: {}", err_label(err.category()), err.message());
        self.last_error = Some(err);
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if dropped.is_empty() {
            return;
        }
        if self.controller.phase() != SubmissionPhase::Editing
            || self.controller.step() != Step::Files
        {
            self.status = "Files can only be added on the Upload Files step".to_string();
            return;
        }

        let mut candidates = Vec::with_capacity(dropped.len());
        let mut problems = Vec::new();
        for file in dropped {
            match &file.path {
                Some(path) => match files::candidate_from_path(path) {
                    Ok(candidate) => candidates.push(candidate),
                    Err(err) => problems.push(format!("{err:#}")),
                },
                None => {
                    let size = file.bytes.as_ref().map(|bytes| bytes.len() as u64);
                    match files::candidate_from_declared(&file.name, &file.mime, size) {
                        Ok(candidate) => candidates.push(candidate),
                        Err(err) => problems.push(format!("{err:#}")),
                    }
                }
            }
        }
        if let Some(problem) = problems.first().cloned() {
            self.report(UiErrorContext::FilePicking, problem);
        }
        steps::admit_candidates(&mut self.controller, candidates, problems, &mut self.file_notice);
    }

    fn on_continue(&mut self) {
        match self.controller.advance_step() {
            Ok(_) => {
                self.show_error_summary = false;
                self.file_notice = None;
            }
            Err(WorkflowError::Validation(_)) => self.show_error_summary = true,
            Err(err) => self.report(UiErrorContext::General, err.to_string()),
        }
    }

    fn on_back(&mut self) {
        if let Err(err) = self.controller.retreat_step() {
            self.status = err.to_string();
        }
    }

    fn on_submit(&mut self) {
        match self.controller.begin_submission() {
            Ok(pending) => {
                self.show_error_summary = false;
                self.last_error = None;
                let dispatched = dispatch_backend_command(
                    &self.cmd_tx,
                    BackendCommand::Submit {
                        ticket: pending.ticket,
                        draft: pending.draft,
                    },
                    &mut self.status,
                );
                if dispatched {
                    self.status = "Submitting...".to_string();
                } else {
                    if let Err(err) = self.controller.cancel_submission() {
                        tracing::warn!("failed to roll back undispatched submission: {err}");
                    }
                    let message = self.status.clone();
                    self.report(UiErrorContext::Submission, message);
                }
            }
            Err(WorkflowError::Validation(_)) => self.show_error_summary = true,
            Err(err) => self.report(UiErrorContext::General, err.to_string()),
        }
    }

    fn on_cancel(&mut self) {
        match self.controller.cancel_submission() {
            Ok(()) => self.status = "Submission cancelled".to_string(),
            Err(err) => self.status = err.to_string(),
        }
    }

    fn error_summary(&self, ui: &mut egui::Ui) {
        if !self.show_error_summary {
            return;
        }
        let step = self.controller.step();
        let errors = match step {
            Step::Review => self.controller.validate_all(),
            step => self.controller.validate_step(step),
        };
        if errors.is_empty() {
            return;
        }

        egui::Frame::group(ui.style())
            .stroke(egui::Stroke::new(1.0, widgets::ERROR_RED))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.colored_label(widgets::ERROR_RED, "Please correct the following:");
                for (_, message) in errors.iter() {
                    ui.colored_label(widgets::ERROR_RED, format!("• {message}"));
                }
            });
    }

    fn show_wizard(&mut self, ui: &mut egui::Ui) {
        let step = self.controller.step();
        let editing = self.controller.phase() == SubmissionPhase::Editing;

        ui.heading("Submit Your Story");
        widgets::hint(
            ui,
            "Share your creative stories and book chapters with our community of passionate writers and readers.",
        );
        ui.add_space(12.0);
        progress_header(ui, step);
        ui.add_space(12.0);

        ui.label(egui::RichText::new(step.title()).size(20.0).strong());
        widgets::hint(
            ui,
            match step {
                Step::Details => "Tell us about your story",
                Step::Files => "Upload your story files",
                Step::Review => "Review your submission before submitting",
            },
        );
        ui.separator();

        ui.add_enabled_ui(editing, |ui| match step {
            Step::Details => steps::details_step(ui, &mut self.controller),
            Step::Files => steps::files_step(ui, &mut self.controller, &mut self.file_notice),
            Step::Review => steps::review_step(ui, &self.controller),
        });

        ui.add_space(12.0);
        self.error_summary(ui);
        if let Some(message) = self.controller.last_submission_error() {
            ui.colored_label(
                widgets::ERROR_RED,
                format!("Submission failed: {message}. Please try again."),
            );
        }
        ui.add_space(12.0);
        ui.separator();

        ui.horizontal(|ui| {
            if step != Step::Details
                && ui
                    .add_enabled(editing, egui::Button::new("Back"))
                    .clicked()
            {
                self.on_back();
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if step != Step::Review {
                    if ui
                        .add_enabled(editing, egui::Button::new("Continue").fill(ACCENT))
                        .clicked()
                    {
                        self.on_continue();
                    }
                } else if editing {
                    if ui
                        .add(egui::Button::new("Submit Story ✔").fill(ACCENT))
                        .clicked()
                    {
                        self.on_submit();
                    }
                } else {
                    if ui.button("Cancel").clicked() {
                        self.on_cancel();
                    }
                    ui.label("Submitting...");
                    ui.spinner();
                }
            });
        });
    }

    fn show_success(&mut self, ui: &mut egui::Ui) {
        match steps::success_screen(ui, &self.controller) {
            SuccessAction::Stay => {}
            SuccessAction::SubmitAnother => {
                self.controller.reset_form();
                self.show_error_summary = false;
                self.file_notice = None;
                self.status = "Ready for a new submission".to_string();
            }
            SuccessAction::Close => {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
            }
        }
    }
}

impl eframe::App for DesktopWizardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        self.handle_dropped_files(ctx);

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(err) = &self.last_error {
                    let suffix = if err.is_retryable() { " (retry)" } else { "" };
                    ui.colored_label(widgets::ERROR_RED, format!("●{suffix}"));
                }
                ui.label(self.status.as_str());
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.set_max_width(CONTENT_MAX_WIDTH);
                        ui.with_layout(egui::Layout::top_down(egui::Align::Min), |ui| {
                            if self.controller.phase() == SubmissionPhase::Succeeded {
                                self.show_success(ui);
                            } else {
                                self.show_wizard(ui);
                            }
                        });
                    });
                });
        });

        if self.controller.phase() == SubmissionPhase::Submitting {
            ctx.request_repaint_after(Duration::from_millis(16));
        } else {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
