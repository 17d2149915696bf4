//! Runtime bridge between the UI command queue and backend event intake.

use std::{sync::Arc, thread};

use crossbeam_channel::{Receiver, Sender};
use submission_core::SubmissionBackend;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    backend: Arc<dyn SubmissionBackend>,
) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("submission worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        let _ = ui_tx.try_send(UiEvent::Info("Submission worker ready".to_string()));

        runtime.block_on(async move {
            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::Submit { ticket, draft } => {
                        tracing::info!(ticket = %ticket, "backend: submit");
                        let backend = Arc::clone(&backend);
                        let ui_tx = ui_tx.clone();
                        tokio::spawn(async move {
                            let outcome = backend
                                .submit(draft)
                                .await
                                .map_err(|err| format!("{err:#}"));
                            if ui_tx
                                .send(UiEvent::SubmissionFinished { ticket, outcome })
                                .is_err()
                            {
                                tracing::warn!(ticket = %ticket, "ui closed before submission finished");
                            }
                        });
                    }
                }
            }
            tracing::info!("ui command queue closed; submission worker stopping");
        });
    });
}
