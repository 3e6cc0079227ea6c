//! Runtime bridge between UI command queue and backend event intake.

use std::{
    sync::Arc,
    thread::{self, JoinHandle},
};

use admin_core::AdminHandle;
use crossbeam_channel::{Receiver, Sender};
use shared::domain::BanAction;
use tracing::{debug, error, info};

use crate::{
    backend_bridge::commands::BackendCommand, bakery_controls::BakeryControl,
    controller::events::UiEvent,
};

/// Starts the backend worker thread. Commands are executed one at a time, in
/// queue order, and each produces exactly one `UiEvent`. The worker exits
/// when either side of the bridge is dropped.
pub fn launch(
    handle: Arc<dyn AdminHandle>,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("admin-backend".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    error!(error = %err, "failed to build backend runtime");
                    let _ = ui_tx.send(UiEvent::Status(format!(
                        "backend worker startup failure: {err}"
                    )));
                    return;
                }
            };

            info!("admin backend worker started");
            while let Ok(cmd) = cmd_rx.recv() {
                debug!(command = cmd.name(), "executing backend command");
                let event = runtime.block_on(execute(handle.as_ref(), cmd));
                if ui_tx.send(event).is_err() {
                    break;
                }
            }
            info!("admin backend worker stopped");
        })
}

pub async fn execute(handle: &dyn AdminHandle, cmd: BackendCommand) -> UiEvent {
    match cmd {
        BackendCommand::ListBakeries { params } => {
            UiEvent::BakeriesLoaded(handle.list_bakeries(&params).await)
        }
        BackendCommand::LoadBakery { bakery_id } => {
            let bakery = handle.get_bakery(&bakery_id).await;
            UiEvent::BakeryLoaded { bakery_id, bakery }
        }
        BackendCommand::LoadBakeryFile { file_id } => {
            let file = handle.get_bakery_file(&file_id).await;
            UiEvent::BakeryFileLoaded { file_id, file }
        }
        BackendCommand::RunBakeryControl { bakery_id, control } => {
            let result = match control {
                BakeryControl::Approve => handle.approve_bakery(&bakery_id).await,
                BakeryControl::Unapprove => handle.unapprove_bakery(&bakery_id).await,
                BakeryControl::Ban => handle.ban_bakery(&bakery_id, BanAction::Ban).await,
                BakeryControl::Unban => handle.ban_bakery(&bakery_id, BanAction::UnBan).await,
                BakeryControl::Delete => handle.delete_bakery(&bakery_id).await,
            };
            UiEvent::BakeryControlFinished {
                bakery_id,
                control,
                result,
            }
        }
        BackendCommand::UpdateBakeryProfile { bakery_id, update } => {
            let result = handle.update_bakery_profile(&bakery_id, update).await;
            UiEvent::ProfileUpdated { bakery_id, result }
        }
        BackendCommand::ListCakeDecorations { params } => {
            UiEvent::CakeDecorationsLoaded(handle.list_cake_decorations(&params).await)
        }
        BackendCommand::CreateCakeDecoration { draft } => {
            UiEvent::CakeDecorationSaved(handle.create_cake_decoration(draft).await)
        }
        BackendCommand::UpdateCakeDecoration {
            decoration_id,
            draft,
        } => UiEvent::CakeDecorationSaved(
            handle.update_cake_decoration(&decoration_id, draft).await,
        ),
        BackendCommand::DeleteCakeDecoration { decoration_id } => {
            let result = handle.delete_cake_decoration(&decoration_id).await;
            UiEvent::CakeDecorationDeleted {
                decoration_id,
                result,
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/runtime_tests.rs"]
mod tests;
