//! Dashboard session state: applies backend events and routes operator
//! intents onto the command queue.

use std::collections::HashMap;

use admin_core::ActionError;
use crossbeam_channel::Sender;
use shared::{
    domain::{Bakery, BakeryFile, BakeryId, DecorationId, FileId},
    protocol::{BakeryProfileUpdate, CakeDecorationDraft, SearchParams},
};

use crate::{
    backend_bridge::commands::BackendCommand,
    bakery_controls::{BakeryControl, BakeryControls},
    controller::{
        events::{Toast, UiError, UiErrorContext, UiEvent},
        orchestration::dispatch_backend_command,
    },
    decoration_table::DecorationTable,
};

pub const PROFILE_UPDATED_MESSAGE: &str = "Đã cập nhật thành công";
pub const DECORATION_SAVED_MESSAGE: &str = "Đã lưu thành công";
pub const REAUTH_MESSAGE: &str = "Phiên đăng nhập đã hết hạn, vui lòng đăng nhập lại";

pub struct DashboardState {
    cmd_tx: Sender<BackendCommand>,
    pub status: String,
    /// Set once the backend rejects the access token; cleared by the host
    /// after it installs a new session.
    pub reauth_required: bool,
    pub bakeries: Vec<Bakery>,
    pub bakery_page_count: u32,
    pub bakery: Option<Bakery>,
    pub files: HashMap<FileId, BakeryFile>,
    pub controls: BakeryControls,
    pub decorations: DecorationTable,
    decoration_params: SearchParams,
    toasts: Vec<Toast>,
}

impl DashboardState {
    pub fn new(cmd_tx: Sender<BackendCommand>) -> Self {
        Self {
            cmd_tx,
            status: String::new(),
            reauth_required: false,
            bakeries: Vec::new(),
            bakery_page_count: 0,
            bakery: None,
            files: HashMap::new(),
            controls: BakeryControls::default(),
            decorations: DecorationTable::default(),
            decoration_params: SearchParams::default(),
            toasts: Vec::new(),
        }
    }

    fn dispatch(&mut self, cmd: BackendCommand) -> bool {
        dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status)
    }

    pub fn refresh_bakeries(&mut self, params: SearchParams) -> bool {
        self.dispatch(BackendCommand::ListBakeries { params })
    }

    pub fn open_bakery(&mut self, bakery_id: BakeryId) -> bool {
        self.dispatch(BackendCommand::LoadBakery { bakery_id })
    }

    pub fn load_file(&mut self, file_id: FileId) -> bool {
        self.dispatch(BackendCommand::LoadBakeryFile { file_id })
    }

    pub fn refresh_decorations(&mut self, params: SearchParams) -> bool {
        self.decoration_params = params.clone();
        self.dispatch(BackendCommand::ListCakeDecorations { params })
    }

    /// Queues a moderation call. A control that is already in flight, or a
    /// queue that refuses the command, yields `false` and leaves the control
    /// usable.
    pub fn submit_control(&mut self, bakery_id: &BakeryId, control: BakeryControl) -> bool {
        let Some(cmd) = self.controls.submit(bakery_id, control) else {
            return false;
        };
        if self.dispatch(cmd) {
            return true;
        }
        self.controls.abandon(bakery_id, control);
        false
    }

    pub fn update_profile(&mut self, bakery_id: BakeryId, update: BakeryProfileUpdate) -> bool {
        self.dispatch(BackendCommand::UpdateBakeryProfile { bakery_id, update })
    }

    pub fn save_decoration(
        &mut self,
        decoration_id: Option<DecorationId>,
        draft: CakeDecorationDraft,
    ) -> bool {
        let cmd = match decoration_id {
            Some(decoration_id) => BackendCommand::UpdateCakeDecoration {
                decoration_id,
                draft,
            },
            None => BackendCommand::CreateCakeDecoration { draft },
        };
        self.dispatch(cmd)
    }

    /// Confirms the open delete prompt. If the command cannot be queued the
    /// prompt is released so it can be retried or cancelled.
    pub fn confirm_decoration_delete(&mut self) -> bool {
        let Some(cmd) = self.decorations.confirm_delete() else {
            return false;
        };
        if self.dispatch(cmd) {
            return true;
        }
        self.decorations.abandon_delete();
        false
    }

    pub fn take_toasts(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.toasts)
    }

    pub fn apply(&mut self, event: UiEvent) {
        match event {
            UiEvent::Status(message) => self.status = message,
            UiEvent::BakeriesLoaded(page) => {
                if page.is_ok() {
                    self.bakeries = page.data;
                    self.bakery_page_count = page.page_count;
                } else if let Some(err) = &page.error {
                    self.note_failure(UiErrorContext::BakeryList, err);
                }
            }
            UiEvent::BakeryLoaded { bakery_id, bakery } => {
                if bakery.is_none() {
                    self.status = format!("bakery {bakery_id} could not be loaded");
                }
                self.bakery = bakery;
            }
            UiEvent::BakeryFileLoaded { file_id, file } => match file {
                Some(file) => {
                    self.files.insert(file_id, file);
                }
                None => self.status = format!("file {file_id} could not be loaded"),
            },
            UiEvent::BakeryControlFinished {
                bakery_id,
                control,
                result,
            } => {
                let toast = self.controls.on_finished(&bakery_id, control, &result);
                self.toasts.push(toast);
                match &result {
                    Ok(()) => self.after_control(&bakery_id, control),
                    Err(err) => self.note_failure(UiErrorContext::BakeryControl, err),
                }
            }
            UiEvent::ProfileUpdated { bakery_id, result } => match result {
                Ok(bakery) => {
                    if self.is_open(&bakery_id) {
                        self.bakery = Some(bakery);
                    }
                    self.toasts.push(Toast::success(PROFILE_UPDATED_MESSAGE));
                }
                Err(err) => self.fail_with_toast(UiErrorContext::ProfileUpdate, &err),
            },
            UiEvent::CakeDecorationsLoaded(page) => {
                if let Some(err) = &page.error {
                    self.note_failure(UiErrorContext::CakeDecoration, err);
                }
                self.decorations.load(page);
            }
            UiEvent::CakeDecorationSaved(result) => match result {
                Ok(_) => {
                    self.toasts.push(Toast::success(DECORATION_SAVED_MESSAGE));
                    self.refresh_decorations(self.decoration_params.clone());
                }
                Err(err) => self.fail_with_toast(UiErrorContext::CakeDecoration, &err),
            },
            UiEvent::CakeDecorationDeleted { result, .. } => {
                let toast = self.decorations.on_delete_finished(&result);
                self.toasts.push(toast);
                match &result {
                    Ok(()) => {
                        self.refresh_decorations(self.decoration_params.clone());
                    }
                    Err(err) => self.note_failure(UiErrorContext::CakeDecoration, err),
                }
            }
        }
    }

    fn is_open(&self, bakery_id: &BakeryId) -> bool {
        self.bakery
            .as_ref()
            .is_some_and(|bakery| &bakery.id == bakery_id)
    }

    fn after_control(&mut self, bakery_id: &BakeryId, control: BakeryControl) {
        if !self.is_open(bakery_id) {
            return;
        }
        if control == BakeryControl::Delete {
            self.bakery = None;
        } else {
            self.open_bakery(bakery_id.clone());
        }
    }

    fn fail_with_toast(&mut self, context: UiErrorContext, err: &ActionError) {
        self.toasts.push(Toast::generic_error());
        self.note_failure(context, err);
    }

    fn note_failure(&mut self, context: UiErrorContext, err: &ActionError) {
        let ui_error = UiError::from_action(context, err);
        if ui_error.requires_reauth() {
            self.reauth_required = true;
            self.status = REAUTH_MESSAGE.to_string();
        } else {
            self.status = format!("{:?} failed: {}", ui_error.context(), ui_error.message());
        }
    }
}

#[cfg(test)]
#[path = "../tests/state_tests.rs"]
mod tests;
