//! Backend commands queued from UI to backend worker.

use shared::{
    domain::{BakeryId, DecorationId, FileId},
    protocol::{BakeryProfileUpdate, CakeDecorationDraft, SearchParams},
};

use crate::bakery_controls::BakeryControl;

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCommand {
    ListBakeries {
        params: SearchParams,
    },
    LoadBakery {
        bakery_id: BakeryId,
    },
    LoadBakeryFile {
        file_id: FileId,
    },
    RunBakeryControl {
        bakery_id: BakeryId,
        control: BakeryControl,
    },
    UpdateBakeryProfile {
        bakery_id: BakeryId,
        update: BakeryProfileUpdate,
    },
    ListCakeDecorations {
        params: SearchParams,
    },
    CreateCakeDecoration {
        draft: CakeDecorationDraft,
    },
    UpdateCakeDecoration {
        decoration_id: DecorationId,
        draft: CakeDecorationDraft,
    },
    DeleteCakeDecoration {
        decoration_id: DecorationId,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ListBakeries { .. } => "list_bakeries",
            Self::LoadBakery { .. } => "load_bakery",
            Self::LoadBakeryFile { .. } => "load_bakery_file",
            Self::RunBakeryControl { .. } => "run_bakery_control",
            Self::UpdateBakeryProfile { .. } => "update_bakery_profile",
            Self::ListCakeDecorations { .. } => "list_cake_decorations",
            Self::CreateCakeDecoration { .. } => "create_cake_decoration",
            Self::UpdateCakeDecoration { .. } => "update_cake_decoration",
            Self::DeleteCakeDecoration { .. } => "delete_cake_decoration",
        }
    }
}
