use std::collections::HashSet;

use admin_core::ActionError;
use shared::domain::BakeryId;
use tracing::warn;

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::events::{Toast, UiError, UiErrorContext},
};

/// Moderation buttons on a bakery detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BakeryControl {
    Approve,
    Unapprove,
    Ban,
    Unban,
    Delete,
}

impl BakeryControl {
    pub fn success_message(self) -> &'static str {
        match self {
            Self::Approve => "Đã duyệt cửa hàng",
            Self::Unapprove => "Đã hủy duyệt cửa hàng",
            Self::Ban => "Đã cấm cửa hàng",
            Self::Unban => "Đã bỏ cấm cửa hàng",
            Self::Delete => "Đã xóa thành công",
        }
    }
}

/// Tracks in-flight moderation calls so each button has at most one.
#[derive(Debug, Default)]
pub struct BakeryControls {
    pending: HashSet<(BakeryId, BakeryControl)>,
}

impl BakeryControls {
    pub fn is_pending(&self, bakery_id: &BakeryId, control: BakeryControl) -> bool {
        self.pending.contains(&(bakery_id.clone(), control))
    }

    /// Returns the command to queue, or `None` if the same control is still
    /// waiting on a previous submission.
    pub fn submit(&mut self, bakery_id: &BakeryId, control: BakeryControl) -> Option<BackendCommand> {
        if !self.pending.insert((bakery_id.clone(), control)) {
            return None;
        }
        Some(BackendCommand::RunBakeryControl {
            bakery_id: bakery_id.clone(),
            control,
        })
    }

    /// Clears a submission that never reached the worker.
    pub fn abandon(&mut self, bakery_id: &BakeryId, control: BakeryControl) {
        self.pending.remove(&(bakery_id.clone(), control));
    }

    pub fn on_finished(
        &mut self,
        bakery_id: &BakeryId,
        control: BakeryControl,
        result: &Result<(), ActionError>,
    ) -> Toast {
        self.pending.remove(&(bakery_id.clone(), control));
        match result {
            Ok(()) => Toast::success(control.success_message()),
            Err(err) => {
                let ui_error = UiError::from_action(UiErrorContext::BakeryControl, err);
                warn!(
                    bakery_id = %bakery_id,
                    control = ?control,
                    category = ?ui_error.category(),
                    error = ui_error.message(),
                    "bakery control failed"
                );
                ui_error.toast()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::events::ToastLevel;
    use crate::GENERIC_ERROR_MESSAGE;

    #[test]
    fn duplicate_submissions_are_dropped_while_pending() {
        let mut controls = BakeryControls::default();
        let bakery_id = BakeryId::from("b-1");

        assert!(controls.submit(&bakery_id, BakeryControl::Approve).is_some());
        assert!(controls.submit(&bakery_id, BakeryControl::Approve).is_none());
        assert!(controls.is_pending(&bakery_id, BakeryControl::Approve));

        // Other controls and other bakeries are independent.
        assert!(controls.submit(&bakery_id, BakeryControl::Ban).is_some());
        assert!(controls
            .submit(&BakeryId::from("b-2"), BakeryControl::Approve)
            .is_some());
    }

    #[test]
    fn finishing_clears_pending_and_emits_toast() {
        let mut controls = BakeryControls::default();
        let bakery_id = BakeryId::from("b-1");
        controls.submit(&bakery_id, BakeryControl::Delete);

        let toast = controls.on_finished(&bakery_id, BakeryControl::Delete, &Ok(()));
        assert_eq!(toast, Toast::success("Đã xóa thành công"));
        assert!(!controls.is_pending(&bakery_id, BakeryControl::Delete));

        controls.submit(&bakery_id, BakeryControl::Unban);
        let toast = controls.on_finished(
            &bakery_id,
            BakeryControl::Unban,
            &Err(ActionError::Transport("timed out".into())),
        );
        assert_eq!(toast.level, ToastLevel::Error);
        assert_eq!(toast.message, GENERIC_ERROR_MESSAGE);
        assert!(controls.submit(&bakery_id, BakeryControl::Unban).is_some());
    }
}
