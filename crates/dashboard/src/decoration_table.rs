//! View-model for the cake-decoration management table.
//!
//! Decoration types render as collapsible groups; an expanded group lists one
//! row per item with edit and delete intents. Deletion goes through a
//! confirmation prompt and the backend worker, so only one delete can be in
//! flight at a time.

use std::collections::HashMap;

use admin_core::{ActionError, Page};
use shared::domain::{
    CakeDecorationGroup, CakeDecorationItem, DecorationCategory, DecorationIcon, DecorationId,
    DecorationType,
};
use tracing::warn;

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::events::{Toast, UiError, UiErrorContext},
    format::format_vnd,
};

pub const DELETE_SUCCESS_MESSAGE: &str = "Đã xóa thành công";
pub const NO_DESCRIPTION_LABEL: &str = "Không có mô tả";

/// Modals the table asks the host to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalRequest {
    AddItem { decoration_type: String },
    EditItem(CakeDecorationItem),
    CreateType { existing_types: Vec<String> },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletePrompt {
    pub open: bool,
    pub target: Option<DecorationId>,
    pub pending: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRow {
    pub decoration_type: String,
    pub display_name: String,
    pub item_count: usize,
    pub item_count_label: String,
    pub expanded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRow {
    pub id: DecorationId,
    pub name: String,
    pub icon: DecorationIcon,
    pub price_label: String,
    /// CSS color value for the swatch; also shown as literal text.
    pub color: String,
    pub description_label: String,
    pub is_default: bool,
    pub default_label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedGroup {
    pub title: String,
    pub icon: DecorationIcon,
    pub items: Vec<ItemRow>,
}

impl ExpandedGroup {
    /// The "add the first item" prompt replaces the item list when true.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupView {
    pub row: GroupRow,
    pub expanded: Option<ExpandedGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableBody {
    /// No types loaded yet.
    Empty { can_create_type: bool },
    Groups(Vec<GroupView>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    pub show_add_type: bool,
    pub page_count: u32,
    pub body: TableBody,
}

#[derive(Debug, Default)]
pub struct DecorationTable {
    groups: Vec<CakeDecorationGroup>,
    page_count: u32,
    expanded: HashMap<String, bool>,
    delete_prompt: DeletePrompt,
}

impl DecorationTable {
    pub fn new(page: Page<CakeDecorationGroup>) -> Self {
        let mut table = Self::default();
        table.load(page);
        table
    }

    /// Replaces the loaded groups. Expansion state survives a reload.
    pub fn load(&mut self, page: Page<CakeDecorationGroup>) {
        if let Some(err) = &page.error {
            warn!(error = %err, "cake decoration list loaded with error");
        }
        self.groups = page.data;
        self.page_count = page.page_count;
    }

    pub fn existing_types(&self) -> Vec<String> {
        self.groups
            .iter()
            .map(|group| group.decoration_type.clone())
            .collect()
    }

    /// True when every predefined category key is among the loaded types.
    /// Matching is exact; custom types never count.
    pub fn all_predefined_types_exist(&self) -> bool {
        DecorationCategory::ALL.iter().all(|category| {
            self.groups
                .iter()
                .any(|group| group.decoration_type == category.key())
        })
    }

    pub fn add_type_request(&self) -> Option<ModalRequest> {
        if self.all_predefined_types_exist() {
            return None;
        }
        Some(ModalRequest::CreateType {
            existing_types: self.existing_types(),
        })
    }

    pub fn toggle(&mut self, decoration_type: &str) {
        let entry = self
            .expanded
            .entry(decoration_type.to_string())
            .or_insert(false);
        *entry = !*entry;
    }

    pub fn is_expanded(&self, decoration_type: &str) -> bool {
        self.expanded
            .get(decoration_type)
            .copied()
            .unwrap_or(false)
    }

    pub fn add_item_request(&self, decoration_type: &str) -> ModalRequest {
        ModalRequest::AddItem {
            decoration_type: decoration_type.to_string(),
        }
    }

    pub fn edit_item_request(&self, decoration_id: &DecorationId) -> Option<ModalRequest> {
        self.find_item(decoration_id)
            .map(|item| ModalRequest::EditItem(item.clone()))
    }

    fn find_item(&self, decoration_id: &DecorationId) -> Option<&CakeDecorationItem> {
        self.groups
            .iter()
            .flat_map(|group| group.items.iter())
            .find(|item| &item.id == decoration_id)
    }

    pub fn delete_prompt(&self) -> &DeletePrompt {
        &self.delete_prompt
    }

    pub fn request_delete(&mut self, decoration_id: DecorationId) {
        if self.delete_prompt.pending {
            return;
        }
        self.delete_prompt.open = true;
        self.delete_prompt.target = Some(decoration_id);
    }

    pub fn cancel_delete(&mut self) {
        if self.delete_prompt.pending {
            return;
        }
        self.delete_prompt.open = false;
    }

    /// Confirms the open prompt. Yields nothing if the prompt is closed or a
    /// delete is already in flight.
    pub fn confirm_delete(&mut self) -> Option<BackendCommand> {
        if !self.delete_prompt.open || self.delete_prompt.pending {
            return None;
        }
        let decoration_id = self.delete_prompt.target.clone()?;
        self.delete_prompt.pending = true;
        Some(BackendCommand::DeleteCakeDecoration { decoration_id })
    }

    /// Clears a confirmed delete that never reached the worker. The prompt
    /// stays open on its target so the operator can retry or cancel.
    pub fn abandon_delete(&mut self) {
        self.delete_prompt.pending = false;
    }

    /// Failure leaves the prompt open and the rows untouched; the next list
    /// refresh is what removes a deleted item.
    pub fn on_delete_finished(&mut self, result: &Result<(), ActionError>) -> Toast {
        self.delete_prompt.pending = false;
        match result {
            Ok(()) => {
                self.delete_prompt.open = false;
                Toast::success(DELETE_SUCCESS_MESSAGE)
            }
            Err(err) => {
                let ui_error = UiError::from_action(UiErrorContext::CakeDecoration, err);
                warn!(
                    target_id = ?self.delete_prompt.target,
                    category = ?ui_error.category(),
                    error = ui_error.message(),
                    "cake decoration delete failed"
                );
                ui_error.toast()
            }
        }
    }

    pub fn view(&self) -> TableView {
        let show_add_type = !self.all_predefined_types_exist();
        let body = if self.groups.is_empty() {
            TableBody::Empty {
                can_create_type: show_add_type,
            }
        } else {
            TableBody::Groups(self.groups.iter().map(|g| self.group_view(g)).collect())
        };

        TableView {
            show_add_type,
            page_count: self.page_count,
            body,
        }
    }

    fn group_view(&self, group: &CakeDecorationGroup) -> GroupView {
        let decoration_type = DecorationType::parse(&group.decoration_type);
        let expanded = self.is_expanded(&group.decoration_type);
        let row = GroupRow {
            decoration_type: group.decoration_type.clone(),
            display_name: decoration_type.display_name().to_string(),
            item_count: group.items.len(),
            item_count_label: format!("{} danh mục", group.items.len()),
            expanded,
        };

        let expanded = expanded.then(|| {
            let icon = decoration_type.icon();
            ExpandedGroup {
                title: format!(
                    "Danh sách {}",
                    decoration_type.display_name().to_lowercase()
                ),
                icon,
                items: group
                    .items
                    .iter()
                    .map(|item| item_row(item, icon))
                    .collect(),
            }
        });

        GroupView { row, expanded }
    }
}

fn item_row(item: &CakeDecorationItem, icon: DecorationIcon) -> ItemRow {
    ItemRow {
        id: item.id.clone(),
        name: item.name.clone(),
        icon,
        price_label: format_vnd(item.price),
        color: item.color.clone(),
        description_label: item
            .description
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(NO_DESCRIPTION_LABEL)
            .to_string(),
        is_default: item.is_default,
        default_label: if item.is_default { "Có" } else { "Không" },
    }
}

#[cfg(test)]
#[path = "tests/decoration_table_tests.rs"]
mod tests;
