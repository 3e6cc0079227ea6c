//! Backend-to-UI events, toasts, and error modeling for the dashboard.

use admin_core::{ActionError, Page};
use shared::{
    domain::{
        Bakery, BakeryFile, BakeryId, CakeDecorationGroup, CakeDecorationItem, DecorationId,
        FileId,
    },
    error::ErrorCode,
};

use crate::{bakery_controls::BakeryControl, GENERIC_ERROR_MESSAGE};

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Status(String),
    BakeriesLoaded(Page<Bakery>),
    BakeryLoaded {
        bakery_id: BakeryId,
        bakery: Option<Bakery>,
    },
    BakeryFileLoaded {
        file_id: FileId,
        file: Option<BakeryFile>,
    },
    BakeryControlFinished {
        bakery_id: BakeryId,
        control: BakeryControl,
        result: Result<(), ActionError>,
    },
    ProfileUpdated {
        bakery_id: BakeryId,
        result: Result<Bakery, ActionError>,
    },
    CakeDecorationsLoaded(Page<CakeDecorationGroup>),
    CakeDecorationSaved(Result<CakeDecorationItem, ActionError>),
    CakeDecorationDeleted {
        decoration_id: DecorationId,
        result: Result<(), ActionError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Success,
            message: message.into(),
        }
    }

    pub fn generic_error() -> Self {
        Self {
            level: ToastLevel::Error,
            message: GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Auth,
    Transport,
    Validation,
    NotFound,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BakeryList,
    BakeryControl,
    ProfileUpdate,
    CakeDecoration,
}

/// Diagnostic view of a failed action. The end user only ever sees the
/// generic toast; this drives logging and the re-login prompt.
#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_action(context: UiErrorContext, err: &ActionError) -> Self {
        let category = match err {
            ActionError::Backend(api) => match api.code {
                ErrorCode::Unauthorized | ErrorCode::Forbidden => UiErrorCategory::Auth,
                ErrorCode::Validation => UiErrorCategory::Validation,
                ErrorCode::NotFound => UiErrorCategory::NotFound,
                ErrorCode::RateLimited | ErrorCode::Internal => UiErrorCategory::Unknown,
            },
            ActionError::Transport(_) | ActionError::InvalidUrl(_) => UiErrorCategory::Transport,
            ActionError::Decode(_) => UiErrorCategory::Unknown,
        };

        Self {
            category,
            context,
            message: err.to_string(),
        }
    }

    pub fn requires_reauth(&self) -> bool {
        self.category == UiErrorCategory::Auth
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn toast(&self) -> Toast {
        Toast::generic_error()
    }
}
