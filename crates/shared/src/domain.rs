use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

id_newtype!(BakeryId);
id_newtype!(FileId);
id_newtype!(DecorationId);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BanStatus {
    Banned,
    #[default]
    Unbanned,
}

/// Discriminator sent to `PUT /bakeries/{id}/ban_action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BanAction {
    Ban,
    UnBan,
}

impl BanAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ban => "BAN",
            Self::UnBan => "UN_BAN",
        }
    }
}

/// A vendor on the marketplace. The backend owns this record; the admin
/// surface only reads it and relays moderation intents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bakery {
    pub id: BakeryId,
    pub bakery_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub bakery_description: Option<String>,
    #[serde(default)]
    pub cake_description: Option<String>,
    #[serde(default)]
    pub price_description: Option<String>,
    #[serde(default)]
    pub owner_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    /// Decimal degrees, kept as the backend's string form.
    #[serde(default)]
    pub latitude: String,
    #[serde(default)]
    pub longitude: String,
    #[serde(default)]
    pub tax_code: String,
    #[serde(default)]
    pub identity_card_number: String,
    #[serde(default)]
    pub avatar_file_id: Option<FileId>,
    #[serde(default)]
    pub front_card_file_id: Option<FileId>,
    #[serde(default)]
    pub back_card_file_id: Option<FileId>,
    #[serde(default)]
    pub food_safety_certificate_file_id: Option<FileId>,
    #[serde(default)]
    pub business_license_file_id: Option<FileId>,
    #[serde(default)]
    pub shop_image_file_ids: Vec<FileId>,
    #[serde(default)]
    pub open_time: String,
    #[serde(default)]
    pub close_time: String,
    #[serde(default, alias = "is_approve")]
    pub is_approved: bool,
    #[serde(default)]
    pub status: BanStatus,
    #[serde(default)]
    pub bank_account: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Bakery {
    pub fn is_banned(&self) -> bool {
        self.status == BanStatus::Banned
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BakeryFile {
    pub id: FileId,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub file_url: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecorationIcon {
    Package,
    Palette,
}

/// The nine predefined decoration categories. Adding a category here forces
/// every display mapping below to handle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DecorationCategory {
    OuterIcing,
    Sprinkles,
    Decoration,
    Bling,
    TallSkirt,
    Drip,
    ShortSkirt,
    Candles,
    CakeBoard,
}

impl DecorationCategory {
    pub const ALL: [Self; 9] = [
        Self::OuterIcing,
        Self::Sprinkles,
        Self::Decoration,
        Self::Bling,
        Self::TallSkirt,
        Self::Drip,
        Self::ShortSkirt,
        Self::Candles,
        Self::CakeBoard,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::OuterIcing => "OUTERICING",
            Self::Sprinkles => "SPRINKLES",
            Self::Decoration => "DECORATION",
            Self::Bling => "BLING",
            Self::TallSkirt => "TALLSKIRT",
            Self::Drip => "DRIP",
            Self::ShortSkirt => "SHORTSKIRT",
            Self::Candles => "CANDLES",
            Self::CakeBoard => "CAKEBOARD",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::OuterIcing => "Phủ ngoài",
            Self::Sprinkles => "Rắc phủ",
            Self::Decoration => "Trang trí",
            Self::Bling => "Trang trí kim tuyến",
            Self::TallSkirt => "Viền cao",
            Self::Drip => "Trang trí chảy",
            Self::ShortSkirt => "Viền thấp",
            Self::Candles => "Nến",
            Self::CakeBoard => "Đế bánh",
        }
    }

    pub fn icon(self) -> DecorationIcon {
        DecorationIcon::Package
    }

    /// Exact key match, as stored by the backend.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.key() == key)
    }
}

/// Custom type rendered with the palette icon. Matched exactly.
pub const COLOR_TYPE: &str = "Color";

/// A decoration type string as it arrives from the backend: either one of the
/// predefined categories or an operator-defined custom type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecorationType {
    Predefined(DecorationCategory),
    Custom(String),
}

impl DecorationType {
    /// Display lookup is case-insensitive; "candles" renders as "Nến".
    pub fn parse(raw: &str) -> Self {
        match DecorationCategory::from_key(&raw.to_ascii_uppercase()) {
            Some(category) => Self::Predefined(category),
            None => Self::Custom(raw.to_string()),
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Self::Predefined(category) => category.display_name(),
            Self::Custom(raw) => raw,
        }
    }

    pub fn icon(&self) -> DecorationIcon {
        match self {
            Self::Predefined(category) => category.icon(),
            Self::Custom(raw) if raw == COLOR_TYPE => DecorationIcon::Palette,
            Self::Custom(_) => DecorationIcon::Package,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CakeDecorationItem {
    pub id: DecorationId,
    pub name: String,
    /// Whole VND.
    pub price: i64,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(rename = "type", default)]
    pub decoration_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CakeDecorationGroup {
    #[serde(rename = "type")]
    pub decoration_type: String,
    #[serde(default)]
    pub items: Vec<CakeDecorationItem>,
}
