use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Bakery, BanAction, DecorationCategory, FileId};

/// Success body for single-entity endpoints: `{"data": T}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// Success body for list endpoints. Older backend builds omit the page count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListEnvelope<T> {
    pub data: Vec<T>,
    #[serde(default, alias = "pageCount", alias = "total_pages")]
    pub page_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Filter/sort/pagination descriptor for list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub sort: Option<(String, SortOrder)>,
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
}

impl SearchParams {
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn sort_by(mut self, column: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some((column.into(), order));
        self
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Query pairs in a stable order: paging, sort, then filters by key.
    /// Empty filter values are dropped.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        if let Some(per_page) = self.per_page {
            pairs.push(("per_page".to_string(), per_page.to_string()));
        }
        if let Some((column, order)) = &self.sort {
            pairs.push(("sort".to_string(), format!("{column}.{}", order.as_str())));
        }
        for (key, value) in &self.filters {
            if !value.is_empty() {
                pairs.push((key.clone(), value.clone()));
            }
        }
        pairs
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproveRequest {
    pub is_approve: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BanActionRequest {
    pub action: BanAction,
}

/// Shop image references as a form may submit them: either a real list or a
/// single raw string (a bare id, or a JSON-encoded list).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageFileIds {
    List(Vec<String>),
    Raw(String),
}

/// Profile fields submitted for `PUT /bakeries/{id}`, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BakeryProfileUpdate {
    pub bakery_name: String,
    #[serde(default)]
    pub bakery_description: Option<String>,
    #[serde(default)]
    pub cake_description: Option<String>,
    #[serde(default)]
    pub price_description: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub latitude: String,
    #[serde(default)]
    pub longitude: String,
    #[serde(default)]
    pub owner_name: String,
    #[serde(default)]
    pub tax_code: String,
    #[serde(default)]
    pub identity_card_number: String,
    #[serde(default)]
    pub shop_image_file_ids: Option<ImageFileIds>,
    #[serde(default)]
    pub avatar_file_id: String,
    #[serde(default)]
    pub front_card_file_id: String,
    #[serde(default)]
    pub back_card_file_id: String,
    #[serde(default)]
    pub food_safety_certificate_file_id: Option<String>,
    #[serde(default)]
    pub business_license_file_id: Option<String>,
    #[serde(default)]
    pub open_time: String,
    #[serde(default)]
    pub close_time: String,
    #[serde(default)]
    pub bank_account: Option<String>,
}

/// Seeds an update with the entity's current values so that callers only
/// override what they mean to change. The password is never carried over.
impl From<&Bakery> for BakeryProfileUpdate {
    fn from(bakery: &Bakery) -> Self {
        let file_ref = |id: &Option<FileId>| id.as_ref().map(|id| id.as_str().to_string());
        Self {
            bakery_name: bakery.bakery_name.clone(),
            bakery_description: bakery.bakery_description.clone(),
            cake_description: bakery.cake_description.clone(),
            price_description: bakery.price_description.clone(),
            password: None,
            phone: bakery.phone.clone(),
            address: bakery.address.clone(),
            latitude: bakery.latitude.clone(),
            longitude: bakery.longitude.clone(),
            owner_name: bakery.owner_name.clone(),
            tax_code: bakery.tax_code.clone(),
            identity_card_number: bakery.identity_card_number.clone(),
            shop_image_file_ids: Some(ImageFileIds::List(
                bakery
                    .shop_image_file_ids
                    .iter()
                    .map(|id| id.as_str().to_string())
                    .collect(),
            )),
            avatar_file_id: file_ref(&bakery.avatar_file_id).unwrap_or_default(),
            front_card_file_id: file_ref(&bakery.front_card_file_id).unwrap_or_default(),
            back_card_file_id: file_ref(&bakery.back_card_file_id).unwrap_or_default(),
            food_safety_certificate_file_id: file_ref(&bakery.food_safety_certificate_file_id),
            business_license_file_id: file_ref(&bakery.business_license_file_id),
            open_time: bakery.open_time.clone(),
            close_time: bakery.close_time.clone(),
            bank_account: bakery.bank_account.clone(),
        }
    }
}

/// The normalized body actually sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BakeryProfilePayload {
    pub bakery_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bakery_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cake_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub phone: String,
    pub address: String,
    pub latitude: String,
    pub longitude: String,
    pub owner_name: String,
    pub tax_code: String,
    pub identity_card_number: String,
    pub shop_image_file_ids: Vec<String>,
    pub avatar_file_id: String,
    pub front_card_file_id: String,
    pub back_card_file_id: String,
    pub food_safety_certificate_file_id: String,
    pub business_license_file_id: String,
    pub open_time: String,
    pub close_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_account: Option<String>,
}

/// Create/update body for a cake-decoration item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CakeDecorationDraft {
    pub name: String,
    pub price: i64,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_default: bool,
    #[serde(rename = "type")]
    pub decoration_type: String,
}

impl CakeDecorationDraft {
    pub fn for_category(category: DecorationCategory, name: impl Into<String>, price: i64) -> Self {
        Self {
            name: name.into(),
            price,
            color: String::new(),
            description: None,
            is_default: false,
            decoration_type: category.key().to_string(),
        }
    }
}
