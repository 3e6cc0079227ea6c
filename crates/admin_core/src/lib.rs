use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{
        BakeryId, BanAction, Bakery, BakeryFile, CakeDecorationGroup, CakeDecorationItem,
        DecorationId, FileId,
    },
    error::ApiError,
    protocol::{
        ApproveRequest, BakeryProfileUpdate, BanActionRequest, CakeDecorationDraft,
        DataEnvelope, ListEnvelope, SearchParams,
    },
};
use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

pub mod normalize;

pub use normalize::{build_profile_payload, normalize_image_file_ids, normalize_time};

pub const INGREDIENTS_PATH: &str = "/dashboard/ingredients";

pub fn bakery_detail_path(bakery_id: &BakeryId) -> String {
    format!("/dashboard/bakeries/{bakery_id}")
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("backend rejected request: {0}")]
    Backend(#[from] ApiError),
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("invalid endpoint url: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for ActionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// One page of a list endpoint. A failed fetch still yields a page: empty,
/// zero pages, with the error attached.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub page_count: u32,
    pub error: Option<ActionError>,
}

impl<T> Page<T> {
    pub fn failed(error: ActionError) -> Self {
        Self {
            data: Vec::new(),
            page_count: 0,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

impl<T> From<ListEnvelope<T>> for Page<T> {
    fn from(envelope: ListEnvelope<T>) -> Self {
        Self {
            data: envelope.data,
            page_count: envelope.page_count,
            error: None,
        }
    }
}

/// Path-keyed invalidation of cached dashboard views.
pub trait CacheInvalidator: Send + Sync {
    fn revalidate_path(&self, path: &str);
}

pub struct NoopCacheInvalidator;

impl CacheInvalidator for NoopCacheInvalidator {
    fn revalidate_path(&self, path: &str) {
        debug!(path, "no cache attached; skipping revalidation");
    }
}

/// Keeps every invalidated path in order. Dashboards poll it to decide which
/// views to refetch.
#[derive(Default)]
pub struct RecordingCacheInvalidator {
    paths: Mutex<Vec<String>>,
}

impl RecordingCacheInvalidator {
    pub fn paths(&self) -> Vec<String> {
        self.paths
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(
            &mut *self
                .paths
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }
}

impl CacheInvalidator for RecordingCacheInvalidator {
    fn revalidate_path(&self, path: &str) {
        self.paths
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(path.to_string());
    }
}

/// Where to reach the backend and who is calling.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub base_url: Url,
    pub access_token: String,
    pub request_timeout: Option<Duration>,
}

impl AdminSession {
    pub fn new(base_url: Url, access_token: impl Into<String>) -> Self {
        Self {
            base_url,
            access_token: access_token.into(),
            request_timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

#[async_trait]
pub trait AdminHandle: Send + Sync {
    async fn list_bakeries(&self, params: &SearchParams) -> Page<Bakery>;
    async fn get_bakery(&self, bakery_id: &BakeryId) -> Option<Bakery>;
    async fn approve_bakery(&self, bakery_id: &BakeryId) -> Result<(), ActionError>;
    async fn unapprove_bakery(&self, bakery_id: &BakeryId) -> Result<(), ActionError>;
    async fn ban_bakery(&self, bakery_id: &BakeryId, action: BanAction)
        -> Result<(), ActionError>;
    async fn delete_bakery(&self, bakery_id: &BakeryId) -> Result<(), ActionError>;
    async fn update_bakery_profile(
        &self,
        bakery_id: &BakeryId,
        update: BakeryProfileUpdate,
    ) -> Result<Bakery, ActionError>;
    async fn get_bakery_file(&self, file_id: &FileId) -> Option<BakeryFile>;
    async fn list_cake_decorations(&self, params: &SearchParams) -> Page<CakeDecorationGroup>;
    async fn create_cake_decoration(
        &self,
        draft: CakeDecorationDraft,
    ) -> Result<CakeDecorationItem, ActionError>;
    async fn update_cake_decoration(
        &self,
        decoration_id: &DecorationId,
        draft: CakeDecorationDraft,
    ) -> Result<CakeDecorationItem, ActionError>;
    async fn delete_cake_decoration(&self, decoration_id: &DecorationId)
        -> Result<(), ActionError>;
}

pub struct AdminClient {
    http: Client,
    session: AdminSession,
    invalidator: Arc<dyn CacheInvalidator>,
}

impl AdminClient {
    pub fn new(session: AdminSession) -> Result<Self, ActionError> {
        Self::new_with_invalidator(session, Arc::new(NoopCacheInvalidator))
    }

    pub fn new_with_invalidator(
        session: AdminSession,
        invalidator: Arc<dyn CacheInvalidator>,
    ) -> Result<Self, ActionError> {
        let mut builder = Client::builder();
        if let Some(timeout) = session.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            session,
            invalidator,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ActionError> {
        let mut url = self.session.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                error!(base_url = %self.session.base_url, "api base url cannot carry path segments");
                ActionError::InvalidUrl(self.session.base_url.to_string())
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.session.access_token)
    }

    fn read(&self, url: Url) -> RequestBuilder {
        self.authed(self.http.get(url))
            .header(header::CACHE_CONTROL, "no-store")
    }

    async fn fetch_list<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        params: &SearchParams,
    ) -> Result<ListEnvelope<T>, ActionError> {
        let url = self.endpoint(segments)?;
        let response = self.read(url).query(&params.to_query_pairs()).send().await?;
        decode_body(ensure_success(response).await?).await
    }

    async fn fetch_single<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ActionError> {
        let url = self.endpoint(segments)?;
        let response = self.read(url).send().await?;
        let envelope: DataEnvelope<T> = decode_body(ensure_success(response).await?).await?;
        Ok(envelope.data)
    }

    async fn send_mutation(&self, request: RequestBuilder) -> Result<Response, ActionError> {
        let response = self.authed(request).send().await?;
        ensure_success(response).await
    }

    async fn save_decoration(
        &self,
        request: RequestBuilder,
    ) -> Result<DataEnvelope<CakeDecorationItem>, ActionError> {
        let response = self.send_mutation(request).await?;
        decode_body(response).await
    }

    async fn set_approval(&self, bakery_id: &BakeryId, is_approve: bool) -> Result<(), ActionError> {
        info!(bakery_id = %bakery_id, is_approve, "updating bakery approval");
        let url = self.endpoint(&["bakeries", bakery_id.as_str(), "approve"])?;
        self.send_mutation(self.http.put(url).json(&ApproveRequest { is_approve }))
            .await
            .inspect_err(|err| {
                error!(bakery_id = %bakery_id, is_approve, error = %err, "failed to update bakery approval")
            })?;
        self.invalidator
            .revalidate_path(&bakery_detail_path(bakery_id));
        Ok(())
    }
}

async fn ensure_success(response: Response) -> Result<Response, ActionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::new(status.as_u16(), body).into())
}

async fn decode_body<T: DeserializeOwned>(response: Response) -> Result<T, ActionError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|err| ActionError::Decode(err.to_string()))
}

#[async_trait]
impl AdminHandle for AdminClient {
    async fn list_bakeries(&self, params: &SearchParams) -> Page<Bakery> {
        match self.fetch_list(&["bakeries"], params).await {
            Ok(envelope) => envelope.into(),
            Err(err) => {
                error!(error = %err, "failed to fetch bakery list");
                Page::failed(err)
            }
        }
    }

    async fn get_bakery(&self, bakery_id: &BakeryId) -> Option<Bakery> {
        match self.fetch_single(&["bakeries", bakery_id.as_str()]).await {
            Ok(bakery) => Some(bakery),
            Err(err) => {
                error!(bakery_id = %bakery_id, error = %err, "failed to fetch bakery by id");
                None
            }
        }
    }

    async fn approve_bakery(&self, bakery_id: &BakeryId) -> Result<(), ActionError> {
        self.set_approval(bakery_id, true).await
    }

    async fn unapprove_bakery(&self, bakery_id: &BakeryId) -> Result<(), ActionError> {
        self.set_approval(bakery_id, false).await
    }

    async fn ban_bakery(
        &self,
        bakery_id: &BakeryId,
        action: BanAction,
    ) -> Result<(), ActionError> {
        info!(bakery_id = %bakery_id, action = action.as_str(), "applying bakery ban action");
        let url = self.endpoint(&["bakeries", bakery_id.as_str(), "ban_action"])?;
        self.send_mutation(self.http.put(url).json(&BanActionRequest { action }))
            .await
            .inspect_err(|err| {
                error!(
                    bakery_id = %bakery_id,
                    action = action.as_str(),
                    error = %err,
                    "failed to apply bakery ban action"
                )
            })?;
        self.invalidator
            .revalidate_path(&bakery_detail_path(bakery_id));
        Ok(())
    }

    async fn delete_bakery(&self, bakery_id: &BakeryId) -> Result<(), ActionError> {
        info!(bakery_id = %bakery_id, "deleting bakery");
        let url = self.endpoint(&["bakeries", bakery_id.as_str()])?;
        self.send_mutation(self.http.delete(url))
            .await
            .inspect_err(|err| error!(bakery_id = %bakery_id, error = %err, "failed to delete bakery"))?;
        // The detail route may no longer resolve; listings are not invalidated.
        self.invalidator
            .revalidate_path(&bakery_detail_path(bakery_id));
        Ok(())
    }

    async fn update_bakery_profile(
        &self,
        bakery_id: &BakeryId,
        update: BakeryProfileUpdate,
    ) -> Result<Bakery, ActionError> {
        let payload = build_profile_payload(update);
        debug!(
            bakery_id = %bakery_id,
            shop_images = payload.shop_image_file_ids.len(),
            open_time = %payload.open_time,
            close_time = %payload.close_time,
            "sending bakery profile update"
        );

        let url = self.endpoint(&["bakeries", bakery_id.as_str()])?;
        let result = match self.send_mutation(self.http.put(url).json(&payload)).await {
            Ok(response) => decode_body::<DataEnvelope<Bakery>>(response).await,
            Err(err) => Err(err),
        };
        let bakery = match result {
            Ok(envelope) => envelope.data,
            Err(err) => {
                error!(bakery_id = %bakery_id, error = %err, "failed to update bakery");
                return Err(err);
            }
        };

        self.invalidator
            .revalidate_path(&bakery_detail_path(bakery_id));
        Ok(bakery)
    }

    async fn get_bakery_file(&self, file_id: &FileId) -> Option<BakeryFile> {
        match self.fetch_single(&["files", file_id.as_str()]).await {
            Ok(file) => Some(file),
            Err(err) => {
                error!(file_id = %file_id, error = %err, "failed to fetch bakery file");
                None
            }
        }
    }

    async fn list_cake_decorations(&self, params: &SearchParams) -> Page<CakeDecorationGroup> {
        match self.fetch_list(&["cake_decorations"], params).await {
            Ok(envelope) => envelope.into(),
            Err(err) => {
                error!(error = %err, "failed to fetch cake decorations");
                Page::failed(err)
            }
        }
    }

    async fn create_cake_decoration(
        &self,
        draft: CakeDecorationDraft,
    ) -> Result<CakeDecorationItem, ActionError> {
        info!(decoration_type = %draft.decoration_type, name = %draft.name, "creating cake decoration");
        let url = self.endpoint(&["cake_decorations"])?;
        let envelope = self
            .save_decoration(self.http.post(url).json(&draft))
            .await
            .inspect_err(|err| {
                error!(decoration_type = %draft.decoration_type, error = %err, "failed to create cake decoration")
            })?;
        self.invalidator.revalidate_path(INGREDIENTS_PATH);
        Ok(envelope.data)
    }

    async fn update_cake_decoration(
        &self,
        decoration_id: &DecorationId,
        draft: CakeDecorationDraft,
    ) -> Result<CakeDecorationItem, ActionError> {
        info!(decoration_id = %decoration_id, "updating cake decoration");
        let url = self.endpoint(&["cake_decorations", decoration_id.as_str()])?;
        let envelope = self
            .save_decoration(self.http.put(url).json(&draft))
            .await
            .inspect_err(|err| {
                error!(decoration_id = %decoration_id, error = %err, "failed to update cake decoration")
            })?;
        self.invalidator.revalidate_path(INGREDIENTS_PATH);
        Ok(envelope.data)
    }

    async fn delete_cake_decoration(
        &self,
        decoration_id: &DecorationId,
    ) -> Result<(), ActionError> {
        info!(decoration_id = %decoration_id, "deleting cake decoration");
        let url = self.endpoint(&["cake_decorations", decoration_id.as_str()])?;
        self.send_mutation(self.http.delete(url))
            .await
            .inspect_err(|err| {
                error!(decoration_id = %decoration_id, error = %err, "failed to delete cake decoration")
            })?;
        self.invalidator.revalidate_path(INGREDIENTS_PATH);
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
