// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! HTTP gateway to the annotation backend.
//!
//! Stateless request/response wrappers over the backend's fixed contract:
//! no caching, no retries.  Application-level failures (`success: false`
//! on an HTTP 200) surface as errors exactly like transport failures, so
//! callers have a single recovery path.
//!
//! Session actions are keyed by name against the `/api/sessions` family of
//! endpoints.

use anyhow::{anyhow, bail, Context, Result};
use reqwest::blocking::{multipart, Client};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::models::session::{
    ActionResponse, AugmentationInfoResponse, AugmentationProgress, GenerateParams,
    GenerateResponse, ProgressResponse, SavePayload, SaveResponse, SavedDataset, SessionSummary,
    SessionsResponse, StartAugmentationRequest, VariantInfo, VisualizeResponse,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct Gateway {
    base: String,
    client: Client,
}

impl Gateway {
    pub fn new(server: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            base: server.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .with_context(|| format!("GET {} failed", path))?
            .error_for_status()?;
        resp.json().with_context(|| format!("GET {}: malformed response", path))
    }

    /// `POST /generate`: upload a local image plus composition parameters,
    /// get back the composed canvas as a base64 data URL.
    pub fn generate(
        &self,
        file_name: &str,
        image: Vec<u8>,
        params: &GenerateParams,
    ) -> Result<String> {
        let form = multipart::Form::new()
            .part("image", multipart::Part::bytes(image).file_name(file_name.to_string()))
            .text("size", params.size.to_string())
            .text("x", params.x.to_string())
            .text("y", params.y.to_string())
            .text("random_bg", params.random_bg.to_string());
        let resp: GenerateResponse = self
            .client
            .post(self.url("/generate"))
            .multipart(form)
            .send()
            .context("POST /generate failed")?
            .error_for_status()?
            .json()
            .context("POST /generate: malformed response")?;
        Ok(resp.image)
    }

    /// `POST /save_annotations`: persist one annotated image into a session.
    pub fn save_annotations(&self, payload: &SavePayload) -> Result<SavedDataset> {
        let annotations = serde_json::to_string(&payload.annotations)?;
        let form = multipart::Form::new()
            .text("annotations", annotations)
            .text("filename", payload.filename.clone())
            .text("session_name", payload.session_name.clone())
            .text("image_width", payload.image_width.to_string())
            .text("image_height", payload.image_height.to_string())
            .text("image_data", payload.image_data.clone());
        let resp: SaveResponse = self
            .client
            .post(self.url("/save_annotations"))
            .multipart(form)
            .send()
            .context("POST /save_annotations failed")?
            .error_for_status()?
            .json()
            .context("POST /save_annotations: malformed response")?;

        if !resp.success {
            bail!(resp.message.unwrap_or_else(|| "save rejected by backend".to_string()));
        }
        Ok(SavedDataset {
            original_name: resp
                .original_name
                .unwrap_or_else(|| payload.filename.clone()),
            unique_name: resp
                .unique_name
                .ok_or_else(|| anyhow!("save response missing unique_name"))?,
            image_file: resp.files.as_ref().map(|f| f.image.clone()).unwrap_or_default(),
            labels_file: resp.files.map(|f| f.labels).unwrap_or_default(),
            yolo_format: resp.yolo_format,
        })
    }

    /// `GET /api/sessions`: all sessions with their image/label counts.
    pub fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        let resp: SessionsResponse = self.get_json("/api/sessions")?;
        if !resp.success {
            bail!(resp.message.unwrap_or_else(|| "failed to list sessions".to_string()));
        }
        Ok(resp.sessions)
    }

    /// `GET /download_session/{name}`: the session as a ZIP (images/ +
    /// labels/ in YOLO layout).
    pub fn download_session(&self, name: &str) -> Result<Vec<u8>> {
        let path = format!("/download_session/{}", name);
        let resp = self
            .client
            .get(self.url(&path))
            .send()
            .with_context(|| format!("GET {} failed", path))?
            .error_for_status()?;
        Ok(resp.bytes()?.to_vec())
    }

    /// `GET /api/session/{name}/visualize`: every image of the session with
    /// its annotations.
    pub fn visualize_session(&self, name: &str) -> Result<VisualizeResponse> {
        let resp: VisualizeResponse =
            self.get_json(&format!("/api/session/{}/visualize", name))?;
        if !resp.success {
            bail!(resp
                .message
                .unwrap_or_else(|| format!("failed to load session '{}'", name)));
        }
        Ok(resp)
    }

    /// `DELETE /delete_session/{name}`.  Returns the backend's message.
    pub fn delete_session(&self, name: &str) -> Result<String> {
        let path = format!("/delete_session/{}", name);
        let resp: ActionResponse = self
            .client
            .delete(self.url(&path))
            .send()
            .with_context(|| format!("DELETE {} failed", path))?
            .error_for_status()?
            .json()
            .with_context(|| format!("DELETE {}: malformed response", path))?;
        if !resp.success {
            bail!(resp
                .message
                .unwrap_or_else(|| format!("failed to delete session '{}'", name)));
        }
        Ok(resp
            .message
            .unwrap_or_else(|| format!("session '{}' deleted", name)))
    }

    /// `GET /api/session/{name}/augmentation/info`: variant metadata.
    pub fn augmentation_info(&self, name: &str) -> Result<BTreeMap<String, VariantInfo>> {
        let resp: AugmentationInfoResponse =
            self.get_json(&format!("/api/session/{}/augmentation/info", name))?;
        if !resp.success {
            bail!(resp
                .message
                .unwrap_or_else(|| "failed to load augmentation variants".to_string()));
        }
        Ok(resp.available_variants)
    }

    /// `POST /api/session/{name}/augmentation/start` with a JSON body naming
    /// the selected variants.
    pub fn start_augmentation(&self, name: &str, variants: &[String]) -> Result<()> {
        let path = format!("/api/session/{}/augmentation/start", name);
        let body = StartAugmentationRequest { variants: variants.to_vec() };
        let resp: ActionResponse = self
            .client
            .post(self.url(&path))
            .json(&body)
            .send()
            .with_context(|| format!("POST {} failed", path))?
            .error_for_status()?
            .json()
            .with_context(|| format!("POST {}: malformed response", path))?;
        if !resp.success {
            bail!(resp
                .message
                .unwrap_or_else(|| "augmentation rejected by backend".to_string()));
        }
        Ok(())
    }

    /// `GET /api/session/{name}/augmentation/progress`.
    pub fn augmentation_progress(&self, name: &str) -> Result<AugmentationProgress> {
        let resp: ProgressResponse =
            self.get_json(&format!("/api/session/{}/augmentation/progress", name))?;
        if !resp.success {
            bail!(resp
                .message
                .unwrap_or_else(|| "failed to read augmentation progress".to_string()));
        }
        Ok(AugmentationProgress {
            current: resp.current,
            total: resp.total,
            completed: resp.completed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let gw = Gateway::new("http://localhost:8000/").unwrap();
        assert_eq!(gw.url("/api/sessions"), "http://localhost:8000/api/sessions");
    }

    #[test]
    fn test_session_paths() {
        let gw = Gateway::new("http://localhost:8000").unwrap();
        assert_eq!(
            gw.url(&format!("/download_session/{}", "traffic")),
            "http://localhost:8000/download_session/traffic"
        );
        assert_eq!(
            gw.url(&format!("/api/session/{}/augmentation/progress", "traffic")),
            "http://localhost:8000/api/session/traffic/augmentation/progress"
        );
    }
}
