/// Blocking HTTP client for the object store (JSON-RPC 1.1) and blob store
use super::{AssemblyRef, BlobHandle, ObjectAccessor, ObjectInfo};
use crate::core::config::RemoteConfig;
use crate::{AssemblyError, Result};
use reqwest::blocking::Client;
use serde_json::{json, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info};

pub struct WorkspaceClient {
    client: Client,
    workspace_url: String,
    blob_url: String,
    token: Option<String>,
}

impl WorkspaceClient {
    /// The token is forwarded as-is on every call
    pub fn new(config: &RemoteConfig, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("asmcache/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AssemblyError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            workspace_url: config.workspace_url.trim_end_matches('/').to_string(),
            blob_url: config.blob_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn call(&self, method: &str, params: Value) -> Result<Value> {
        let body = json!({
            "version": "1.1",
            "method": format!("Workspace.{}", method),
            "params": params,
            "id": uuid::Uuid::new_v4().to_string(),
        });

        let mut request = self.client.post(&self.workspace_url).json(&body);
        if let Some(token) = &self.token {
            request = request.header("Authorization", token);
        }

        debug!("Calling Workspace.{}", method);
        let response = request
            .send()
            .map_err(|e| AssemblyError::UpstreamFetch(format!("Workspace.{}: {}", method, e)))?;
        let status = response.status();
        let text = response
            .text()
            .map_err(|e| AssemblyError::UpstreamFetch(format!("Workspace.{}: {}", method, e)))?;

        let payload: Value = serde_json::from_str(&text).map_err(|_| {
            AssemblyError::UpstreamFetch(format!(
                "Workspace.{} returned status {} with a non-JSON body",
                method, status
            ))
        })?;

        if let Some(err) = payload.get("error").filter(|e| !e.is_null()) {
            let message = err
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| err.to_string());
            return Err(AssemblyError::UpstreamFetch(message));
        }
        if !status.is_success() {
            return Err(AssemblyError::UpstreamFetch(format!(
                "Workspace.{} returned status {}",
                method, status
            )));
        }

        payload
            .get("result")
            .and_then(|r| r.get(0))
            .cloned()
            .ok_or_else(|| {
                AssemblyError::UpstreamFetch(format!("Workspace.{} returned no result", method))
            })
    }
}

impl ObjectAccessor for WorkspaceClient {
    fn get_object_info(&self, reference: &AssemblyRef) -> Result<ObjectInfo> {
        let result = self.call(
            "get_object_info3",
            json!([{ "objects": [{ "ref": reference.as_str() }] }]),
        )?;
        let info = result
            .get("infos")
            .and_then(|infos| infos.get(0))
            .ok_or_else(|| AssemblyError::NotFound(format!("object info for {}", reference)))?;
        ObjectInfo::from_tuple(info)
    }

    fn get_fields(&self, reference: &AssemblyRef, included: &[String]) -> Result<Value> {
        let result = self.call(
            "get_objects2",
            json!([{ "objects": [{ "ref": reference.as_str(), "included": included }] }]),
        )?;
        result
            .get("data")
            .and_then(|data| data.get(0))
            .and_then(|object| object.get("data"))
            .cloned()
            .ok_or_else(|| AssemblyError::NotFound(format!("object data for {}", reference)))
    }

    fn stream_blob(&self, handle: &BlobHandle, dest: &Path) -> Result<u64> {
        let url = format!("{}/node/{}?download_raw", self.blob_url, handle.id);
        info!("Downloading blob {} into file: {}", handle.id, dest.display());

        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("OAuth {}", token));
        }
        let mut response = request
            .send()
            .map_err(|e| AssemblyError::UpstreamFetch(format!("blob {}: {}", handle.id, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(match parse_blob_error(&body) {
                Some(message) => AssemblyError::UpstreamFetch(message),
                None => {
                    error!("Couldn't parse response error content from blob store: {}", body);
                    AssemblyError::UpstreamFetch(format!(
                        "blob {} download failed with status {}",
                        handle.id, status
                    ))
                }
            });
        }

        let mut writer = BufWriter::new(File::create(dest)?);
        let written = response
            .copy_to(&mut writer)
            .map_err(|e| AssemblyError::UpstreamFetch(format!("blob {}: {}", handle.id, e)))?;
        writer.flush()?;
        Ok(written)
    }

    fn list_referencing_objects(&self, reference: &AssemblyRef) -> Result<Vec<ObjectInfo>> {
        let result = self.call(
            "list_referencing_objects",
            json!([[{ "ref": reference.as_str() }]]),
        )?;
        // One list of referrers per requested reference
        result
            .get(0)
            .and_then(Value::as_array)
            .map(|infos| infos.iter().map(ObjectInfo::from_tuple).collect())
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// First message of a blob-store `{"error": [...]}` body
fn parse_blob_error(body: &str) -> Option<String> {
    let payload: Value = serde_json::from_str(body).ok()?;
    payload
        .get("error")?
        .get(0)?
        .as_str()
        .map(str::to_string)
}
