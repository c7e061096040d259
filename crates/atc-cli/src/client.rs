//! HTTP client for a running analysis server.

use anyhow::{Context, Result};
use atc_core::{
    AnalysisResult, Conflict, IngestResult, RawFlight, ResolutionCandidate, ResolutionSummary,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SubmittedAnalysis {
    pub analysis_id: String,
    #[serde(flatten)]
    pub analysis: AnalysisResult,
}

#[derive(Debug, Deserialize)]
pub struct ScoredResolutions {
    pub candidates: Vec<ResolutionCandidate>,
    pub summary: ResolutionSummary,
}

#[derive(Debug, Serialize)]
struct AnalysisRequest<'a> {
    flights: &'a [RawFlight],
    #[serde(skip_serializing_if = "Option::is_none")]
    step_sec: Option<i64>,
}

#[derive(Debug, Serialize)]
struct ScoreRequest<'a> {
    conflicts: &'a [Conflict],
}

/// Client for the analysis server's REST API.
pub struct AnalysisClient {
    base_url: String,
    client: reqwest::Client,
}

impl AnalysisClient {
    /// Create a client for a server such as `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Upload raw JSON or CSV text for validation.
    pub async fn ingest(&self, text: String) -> Result<IngestResult> {
        let url = format!("{}/v1/flights/ingest", self.base_url);
        let response = self
            .client
            .post(&url)
            .body(text)
            .send()
            .await
            .with_context(|| format!("failed to reach {url}"))?;
        read_response(response).await
    }

    pub async fn analyze(
        &self,
        flights: &[RawFlight],
        step_sec: Option<i64>,
    ) -> Result<SubmittedAnalysis> {
        let url = format!("{}/v1/analysis", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&AnalysisRequest { flights, step_sec })
            .send()
            .await
            .with_context(|| format!("failed to reach {url}"))?;
        read_response(response).await
    }

    pub async fn score(&self, conflicts: &[Conflict]) -> Result<ScoredResolutions> {
        let url = format!("{}/v1/resolutions/score", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&ScoreRequest { conflicts })
            .send()
            .await
            .with_context(|| format!("failed to reach {url}"))?;
        read_response(response).await
    }
}

/// Decode a success body, or surface the server's error message.
async fn read_response<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body: serde_json::Value = response.json().await.unwrap_or_default();
        let message = body["message"]
            .as_str()
            .or_else(|| body["error"].as_str())
            .unwrap_or("no details");
        anyhow::bail!("server returned {status}: {message}");
    }
    response
        .json()
        .await
        .context("failed to decode server response")
}
