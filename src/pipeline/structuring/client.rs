use serde::{Deserialize, Serialize};

use super::types::{StructuredQuestions, StructuringClient};
use super::StructuringError;
use crate::models::payloads::CandidateQuestion;

/// HTTP client for the text-structuring collaborator.
pub struct HttpStructuringClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpStructuringClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, StructuringError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| StructuringError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn post<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<R, StructuringError> {
        let url = format!("{}{endpoint}", self.base_url);
        let response = self.client.post(&url).json(body).send().map_err(|e| {
            if e.is_connect() {
                StructuringError::Connection(self.base_url.clone())
            } else {
                StructuringError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StructuringError::Service {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<R>()
            .map_err(|e| StructuringError::MalformedResponse(e.to_string()))
    }
}

#[derive(Serialize)]
struct StructureRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct StructureResponse {
    model: String,
    questions: Vec<CandidateQuestion>,
}

#[derive(Serialize)]
struct ProofreadRequest<'a> {
    inputs: &'a [String],
}

#[derive(Deserialize)]
struct ProofreadResponse {
    output: Vec<String>,
}

impl StructuringClient for HttpStructuringClient {
    fn structure(&self, text: &str) -> Result<StructuredQuestions, StructuringError> {
        let response: StructureResponse =
            self.post("/v1/structure", &StructureRequest { text })?;
        Ok(StructuredQuestions {
            model: response.model,
            questions: response.questions,
        })
    }

    fn proofread(&self, inputs: &[String]) -> Result<Vec<String>, StructuringError> {
        let response: ProofreadResponse =
            self.post("/v1/proofread", &ProofreadRequest { inputs })?;
        if response.output.len() != inputs.len() {
            return Err(StructuringError::MalformedResponse(format!(
                "proofread returned {} strings for {} inputs",
                response.output.len(),
                inputs.len()
            )));
        }
        Ok(response.output)
    }
}
