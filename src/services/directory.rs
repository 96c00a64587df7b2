use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::models::{Candidate, CandidateKind, Counselor, PersonRecord, SupportGroup};
use crate::services::store::{CandidateStore, ProfileStore, StoreError};

/// Errors that can occur when talking to the directory service.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    Api(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid response format: {0}")]
    InvalidResponse(String),
}

/// Collection IDs in the directory service.
#[derive(Debug, Clone)]
pub struct DirectoryCollections {
    pub persons: String,
    pub counselors: String,
    pub support_groups: String,
}

/// Client for the platform's document directory.
///
/// The directory owns person profiles and the candidate pool (counselors and
/// support groups); this service only reads them. Candidate documents decode
/// their stored attribute sets once at load (see the tolerant set
/// deserializer on the models).
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    base_url: String,
    api_key: String,
    client: Client,
    collections: DirectoryCollections,
}

impl DirectoryClient {
    pub fn new(base_url: String, api_key: String, collections: DirectoryCollections) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            client,
            collections,
        }
    }

    /// Fetch documents from a collection with the given query filters.
    async fn fetch_documents(
        &self,
        collection: &str,
        queries: &[String],
    ) -> Result<Vec<Value>, DirectoryError> {
        let queries_json = serde_json::to_string(queries)
            .map_err(|e| DirectoryError::InvalidResponse(format!("Bad query encoding: {}", e)))?;
        let encoded_queries = urlencoding::encode(&queries_json);

        let url = format!(
            "{}/collections/{}/documents?query={}",
            self.base_url.trim_end_matches('/'),
            collection,
            encoded_queries
        );

        tracing::debug!("Fetching directory documents: {}", url);

        let response = self
            .client
            .get(&url)
            .header("X-Directory-Key", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DirectoryError::Api(format!(
                "Directory query against {} failed: {}",
                collection,
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        let documents = json
            .get("documents")
            .and_then(|d| d.as_array())
            .ok_or_else(|| DirectoryError::InvalidResponse("Missing documents array".into()))?;

        Ok(documents
            .iter()
            .map(|doc| doc.get("data").unwrap_or(doc).clone())
            .collect())
    }

    /// Fetch a person record by id.
    pub async fn get_person_doc(&self, person_id: &str) -> Result<PersonRecord, DirectoryError> {
        let queries = vec![format!("equal(\"personId\", \"{}\")", person_id)];
        let documents = self
            .fetch_documents(&self.collections.persons, &queries)
            .await?;

        let doc = documents
            .into_iter()
            .next()
            .ok_or_else(|| DirectoryError::NotFound(format!("Person {} not found", person_id)))?;

        serde_json::from_value(doc)
            .map_err(|e| DirectoryError::InvalidResponse(format!("Failed to parse person: {}", e)))
    }

    /// List counselors currently taking clients.
    pub async fn list_counselors(&self) -> Result<Vec<Counselor>, DirectoryError> {
        let queries = vec!["equal(\"status\", \"AVAILABLE\")".to_string()];
        let documents = self
            .fetch_documents(&self.collections.counselors, &queries)
            .await?;

        Ok(decode_candidates(documents, "counselor"))
    }

    /// List active groups, dropping those already at capacity.
    pub async fn list_groups(&self) -> Result<Vec<SupportGroup>, DirectoryError> {
        let queries = vec!["equal(\"status\", \"ACTIVE\")".to_string()];
        let documents = self
            .fetch_documents(&self.collections.support_groups, &queries)
            .await?;

        let mut groups: Vec<SupportGroup> = decode_candidates(documents, "group");
        groups.retain(SupportGroup::has_capacity);
        Ok(groups)
    }

    pub async fn get_counselor(&self, counselor_id: &str) -> Result<Counselor, DirectoryError> {
        let queries = vec![format!("equal(\"counselorId\", \"{}\")", counselor_id)];
        let documents = self
            .fetch_documents(&self.collections.counselors, &queries)
            .await?;

        let doc = documents.into_iter().next().ok_or_else(|| {
            DirectoryError::NotFound(format!("Counselor {} not found", counselor_id))
        })?;

        serde_json::from_value(doc).map_err(|e| {
            DirectoryError::InvalidResponse(format!("Failed to parse counselor: {}", e))
        })
    }

    pub async fn get_group(&self, group_id: &str) -> Result<SupportGroup, DirectoryError> {
        let queries = vec![format!("equal(\"groupId\", \"{}\")", group_id)];
        let documents = self
            .fetch_documents(&self.collections.support_groups, &queries)
            .await?;

        let doc = documents
            .into_iter()
            .next()
            .ok_or_else(|| DirectoryError::NotFound(format!("Group {} not found", group_id)))?;

        serde_json::from_value(doc)
            .map_err(|e| DirectoryError::InvalidResponse(format!("Failed to parse group: {}", e)))
    }
}

/// Decode candidate documents, skipping ones that are beyond repair.
///
/// Set-level corruption is already absorbed by the tolerant set decoding on
/// the models; a document failing here is missing its identity fields.
fn decode_candidates<T: serde::de::DeserializeOwned>(documents: Vec<Value>, label: &str) -> Vec<T> {
    documents
        .into_iter()
        .filter_map(|doc| match serde_json::from_value(doc) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Skipping undecodable {} document: {}", label, e);
                None
            }
        })
        .collect()
}

impl ProfileStore for DirectoryClient {
    async fn get_person(&self, person_id: &str) -> Result<PersonRecord, StoreError> {
        self.get_person_doc(person_id).await.map_err(to_store_error)
    }
}

impl CandidateStore for DirectoryClient {
    async fn list_eligible(&self, kind: CandidateKind) -> Result<Vec<Candidate>, StoreError> {
        match kind {
            CandidateKind::Counselor => Ok(self
                .list_counselors()
                .await
                .map_err(to_store_error)?
                .into_iter()
                .map(Candidate::Counselor)
                .collect()),
            CandidateKind::Group => Ok(self
                .list_groups()
                .await
                .map_err(to_store_error)?
                .into_iter()
                .map(Candidate::Group)
                .collect()),
        }
    }

    async fn get_candidate(
        &self,
        candidate_id: &str,
        kind: CandidateKind,
    ) -> Result<Candidate, StoreError> {
        match kind {
            CandidateKind::Counselor => self
                .get_counselor(candidate_id)
                .await
                .map(Candidate::Counselor)
                .map_err(to_store_error),
            CandidateKind::Group => self
                .get_group(candidate_id)
                .await
                .map(Candidate::Group)
                .map_err(to_store_error),
        }
    }
}

fn to_store_error(err: DirectoryError) -> StoreError {
    match err {
        DirectoryError::NotFound(what) => StoreError::NotFound(what),
        other => StoreError::Unavailable(other.to_string()),
    }
}
