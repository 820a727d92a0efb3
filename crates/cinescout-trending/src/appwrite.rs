//! [`TrendingStore`] backed by an Appwrite collection over its REST API.
//!
//! Documents live at
//! `{endpoint}/databases/{database}/collections/{collection}/documents` and
//! keep the attribute names of the existing collection: `searchTerm`,
//! `movieTitle`, `title`, `movieId`, `posterPath`, `poster_url`,
//! `searchCount`, `lastSearched`. Queries go out as JSON-encoded
//! `queries[]` parameters.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cinescout_core::{AppConfig, TrendingEntry};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::store::{EntryUpdate, StoredEntry, TrendingStore};

const PROJECT_HEADER: &str = "X-Appwrite-Project";

/// Client for one Appwrite collection holding trending documents.
pub struct AppwriteStore {
    client: Client,
    project_id: String,
    documents_url: Url,
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Attribute set of a trending document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrendingAttributes {
    search_term: String,
    movie_title: String,
    #[serde(default)]
    title: Option<String>,
    movie_id: i64,
    #[serde(default)]
    poster_path: Option<String>,
    #[serde(rename = "poster_url", default)]
    poster_url: Option<String>,
    search_count: u64,
    #[serde(rename = "lastSearched")]
    last_searched: DateTime<Utc>,
}

impl From<&TrendingEntry> for TrendingAttributes {
    fn from(entry: &TrendingEntry) -> Self {
        Self {
            search_term: entry.search_term.clone(),
            movie_title: entry.movie_title.clone(),
            title: Some(entry.movie_title.clone()),
            movie_id: entry.movie_id,
            poster_path: entry.poster_path.clone(),
            poster_url: entry.poster_url.clone(),
            search_count: entry.search_count,
            last_searched: entry.last_searched_at,
        }
    }
}

impl From<TrendingAttributes> for TrendingEntry {
    fn from(attrs: TrendingAttributes) -> Self {
        let movie_title = if attrs.movie_title.is_empty() {
            attrs.title.unwrap_or_default()
        } else {
            attrs.movie_title
        };
        Self {
            movie_id: attrs.movie_id,
            search_term: attrs.search_term,
            movie_title,
            poster_path: attrs.poster_path,
            poster_url: attrs.poster_url,
            search_count: attrs.search_count,
            last_searched_at: attrs.last_searched,
        }
    }
}

/// A document as returned by Appwrite: system fields plus attributes.
#[derive(Debug, Deserialize)]
struct Document<T> {
    #[serde(rename = "$id")]
    id: String,
    #[serde(flatten)]
    data: T,
}

impl From<Document<TrendingAttributes>> for StoredEntry {
    fn from(doc: Document<TrendingAttributes>) -> Self {
        Self {
            document_id: doc.id,
            entry: doc.data.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DocumentList<T> {
    #[serde(default)]
    total: u64,
    documents: Vec<Document<T>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateDocument<'a> {
    document_id: &'a str,
    data: TrendingAttributes,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CounterPatch<'a> {
    search_term: &'a str,
    search_count: u64,
    #[serde(rename = "lastSearched")]
    last_searched: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct UpdateDocument<'a> {
    data: CounterPatch<'a>,
}

/// Appwrite's error body: `{"message": "...", "code": 404, "type": "..."}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

// ---------------------------------------------------------------------------
// Query builders
// ---------------------------------------------------------------------------

pub(crate) fn equal_query(attribute: &str, value: i64) -> String {
    serde_json::json!({ "method": "equal", "attribute": attribute, "values": [value] })
        .to_string()
}

pub(crate) fn order_desc_query(attribute: &str) -> String {
    serde_json::json!({ "method": "orderDesc", "attribute": attribute }).to_string()
}

pub(crate) fn limit_query(limit: usize) -> String {
    serde_json::json!({ "method": "limit", "values": [limit] }).to_string()
}

impl AppwriteStore {
    /// Creates a store for one collection.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotConfigured`] if any identifier is blank.
    /// - [`StoreError::InvalidEndpoint`] if `endpoint` is not an absolute URL.
    /// - [`StoreError::Transport`] if the `reqwest::Client` cannot be built.
    pub fn new(
        endpoint: &str,
        project_id: &str,
        database_id: &str,
        collection_id: &str,
        timeout_secs: u64,
    ) -> Result<Self, StoreError> {
        for (name, value) in [
            ("endpoint", endpoint),
            ("project_id", project_id),
            ("database_id", database_id),
            ("collection_id", collection_id),
        ] {
            if value.trim().is_empty() {
                return Err(StoreError::NotConfigured(name));
            }
        }

        let invalid = |reason: String| StoreError::InvalidEndpoint {
            url: endpoint.to_string(),
            reason,
        };
        let mut documents_url =
            Url::parse(endpoint.trim_end_matches('/')).map_err(|e| invalid(e.to_string()))?;
        documents_url
            .path_segments_mut()
            .map_err(|()| invalid("URL cannot be used as a base".to_string()))?
            .pop_if_empty()
            .extend([
                "databases",
                database_id,
                "collections",
                collection_id,
                "documents",
            ]);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("cinescout/0.1 (trending)")
            .build()?;

        Ok(Self {
            client,
            project_id: project_id.to_owned(),
            documents_url,
        })
    }

    /// Builds a store from the loaded application config.
    ///
    /// # Errors
    ///
    /// See [`AppwriteStore::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, StoreError> {
        Self::new(
            &config.appwrite_endpoint,
            &config.appwrite_project_id,
            &config.appwrite_database_id,
            &config.appwrite_collection_id,
            config.appwrite_request_timeout_secs,
        )
    }

    fn document_url(&self, document_id: &str) -> Url {
        let mut url = self.documents_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(document_id);
        }
        url
    }

    async fn list_documents(
        &self,
        queries: &[String],
    ) -> Result<DocumentList<TrendingAttributes>, StoreError> {
        let params: Vec<(&str, &str)> = queries.iter().map(|q| ("queries[]", q.as_str())).collect();
        let request = self
            .client
            .get(self.documents_url.clone())
            .query(&params);
        self.send(request, "listDocuments").await
    }

    /// Adds the project header, sends, and decodes a 2xx body into `T`.
    ///
    /// Non-2xx answers become [`StoreError::Status`] carrying Appwrite's
    /// `message` when the body has one, the raw body otherwise.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<T, StoreError> {
        let response = request
            .header(PROJECT_HEADER, &self.project_id)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.message)
                .unwrap_or(body);
            return Err(StoreError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| StoreError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }
}

#[async_trait]
impl TrendingStore for AppwriteStore {
    async fn find_by_movie_id(&self, movie_id: i64) -> Result<StoredEntry, StoreError> {
        let list = self
            .list_documents(&[equal_query("movieId", movie_id), limit_query(1)])
            .await?;
        if list.total > 1 {
            tracing::warn!(movie_id, total = list.total, "duplicate trending documents for movie");
        }
        list.documents
            .into_iter()
            .next()
            .map(StoredEntry::from)
            .ok_or(StoreError::NotFound)
    }

    async fn create_entry(&self, entry: &TrendingEntry) -> Result<StoredEntry, StoreError> {
        let document_id = uuid::Uuid::new_v4().simple().to_string();
        let body = CreateDocument {
            document_id: &document_id,
            data: TrendingAttributes::from(entry),
        };
        let request = self.client.post(self.documents_url.clone()).json(&body);
        let doc: Document<TrendingAttributes> = self.send(request, "createDocument").await?;
        Ok(doc.into())
    }

    async fn update_entry(
        &self,
        document_id: &str,
        update: &EntryUpdate,
    ) -> Result<StoredEntry, StoreError> {
        let body = UpdateDocument {
            data: CounterPatch {
                search_term: &update.search_term,
                search_count: update.search_count,
                last_searched: update.last_searched_at,
            },
        };
        let request = self.client.patch(self.document_url(document_id)).json(&body);
        let doc: Document<TrendingAttributes> = self.send(request, "updateDocument").await?;
        Ok(doc.into())
    }

    async fn list_by_search_count(&self, limit: usize) -> Result<Vec<StoredEntry>, StoreError> {
        let list = self
            .list_documents(&[order_desc_query("searchCount"), limit_query(limit)])
            .await?;
        Ok(list.documents.into_iter().map(StoredEntry::from).collect())
    }
}
