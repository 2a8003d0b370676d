//! Encyclopedia summary lookup backed by the MediaWiki API.
//!
//! Fetches the intro extract of an article in plain text and truncates it
//! to a configured number of sentences. Disambiguation pages and missing
//! pages are reported as typed errors so the caller can phrase a reply.

use crate::config::LookupConfig;
use crate::error::{LookupError, Result};
use crate::http;
use crate::types::Summary;
use serde::Deserialize;
use std::collections::HashMap;

/// MediaWiki summary client.
pub struct EncyclopediaClient {
    client: reqwest::Client,
    api_url: String,
}

/// Top-level MediaWiki query response.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    query: Option<QueryBody>,
}

#[derive(Debug, Deserialize)]
struct QueryBody {
    /// Keyed by page ID; `-1` marks a missing page.
    pages: HashMap<String, Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: Option<String>,
    extract: Option<String>,
    missing: Option<serde_json::Value>,
    pageprops: Option<PageProps>,
}

#[derive(Debug, Deserialize)]
struct PageProps {
    disambiguation: Option<serde_json::Value>,
}

impl EncyclopediaClient {
    /// Create a new client from the lookup configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &LookupConfig) -> Result<Self> {
        Ok(Self {
            client: http::build_client(config)?,
            api_url: config.encyclopedia_url.clone(),
        })
    }

    /// Fetch a plain-text summary of `query`, truncated to `sentences`.
    ///
    /// Redirects are followed server-side, so "einstein" resolves to the
    /// canonical article.
    ///
    /// # Errors
    ///
    /// - [`LookupError::NotFound`] when no article matches.
    /// - [`LookupError::Ambiguous`] when the query lands on a disambiguation
    ///   page.
    /// - [`LookupError::Http`] / [`LookupError::Parse`] for transport and
    ///   payload failures.
    pub async fn summary(&self, query: &str, sentences: usize) -> Result<Summary> {
        tracing::trace!(query, "encyclopedia lookup");

        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("prop", "extracts|pageprops"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", query),
            ])
            .send()
            .await
            .map_err(|e| LookupError::Http(format!("encyclopedia request failed: {e}")))?
            .error_for_status()
            .map_err(|e| LookupError::Http(format!("encyclopedia request rejected: {e}")))?;

        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| LookupError::Parse(format!("invalid encyclopedia response: {e}")))?;

        let pages = body
            .query
            .ok_or_else(|| LookupError::Parse("response has no query body".to_owned()))?
            .pages;

        let page = pages
            .into_values()
            .next()
            .ok_or_else(|| LookupError::NotFound(format!("no article for {query}")))?;

        if page.missing.is_some() {
            return Err(LookupError::NotFound(format!("no article for {query}")));
        }

        if page
            .pageprops
            .as_ref()
            .is_some_and(|props| props.disambiguation.is_some())
        {
            return Err(LookupError::Ambiguous(query.to_owned()));
        }

        let extract = page.extract.unwrap_or_default();
        if extract.trim().is_empty() {
            return Err(LookupError::NotFound(format!("no article for {query}")));
        }

        Ok(Summary {
            title: page.title.unwrap_or_else(|| query.to_owned()),
            extract: first_sentences(&extract, sentences),
        })
    }
}

/// Truncate `text` to its first `count` sentences.
///
/// A sentence ends at `.`, `!` or `?`. With `count == 0` the full text is
/// returned unchanged.
fn first_sentences(text: &str, count: usize) -> String {
    if count == 0 {
        return text.trim().to_owned();
    }

    let mut taken = 0usize;
    let mut end = text.len();
    for (idx, ch) in text.char_indices() {
        if matches!(ch, '.' | '!' | '?') {
            taken += 1;
            if taken == count {
                end = idx + ch.len_utf8();
                break;
            }
        }
    }
    text[..end].trim().to_owned()
}
