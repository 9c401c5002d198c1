// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted import plugin for deterministic testing.
//!
//! `MockPlugin` implements `ImportPlugin` with canned records and search
//! results, counts every outbound call, and can be scripted to fail or to
//! block until the caller cancels.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use stockroom_core::{
    DataType, ImportData, ImportPlugin, PluginAttribute, SearchField, SearchResult,
    StockroomError,
};
use tokio_util::sync::CancellationToken;

/// How the mock answers a call.
#[derive(Debug, Clone)]
enum Behavior {
    Succeed,
    Fail(String),
    /// Block until the caller's token is cancelled.
    Hang,
}

/// Arguments of the most recent search call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCall {
    pub field: String,
    pub query: String,
    pub limit: usize,
}

/// A mock import plugin with call counters.
pub struct MockPlugin {
    id: String,
    name: String,
    category_name: String,
    enabled: bool,
    disabled_reason: Option<String>,
    search_fields: Vec<SearchField>,
    attributes: Vec<PluginAttribute>,
    records: HashMap<String, ImportData>,
    search_results: Vec<SearchResult>,
    search_behavior: Behavior,
    fetch_behavior: Behavior,
    search_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    last_search: Mutex<Option<SearchCall>>,
}

impl MockPlugin {
    /// A plugin with one `title` search field, no attributes, and no records.
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            category_name: id.to_string(),
            enabled: true,
            disabled_reason: None,
            search_fields: vec![SearchField::new("title", "Title")],
            attributes: Vec::new(),
            records: HashMap::new(),
            search_results: Vec::new(),
            search_behavior: Behavior::Succeed,
            fetch_behavior: Behavior::Succeed,
            search_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            last_search: Mutex::new(None),
        }
    }

    /// The `books` fixture: `isbn` and `author` attributes, records `X1` and `X2`.
    pub fn books() -> Self {
        let mut plugin = Self::new("books");
        plugin.name = "Book Metadata".to_string();
        plugin.category_name = "Books".to_string();
        plugin.search_fields = vec![
            SearchField::new("title", "Title"),
            SearchField::new("isbn", "ISBN"),
            SearchField::new("author", "Author"),
        ];
        plugin.attributes = vec![
            PluginAttribute::new("isbn", "ISBN", DataType::String, true),
            PluginAttribute::new("author", "Author", DataType::String, false),
        ];
        plugin
            .with_record(book_record("X1", "Dune", "Frank Herbert", "9780441013593"))
            .with_record(book_record(
                "X2",
                "The Left Hand of Darkness",
                "Ursula K. Le Guin",
                "9780441478125",
            ))
    }

    /// Marks the plugin itself as disabled.
    pub fn disabled(mut self, reason: &str) -> Self {
        self.enabled = false;
        self.disabled_reason = Some(reason.to_string());
        self
    }

    pub fn with_search_fields(mut self, fields: Vec<SearchField>) -> Self {
        self.search_fields = fields;
        self
    }

    pub fn with_attributes(mut self, attributes: Vec<PluginAttribute>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Adds (or replaces) a fetchable record keyed by its external id.
    pub fn with_record(mut self, record: ImportData) -> Self {
        self.records.insert(record.external_id.clone(), record);
        self
    }

    pub fn with_search_results(mut self, results: Vec<SearchResult>) -> Self {
        self.search_results = results;
        self
    }

    /// Every search fails with an upstream error carrying `message`.
    pub fn failing_search(mut self, message: &str) -> Self {
        self.search_behavior = Behavior::Fail(message.to_string());
        self
    }

    /// Every fetch fails with an upstream error carrying `message`.
    pub fn failing_fetch(mut self, message: &str) -> Self {
        self.fetch_behavior = Behavior::Fail(message.to_string());
        self
    }

    /// Search and fetch block until the caller cancels.
    pub fn hanging(mut self) -> Self {
        self.search_behavior = Behavior::Hang;
        self.fetch_behavior = Behavior::Hang;
        self
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn last_search(&self) -> Option<SearchCall> {
        self.last_search
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

/// Builds a book record with `author` and `isbn` attributes.
pub fn book_record(external_id: &str, title: &str, author: &str, isbn: &str) -> ImportData {
    let mut record = ImportData {
        external_id: external_id.to_string(),
        name: title.to_string(),
        description: Some(format!("{title} by {author}")),
        ..Default::default()
    };
    record
        .attributes
        .insert("author".to_string(), serde_json::json!(author));
    record
        .attributes
        .insert("isbn".to_string(), serde_json::json!(isbn));
    record
}

#[async_trait]
impl ImportPlugin for MockPlugin {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "scripted test plugin"
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn disabled_reason(&self) -> Option<&str> {
        self.disabled_reason.as_deref()
    }

    fn category_name(&self) -> &str {
        &self.category_name
    }

    fn category_description(&self) -> &str {
        "Records imported by the scripted test plugin"
    }

    fn search_fields(&self) -> &[SearchField] {
        &self.search_fields
    }

    fn attributes(&self) -> &[PluginAttribute] {
        &self.attributes
    }

    async fn search(
        &self,
        cancel: &CancellationToken,
        field: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>, StockroomError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        *self
            .last_search
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(SearchCall {
            field: field.to_string(),
            query: query.to_string(),
            limit,
        });

        match &self.search_behavior {
            Behavior::Succeed => Ok(self.search_results.iter().take(limit).cloned().collect()),
            Behavior::Fail(message) => Err(StockroomError::upstream(message.clone())),
            Behavior::Hang => {
                cancel.cancelled().await;
                Err(StockroomError::Cancelled)
            }
        }
    }

    async fn fetch(
        &self,
        cancel: &CancellationToken,
        external_id: &str,
    ) -> Result<ImportData, StockroomError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);

        match &self.fetch_behavior {
            Behavior::Succeed => self
                .records
                .get(external_id)
                .cloned()
                .ok_or_else(|| StockroomError::not_found("record", external_id)),
            Behavior::Fail(message) => Err(StockroomError::upstream(message.clone())),
            Behavior::Hang => {
                cancel.cancelled().await;
                Err(StockroomError::Cancelled)
            }
        }
    }
}
