//! Field mapping form and list.
//!
//! [`MappingBook`] owns both the form being edited and the collection shown
//! under it, so a successful create lands in the list without any component
//! reaching into another one's state.
//!
//! The book is split into a pure part (`validate`, `record_*`) that a UI can
//! drive from its own event loop, and async helpers (`submit`, `load`) that
//! run a whole request cycle against a [`MapperApi`].

use tracing::debug;

use crate::api::MapperApi;
use crate::error::{ClientError, FieldErrors};
use crate::model::{FieldMapping, NewFieldMapping};
use crate::report::{Flow, Notice, Reporter};

pub const PLACEHOLDER: &str = "No mappings available.";
pub const API_FIELD_REQUIRED: &str = "API Field is required";
pub const DB_FIELD_REQUIRED: &str = "DB Field is required";
pub const MAPPING_ADDED: &str = "Mapping added successfully!";
pub const MAPPING_ADD_FAILED: &str = "Failed to add mapping.";
pub const MAPPINGS_LOAD_FAILED: &str = "Failed to load mappings.";

/// What the list area shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    Placeholder(&'static str),
    Rows(Vec<String>),
}

/// Result of a full submit cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The server created the record and it is now in the list.
    Added(FieldMapping),
    /// Validation failed; no request was made.
    Invalid(FieldErrors),
    /// The request failed.
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingBook {
    mappings: Vec<FieldMapping>,
    api_field: String,
    db_field: String,
    errors: FieldErrors,
    notice: Option<Notice>,
    loaded: bool,
}

impl MappingBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_api_field(&mut self, value: impl Into<String>) {
        self.api_field = value.into();
    }

    pub fn set_db_field(&mut self, value: impl Into<String>) {
        self.db_field = value.into();
    }

    pub fn api_field(&self) -> &str {
        &self.api_field
    }

    pub fn db_field(&self) -> &str {
        &self.db_field
    }

    pub fn errors(&self) -> FieldErrors {
        self.errors
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Records in server order, followed by ones created since the load.
    pub fn mappings(&self) -> &[FieldMapping] {
        &self.mappings
    }

    /// Whether the initial list request has settled.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Check both inputs and build the request body.
    ///
    /// Both fields are checked every time, so both messages can show at once.
    /// Blank input counts as empty; the body carries trimmed values.
    pub fn validate(&mut self) -> Result<NewFieldMapping, FieldErrors> {
        let api_field = self.api_field.trim();
        let db_field = self.db_field.trim();
        let errors = FieldErrors {
            api_field: api_field.is_empty().then_some(API_FIELD_REQUIRED),
            db_field: db_field.is_empty().then_some(DB_FIELD_REQUIRED),
        };
        self.errors = errors;

        if errors.is_empty() {
            Ok(NewFieldMapping::new(
                api_field.to_string(),
                db_field.to_string(),
            ))
        } else {
            Err(errors)
        }
    }

    /// Apply the settled create request.
    ///
    /// On success the record is added to the list and the form is reset.
    /// The server upserts by API field, so a returned id that is already
    /// listed replaces that entry instead of duplicating it.
    pub fn record_created(
        &mut self,
        result: Result<FieldMapping, ClientError>,
        reporter: &dyn Reporter,
    ) -> Notice {
        let notice = match result {
            Ok(mapping) => {
                match self.mappings.iter_mut().find(|m| m.id == mapping.id) {
                    Some(existing) => *existing = mapping,
                    None => self.mappings.push(mapping),
                }
                self.api_field.clear();
                self.db_field.clear();
                self.errors = FieldErrors::default();
                Notice::success(Flow::CreateMapping, MAPPING_ADDED)
            }
            Err(e) => {
                reporter.failure(Flow::CreateMapping, &e);
                Notice::error(Flow::CreateMapping, MAPPING_ADD_FAILED)
            }
        };
        self.notice = Some(notice.clone());
        notice
    }

    /// Apply the settled list request.
    ///
    /// Server order is kept as-is. Records created locally before a slow list
    /// response arrived stay at the end if the response does not contain them.
    pub fn record_listed(
        &mut self,
        result: Result<Vec<FieldMapping>, ClientError>,
        reporter: &dyn Reporter,
    ) {
        self.loaded = true;
        match result {
            Ok(mut fetched) => {
                let local: Vec<FieldMapping> = self
                    .mappings
                    .drain(..)
                    .filter(|m| !fetched.iter().any(|f| f.id == m.id))
                    .collect();
                debug!(
                    fetched = fetched.len(),
                    kept_local = local.len(),
                    "Mappings loaded."
                );
                fetched.extend(local);
                self.mappings = fetched;
            }
            Err(e) => {
                reporter.failure(Flow::ListMappings, &e);
                self.notice = Some(Notice::error(Flow::ListMappings, MAPPINGS_LOAD_FAILED));
            }
        }
    }

    pub fn listing(&self) -> Listing {
        if self.mappings.is_empty() {
            Listing::Placeholder(PLACEHOLDER)
        } else {
            Listing::Rows(self.mappings.iter().map(FieldMapping::arrow_line).collect())
        }
    }

    /// Validate, create, and fold the result into the book.
    pub async fn submit<A>(&mut self, api: &A, reporter: &dyn Reporter) -> SubmitOutcome
    where
        A: MapperApi + ?Sized,
    {
        let new_mapping = match self.validate() {
            Ok(new_mapping) => new_mapping,
            Err(errors) => return SubmitOutcome::Invalid(errors),
        };

        let result = api.create_mapping(&new_mapping).await;
        let created = result.as_ref().ok().cloned();
        self.record_created(result, reporter);

        match created {
            Some(mapping) => SubmitOutcome::Added(mapping),
            None => SubmitOutcome::Failed,
        }
    }

    /// Fetch the collection once and fold it into the book.
    pub async fn load<A>(&mut self, api: &A, reporter: &dyn Reporter) -> Listing
    where
        A: MapperApi + ?Sized,
    {
        let result = api.list_mappings().await;
        self.record_listed(result, reporter);
        self.listing()
    }
}
