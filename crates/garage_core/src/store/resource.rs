//! Resource path resolution.
//!
//! # Responsibility
//! - Map `garage://cars` and `garage://cars/{id}` paths onto routing
//!   targets.
//!
//! # Invariants
//! - Anything that is not the collection or a well-formed numeric item
//!   path is unroutable, never silently defaulted.

use crate::contract;
use crate::store::{StoreError, StoreResult};
use regex::Regex;
use std::fmt::{Display, Formatter};

/// Resolved addressing target for one store call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// The whole cars table.
    Collection,
    /// One row addressed by storage id.
    Item(i64),
}

impl Resource {
    /// Renders the canonical URI for this resource.
    pub fn uri(&self) -> String {
        match self {
            Self::Collection => contract::collection_uri(),
            Self::Item(id) => contract::item_uri(*id),
        }
    }
}

impl Display for Resource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.uri())
    }
}

/// Instance-owned route table.
///
/// Each store builds its own compiled route set at construction; there is
/// no process-wide matcher state.
#[derive(Debug)]
pub struct ResourceRouter {
    scheme_prefix: String,
    collection: Regex,
    item: Regex,
}

impl ResourceRouter {
    pub fn new() -> Self {
        let path = regex::escape(contract::PATH_CARS);
        // Both patterns are derived from contract constants and are
        // checked by the route table unit tests, so compilation is
        // infallible here.
        Self {
            scheme_prefix: format!("{}://", contract::AUTHORITY),
            collection: Regex::new(&format!("^{path}$")).expect("collection route pattern"),
            item: Regex::new(&format!("^{path}/([0-9]+)$")).expect("item route pattern"),
        }
    }

    /// Resolves a collection or item path.
    ///
    /// Accepts the full `garage://` URI or the bare path form. Fails with
    /// `InvalidResource` for anything else, including non-numeric ids and
    /// ids too large for storage.
    pub fn resolve(&self, path: &str) -> StoreResult<Resource> {
        let trimmed = path.trim();
        let relative = trimmed.strip_prefix(&self.scheme_prefix).unwrap_or(trimmed);

        if self.collection.is_match(relative) {
            return Ok(Resource::Collection);
        }
        if let Some(captures) = self.item.captures(relative) {
            let id = captures[1]
                .parse::<i64>()
                .map_err(|_| StoreError::InvalidResource(path.to_string()))?;
            return Ok(Resource::Item(id));
        }

        Err(StoreError::InvalidResource(path.to_string()))
    }
}

impl Default for ResourceRouter {
    fn default() -> Self {
        Self::new()
    }
}
