//! Helpers shared by the multi-query stages

use serde_json::Value;
use std::collections::{HashMap, HashSet};

use crate::NamedResult;

/// Strip everything but ASCII letters and digits
pub fn sanitize_query_name(title: &str) -> String {
    title.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// Allocates query names that are unique within one request.
///
/// Titles that sanitize to the same key ("Half-Life" and "Half Life") get a
/// numeric suffix instead of overwriting each other in the response map.
#[derive(Debug, Default)]
pub struct QueryKeys {
    used: HashSet<String>,
}

impl QueryKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, title: &str) -> String {
        let mut base = sanitize_query_name(title);
        if base.is_empty() {
            base = "title".to_string();
        }

        if self.used.insert(base.clone()) {
            return base;
        }

        let mut suffix = 2;
        loop {
            let candidate = format!("{}_{}", base, suffix);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }
}

/// Index a multi-query response by query name
pub fn index_results(results: Vec<NamedResult>) -> HashMap<String, Vec<Value>> {
    results
        .into_iter()
        .map(|named| (named.name, named.result))
        .collect()
}

/// Number of chunks of `size` needed for `len` items
pub fn chunk_count(len: usize, size: usize) -> usize {
    len.div_ceil(size.max(1))
}
