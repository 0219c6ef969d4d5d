// src/watch/filter.rs

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::errors::{Result, WatchError};

/// Decides whether a change on `location` is relevant.
pub trait Filter: Send + Sync + fmt::Debug {
    fn matches(&self, location: &str) -> bool;
}

/// Filter used when none is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl Filter for AcceptAll {
    fn matches(&self, _location: &str) -> bool {
        true
    }
}

/// Regular-expression filter. The pattern is searched anywhere in the
/// location, so anchor it (`^...$`) for whole-path matches.
#[derive(Debug, Clone)]
pub struct RegexFilter {
    re: Regex,
}

impl RegexFilter {
    pub fn new(pattern: &str) -> Result<Self> {
        let re = Regex::new(pattern).map_err(|source| WatchError::InvalidFilter {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { re })
    }

    pub fn as_str(&self) -> &str {
        self.re.as_str()
    }
}

impl Filter for RegexFilter {
    fn matches(&self, location: &str) -> bool {
        self.re.is_match(location)
    }
}

/// Build the filter for an optional pattern; empty or missing accepts all.
pub fn filter_from_pattern(pattern: Option<&str>) -> Result<Arc<dyn Filter>> {
    match pattern {
        Some(p) if !p.is_empty() => Ok(Arc::new(RegexFilter::new(p)?)),
        _ => Ok(Arc::new(AcceptAll)),
    }
}
