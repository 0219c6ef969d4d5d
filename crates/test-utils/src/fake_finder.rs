use std::path::PathBuf;

use watchrun::errors::{Result, WatchError};
use watchrun::watch::{Finder, FinderResults};

/// A finder that returns a fixed set of locations, or a fixed error.
#[derive(Debug, Clone)]
pub struct StaticFinder {
    locations: Vec<PathBuf>,
    failing: bool,
}

impl StaticFinder {
    pub fn new<I, P>(locations: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            locations: locations.into_iter().map(Into::into).collect(),
            failing: false,
        }
    }

    /// `find()` fails with [`WatchError::EmptyGlob`].
    pub fn failing() -> Self {
        Self {
            locations: Vec::new(),
            failing: true,
        }
    }
}

impl Finder for StaticFinder {
    fn find(&self) -> Result<FinderResults> {
        if self.failing {
            return Err(WatchError::EmptyGlob("static".to_string()));
        }
        Ok(FinderResults {
            locations: self.locations.clone(),
            excluded: Vec::new(),
        })
    }

    fn match_spec(&self) -> &str {
        "static"
    }
}
