//! Filename filtering for raw filesystem notifications.

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::error::Result;

/// Decides which file names are eligible for debounced publishing.
///
/// Temp patterns always exclude. When the allow list is non-empty a name
/// must additionally match at least one of its globs. Both lists match
/// against the bare file name, never the full path.
#[derive(Debug)]
pub(crate) struct EventFilter {
    allow: Option<GlobSet>,
    deny: GlobSet,
}

impl EventFilter {
    /// Compile the configured glob lists. An empty allow list means every
    /// non-temp file qualifies.
    pub(crate) fn new(
        filename_patterns: &[String],
        ignore_temp_files: &[String],
    ) -> Result<Self> {
        let allow = if filename_patterns.is_empty() {
            None
        } else {
            Some(build_glob_set(filename_patterns)?)
        };
        Ok(Self {
            allow,
            deny: build_glob_set(ignore_temp_files)?,
        })
    }

    /// Whether a file with this name should be processed.
    pub(crate) fn allows(&self, file_name: &str) -> bool {
        if self.deny.is_match(file_name) {
            return false;
        }
        match &self.allow {
            None => true,
            Some(patterns) => patterns.is_match(file_name),
        }
    }
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
