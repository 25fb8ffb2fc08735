//! Domain types shared by the transport and orchestration layers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reduction applied to the matches of a [`FileSpec::Pattern`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFilter {
    /// Keep only the most recently modified match
    Latest,
}

/// Which files an operation acts on
///
/// Deserializes from a bare string, a list of strings, or a
/// `{ pattern, filter }` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FileSpec {
    Single(String),
    List(Vec<String>),
    Pattern {
        pattern: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filter: Option<FileFilter>,
    },
}

impl FileSpec {
    pub fn pattern(pattern: impl Into<String>) -> Self {
        FileSpec::Pattern {
            pattern: pattern.into(),
            filter: None,
        }
    }

    pub fn latest(pattern: impl Into<String>) -> Self {
        FileSpec::Pattern {
            pattern: pattern.into(),
            filter: Some(FileFilter::Latest),
        }
    }

    /// Concrete paths, for the forms that need no expansion
    pub fn as_literal_paths(&self) -> Option<Vec<String>> {
        match self {
            FileSpec::Single(path) => Some(vec![path.clone()]),
            FileSpec::List(paths) => Some(paths.clone()),
            FileSpec::Pattern { .. } => None,
        }
    }
}

impl From<&str> for FileSpec {
    fn from(path: &str) -> Self {
        FileSpec::Single(path.to_string())
    }
}

impl From<Vec<String>> for FileSpec {
    fn from(paths: Vec<String>) -> Self {
        FileSpec::List(paths)
    }
}

impl fmt::Display for FileSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileSpec::Single(path) => write!(f, "{}", path),
            FileSpec::List(paths) => write!(f, "[{}]", paths.join(", ")),
            FileSpec::Pattern {
                pattern,
                filter: Some(FileFilter::Latest),
            } => write!(f, "{} (latest)", pattern),
            FileSpec::Pattern {
                pattern,
                filter: None,
            } => write!(f, "{}", pattern),
        }
    }
}

/// Application identity parsed from the package description (`config.xml`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppMetadata {
    /// Application identifier (`<tizen:application id>`)
    pub id: String,
    /// Widget identifier (`<widget id>`)
    pub uri: String,
    /// Package name (`<tizen:application package>`)
    pub package_name: String,
    /// Entry document (`<content src>`)
    pub content: String,
}
