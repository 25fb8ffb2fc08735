//! Application identity from the widget's `config.xml`
//!
//! The package description is read once, on first use, and the parsed
//! [`AppMetadata`] is kept for the lifetime of the [`PackageConfig`].

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tokio::sync::OnceCell;
use tzb_core::prelude::*;
use tzb_core::AppMetadata;

/// Default package description file name
pub const DEFAULT_CONFIG_XML: &str = "config.xml";

static WIDGET_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<widget\b[^>]*>").expect("Invalid widget regex"));

/// `<tizen:application .../>`, namespace prefix optional
static APPLICATION_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(?:[\w-]+:)?application\b[^>]*>").expect("Invalid application regex")
});

static CONTENT_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<content\b[^>]*>").expect("Invalid content regex"));

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("Invalid comment regex"));

/// `name="value"` or `name='value'` inside a start tag
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\s([\w:.-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("Invalid attribute regex")
});

/// Value of attribute `name` inside a start tag
fn attribute(tag: &str, name: &str) -> Option<String> {
    ATTRIBUTE
        .captures_iter(tag)
        .find(|caps| &caps[1] == name)
        .and_then(|caps| caps.get(2).or_else(|| caps.get(3)))
        .map(|m| m.as_str().to_string())
}

fn required(
    content: &str,
    tag: &Regex,
    tag_name: &str,
    attr: &str,
) -> std::result::Result<String, String> {
    let start_tag = tag
        .find(content)
        .ok_or_else(|| format!("missing <{}> element", tag_name))?;
    attribute(start_tag.as_str(), attr)
        .ok_or_else(|| format!("<{}> has no '{}' attribute", tag_name, attr))
}

/// Parse the identity fields out of a `config.xml` document
pub fn parse_config_xml(path: &Path, content: &str) -> Result<AppMetadata> {
    let content = COMMENT.replace_all(content, "");
    let parse = || -> std::result::Result<AppMetadata, String> {
        Ok(AppMetadata {
            uri: required(&content, &WIDGET_TAG, "widget", "id")?,
            id: required(&content, &APPLICATION_TAG, "tizen:application", "id")?,
            package_name: required(&content, &APPLICATION_TAG, "tizen:application", "package")?,
            content: required(&content, &CONTENT_TAG, "content", "src")?,
        })
    };
    parse().map_err(|message| Error::package_config(path, message))
}

/// Lazily parsed, cached package description
#[derive(Debug)]
pub struct PackageConfig {
    path: PathBuf,
    meta: OnceCell<AppMetadata>,
}

impl PackageConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            meta: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Point at another file. Metadata that was already parsed is kept.
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = path.into();
    }

    /// Parsed metadata, reading the file on first call only
    pub async fn meta(&self) -> Result<&AppMetadata> {
        self.meta
            .get_or_try_init(|| async {
                debug!("Reading package description {}", self.path.display());
                let content = tokio::fs::read_to_string(&self.path)
                    .await
                    .map_err(|e| Error::package_config(&self.path, e.to_string()))?;
                let meta = parse_config_xml(&self.path, &content)?;
                info!("Package {} / application {}", meta.package_name, meta.id);
                Ok(meta)
            })
            .await
    }
}
