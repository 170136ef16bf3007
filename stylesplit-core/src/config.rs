use crate::types::Bucket;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Default value functions for serde
fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_stylesheet() -> PathBuf {
    PathBuf::from("src/App.css")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("src/styles")
}

fn default_entry_file() -> PathBuf {
    PathBuf::from("src/App.tsx")
}

fn default_entry_import_from() -> String {
    "import './App.css'".to_string()
}

fn default_entry_import_to() -> String {
    "import './styles/globals.css'".to_string()
}

fn default_page_import_base() -> String {
    "../styles".to_string()
}

fn default_pages() -> Vec<PageConfig> {
    [
        ("HomePage.tsx", Bucket::Home),
        ("WatchPage.tsx", Bucket::Watch),
        ("AboutPage.tsx", Bucket::About),
        ("ConnectPage.tsx", Bucket::Connect),
        ("GroupsPage.tsx", Bucket::Groups),
        ("EventsPage.tsx", Bucket::Events),
    ]
    .into_iter()
    .map(|(file, bucket)| PageConfig {
        path: Path::new("src/pages").join(file),
        bucket,
    })
    .collect()
}

fn default_grouping_prefixes() -> Vec<String> {
    vec!["@media".to_string()]
}

fn default_rules() -> Vec<ClassificationRuleConfig> {
    fn rule(bucket: Bucket, markers: &[&str]) -> ClassificationRuleConfig {
        ClassificationRuleConfig {
            bucket,
            markers: markers.iter().map(|m| m.to_string()).collect(),
        }
    }

    vec![
        // Page sections, first match wins
        rule(Bucket::About, &[".about-"]),
        rule(Bucket::Connect, &[".connect-"]),
        rule(Bucket::Groups, &[".groups-"]),
        rule(Bucket::Watch, &[".watch-"]),
        rule(Bucket::Home, &[".welcome-", ".latest-", ".next-", ".hero-", ".video-"]),
        rule(Bucket::Events, &[".events-"]),
        // Site shell and shared utilities
        rule(
            Bucket::Globals,
            &[
                "html",
                "body",
                ".app-shell",
                ".site-header",
                ".nav-",
                ".brand",
                ".logo-",
                ".action-",
                ".page-content",
                ".page",
                ".site-footer",
                ".sr-only",
            ],
        ),
        rule(Bucket::Globals, &["@keyframes"]),
    ]
}

fn default_fallback() -> Bucket {
    Bucket::Globals
}

/// Everything a migration run needs to know about the project layout.
/// Relative paths are resolved against `root`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Project directory all other paths are relative to
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// The monolithic stylesheet to split
    #[serde(default = "default_stylesheet")]
    pub stylesheet: PathBuf,
    /// Directory receiving one `<bucket>.css` per bucket
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Entry file holding the original stylesheet import
    #[serde(default = "default_entry_file")]
    pub entry_file: PathBuf,
    /// Exact import text replaced in the entry file
    #[serde(default = "default_entry_import_from")]
    pub entry_import_from: String,
    /// Replacement import text pointing at the global stylesheet
    #[serde(default = "default_entry_import_to")]
    pub entry_import_to: String,
    /// Import path prefix used when adding a page's stylesheet import
    #[serde(default = "default_page_import_base")]
    pub page_import_base: String,
    /// Page files and the bucket each one imports
    #[serde(default = "default_pages")]
    pub pages: Vec<PageConfig>,
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageConfig {
    pub path: PathBuf,
    pub bucket: Bucket,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Rules evaluated in order; the first rule with a marker found in the header wins
    #[serde(default = "default_rules")]
    pub rules: Vec<ClassificationRuleConfig>,
    /// Header prefixes marking grouping rules whose body holds nested rules
    #[serde(default = "default_grouping_prefixes")]
    pub grouping_prefixes: Vec<String>,
    /// Bucket used when no rule matches, and for grouping rules whose
    /// nested rules disagree
    #[serde(default = "default_fallback")]
    pub fallback: Bucket,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            rules: default_rules(),
            grouping_prefixes: default_grouping_prefixes(),
            fallback: default_fallback(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationRuleConfig {
    pub bucket: Bucket,
    /// Literal substrings; any one of them selects `bucket`
    pub markers: Vec<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("classification rule for '{bucket}' has an empty marker")]
    EmptyMarker { bucket: Bucket },
    #[error("grouping prefix list contains an empty prefix")]
    EmptyGroupingPrefix,
    #[error("page {0} is listed more than once")]
    DuplicatePage(PathBuf),
    #[error("entry import text must not be empty")]
    EmptyEntryImport,
}

impl MigrationConfig {
    /// Load config from a YAML file. Missing fields take their defaults.
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path}"))?;
        let config: MigrationConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {path}"))?;
        Ok(config)
    }

    /// Load the given config file, or the defaults when no file is given.
    /// A file that is missing or does not parse is an error.
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entry_import_from.is_empty() {
            return Err(ConfigError::EmptyEntryImport);
        }

        for rule in &self.classifier.rules {
            if rule.markers.iter().any(String::is_empty) {
                return Err(ConfigError::EmptyMarker { bucket: rule.bucket });
            }
        }
        if self.classifier.grouping_prefixes.iter().any(String::is_empty) {
            return Err(ConfigError::EmptyGroupingPrefix);
        }

        let mut seen = HashSet::new();
        for page in &self.pages {
            if !seen.insert(&page.path) {
                return Err(ConfigError::DuplicatePage(page.path.clone()));
            }
        }

        Ok(())
    }

    /// Resolve a configured path against `root`. Absolute paths are kept as-is.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn stylesheet_path(&self) -> PathBuf {
        self.resolve(&self.stylesheet)
    }

    pub fn output_dir_path(&self) -> PathBuf {
        self.resolve(&self.output_dir)
    }

    pub fn entry_file_path(&self) -> PathBuf {
        self.resolve(&self.entry_file)
    }
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            stylesheet: default_stylesheet(),
            output_dir: default_output_dir(),
            entry_file: default_entry_file(),
            entry_import_from: default_entry_import_from(),
            entry_import_to: default_entry_import_to(),
            page_import_base: default_page_import_base(),
            pages: default_pages(),
            classifier: ClassifierConfig::default(),
        }
    }
}
