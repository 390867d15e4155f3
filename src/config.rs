use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Ok, Result, bail};
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::catalog::LocationsMode;
use crate::core::heuristics::{DEFAULT_SIMILARITY_THRESHOLD, HeuristicKind};
use crate::core::release::{ObsoleteHandling, ReleaseOptions};
use crate::core::validate::Validators;

pub const CONFIG_FILE_NAME: &str = ".tsctlrc.json";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Catalog files, directories or glob patterns used when a command gets none.
    #[serde(default = "default_catalogs")]
    pub catalogs: Vec<String>,
    #[serde(default)]
    pub source_language: Option<String>,
    #[serde(default)]
    pub target_language: Option<String>,
    #[serde(default = "default_sort_contexts")]
    pub sort_contexts: bool,
    #[serde(default)]
    pub no_obsolete: bool,
    #[serde(default)]
    pub keep_obsolete: bool,
    /// Regexes matched against `extra-*` names that are not written back.
    #[serde(default)]
    pub drop_tags: Vec<String>,
    #[serde(default = "default_locations")]
    pub locations: LocationsMode,
    #[serde(default)]
    pub disabled_heuristics: Vec<HeuristicKind>,
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    #[serde(default)]
    pub phrase_books: Vec<String>,
    #[serde(default)]
    pub validators: Validators,
    #[serde(default)]
    pub release: ReleaseConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReleaseConfig {
    pub id_based: bool,
    pub drop_unfinished: bool,
    pub drop_identical_to_source: bool,
    /// Prefix for untranslated messages; they are left out when unset.
    pub mark_untranslated: Option<String>,
    pub obsolete_handling: ObsoleteHandling,
}

impl From<&ReleaseConfig> for ReleaseOptions {
    fn from(release: &ReleaseConfig) -> Self {
        ReleaseOptions {
            id_based: release.id_based,
            drop_unfinished: release.drop_unfinished,
            drop_identical_to_source: release.drop_identical_to_source,
            mark_untranslated_prefix: release.mark_untranslated.clone(),
            obsolete_handling: release.obsolete_handling,
        }
    }
}

fn default_catalogs() -> Vec<String> {
    vec!["translations".to_string()]
}

fn default_sort_contexts() -> bool {
    true
}

fn default_locations() -> LocationsMode {
    LocationsMode::Absolute
}

fn default_similarity_threshold() -> f64 {
    DEFAULT_SIMILARITY_THRESHOLD
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalogs: default_catalogs(),
            source_language: None,
            target_language: None,
            sort_contexts: default_sort_contexts(),
            no_obsolete: false,
            keep_obsolete: false,
            drop_tags: Vec::new(),
            locations: default_locations(),
            disabled_heuristics: Vec::new(),
            similarity_threshold: default_similarity_threshold(),
            phrase_books: Vec::new(),
            validators: Validators::default(),
            release: ReleaseConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Rejects invalid glob patterns and tag regexes, a similarity threshold
    /// outside `(0, 1]`, and asking to both keep and drop obsolete units.
    pub fn validate(&self) -> Result<()> {
        for (field, patterns) in [("catalogs", &self.catalogs), ("phraseBooks", &self.phrase_books)] {
            for pattern in patterns {
                if pattern.contains('*') || pattern.contains('?') {
                    Pattern::new(pattern).with_context(|| {
                        format!("Invalid glob pattern in '{}': \"{}\"", field, pattern)
                    })?;
                }
            }
        }

        for tag in &self.drop_tags {
            Regex::new(tag)
                .with_context(|| format!("Invalid regex in 'dropTags': \"{}\"", tag))?;
        }

        if !(self.similarity_threshold > 0.0 && self.similarity_threshold <= 1.0) {
            bail!(
                "'similarityThreshold' must be in (0, 1], got {}",
                self.similarity_threshold
            );
        }

        if self.no_obsolete && self.keep_obsolete {
            bail!("'noObsolete' and 'keepObsolete' cannot both be set");
        }

        Ok(())
    }

    /// All `dropTags` combined into one regex, or `None` when empty.
    pub fn drop_tags_regex(&self) -> Result<Option<Regex>> {
        if self.drop_tags.is_empty() {
            return Ok(None);
        }
        let combined = self
            .drop_tags
            .iter()
            .map(|tag| format!("(?:{})", tag))
            .collect::<Vec<_>>()
            .join("|");
        let regex = Regex::new(&combined).context("Invalid regex in 'dropTags'")?;
        Ok(Some(regex))
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
    /// Directory relative paths in the config are resolved against.
    pub base_dir: PathBuf,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            let base_dir = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| start_dir.to_path_buf());
            Ok(ConfigLoadResult {
                config,
                from_file: true,
                base_dir,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
            base_dir: start_dir.to_path_buf(),
        }),
    }
}
