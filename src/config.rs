//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/aidtree/aidtree.toml`
//! 3. Local config: `./.aidtree.toml` (or an explicit `--config` file)
//! 4. Environment variables: `AIDTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{expand_env_vars, TreeOptions, YearRange, MAX_YEAR, MIN_YEAR};
use crate::infrastructure::traits::{is_remote, STDIN_LOCATION};

/// Public copy of the calamity dataset.
pub const DEFAULT_DATASET: &str =
    "https://raw.githubusercontent.com/FlightVin/Data-Viz-Labs/main/calamity-dataset.csv";

/// Route that receives the selected range as two path segments.
pub const DEFAULT_ROUTE_BASE: &str = "/aid-politics-yes";

/// Presentation options handed to the tree widget along with the data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    pub separation_siblings: f64,
    pub separation_non_siblings: f64,
    pub translate_x: f64,
    pub translate_y: f64,
    /// Distance between tree levels
    pub depth_factor: f64,
    pub root_class: String,
    pub branch_class: String,
    pub leaf_class: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            separation_siblings: 0.3,
            separation_non_siblings: 0.5,
            translate_x: 500.0,
            translate_y: 300.0,
            depth_factor: 200.0,
            root_class: "node__root".into(),
            branch_class: "node__branch".into(),
            leaf_class: "node__leaf".into(),
        }
    }
}

/// Raw tree labels for intermediate parsing (Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawTreeConfig {
    pub root_label: Option<String>,
    pub yes_label: Option<String>,
    pub no_label: Option<String>,
    pub name_width: Option<usize>,
}

/// Raw widget layout, merged key by key like the tree labels.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawLayoutConfig {
    pub separation_siblings: Option<f64>,
    pub separation_non_siblings: Option<f64>,
    pub translate_x: Option<f64>,
    pub translate_y: Option<f64>,
    pub depth_factor: Option<f64>,
    pub root_class: Option<String>,
    pub branch_class: Option<String>,
    pub leaf_class: Option<String>,
}

impl LayoutConfig {
    fn merge_with(&self, overlay: &RawLayoutConfig) -> Self {
        Self {
            separation_siblings: overlay
                .separation_siblings
                .unwrap_or(self.separation_siblings),
            separation_non_siblings: overlay
                .separation_non_siblings
                .unwrap_or(self.separation_non_siblings),
            translate_x: overlay.translate_x.unwrap_or(self.translate_x),
            translate_y: overlay.translate_y.unwrap_or(self.translate_y),
            depth_factor: overlay.depth_factor.unwrap_or(self.depth_factor),
            root_class: overlay
                .root_class
                .clone()
                .unwrap_or_else(|| self.root_class.clone()),
            branch_class: overlay
                .branch_class
                .clone()
                .unwrap_or_else(|| self.branch_class.clone()),
            leaf_class: overlay
                .leaf_class
                .clone()
                .unwrap_or_else(|| self.leaf_class.clone()),
        }
    }
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub dataset: Option<String>,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
    pub render_delay_ms: Option<u64>,
    pub route_base: Option<String>,
    pub tree: RawTreeConfig,
    pub layout: RawLayoutConfig,
}

/// Unified configuration for aidtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Dataset location: file path, http(s) URL, or `-` for stdin
    pub dataset: String,
    /// Default lower bound of the year range
    pub year_min: i32,
    /// Default upper bound of the year range
    pub year_max: i32,
    /// Pause before each tree build, in milliseconds
    pub render_delay_ms: u64,
    pub route_base: String,
    pub tree: TreeOptions,
    pub layout: LayoutConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dataset: DEFAULT_DATASET.into(),
            year_min: MIN_YEAR,
            year_max: MAX_YEAR,
            render_delay_ms: 0,
            route_base: DEFAULT_ROUTE_BASE.into(),
            tree: TreeOptions::default(),
            layout: LayoutConfig::default(),
        }
    }
}

/// Get the XDG config directory for aidtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "aidtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("aidtree.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".aidtree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> ApplicationResult<RawSettings> {
    let content = std::fs::read_to_string(path).with_path_context("read config", path)?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Default year range, validated.
    pub fn default_range(&self) -> ApplicationResult<YearRange> {
        Ok(YearRange::new(self.year_min, self.year_max)?)
    }

    /// Expand shell variables and tilde in a local dataset path.
    fn expand_paths(&mut self) {
        if !is_remote(&self.dataset) && self.dataset != STDIN_LOCATION {
            self.dataset = expand_env_vars(&self.dataset);
        }
    }

    /// Overlay config onto self: every specified value wins.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            dataset: overlay
                .dataset
                .clone()
                .unwrap_or_else(|| self.dataset.clone()),
            year_min: overlay.year_min.unwrap_or(self.year_min),
            year_max: overlay.year_max.unwrap_or(self.year_max),
            render_delay_ms: overlay.render_delay_ms.unwrap_or(self.render_delay_ms),
            route_base: overlay
                .route_base
                .clone()
                .unwrap_or_else(|| self.route_base.clone()),
            tree: TreeOptions {
                root_label: overlay
                    .tree
                    .root_label
                    .clone()
                    .unwrap_or_else(|| self.tree.root_label.clone()),
                yes_label: overlay
                    .tree
                    .yes_label
                    .clone()
                    .unwrap_or_else(|| self.tree.yes_label.clone()),
                no_label: overlay
                    .tree
                    .no_label
                    .clone()
                    .unwrap_or_else(|| self.tree.no_label.clone()),
                name_width: overlay.tree.name_width.unwrap_or(self.tree.name_width),
            },
            layout: self.layout.merge_with(&overlay.layout),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_config` - Explicit config file; must exist when given.
    ///   Without it, `./.aidtree.toml` is used if present.
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/aidtree/aidtree.toml`
    /// 3. Local config
    /// 4. Environment variables: `AIDTREE_*` prefix
    pub fn load(local_config: Option<&Path>) -> ApplicationResult<Self> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config
        match local_config {
            Some(path) => {
                if !path.exists() {
                    return Err(ApplicationError::Config {
                        message: format!("config file not found: {}", path.display()),
                    });
                }
                current = current.merge_with(&load_raw_settings(path)?);
            }
            None => {
                let path = local_config_path(Path::new("."));
                if path.exists() {
                    current = current.merge_with(&load_raw_settings(&path)?);
                }
            }
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();

        Ok(current)
    }

    /// Apply AIDTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> ApplicationResult<Self> {
        // Use config crate just for env var parsing
        let builder = Config::builder().add_source(
            Environment::with_prefix("AIDTREE")
                .prefix_separator("_")
                .separator("__"),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("dataset") {
            settings.dataset = val;
        }
        if let Ok(val) = config.get_int("year_min") {
            settings.year_min = int_setting("year_min", val)?;
        }
        if let Ok(val) = config.get_int("year_max") {
            settings.year_max = int_setting("year_max", val)?;
        }
        if let Ok(val) = config.get_int("render_delay_ms") {
            settings.render_delay_ms = int_setting("render_delay_ms", val)?;
        }
        if let Ok(val) = config.get_string("route_base") {
            settings.route_base = val;
        }
        if let Ok(val) = config.get_string("tree.root_label") {
            settings.tree.root_label = val;
        }
        if let Ok(val) = config.get_string("tree.yes_label") {
            settings.tree.yes_label = val;
        }
        if let Ok(val) = config.get_string("tree.no_label") {
            settings.tree.no_label = val;
        }
        if let Ok(val) = config.get_int("tree.name_width") {
            settings.tree.name_width = int_setting("tree.name_width", val)?;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> ApplicationResult<String> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        format!(
            r#"# aidtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/aidtree/aidtree.toml
#   Local:  ./.aidtree.toml (or --config FILE)
#   Env:    AIDTREE_* environment variables, e.g. AIDTREE_YEAR_MIN=1990,
#           AIDTREE_TREE__NAME_WIDTH=20

# Dataset: local CSV path, http(s) URL, or "-" for stdin
# dataset = "{dataset}"

# Default year range (inclusive, within {min}-{max})
# year_min = {min}
# year_max = {max}

# Pause before each tree build, in milliseconds
# render_delay_ms = 0

# Route receiving the range as /<min>/<max>
# route_base = "{route}"

[tree]
# root_label = "Appealed for aid?"
# yes_label = "Yes"
# no_label = "No"
# name_width = 14

[layout]
# separation_siblings = 0.3
# separation_non_siblings = 0.5
# translate_x = 500.0
# translate_y = 300.0
# depth_factor = 200.0
# root_class = "node__root"
# branch_class = "node__branch"
# leaf_class = "node__leaf"
"#,
            dataset = DEFAULT_DATASET,
            min = MIN_YEAR,
            max = MAX_YEAR,
            route = DEFAULT_ROUTE_BASE,
        )
    }

    /// Write the template to `path`, refusing to overwrite.
    pub fn write_template(path: &Path) -> ApplicationResult<()> {
        if path.exists() {
            return Err(ApplicationError::Config {
                message: format!("config already exists: {}", path.display()),
            });
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_path_context("create config dir", parent)?;
        }
        std::fs::write(path, Self::template()).with_path_context("write config", path)
    }
}

fn int_setting<T: TryFrom<i64>>(key: &str, value: i64) -> ApplicationResult<T> {
    T::try_from(value).map_err(|_| ApplicationError::Config {
        message: format!("{key}: value out of range: {value}"),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
