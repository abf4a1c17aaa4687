//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/orgperf/orgperf.toml`
//! 3. Local config: `<dir>/.orgperf.toml` (relative paths resolve against `<dir>`)
//! 4. Environment variables: `ORGPERF_*` prefix, `__` between sections

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::aggregator::DEFAULT_TARGET_PERCENTAGE;
use crate::domain::status::SUCCESS_THRESHOLD;
use crate::domain::{AggregationPolicy, Scoring};

/// Aggregation tuning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AggregationSettings {
    /// Operator performance counted as on target (default 80)
    pub operator_threshold: i32,
    /// Target percentage for managers that do not set one (default 80)
    pub default_target_percentage: f64,
    /// `binary` (0 or 100) or `proportional`
    pub scoring: Scoring,
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            operator_threshold: SUCCESS_THRESHOLD,
            default_target_percentage: DEFAULT_TARGET_PERCENTAGE,
            scoring: Scoring::Binary,
        }
    }
}

impl AggregationSettings {
    pub fn policy(&self) -> AggregationPolicy {
        AggregationPolicy {
            operator_threshold: self.operator_threshold,
            default_target_percentage: self.default_target_percentage,
            scoring: self.scoring,
        }
    }

    fn merge(&self, overlay: &RawAggregationSettings) -> Self {
        Self {
            operator_threshold: overlay.operator_threshold.unwrap_or(self.operator_threshold),
            default_target_percentage: overlay
                .default_target_percentage
                .unwrap_or(self.default_target_percentage),
            scoring: overlay.scoring.unwrap_or(self.scoring),
        }
    }
}

/// Raw aggregation config for intermediate parsing (`None` = not specified).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawAggregationSettings {
    pub operator_threshold: Option<i32>,
    pub default_target_percentage: Option<f64>,
    pub scoring: Option<Scoring>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub records: Option<PathBuf>,
    pub tree: Option<PathBuf>,
    pub aggregation: RawAggregationSettings,
}

impl RawSettings {
    /// Anchor relative data paths at `base`.
    fn resolve_relative(mut self, base: &Path) -> Self {
        self.records = self.records.map(|p| anchor(base, p));
        self.tree = self.tree.map(|p| anchor(base, p));
        self
    }
}

fn anchor(base: &Path, path: PathBuf) -> PathBuf {
    let expanded = PathBuf::from(expand_env_vars(&path.to_string_lossy()));
    if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    }
}

/// Unified configuration for orgperf.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Settings {
    /// JSON file with flat member records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<PathBuf>,
    /// JSON file with a pre-built organization tree
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree: Option<PathBuf>,
    pub aggregation: AggregationSettings,
}

/// Get the XDG config directory for orgperf.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "orgperf").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("orgperf.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".orgperf.toml")
}

/// Expand `~`, `$VAR` and `${VAR}`; unresolvable input is returned as is.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    pub fn policy(&self) -> AggregationPolicy {
        self.aggregation.policy()
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expand = |p: &PathBuf| PathBuf::from(expand_env_vars(&p.to_string_lossy()));
        self.records = self.records.as_ref().map(expand);
        self.tree = self.tree.as_ref().map(expand);
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            records: overlay.records.clone().or_else(|| self.records.clone()),
            tree: overlay.tree.clone().or_else(|| self.tree.clone()),
            aggregation: self.aggregation.merge(&overlay.aggregation),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.orgperf.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?.resolve_relative(dir);
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        tracing::debug!("settings: {:?}", current);
        Ok(current)
    }

    /// Apply ORGPERF_* environment variables as explicit overrides.
    fn apply_env_overrides(settings: Self) -> Result<Self, ApplicationError> {
        Self::apply_overrides(settings, env_source())
    }

    fn apply_overrides(mut settings: Self, source: Environment) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(source)
            .build()
            .map_err(config_err)?;

        if let Some(val) = env_value(config.get_string("records"))? {
            settings.records = Some(PathBuf::from(val));
        }
        if let Some(val) = env_value(config.get_string("tree"))? {
            settings.tree = Some(PathBuf::from(val));
        }
        if let Some(val) = env_value(config.get_int("aggregation.operator_threshold"))? {
            settings.aggregation.operator_threshold =
                i32::try_from(val).map_err(|e| ApplicationError::Config {
                    message: format!("aggregation.operator_threshold: {}", e),
                })?;
        }
        if let Some(val) = env_value(config.get_float("aggregation.default_target_percentage"))? {
            settings.aggregation.default_target_percentage = val;
        }
        if let Some(val) = env_value(config.get_string("aggregation.scoring"))? {
            settings.aggregation.scoring = val
                .parse()
                .map_err(|message| ApplicationError::Config { message })?;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# orgperf configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/orgperf/orgperf.toml
#   Local:  <dir>/.orgperf.toml          (paths relative to <dir>)
#   Env:    ORGPERF_* environment variables, e.g.
#           ORGPERF_RECORDS=./employees.json
#           ORGPERF_AGGREGATION__SCORING=proportional

# Flat member records (JSON array with id / parentId / name / position / performance / team)
# records = "employees.json"

# Pre-built organization tree (JSON), used when no records file is set
# tree = "organization.json"

[aggregation]
# Operator performance that counts as reaching the goal
# operator_threshold = 80

# Share of operators (percent) a manager needs when it sets no target itself
# default_target_percentage = 80

# "binary": managers score 100 on target, 0 otherwise
# "proportional": partial credit below target
# scoring = "binary"
"#
        .to_string()
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("ORGPERF")
        .prefix_separator("_")
        .separator("__")
}

/// Unset keys are `None`; unparsable values are config errors.
fn env_value<T>(value: Result<T, ConfigError>) -> Result<Option<T>, ApplicationError> {
    match value {
        Ok(v) => Ok(Some(v)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(config_err(e)),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn given_defaults_when_building_policy_then_matches_domain_default() {
        assert_eq!(Settings::default().policy(), AggregationPolicy::default());
    }

    #[test]
    fn given_partial_overlay_when_merging_then_keeps_unspecified_values() {
        let base = Settings {
            records: Some(PathBuf::from("/data/base.json")),
            tree: None,
            aggregation: AggregationSettings::default(),
        };
        let overlay = RawSettings {
            records: None,
            tree: Some(PathBuf::from("/data/tree.json")),
            aggregation: RawAggregationSettings {
                scoring: Some(Scoring::Proportional),
                ..Default::default()
            },
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.records, Some(PathBuf::from("/data/base.json")));
        assert_eq!(merged.tree, Some(PathBuf::from("/data/tree.json")));
        assert_eq!(merged.aggregation.scoring, Scoring::Proportional);
        assert_eq!(merged.aggregation.operator_threshold, 80);
    }

    #[test]
    fn given_relative_paths_when_resolving_then_anchors_at_base() {
        let raw = RawSettings {
            records: Some(PathBuf::from("employees.json")),
            tree: Some(PathBuf::from("/abs/tree.json")),
            aggregation: RawAggregationSettings::default(),
        }
        .resolve_relative(Path::new("/project"));

        assert_eq!(raw.records, Some(PathBuf::from("/project/employees.json")));
        assert_eq!(raw.tree, Some(PathBuf::from("/abs/tree.json")));
    }

    #[test]
    fn given_tilde_in_records_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            records: Some(PathBuf::from("~/employees.json")),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        assert!(settings
            .records
            .unwrap()
            .to_string_lossy()
            .starts_with(&home));
    }

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        env_source().source(Some(map))
    }

    #[test]
    fn given_env_overrides_when_applying_then_replace_values() {
        let settings = Settings::apply_overrides(
            Settings::default(),
            env(&[
                ("ORGPERF_RECORDS", "/env/records.json"),
                ("ORGPERF_AGGREGATION__OPERATOR_THRESHOLD", "75"),
                ("ORGPERF_AGGREGATION__DEFAULT_TARGET_PERCENTAGE", "60.5"),
                ("ORGPERF_AGGREGATION__SCORING", "Proportional"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.records, Some(PathBuf::from("/env/records.json")));
        assert_eq!(settings.aggregation.operator_threshold, 75);
        assert_eq!(settings.aggregation.default_target_percentage, 60.5);
        assert_eq!(settings.aggregation.scoring, Scoring::Proportional);
    }

    #[rstest]
    #[case::threshold("ORGPERF_AGGREGATION__OPERATOR_THRESHOLD", "high")]
    #[case::target_percentage("ORGPERF_AGGREGATION__DEFAULT_TARGET_PERCENTAGE", "most")]
    #[case::scoring("ORGPERF_AGGREGATION__SCORING", "weighted")]
    fn given_unparsable_env_value_when_applying_then_config_error(
        #[case] key: &str,
        #[case] value: &str,
    ) {
        let result = Settings::apply_overrides(Settings::default(), env(&[(key, value)]));

        assert!(matches!(result, Err(ApplicationError::Config { .. })));
    }

    #[test]
    fn given_no_env_overrides_when_applying_then_unchanged() {
        let settings = Settings::apply_overrides(Settings::default(), env(&[])).unwrap();

        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).expect("template parses");
        assert!(raw.records.is_none());
        assert!(raw.aggregation.scoring.is_none());
    }

    #[test]
    fn given_settings_when_round_tripping_toml_then_equal() {
        let settings = Settings {
            records: Some(PathBuf::from("/data/employees.json")),
            tree: None,
            aggregation: AggregationSettings {
                scoring: Scoring::Proportional,
                ..AggregationSettings::default()
            },
        };

        let toml = settings.to_toml().unwrap();
        let parsed: Settings = toml::from_str(&toml).unwrap();

        assert!(toml.contains("scoring = \"proportional\""));
        assert_eq!(parsed, settings);
    }
}
