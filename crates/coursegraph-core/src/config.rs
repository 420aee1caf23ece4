use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use crate::course::CodeStyle;
use crate::graph::TargetExclusionPolicy;
use crate::relation::RelationKind;

/// Project-level defaults read from `.coursegraph/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub plan: PlanConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanConfig {
    #[serde(default = "default_true")]
    pub include_coreqs: bool,
    #[serde(default)]
    pub excluded_targets: TargetExclusionPolicy,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            include_coreqs: default_true(),
            excluded_targets: TargetExclusionPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Catalog files loaded when none are given on the command line.
    /// Relative paths are resolved against the project root.
    #[serde(default)]
    pub files: Vec<PathBuf>,
    #[serde(default)]
    pub code_style: CodeStyle,
}

impl CatalogConfig {
    #[must_use]
    pub fn resolved_files(&self, project_root: &Path) -> Vec<PathBuf> {
        self.files
            .iter()
            .map(|file| {
                if file.is_absolute() {
                    file.clone()
                } else {
                    project_root.join(file)
                }
            })
            .collect()
    }
}

/// Edge colors for rendered graphs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_prereq_color")]
    pub prereq_color: String,
    #[serde(default = "default_coreq_color")]
    pub coreq_color: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            prereq_color: default_prereq_color(),
            coreq_color: default_coreq_color(),
        }
    }
}

impl RenderConfig {
    #[must_use]
    pub fn color_for(&self, kind: RelationKind) -> &str {
        match kind {
            RelationKind::Prerequisite => &self.prereq_color,
            RelationKind::Corequisite => &self.coreq_color,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub project: ProjectConfig,
    pub resolved_output: String,
}

/// Load `<project_root>/.coursegraph/config.toml`, or defaults if absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(".coursegraph/config.toml");
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load `<config_dir>/coursegraph/config.toml`, or defaults if absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("coursegraph/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Merge project and user config and settle the output mode.
///
/// # Errors
///
/// Returns an error if either config file is unreadable or malformed.
pub fn resolve_config(project_root: &Path, cli_json: bool) -> Result<EffectiveConfig> {
    let project = load_project_config(project_root)?;
    let user = load_user_config()?;

    let env_format = env::var("FORMAT").ok();
    let resolved_output = resolve_output(cli_json, user.output, env_format);

    Ok(EffectiveConfig {
        project,
        resolved_output,
    })
}

/// `--json` wins, then `FORMAT`, then the user config, then a TTY check.
fn resolve_output(
    cli_json: bool,
    user_output: Option<String>,
    env_format: Option<String>,
) -> String {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some("pretty"),
            "text" | "plain" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    if cli_json {
        return "json".to_string();
    }

    if let Some(mode) = env_format.as_deref().and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if let Some(mode) = user_output.as_deref().and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if std::io::stdout().is_terminal() {
        "pretty".to_string()
    } else {
        "text".to_string()
    }
}

const fn default_true() -> bool {
    true
}

fn default_prereq_color() -> String {
    "green".to_string()
}

fn default_coreq_color() -> String {
    "blue".to_string()
}
