use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Deserializer, Serialize};

use crate::cli::Args;
use crate::data::loader::LoadOptions;
use crate::data::pipeline::ViewOptions;
use crate::data::schema::GroupingRule;

pub const APP_NAME: &str = "survey-lens";
pub const DEFAULT_SOURCE: &str = "All India National Family Health Survey4.xlsx";

/// Where the dataset comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub path: PathBuf,
    /// Spreadsheet sheet by 0-based index or name.
    #[serde(default, deserialize_with = "sheet_selector")]
    pub sheet: Option<String>,
}

/// Accepts `sheet = 2` as well as `sheet = "Data"`.
fn sheet_selector<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Sheet {
        Index(usize),
        Name(String),
    }

    Ok(Option::<Sheet>::deserialize(deserializer)?.map(|sheet| match sheet {
        Sheet::Index(i) => i.to_string(),
        Sheet::Name(name) => name,
    }))
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_SOURCE),
            sheet: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Rows shown in the raw dataset preview.
    pub preview_rows: usize,
    #[serde(flatten)]
    pub view: ViewOptions,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            preview_rows: 5,
            view: ViewOptions::default(),
        }
    }
}

/// Complete dashboard configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DashboardConfig {
    pub source: SourceConfig,
    pub grouping: GroupingRule,
    pub display: DisplayConfig,
}

impl DashboardConfig {
    /// Load from `explicit` if given, else from the user config directory if a
    /// file exists there, else defaults. Not validated: call [`Self::validate`]
    /// once command-line overrides have been applied.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Ok(match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::user_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        })
    }

    /// `<config dir>/survey-lens/config.toml`
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_NAME).join("config.toml"))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;
        log::info!("Using config file {}", path.display());
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| anyhow!("{e}"))
    }

    /// Command-line flags take precedence over the file.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(path) = &args.path {
            self.source.path = path.clone();
        }
        if args.sheet.is_some() {
            self.source.sheet = args.sheet.clone();
        }
        if args.group_column.is_some() {
            self.grouping.column = args.group_column.clone();
        }
        if let Some(hint) = &args.group_hint {
            self.grouping.hint = hint.clone();
        }
        if let Some(rows) = args.preview_rows {
            self.display.preview_rows = rows;
        }
        if let Some(bins) = args.bins {
            self.display.view.histogram_bins = bins;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.display.preview_rows == 0 {
            bail!("preview_rows must be greater than 0");
        }
        if self.display.view.histogram_bins == 0 {
            bail!("histogram_bins must be greater than 0");
        }
        if self.grouping.hint.trim().is_empty() {
            bail!("grouping hint must not be empty");
        }
        Ok(())
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            sheet: self.source.sheet.clone(),
        }
    }
}
