use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for survey-lens
#[derive(Parser, Debug, Default)]
#[command(version, about = "Interactive health-survey dashboard")]
pub struct Args {
    /// Dataset to open (.xlsx, .xls, .ods, .csv, .json, .parquet).
    /// Defaults to the path in the config file.
    pub path: Option<PathBuf>,

    /// Read configuration from this TOML file instead of the user config directory
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Spreadsheet sheet to read, by 0-based index or name
    #[arg(long = "sheet")]
    pub sheet: Option<String>,

    /// Group by this column instead of auto-detecting one
    #[arg(long = "group-column")]
    pub group_column: Option<String>,

    /// Substring used to auto-detect the grouping column (default: "state")
    #[arg(long = "group-hint")]
    pub group_hint: Option<String>,

    /// Number of rows in the raw dataset preview
    #[arg(long = "preview-rows")]
    pub preview_rows: Option<usize>,

    /// Number of histogram bins
    #[arg(long = "bins")]
    pub bins: Option<usize>,
}
