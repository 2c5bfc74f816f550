use serde::{Deserialize, Serialize};

use super::model::Dataset;

/// Substring looked for in column names when no grouping column is configured.
pub const DEFAULT_GROUPING_HINT: &str = "state";

/// How the grouping column is chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingRule {
    /// Explicit column name; wins over the hint when it exists in the dataset.
    pub column: Option<String>,
    /// Case-insensitive substring matched against column names in order.
    pub hint: String,
}

impl Default for GroupingRule {
    fn default() -> Self {
        Self {
            column: None,
            hint: DEFAULT_GROUPING_HINT.to_string(),
        }
    }
}

/// Metadata derived from a dataset's columns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    pub grouping_column: Option<String>,
    /// Numeric columns in declaration order.
    pub numeric_columns: Vec<String>,
    pub total_columns: usize,
}

impl Schema {
    /// Inspect `dataset` and pick the grouping column according to `rule`.
    pub fn inspect(dataset: &Dataset, rule: &GroupingRule) -> Self {
        let grouping_column = match rule.column.as_deref() {
            Some(name) if dataset.column(name).is_some() => {
                log::info!("Grouping by configured column '{name}'");
                Some(name.to_string())
            }
            Some(name) => {
                log::warn!(
                    "Configured grouping column '{name}' not found; falling back to '{}' match",
                    rule.hint
                );
                detect_grouping_column(dataset, &rule.hint)
            }
            None => detect_grouping_column(dataset, &rule.hint),
        };

        match &grouping_column {
            Some(col) => log::debug!("Grouping column: '{col}'"),
            None => log::warn!("No grouping column found; views show the full dataset"),
        }

        Schema {
            grouping_column,
            numeric_columns: numeric_columns(dataset),
            total_columns: dataset.n_columns(),
        }
    }

    pub fn is_numeric(&self, column: &str) -> bool {
        self.numeric_columns.iter().any(|c| c == column)
    }
}

/// First column, in declaration order, whose lower-cased name contains `hint`.
pub fn detect_grouping_column(dataset: &Dataset, hint: &str) -> Option<String> {
    let hint = hint.to_lowercase();
    if hint.is_empty() {
        return None;
    }
    dataset
        .columns()
        .iter()
        .find(|c| c.name.to_lowercase().contains(&hint))
        .map(|c| c.name.clone())
}

pub fn numeric_columns(dataset: &Dataset) -> Vec<String> {
    dataset
        .columns()
        .iter()
        .filter(|c| c.is_numeric())
        .map(|c| c.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Column};

    fn dataset(names: &[&str]) -> Dataset {
        Dataset::from_columns(
            names
                .iter()
                .map(|n| Column::new(*n, vec![CellValue::Integer(1)]))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn first_state_like_column_wins() {
        let ds = dataset(&["Area", "State/UT", "Statewide rank"]);
        assert_eq!(
            detect_grouping_column(&ds, DEFAULT_GROUPING_HINT).as_deref(),
            Some("State/UT")
        );
    }

    #[test]
    fn match_is_case_insensitive() {
        let ds = dataset(&["district", "STATE NAME"]);
        let schema = Schema::inspect(&ds, &GroupingRule::default());
        assert_eq!(schema.grouping_column.as_deref(), Some("STATE NAME"));
    }

    #[test]
    fn absent_when_nothing_matches() {
        let ds = dataset(&["Region", "Value"]);
        let schema = Schema::inspect(&ds, &GroupingRule::default());
        assert_eq!(schema.grouping_column, None);
        assert_eq!(schema.numeric_columns, vec!["Region", "Value"]);
        assert_eq!(schema.total_columns, 2);
    }

    #[test]
    fn explicit_column_overrides_hint() {
        let ds = dataset(&["State", "Region"]);
        let rule = GroupingRule {
            column: Some("Region".into()),
            ..GroupingRule::default()
        };
        assert_eq!(
            Schema::inspect(&ds, &rule).grouping_column.as_deref(),
            Some("Region")
        );
    }

    #[test]
    fn missing_override_falls_back_to_hint() {
        let ds = dataset(&["Region", "State"]);
        let rule = GroupingRule {
            column: Some("Province".into()),
            ..GroupingRule::default()
        };
        assert_eq!(
            Schema::inspect(&ds, &rule).grouping_column.as_deref(),
            Some("State")
        );
    }

    #[test]
    fn numeric_columns_keep_declaration_order() {
        let ds = Dataset::from_columns(vec![
            Column::new("z", vec![CellValue::Float(1.0)]),
            Column::new("State", vec![CellValue::Text("X".into())]),
            Column::new("a", vec![CellValue::Integer(2)]),
        ])
        .unwrap();
        assert_eq!(numeric_columns(&ds), vec!["z", "a"]);
    }
}
