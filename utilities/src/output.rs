//! Output formatting for reports and parsed facts.

use serde::Serialize;
use serde_json::Value;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Table,
}

/// Formats any serializable report in the requested output format.
pub fn format_output<T: Serialize>(value: &T, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Table => {
            let value =
                serde_json::to_value(value).map_err(|e| format!("Serialization failed: {e}"))?;
            Ok(value_to_table(&value))
        }
    }
}

/// Scalar fields as aligned `key  value` rows, then one section per list.
///
/// Lists of objects (execution logs, job status entries) become a column
/// table of their scalar fields; multi-line text is cut to its first line.
fn value_to_table(value: &Value) -> String {
    let Value::Object(fields) = value else {
        return format!("{}\n", scalar(value));
    };

    let mut out = String::new();
    let scalars: Vec<_> = fields
        .iter()
        .filter(|(_, v)| !v.is_array() && !v.is_object())
        .collect();
    let width = scalars.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    for (key, field) in &scalars {
        out.push_str(&format!("{key:<width$}  {}\n", scalar(field)));
    }

    for (key, field) in fields {
        match field {
            Value::Array(items) => {
                out.push_str(&format!("\n{key}:\n"));
                out.push_str(&rows_to_table(items));
            }
            Value::Object(_) => {
                out.push_str(&format!("\n{key}:\n"));
                for line in value_to_table(field).lines() {
                    out.push_str(&format!("  {line}\n"));
                }
            }
            _ => {}
        }
    }
    out
}

fn rows_to_table(items: &[Value]) -> String {
    if items.is_empty() {
        return "  (none)\n".to_string();
    }

    let mut columns: Vec<&str> = Vec::new();
    for item in items {
        if let Value::Object(fields) = item {
            for (key, field) in fields {
                if !field.is_array() && !field.is_object() && !columns.contains(&key.as_str()) {
                    columns.push(key);
                }
            }
        }
    }
    if columns.is_empty() {
        return items
            .iter()
            .map(|item| format!("  {}\n", scalar(item)))
            .collect();
    }

    let cells: Vec<Vec<String>> = items
        .iter()
        .map(|item| {
            columns
                .iter()
                .map(|column| item.get(*column).map(scalar).unwrap_or_default())
                .collect()
        })
        .collect();
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            cells
                .iter()
                .map(|row| row[i].len())
                .chain(std::iter::once(column.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(column, width)| format!("{:<width$}", column.to_uppercase()))
        .collect();
    out.push_str(&format!("  {}\n", header.join("  ").trim_end()));
    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        out.push_str(&format!("  {}\n", line.join("  ").trim_end()));
    }
    out
}

fn scalar(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(text) => text.lines().next().unwrap_or_default().to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cics_provision_core::ExecutionRecord;

    #[derive(Serialize)]
    struct Report {
        changed: bool,
        msg: String,
        executions: Vec<ExecutionRecord>,
    }

    fn report() -> Report {
        Report {
            changed: true,
            msg: String::new(),
            executions: vec![
                ExecutionRecord::new("IDCAMS - Create data set - Run 1", 0, "IDC0001I\nMORE", ""),
                ExecutionRecord::new("DFHCCUTL", 4, "", ""),
            ],
        }
    }

    #[test]
    fn test_json_output() {
        let json = format_output(&report(), OutputFormat::Json).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["changed"], true);
        assert_eq!(value["executions"][1]["rc"], 4);
    }

    #[test]
    fn test_yaml_output() {
        let yaml = format_output(&report(), OutputFormat::Yaml).unwrap();
        assert!(yaml.contains("changed: true"));
        assert!(yaml.contains("name: DFHCCUTL"));
    }

    #[test]
    fn test_table_output() {
        let table = format_output(&report(), OutputFormat::Table).unwrap();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "changed  true");
        assert!(lines.contains(&"executions:"));
        assert!(table.contains("NAME"));
        assert!(table.contains("IDCAMS - Create data set - Run 1"));
        assert!(table.contains("IDC0001I"));
        assert!(!table.contains("MORE"));
    }

    #[test]
    fn test_table_of_empty_list() {
        let empty = Report {
            changed: false,
            msg: String::new(),
            executions: Vec::new(),
        };
        let table = format_output(&empty, OutputFormat::Table).unwrap();
        assert!(table.contains("(none)"));
    }
}
