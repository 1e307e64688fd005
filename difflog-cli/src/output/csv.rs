//! CSV output formatting for data export.
//!
//! Values containing separators, quotes or newlines are quoted, and nested
//! arrays and objects collapse to a short placeholder.

use super::{Column, OutputConfig};
use serde::Serialize;
use serde_json::Value;

/// CSV output formatter
pub struct CsvOutput;

impl CsvOutput {
    /// Format data as CSV string
    ///
    /// A single object becomes a header row plus one value row. An array of
    /// objects takes its headers from the first element.
    pub fn format<T: Serialize + ?Sized>(data: &T, _config: &OutputConfig) -> String {
        match serde_json::to_value(data) {
            Ok(Value::Array(items)) => Self::format_array_value(&items),
            Ok(Value::Object(obj)) => Self::format_object_value(&obj),
            Ok(other) => Self::value_to_csv(&other),
            Err(_) => String::new(),
        }
    }

    /// Format rows with an explicit column selection
    pub fn format_with_columns<T: Serialize>(
        data: &[T],
        columns: &[Column],
        _config: &OutputConfig,
    ) -> String {
        let headers: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        let mut output = headers.join(",");

        for item in data {
            let Ok(json) = serde_json::to_value(item) else {
                continue;
            };
            let row: Vec<String> = columns
                .iter()
                .map(|col| json.get(&col.key).map(Self::value_to_csv).unwrap_or_default())
                .collect();
            output.push('\n');
            output.push_str(&row.join(","));
        }

        output
    }

    fn format_array_value(items: &[Value]) -> String {
        let Some(Value::Object(first)) = items.first() else {
            return items
                .iter()
                .map(Self::value_to_csv)
                .collect::<Vec<_>>()
                .join("\n");
        };

        let headers: Vec<&String> = first.keys().collect();
        let mut output = headers
            .iter()
            .map(|h| Self::escape_value(h))
            .collect::<Vec<_>>()
            .join(",");

        for item in items {
            if let Value::Object(obj) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| obj.get(*h).map(Self::value_to_csv).unwrap_or_default())
                    .collect();
                output.push('\n');
                output.push_str(&row.join(","));
            }
        }

        output
    }

    fn format_object_value(obj: &serde_json::Map<String, Value>) -> String {
        let headers: Vec<String> = obj.keys().map(|k| Self::escape_value(k)).collect();
        let values: Vec<String> = obj.values().map(Self::value_to_csv).collect();

        format!("{}\n{}", headers.join(","), values.join(","))
    }

    fn value_to_csv(value: &Value) -> String {
        match value {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => Self::escape_value(s),
            Value::Array(arr) => Self::escape_value(&format!("[{} items]", arr.len())),
            Value::Object(obj) => Self::escape_value(&format!("{{{} fields}}", obj.len())),
        }
    }

    /// Quote a value if it contains a comma, newline or quote, doubling quotes.
    fn escape_value(s: &str) -> String {
        if s.contains(',') || s.contains('\n') || s.contains('\r') || s.contains('"') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;

    #[derive(Serialize)]
    struct Row {
        member: String,
        breaking: bool,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                member: "Foo.bar".to_string(),
                breaking: true,
            },
            Row {
                member: "baz, qux".to_string(),
                breaking: false,
            },
        ]
    }

    #[test]
    fn test_format_array() {
        let output = CsvOutput::format(&rows(), &OutputConfig::new(OutputFormat::Csv));
        let lines: Vec<_> = output.lines().collect();
        // serde_json orders object keys alphabetically
        assert_eq!(lines, vec!["breaking,member", "true,Foo.bar", "false,\"baz, qux\""]);
    }

    #[test]
    fn test_escape_special_chars() {
        assert_eq!(CsvOutput::escape_value("hello"), "hello");
        assert_eq!(CsvOutput::escape_value("hello,world"), "\"hello,world\"");
        assert_eq!(CsvOutput::escape_value("hello\nworld"), "\"hello\nworld\"");
        assert_eq!(CsvOutput::escape_value("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_format_with_columns() {
        let columns = vec![Column::new("Member", "member"), Column::new("Breaking", "breaking")];
        let output =
            CsvOutput::format_with_columns(&rows(), &columns, &OutputConfig::new(OutputFormat::Csv));

        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines[0], "Member,Breaking");
        assert_eq!(lines[1], "Foo.bar,true");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_empty_rows_keep_header() {
        let columns = vec![Column::new("Member", "member")];
        let output = CsvOutput::format_with_columns::<Row>(
            &[],
            &columns,
            &OutputConfig::new(OutputFormat::Csv),
        );
        assert_eq!(output, "Member");
    }
}
