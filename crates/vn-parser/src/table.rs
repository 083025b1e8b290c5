use std::collections::BTreeMap;

use vn_core::SceneRecord;

/// Delimiter strategy: the header line decides between `,` and `;`, falling
/// back to `,` unless `;` strictly outnumbers it. Data rows are then split on
/// that delimiter with double-quote awareness.
pub const DEFAULT_DELIMITER: char = ',';
pub const ALTERNATE_DELIMITER: char = ';';

/// Rows are accepted leniently: anything that splits into at least this many
/// fields is kept and missing trailing cells read as empty.
pub const MIN_ROW_FIELDS: usize = 2;

const BYTE_ORDER_MARK: char = '\u{feff}';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTable {
    pub delimiter: char,
    pub headers: Vec<String>,
    pub records: Vec<SceneRecord>,
    pub skipped_rows: usize,
}

/// Parses the story table into records, in row order. Malformed rows are
/// dropped; an empty result means the source is unusable.
pub fn parse(raw: &str) -> Vec<SceneRecord> {
    parse_table(raw).records
}

pub fn parse_table(raw: &str) -> ParsedTable {
    let mut lines = raw.trim().split('\n');
    let Some(header_line) = lines.next().filter(|line| !line.trim().is_empty()) else {
        return ParsedTable {
            delimiter: DEFAULT_DELIMITER,
            headers: Vec::new(),
            records: Vec::new(),
            skipped_rows: 0,
        };
    };

    let delimiter = detect_delimiter(header_line);
    let headers = header_line
        .split(delimiter)
        .enumerate()
        .map(|(index, header)| {
            let header = if index == 0 {
                header.trim_start_matches(BYTE_ORDER_MARK)
            } else {
                header
            };
            header.trim().to_lowercase()
        })
        .collect::<Vec<_>>();

    let mut records = Vec::new();
    let mut skipped_rows = 0usize;
    for (line_index, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let cells = split_quoted(line, delimiter);
        if cells.len() < MIN_ROW_FIELDS {
            tracing::debug!(row = line_index + 2, cells = cells.len(), "skipping malformed row");
            skipped_rows += 1;
            continue;
        }

        let fields = headers
            .iter()
            .enumerate()
            .map(|(index, header)| {
                let value = cells.get(index).map(|cell| unquote(cell)).unwrap_or_default();
                (header.clone(), value)
            })
            .collect::<BTreeMap<_, _>>();
        records.push(SceneRecord::from_fields(fields));
    }

    ParsedTable {
        delimiter,
        headers,
        records,
        skipped_rows,
    }
}

pub fn detect_delimiter(header_line: &str) -> char {
    let commas = header_line.matches(DEFAULT_DELIMITER).count();
    let semicolons = header_line.matches(ALTERNATE_DELIMITER).count();
    if semicolons > commas {
        ALTERNATE_DELIMITER
    } else {
        DEFAULT_DELIMITER
    }
}

/// Splits on `delimiter`, except inside a pair of double quotes.
pub fn split_quoted(line: &str, delimiter: char) -> Vec<&str> {
    let mut cells = Vec::new();
    let mut in_quotes = false;
    let mut start = 0usize;
    for (offset, ch) in line.char_indices() {
        if ch == '"' {
            in_quotes = !in_quotes;
        } else if ch == delimiter && !in_quotes {
            cells.push(&line[start..offset]);
            start = offset + ch.len_utf8();
        }
    }
    cells.push(&line[start..]);
    cells
}

fn unquote(cell: &str) -> String {
    let trimmed = cell.trim();
    let inner = if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };
    inner.replace("\"\"", "\"")
}

/// Joins the given columns of a record back into one table row. Values are
/// written as-is, so this only reproduces rows without embedded delimiters or
/// quotes.
pub fn format_row(record: &SceneRecord, headers: &[String], delimiter: char) -> String {
    headers
        .iter()
        .map(|header| record.field(header).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(&delimiter.to_string())
}
