mod table;

pub use table::{
    detect_delimiter, format_row, parse, parse_table, split_quoted, ParsedTable,
    ALTERNATE_DELIMITER, DEFAULT_DELIMITER, MIN_ROW_FIELDS,
};
