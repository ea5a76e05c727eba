#![allow(dead_code)]

mod mocks;

pub use mocks::read_only_output;

use code_batch::code::record::Record;

/// Splits file content back into record blocks of `lines_per_record` lines.
pub fn split_records(content: &str, lines_per_record: usize) -> Vec<String> {
    let lines: Vec<&str> = content.lines().collect();
    lines
        .chunks(lines_per_record)
        .map(|block| block.join("\n"))
        .collect()
}

pub fn rendered(records: &[Record]) -> Vec<String> {
    records.iter().map(|record| record.to_string()).collect()
}
