pub mod assemble;
pub mod output;
pub mod significance;
pub mod statistics;
pub mod tsv_reader;
pub mod types;
