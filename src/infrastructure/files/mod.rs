pub mod file_row_source;
