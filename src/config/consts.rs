// src/config/consts.rs

// Input / output
pub const DEFAULT_INPUT: &str = "cars.json";
pub const DEFAULT_OUTPUT: &str = "cars.csv";
pub const DEFAULT_PROFILE: &str = "generic";

// Tree
pub const DEFAULT_CONFIGURATION: &str = "Default Configuration";
pub const TYPE_SEP: &str = " - ";
pub const PATH_SEP: char = '/';

// Rows
pub const ZERO_PRICE: &str = "$0";
pub const FEATURES_SEP: &str = ", ";

// Summary
pub const SAMPLE_ROWS: usize = 5;

// Exit codes
pub const EXIT_OK: i32 = 0;
pub const EXIT_CONFIG: i32 = 1;
pub const EXIT_NOT_FOUND: i32 = 2;
pub const EXIT_MALFORMED: i32 = 3;
pub const EXIT_IO_FAILURE: i32 = 4;
