// src/defaults.rs

// Edit-distance scoring (also the default alignment scoring)
pub const MATCH_SCORE: i32 = 0;
pub const MISMATCH_SCORE: i32 = -1;
pub const GAP_SCORE: i32 = -1;
pub const GAP_OPEN_SCORE: i32 = 0;

// Affine defaults for the command line
pub const AFFINE_GAP_SCORE: i32 = -1;
pub const AFFINE_GAP_OPEN_SCORE: i32 = -10;

// Matrix constants
pub const MINUS_INFINITY: i32 = i32::MIN / 2;
pub const BATCH_LANES: usize = 8;

// Full-text index constants
pub const SA_SAMPLE_INTERVAL: u64 = 8;
pub const OCC_INTERVAL_SHIFT: u64 = 6;
pub const SENTINEL_CODE: u8 = 0;
pub const SEPARATOR_CODE: u8 = 1;
pub const FIRST_SYMBOL_CODE: u8 = 2;

// Search constants
pub const MAX_TOTAL_ERRORS: u8 = 255;
pub const MAX_SCHEME_ERRORS: u8 = 3;
pub const STRATUM: u8 = 0;

// Other Constants
pub const VERBOSITY: i32 = 3;
