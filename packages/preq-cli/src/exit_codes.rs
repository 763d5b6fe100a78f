pub const SUCCESS: i32 = 0;
/// Bad arguments, configuration or input files
pub const INPUT_ERROR: i32 = 1;
/// The evaluation itself failed, or output could not be written
pub const EXECUTION_ERROR: i32 = 2;
/// Some files of a batch failed
pub const PARTIAL_FAILURE: i32 = 3;
