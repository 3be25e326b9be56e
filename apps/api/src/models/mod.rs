pub mod cv;
pub mod date_value;
pub mod evaluation;
