pub mod form;
pub mod prediction;
