pub mod form_service;
pub mod payload;
pub mod prediction_service;
pub mod presenter;
