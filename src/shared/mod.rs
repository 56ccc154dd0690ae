pub mod constants;
pub mod templates;
pub mod types;
