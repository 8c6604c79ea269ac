pub mod demo;
pub mod export;
pub mod generator;
pub mod llm_provider;
pub mod pdf;
pub mod text_extract;
pub mod validation;
