//! Triage: classifies e-mails as "Produtivo" or "Improdutivo" and suggests a reply.

pub mod config;
pub mod distilbert_engine;
pub mod engine;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod presets;
pub mod server;
pub mod types;
pub mod ui;
