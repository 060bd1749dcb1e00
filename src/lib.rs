//! lingodesk - Customer Support Language Assistant
//!
//! Detects the language of a customer message (typed or extracted from a PDF),
//! translates it for the agent, and translates the agent's reply back into the
//! customer's language with optional word-level glosses.

pub mod cli;
pub mod config;
pub mod error;
pub mod languages;
pub mod classify;
pub mod pdf;
pub mod translate;
pub mod gloss;
pub mod session;
pub mod desk;
pub mod render;
pub mod shell;
