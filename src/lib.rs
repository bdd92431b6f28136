//! Tosca is a terminal-first chat assistant client for multi-modal AI APIs.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the data model, local persistence, the conversation
//!   registry, the re-branding substitution rules, and the message pipeline
//!   that dispatches user intents to remote capabilities.
//! - [`api`] defines the payloads and the HTTP client for the four remote
//!   capabilities (chat completion, image analysis, OCR, image generation).
//! - [`auth`] holds the simulated account session, the advisory capability
//!   gate, and API credential resolution.
//! - [`cli`] parses arguments and runs the interactive chat loop.
//!
//! The binary entrypoint (`src/main.rs`) routes through [`crate::cli::main`].

pub mod api;
pub mod auth;
pub mod cli;
pub mod core;
pub mod utils;
