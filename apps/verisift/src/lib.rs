//! # verisift
//!
//! The Verisift credibility server - THE BINARY.
//!
//! `verisift-core` decides; this crate calls out. It owns the adapters to
//! external services, the engine that bounds and combines their answers,
//! the HTTP API and the CLI.
//!
//! ```text
//!   CLI (clap) ──┐
//!                ├──► engine ──► adapters ──► classifier / LLM / X / Reddit / PDFs
//!   API (axum) ──┘       │
//!                        ▼
//!                  verisift-core (policy, merger, relevance, catalog)
//! ```

pub mod adapters;
pub mod api;
pub mod cli;
pub mod config;
pub mod engine;

pub use config::{Settings, Timeouts};
pub use engine::{DocumentVerifier, Engine, EvidenceGatherer, Orchestrator};
