//! # Dealterms
//!
//! Turns unreliable LLM contract-analysis responses into dependable
//! structured deal terms.
//!
//! Language models do not reliably emit valid JSON under instruction.
//! Dealterms sends a purchase contract to a model with a structured-
//! extraction prompt, then turns whatever comes back — prose-wrapped
//! objects, trailing commas, bare keys, truncated braces, outright
//! refusals — into a complete, schema-shaped [`document::AnalysisDocument`],
//! never throwing away partial information and never failing the caller.
//!
//! ## Pipeline
//!
//! ```text
//! ┌────────┐  ┌───────┐  ┌────────┐  ┌────────┐  ┌───────┐  ┌───────┐  ┌──────────┐
//! │ Prompt │─▶│ Model │─▶│ Locate │─▶│ Repair │─▶│ Parse │─▶│ Merge │─▶│ Validate │
//! └────────┘  └───┬───┘  └───┬────┘  └────────┘  └───┬───┘  └───────┘  └──────────┘
//!                 │          │                       │
//!                 └──────────┴───────────────────────┴──▶ Fallback synthesizer
//! ```
//!
//! Every failure after the model call degrades to the fallback synthesizer,
//! which pattern-scans the raw contract text. The only error that crosses
//! the library boundary is missing credentials, raised when the client is
//! constructed.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`document`] | Canonical `AnalysisDocument` shape |
//! | [`prompt`] | Instruction template + prompt construction |
//! | [`model`] | `ModelClient` trait and the OpenAI implementation |
//! | [`locate`] | Greedy JSON object location |
//! | [`repair`] | Staged textual JSON repair |
//! | [`parse`] | Multi-strategy parsing |
//! | [`merge`] | Deep merge into the canonical shape |
//! | [`validate`] | Advisory completeness/consistency checks |
//! | [`fallback`] | Pattern-scan safety net |
//! | [`analyze`] | Pipeline orchestration |

pub mod analyze;
pub mod config;
pub mod document;
pub mod fallback;
pub mod locate;
pub mod merge;
pub mod model;
pub mod parse;
pub mod prompt;
pub mod repair;
pub mod validate;

pub use analyze::{analyze, AnalysisOutcome, AnalysisReport};
pub use document::AnalysisDocument;
pub use model::{ModelClient, ModelError, OpenAiClient};
