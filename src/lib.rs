//! itinera: deterministic multi-day travel itinerary generation.
//!
//! The engine turns a content library (route templates plus reusable day
//! blocks) and a structured request into a dated, labeled itinerary. A
//! deterministic travel-logic pass fixes arrival/departure realism,
//! multi-day excursion ordering and description length, and the same pass
//! gates every LLM-assisted edit, so model output can never corrupt the
//! result.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use itinera::{Engine, Library, ItineraryRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let library = Library::from_path("library.json".as_ref())?;
//!     let request = ItineraryRequest {
//!         city: "Almaty".into(),
//!         start: "15.01.2026".into(),
//!         days: 5,
//!         pax: 2,
//!         arrival_time: "19:30".into(),
//!         departure_time: "10:10".into(),
//!         ..Default::default()
//!     };
//!     let engine = Engine::new(library);
//!     let (request_id, itinerary) = engine.generate("demo", &request).await?;
//!     println!("{}: {}", request_id, itinerary.to_preview_text());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod generator;
pub mod library;
pub mod logic;
pub mod services;
pub mod store;
pub mod types;
pub mod validator;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{EngineError, Result};
pub use export::{build_placeholders, document_name, DocumentRenderer};
pub use library::Library;
pub use logic::{PostFix, RegionRules};
pub use services::{CompletionConfig, ItineraryEditor, OpenAiTextClient, TextCompletion};
pub use store::{InMemoryStore, StateStore, StoreKey};
pub use types::{Itinerary, ItineraryDay, ItineraryMeta, ItineraryRequest, MAX_REQUEST_DAYS};
pub use validator::validate_itinerary;

#[cfg(feature = "cli")]
pub mod cli;
