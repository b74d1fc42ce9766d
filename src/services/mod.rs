//! External-facing services: text completion and the LLM edit cycle.

pub mod completion;
pub mod editor;
pub mod prompts;

pub use completion::{CompletionConfig, CompletionOptions, OpenAiTextClient, TextCompletion};
pub use editor::ItineraryEditor;
