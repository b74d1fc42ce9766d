//! LLM-assisted itinerary editing.
//!
//! The model receives the current itinerary plus the user's instructions
//! and must return a complete replacement JSON. The reply is gated hard:
//! schema check, strict validation, then the travel-logic post-fix pass.
//! Any failure keeps the previous itinerary untouched at the caller.

use jsonschema::{Draft, JSONSchema};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{EngineError, Result};
use crate::logic::PostFix;
use crate::services::completion::{CompletionOptions, TextCompletion};
use crate::services::prompts::{edit_prompt, ITINERARY_SCHEMA};
use crate::types::Itinerary;
use crate::validator::validate_itinerary;

const EDIT_MAX_TOKENS: u32 = 2500;

pub struct ItineraryEditor {
    postfix: PostFix,
    max_tokens: u32,
}

impl Default for ItineraryEditor {
    fn default() -> Self {
        Self::new(PostFix::default())
    }
}

impl ItineraryEditor {
    pub fn new(postfix: PostFix) -> Self {
        Self {
            postfix,
            max_tokens: EDIT_MAX_TOKENS,
        }
    }

    /// Override the reply token budget (the `OPENAI_MAX_OUTPUT_TOKENS` knob).
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Apply user instructions to an itinerary via the completion service.
    ///
    /// Returns the replacement itinerary or an [`EngineError::EditRejected`]
    /// explaining why the model reply was unusable.
    pub async fn edit(
        &self,
        svc: &dyn TextCompletion,
        current: &Itinerary,
        instructions: &str,
    ) -> Result<Itinerary> {
        if instructions.trim().is_empty() {
            return Err(EngineError::EditRejected("no edit instructions given".into()));
        }
        let prompt = edit_prompt(current, instructions)?;
        let raw = svc
            .complete(&prompt, &CompletionOptions { max_tokens: self.max_tokens })
            .await?;
        if raw.trim().is_empty() {
            return Err(EngineError::EditRejected("model returned no content".into()));
        }

        let json_str = extract_json(&raw).ok_or_else(|| {
            EngineError::EditRejected("model reply contains no JSON object".into())
        })?;
        let value: Value = serde_json::from_str(json_str)
            .map_err(|err| EngineError::EditRejected(format!("reply is not valid JSON: {}", err)))?;

        check_schema(&value)?;

        // strict: labels and description length are the model's job, a
        // proposal that drops them is rejected wholesale instead of repaired
        let mut itinerary = validate_itinerary(&value, true).ok_or_else(|| {
            EngineError::EditRejected(
                "reply fails itinerary validation (field labels and 20-word descriptions are mandatory)"
                    .into(),
            )
        })?;
        self.postfix.apply_with(&mut itinerary, svc).await;

        info!(
            target: "itinera::editor",
            days = itinerary.days.len(),
            "edit accepted"
        );
        Ok(itinerary)
    }
}

/// Cut the first balanced-looking JSON object out of a model reply: from
/// the first `{` to the last `}`. Tolerates markdown fences and prose
/// around the object.
pub fn extract_json(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

fn check_schema(value: &Value) -> Result<()> {
    let compiled = JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(&ITINERARY_SCHEMA)
        .map_err(|err| EngineError::Validation(format!("schema compile failed: {}", err)))?;
    if let Err(errors) = compiled.validate(value) {
        let details: Vec<String> = errors
            .take(3)
            .map(|e| format!("{} at {}", e, e.instance_path))
            .collect();
        debug!(target: "itinera::editor", errors = ?details, "schema check failed");
        return Err(EngineError::EditRejected(format!(
            "reply violates the itinerary schema: {}",
            details.join("; ")
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CannedCompletion(String);

    #[async_trait]
    impl TextCompletion for CannedCompletion {
        async fn complete(&self, _prompt: &str, _opts: &CompletionOptions) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    struct RecordingCompletion {
        reply: String,
        seen_max_tokens: AtomicU32,
    }

    #[async_trait]
    impl TextCompletion for RecordingCompletion {
        async fn complete(&self, _prompt: &str, opts: &CompletionOptions) -> Result<String> {
            self.seen_max_tokens.store(opts.max_tokens, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    fn current() -> Itinerary {
        let mut it: Itinerary = serde_json::from_value(serde_json::json!({
            "meta": {
                "city": "Almaty",
                "start": "15.01.2026",
                "arrivalTime": "12:00",
                "departureTime": "18:00"
            },
            "days": [
                { "name": "City Walk", "description": "A relaxed first day." },
                { "name": "Mountains", "description": "Cable car day." }
            ]
        }))
        .unwrap();
        PostFix::default().apply(&mut it);
        it
    }

    #[tokio::test]
    async fn accepts_valid_reply_and_runs_postfix() {
        let mut edited = current();
        edited.days[0].name = "Museums & Coffee".into();
        let reply = format!(
            "Here is the updated itinerary:\n```json\n{}\n```",
            serde_json::to_string(&edited).unwrap()
        );
        let out = ItineraryEditor::default()
            .edit(&CannedCompletion(reply), &current(), "swap day 1 for museums")
            .await
            .unwrap();
        assert_eq!(out.days[0].name, "Museums & Coffee");
        // post-fix still holds after the edit
        assert_eq!(out.days.last().unwrap().overnight, "Overnight: -");
    }

    #[tokio::test]
    async fn rejects_unlabeled_fields_and_short_descriptions() {
        let mut edited = current();
        edited.days[0].time = "from ten to five".into();
        edited.days[0].description = "Just a short day.".into();
        let reply = serde_json::to_string(&edited).unwrap();
        let err = ItineraryEditor::default()
            .edit(&CannedCompletion(reply), &current(), "shorten day 1")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::EditRejected(_)));
    }

    #[tokio::test]
    async fn configured_token_budget_reaches_the_service() {
        let svc = RecordingCompletion {
            reply: serde_json::to_string(&current()).unwrap(),
            seen_max_tokens: AtomicU32::new(0),
        };
        ItineraryEditor::default()
            .with_max_tokens(900)
            .edit(&svc, &current(), "keep everything as it is")
            .await
            .unwrap();
        assert_eq!(svc.seen_max_tokens.load(Ordering::SeqCst), 900);
    }

    #[tokio::test]
    async fn rejects_empty_reply() {
        let err = ItineraryEditor::default()
            .edit(&CannedCompletion(String::new()), &current(), "do something")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::EditRejected(_)));
    }

    #[tokio::test]
    async fn rejects_prose_without_json() {
        let err = ItineraryEditor::default()
            .edit(
                &CannedCompletion("Sorry, I cannot help with that.".into()),
                &current(),
                "do something",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::EditRejected(_)));
    }

    #[tokio::test]
    async fn rejects_schema_violations() {
        let reply = r#"{ "meta": {}, "days": [ { "name": 42 } ] }"#;
        let err = ItineraryEditor::default()
            .edit(&CannedCompletion(reply.into()), &current(), "do something")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::EditRejected(_)));
    }

    #[tokio::test]
    async fn rejects_blank_instructions() {
        let err = ItineraryEditor::default()
            .edit(&CannedCompletion("{}".into()), &current(), "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::EditRejected(_)));
    }

    #[test]
    fn json_extraction_handles_fences_and_prose() {
        assert_eq!(extract_json("```json\n{\"a\":1}\n```"), Some("{\"a\":1}"));
        assert_eq!(extract_json("noise {\"a\":{\"b\":2}} trailing"), Some("{\"a\":{\"b\":2}}"));
        assert_eq!(extract_json("no object here"), None);
    }
}
