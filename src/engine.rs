//! The engine facade: wires the library, the post-fix pass, the state
//! store and the optional completion service into one conversational API.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::error::{EngineError, Result};
use crate::generator;
use crate::library::Library;
use crate::logic::{PostFix, RegionRules};
use crate::services::{ItineraryEditor, TextCompletion};
use crate::store::{new_request_id, InMemoryStore, StateStore, StoreKey, SESSION_TTL};
use crate::types::{Itinerary, ItineraryRequest};
use crate::validator::validate_itinerary;

pub struct Engine {
    library: Library,
    postfix: PostFix,
    editor: ItineraryEditor,
    store: Arc<dyn StateStore>,
    completion: Option<Arc<dyn TextCompletion>>,
}

impl Engine {
    pub fn new(library: Library) -> Self {
        Self {
            library,
            postfix: PostFix::default(),
            editor: ItineraryEditor::default(),
            store: Arc::new(InMemoryStore::new()),
            completion: None,
        }
    }

    pub fn with_rules(mut self, rules: RegionRules) -> Self {
        self.postfix = PostFix::new(rules.clone());
        self.editor = ItineraryEditor::new(PostFix::new(rules));
        self
    }

    pub fn with_store(mut self, store: Arc<dyn StateStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_completion(mut self, completion: Arc<dyn TextCompletion>) -> Self {
        self.completion = Some(completion);
        self
    }

    /// Cap the edit reply token budget (see `OPENAI_MAX_OUTPUT_TOKENS`).
    pub fn with_max_output_tokens(mut self, max_tokens: u32) -> Self {
        self.editor = self.editor.with_max_tokens(max_tokens);
        self
    }

    /// Generate an itinerary for a conversation, pin it under a fresh
    /// request id and make it the conversation's current itinerary. With a
    /// completion service configured, out-of-window descriptions are offered
    /// to the model before the deterministic pass backstops them.
    pub async fn generate(
        &self,
        conversation: &str,
        req: &ItineraryRequest,
    ) -> Result<(String, Itinerary)> {
        let itinerary = match self.completion.as_deref() {
            Some(svc) => generator::generate_with(&self.library, req, &self.postfix, svc).await?,
            None => generator::generate(&self.library, req, &self.postfix)?,
        };
        let request_id = new_request_id();
        self.remember(conversation, &request_id, &itinerary)?;
        info!(
            target: "itinera::engine",
            conversation,
            request_id = %request_id,
            days = itinerary.days.len(),
            "itinerary generated"
        );
        Ok((request_id, itinerary))
    }

    /// Apply edit instructions to the conversation's current itinerary.
    /// On any rejection the stored itinerary stays as it was.
    pub async fn edit(&self, conversation: &str, instructions: &str) -> Result<Itinerary> {
        let svc = self
            .completion
            .as_ref()
            .ok_or_else(|| EngineError::Config("no completion service configured".into()))?;
        let current = self.current(conversation)?.ok_or_else(|| {
            EngineError::InvalidRequest(format!(
                "conversation {} has no itinerary to edit",
                conversation
            ))
        })?;
        let edited = self.editor.edit(svc.as_ref(), &current, instructions).await?;

        let request_id = self
            .last_request_id(conversation)?
            .unwrap_or_else(new_request_id);
        self.remember(conversation, &request_id, &edited)?;
        Ok(edited)
    }

    /// Run the canned language-polish pass over the current itinerary. The
    /// same gates as [`Engine::edit`] apply.
    pub async fn polish(&self, conversation: &str) -> Result<Itinerary> {
        self.edit(conversation, crate::services::prompts::POLISH_INSTRUCTIONS)
            .await
    }

    /// The itinerary currently under discussion, if any.
    pub fn current(&self, conversation: &str) -> Result<Option<Itinerary>> {
        let key = StoreKey::CurrentItinerary {
            conversation: conversation.to_string(),
        };
        Ok(self
            .store
            .get(&key)?
            .and_then(|value| validate_itinerary(&value, false)))
    }

    /// Load an itinerary pinned by request id, surviving conversation
    /// expiry.
    pub fn by_request_id(&self, request_id: &str) -> Result<Option<Itinerary>> {
        let key = StoreKey::PersistedItinerary {
            request_id: request_id.to_string(),
        };
        Ok(self
            .store
            .get(&key)?
            .and_then(|value| validate_itinerary(&value, false)))
    }

    fn last_request_id(&self, conversation: &str) -> Result<Option<String>> {
        let key = StoreKey::LastRequest {
            conversation: conversation.to_string(),
        };
        Ok(self
            .store
            .get(&key)?
            .and_then(|v| v.as_str().map(str::to_string)))
    }

    fn remember(&self, conversation: &str, request_id: &str, it: &Itinerary) -> Result<()> {
        let value: Value = serde_json::to_value(it)?;
        self.store.put(
            &StoreKey::CurrentItinerary {
                conversation: conversation.to_string(),
            },
            &value,
            Some(SESSION_TTL),
        )?;
        self.store.put(
            &StoreKey::PersistedItinerary {
                request_id: request_id.to_string(),
            },
            &value,
            None,
        )?;
        self.store.put(
            &StoreKey::LastRequest {
                conversation: conversation.to_string(),
            },
            &Value::String(request_id.to_string()),
            Some(SESSION_TTL),
        )?;
        Ok(())
    }
}
