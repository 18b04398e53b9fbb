//! One shopper's conversation: translate, remember, search, reply.
use std::sync::Arc;

use aisle_context::{ContextCommand, ConversationContext, Transcript, VendorScope};
use aisle_core::catalog::Catalog;
use aisle_core::traits::Translator;

pub mod reply;

pub use reply::ChatReply;

pub const DEFAULT_LIMIT: usize = 3;

pub struct Assistant<T>
where
    T: Translator,
{
    catalog: Arc<Catalog>,
    translator: T,
    context: ConversationContext,
    transcript: Transcript,
    limit: usize,
}

impl<T> Assistant<T>
where
    T: Translator,
{
    pub fn new(catalog: Arc<Catalog>, translator: T) -> Self {
        Self {
            catalog,
            translator,
            context: ConversationContext::new(),
            transcript: Transcript::default(),
            limit: DEFAULT_LIMIT,
        }
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Handle one user message.
    ///
    /// A failed translation leaves the context and transcript as they were.
    pub fn respond(&mut self, input: &str) -> ChatReply {
        if ContextCommand::parse(input) == Some(ContextCommand::Reset) {
            self.reset();
            return ChatReply::text(reply::RESET_MESSAGE);
        }

        let previous = self.context.as_query();
        let query = match self.translator.translate(input, &previous) {
            Ok(query) => query,
            Err(err) => {
                tracing::warn!(error = %err, "translation failed, context left unchanged");
                return ChatReply::text(reply::failure_message(&err.to_string()));
            }
        };

        self.transcript.push_user(input);
        self.context.mirror(&query);
        let products = aisle_engine::search(self.catalog.products(), &query, self.limit);

        let message = if products.is_empty() {
            reply::NO_RESULTS_MESSAGE.to_string()
        } else if self.context.has_active_context() {
            reply::with_summary(&self.context.summarize(), &reply::found_message(products.len()))
        } else {
            reply::found_message(products.len())
        };
        tracing::info!(results = products.len(), active_context = self.context.has_active_context(), "turn answered");

        self.transcript.push_assistant(&message);
        ChatReply { message, products, filters_used: Some(query) }
    }

    /// Re-scope the conversation to a shop choice and re-run the last search.
    pub fn select_vendors(&mut self, scope: VendorScope) -> ChatReply {
        let reply = match self.context.rerun_with_vendor_scope(scope, self.catalog.products(), self.limit) {
            Some(rerun) if rerun.results.is_empty() => ChatReply {
                message: reply::NO_SHOP_RESULTS_MESSAGE.to_string(),
                products: Vec::new(),
                filters_used: Some(rerun.query),
            },
            Some(rerun) => ChatReply {
                message: reply::with_summary(&self.context.summarize(), &reply::found_message(rerun.results.len())),
                products: rerun.results,
                filters_used: Some(rerun.query),
            },
            None => ChatReply {
                message: reply::context_updated_message(&self.context.summarize()),
                products: Vec::new(),
                filters_used: Some(self.context.as_query()),
            },
        };
        self.transcript.push_assistant(&reply.message);
        reply
    }

    pub fn reset(&mut self) {
        self.context.reset();
        self.transcript.clear();
    }

    pub fn context(&self) -> &ConversationContext {
        &self.context
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
