use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::Value;

use aisle_core::error::{Error, Result};
use aisle_core::traits::Translator;
use aisle_core::types::StructuredQuery;

enum Reply {
    Query(StructuredQuery),
    Raw(Value),
    Fail(String),
}

/// Translator that replays queued replies in order, for tests and demos.
///
/// Raw JSON replies go through the same lenient parsing a model's output
/// would, so a malformed payload becomes the unfiltered query. Every call
/// is recorded with the previous query it was given.
#[derive(Default)]
pub struct ScriptedTranslator {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<(String, StructuredQuery)>>,
}

impl ScriptedTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn then_query(self, query: StructuredQuery) -> Self {
        self.push(Reply::Query(query))
    }

    #[must_use]
    pub fn then_json(self, payload: Value) -> Self {
        self.push(Reply::Raw(payload))
    }

    #[must_use]
    pub fn then_fail(self, message: &str) -> Self {
        self.push(Reply::Fail(message.to_string()))
    }

    fn push(self, reply: Reply) -> Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
        self
    }

    /// Instructions seen so far, each with the previous query it came with.
    pub fn calls(&self) -> Vec<(String, StructuredQuery)> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().map(|r| r.len()).unwrap_or_default()
    }
}

impl Translator for ScriptedTranslator {
    fn translate(&self, instruction: &str, previous: &StructuredQuery) -> Result<StructuredQuery> {
        self.calls
            .lock()
            .map_err(|_| Error::Translation("call log poisoned".to_string()))?
            .push((instruction.to_string(), previous.clone()));
        let reply = self
            .replies
            .lock()
            .map_err(|_| Error::Translation("script poisoned".to_string()))?
            .pop_front();
        match reply {
            Some(Reply::Query(query)) => Ok(query),
            Some(Reply::Raw(payload)) => Ok(StructuredQuery::from_value_lenient(payload)),
            Some(Reply::Fail(message)) => Err(Error::Translation(message)),
            None => Err(Error::Translation(format!("no scripted reply for {instruction:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn replays_in_order_then_runs_dry() {
        let t = ScriptedTranslator::new()
            .then_json(json!({"vendors": ["Subway"], "sort_by": null}))
            .then_json(json!("not an object"))
            .then_fail("timeout");

        let first = t.translate("from subway", &StructuredQuery::default()).unwrap();
        assert_eq!(first.vendors, Some(vec!["Subway".to_string()]));
        assert_eq!(t.translate("??", &first).unwrap(), StructuredQuery::default());
        assert!(matches!(t.translate("x", &first), Err(Error::Translation(m)) if m == "timeout"));
        assert!(t.translate("y", &first).is_err());

        let calls = t.calls();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[1].1, first);
        assert_eq!(t.remaining(), 0);
    }
}
