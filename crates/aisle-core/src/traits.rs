use crate::error::Result;
use crate::types::StructuredQuery;

/// Turns a free-text instruction into the next complete query state.
///
/// `previous` is the query the conversation context currently mirrors. The
/// returned query is authoritative: callers store it verbatim.
pub trait Translator: Send + Sync {
    fn translate(&self, instruction: &str, previous: &StructuredQuery) -> Result<StructuredQuery>;
}

impl<T: Translator + ?Sized> Translator for Box<T> {
    fn translate(&self, instruction: &str, previous: &StructuredQuery) -> Result<StructuredQuery> {
        (**self).translate(instruction, previous)
    }
}
