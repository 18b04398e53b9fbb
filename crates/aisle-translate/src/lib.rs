//! aisle-translate
//!
//! Everything on the instruction side of the engine: the merge contract as
//! executable code, a checker that judges any translator against it, and two
//! translators that need no language model (phrase rules and a script).
pub mod category_map;
pub mod conformance;
pub mod merge;
pub mod rules;
pub mod scripted;

pub use category_map::CategoryMap;
pub use merge::{merge, CategoryIntent, Change, QueryIntent};
pub use rules::RuleTranslator;
pub use scripted::ScriptedTranslator;
