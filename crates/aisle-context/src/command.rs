const RESET_PHRASES: [&str; 4] = ["reset", "clear", "start over", "new search"];

/// Inputs handled by the session itself instead of the translator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextCommand {
    Reset,
}

impl ContextCommand {
    /// Whole-input match, case-insensitive, surrounding whitespace ignored.
    pub fn parse(input: &str) -> Option<Self> {
        let normalized = input.trim().to_lowercase();
        RESET_PHRASES
            .contains(&normalized.as_str())
            .then_some(ContextCommand::Reset)
    }
}
