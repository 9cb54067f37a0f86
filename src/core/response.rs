use once_cell::sync::Lazy;
use regex::Regex;

static CODE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```clojure\n(.*?)```").unwrap());

const FENCE_MARKER: &str = "```clojure";

pub struct ResponseParser;

impl ResponseParser {
    /// The model may narrate before emitting the corrected file, so the last
    /// fenced clojure block is taken as the refactored body.
    pub fn extract_code(response: &str) -> Option<String> {
        CODE_BLOCK
            .captures_iter(response)
            .last()
            .map(|caps| caps[1].trim().to_string())
    }

    /// Everything before the first fenced clojure block, trimmed. Empty when
    /// the reply has no fence or nothing precedes it.
    pub fn extract_summary(response: &str) -> String {
        match response.split_once(FENCE_MARKER) {
            Some((before, _)) => before.trim().to_string(),
            None => String::new(),
        }
    }
}
