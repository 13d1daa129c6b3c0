//! Required-construct extraction for executable code questions.
//!
//! Some prompts demand a particular construct ("use the `sorted()` function")
//! on top of producing the right output. This is a best-effort textual
//! heuristic, not a parse: backtick-quoted identifiers inside imperative
//! sentences become requirements, and the learner's source must mention each
//! one. The heuristic is knowingly loose; a prompt that merely mentions
//! `print` inside a "use" sentence will also pick it up.

use std::sync::OnceLock;

use regex::Regex;

/// Words that mark a sentence as demanding something of the learner's code.
const REQUIREMENT_WORDS: &[&str] = &["use", "using", "call", "calling", "must", "apply"];

fn backtick_ident() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"`([A-Za-z_][A-Za-z0-9_.]*)\s*(?:\(\s*\))?`").expect("valid construct pattern")
    })
}

/// Extract construct names the prompt requires the learner's source to use.
pub fn required_constructs(prompt: &str) -> Vec<String> {
    let mut constructs = Vec::new();
    for sentence in prompt.split(['.', '!', '?', '\n']) {
        let lowered = sentence.to_lowercase();
        let demanding = REQUIREMENT_WORDS
            .iter()
            .any(|w| lowered.split_whitespace().any(|token| token == *w));
        if !demanding {
            continue;
        }
        for cap in backtick_ident().captures_iter(sentence) {
            let name = cap[1].to_string();
            if !constructs.contains(&name) {
                constructs.push(name);
            }
        }
    }
    constructs
}

/// Whether the source mentions the construct as a whole word.
pub fn source_uses(source: &str, construct: &str) -> bool {
    let pattern = format!(r"\b{}\b", regex::escape(construct));
    match Regex::new(&pattern) {
        Ok(re) => re.is_match(source),
        Err(_) => source.contains(construct),
    }
}
