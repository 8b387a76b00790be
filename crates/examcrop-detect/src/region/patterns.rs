// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Question marker and section header recognition.

use std::sync::LazyLock;

use examcrop_core::{DetectorConfig, GroupRange};
use regex::Regex;

/// Question-start markers, most specific first.
///
/// Exams often write `18.다음` with no space after the dot, so the dotted form
/// does not require trailing whitespace. The bare `18 ` form is a last resort.
static QUESTION_PATTERNS: LazyLock<[Regex; 5]> = LazyLock::new(|| {
    [
        Regex::new(r"^\[([0-9]{1,2})\s*[~∼]\s*([0-9]{1,2})\]").expect("valid regex"),
        Regex::new(r"^【([0-9]{1,2})】").expect("valid regex"),
        Regex::new(r"^\[([0-9]{1,2})\]").expect("valid regex"),
        Regex::new(r"^([0-9]{1,2})\.").expect("valid regex"),
        Regex::new(r"^([0-9]{1,2})\s").expect("valid regex"),
    ]
});

static RANGE_BRACKET_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[\s*[0-9]").expect("valid regex"));

/// Trailing text shorter than this after a range bracket marks a section header.
const SECTION_HEADER_MAX_TAIL: usize = 30;

/// A recognised question marker at the start of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionStart {
    pub number: u32,
    /// Set when the marker was a `[N~M]` range.
    pub group: Option<GroupRange>,
}

/// Whether `text` is a section header such as `[31~34] 다음 글을 읽고 물음에 답하시오.`
///
/// Headers introduce a group of questions but are not questions themselves.
/// They are recognised by a leading numeric range bracket followed by only a
/// short descriptor. A range bracket followed by a full passage is a group
/// question and is left to [`match_question_start`].
pub fn is_section_header(text: &str) -> bool {
    let text = text.trim();
    if !RANGE_BRACKET_START.is_match(text) {
        return false;
    }
    if !(text.contains('~') || text.contains('∼') || text.contains("\\sim")) {
        return false;
    }
    match text.find(']') {
        Some(end) => text[end + 1..].trim().chars().count() < SECTION_HEADER_MAX_TAIL,
        None => false,
    }
}

/// Match a question-start marker against the beginning of `text`.
///
/// Patterns are tried in order; a pattern whose number falls outside the
/// configured bounds does not end the search.
pub fn match_question_start(text: &str, config: &DetectorConfig) -> Option<QuestionStart> {
    let text = text.trim();
    for pattern in QUESTION_PATTERNS.iter() {
        let Some(caps) = pattern.captures(text) else {
            continue;
        };
        let Some(number) = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok()) else {
            continue;
        };
        if !config.accepts(number) {
            continue;
        }
        let group = caps
            .get(2)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .map(|last| GroupRange {
                first: number,
                last,
            });
        return Some(QuestionStart { number, group });
    }
    None
}
