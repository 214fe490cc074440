use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::Paragraph;
use crate::normalize::{compile, phrase_alternation, strings};

// ── Thresholds ───────────────────────────────────────────────────────────────

const BLANK_SPLIT_MIN: usize = 20;
const SENTENCE_SOFT_CAP: usize = 500;
const SENTENCE_FLUSH_MIN: usize = 50;
const KEYWORD_SPLIT_TEXT_MIN: usize = 1000;
const KEYWORD_FRAGMENT_MIN: usize = 100;
const SHORT_HANGUL_MAX: usize = 3;

static BLANK_LINES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t]*\n\s*").unwrap());

static NUMBERED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\.\s*[가-힣A-Za-z]").unwrap());

static DEFINITION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\s.!?]+(?:이란|란)\?|\b[A-Za-z][A-Za-z-]* is defined as\b").unwrap()
});

static PUNCT_ONLY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\d\s\p{P}\p{S}]+$").unwrap());

static SHORT_HANGUL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^[ㄱ-ㅎㅏ-ㅣ가-힣\s]{{1,{SHORT_HANGUL_MAX}}}$")).unwrap()
});

// ── Rule tables ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SegmentRules {
    /// Connectives a long unbroken text is split in front of.
    pub discourse_markers: Vec<String>,
    /// Single-word navigation labels ("next", "category", ...).
    pub navigation_tokens: Vec<String>,
    /// Engagement-counter labels; a line of just label + count is navigation.
    pub counter_labels: Vec<String>,
}

impl Default for SegmentRules {
    fn default() -> Self {
        Self {
            discourse_markers: strings(&[
                "그런데", "하지만", "그래서", "따라서", "결론적으로", "마지막으로", "However",
                "Therefore", "Finally", "So,",
            ]),
            navigation_tokens: strings(&[
                "다음글", "이전글", "목록", "카테고리", "태그", "prev", "previous", "next",
                "list", "category", "tag", "tags",
            ]),
            counter_labels: strings(&[
                "공감", "댓글", "조회", "좋아요", "구독", "이웃추가", "likes", "comments", "views",
            ]),
        }
    }
}

// ── Segmenter ────────────────────────────────────────────────────────────────

/// Splits normalized text into paragraphs. Stateless: equal input always
/// yields an equal sequence.
#[derive(Debug, Clone)]
pub struct Segmenter {
    discourse: Option<Regex>,
    navigation: Option<Regex>,
    counter: Option<Regex>,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(&SegmentRules::default())
    }
}

impl Segmenter {
    pub fn new(rules: &SegmentRules) -> Self {
        let discourse = phrase_alternation(&rules.discourse_markers);
        let navigation =
            phrase_alternation(&rules.navigation_tokens).map(|t| format!(r"(?i)^{t}$"));
        let counter =
            phrase_alternation(&rules.counter_labels).map(|l| format!(r"(?i)^{l}\s*\d*$"));
        Self {
            discourse: compile(discourse),
            navigation: compile(navigation),
            counter: compile(counter),
        }
    }

    pub fn segment(&self, text: &str) -> Vec<Paragraph> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }

        let by_blank = split_blank_lines(text);
        let candidates = if by_blank.len() > 1 {
            by_blank
        } else {
            let by_sentence = split_sentences(text);
            if by_sentence.len() > 1 {
                by_sentence
            } else {
                let by_keyword = if text.chars().count() > KEYWORD_SPLIT_TEXT_MIN {
                    self.split_keywords(text)
                } else {
                    Vec::new()
                };
                if by_keyword.len() > 1 {
                    by_keyword
                } else if !by_blank.is_empty() {
                    by_blank
                } else if !by_sentence.is_empty() {
                    by_sentence
                } else {
                    vec![text.to_string()]
                }
            }
        };

        candidates
            .into_iter()
            .filter(|c| !self.is_navigation_text(c))
            .enumerate()
            .map(|(index, text)| Paragraph::new(text, index))
            .collect()
    }

    pub fn is_navigation_text(&self, text: &str) -> bool {
        let t = text.trim();
        if t.is_empty() {
            return true;
        }
        self.navigation.as_ref().is_some_and(|re| re.is_match(t))
            || self.counter.as_ref().is_some_and(|re| re.is_match(t))
            || PUNCT_ONLY_RE.is_match(t)
            || SHORT_HANGUL_RE.is_match(t)
    }

    fn split_keywords(&self, text: &str) -> Vec<String> {
        let patterns = [Some(&*DEFINITION_RE), Some(&*NUMBERED_RE), self.discourse.as_ref()];
        for re in patterns.into_iter().flatten() {
            let fragments: Vec<String> = split_before(re, text)
                .into_iter()
                .filter(|f| f.chars().count() > KEYWORD_FRAGMENT_MIN)
                .collect();
            if fragments.len() > 1 {
                tracing::debug!(pattern = re.as_str(), fragments = fragments.len(), "keyword split");
                return fragments;
            }
        }
        Vec::new()
    }
}

fn split_blank_lines(text: &str) -> Vec<String> {
    BLANK_LINES_RE
        .split(text)
        .map(str::trim)
        .filter(|p| p.chars().count() > BLANK_SPLIT_MIN)
        .map(str::to_string)
        .collect()
}

fn is_sentence_start(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || ('가'..='힣').contains(&c)
}

/// Sentence boundaries: a terminal mark followed by a capital, Hangul
/// syllable or digit. Digits only count after whitespace so decimals stay
/// whole.
fn sentence_spans(text: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut spans = Vec::new();
    let mut start = 0;

    for (i, &(pos, c)) in chars.iter().enumerate() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let mut j = i + 1;
        while j < chars.len() && chars[j].1.is_whitespace() {
            j += 1;
        }
        let Some(&(next_pos, next)) = chars.get(j) else {
            break;
        };
        let spaced = j > i + 1;
        if is_sentence_start(next) && (spaced || !next.is_ascii_digit()) {
            spans.push(text[start..pos + c.len_utf8()].trim());
            start = next_pos;
        }
    }
    spans.push(text[start..].trim());
    spans.retain(|s| !s.is_empty());
    spans
}

fn split_sentences(text: &str) -> Vec<String> {
    let sentences = sentence_spans(text);
    if sentences.len() <= 1 {
        return Vec::new();
    }

    let mut paragraphs = Vec::new();
    let mut buffer = String::new();
    let mut buffer_len = 0;

    for sentence in sentences {
        let len = sentence.chars().count();
        if buffer_len + len < SENTENCE_SOFT_CAP {
            if !buffer.is_empty() {
                buffer.push(' ');
                buffer_len += 1;
            }
            buffer.push_str(sentence);
            buffer_len += len;
        } else {
            if buffer_len > SENTENCE_FLUSH_MIN {
                paragraphs.push(std::mem::take(&mut buffer));
            }
            buffer = sentence.to_string();
            buffer_len = len;
        }
    }
    if buffer_len > SENTENCE_FLUSH_MIN {
        paragraphs.push(buffer);
    }
    paragraphs
}

fn split_before(re: &Regex, text: &str) -> Vec<String> {
    let mut cuts: Vec<usize> = re.find_iter(text).map(|m| m.start()).filter(|&s| s > 0).collect();
    cuts.dedup();
    let mut fragments = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0;
    for cut in cuts {
        fragments.push(text[start..cut].trim().to_string());
        start = cut;
    }
    fragments.push(text[start..].trim().to_string());
    fragments.retain(|f| !f.is_empty());
    fragments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(s: &str) -> Vec<Paragraph> {
        Segmenter::default().segment(s)
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(segment("").is_empty());
        assert!(segment("   \n\n ").is_empty());
    }

    #[test]
    fn blank_lines_split_in_order() {
        let p = segment("The first paragraph has enough text\n\nThe second paragraph has enough text");
        assert_eq!(p.len(), 2);
        assert_eq!(p[0].text, "The first paragraph has enough text");
        assert_eq!(p[1].text, "The second paragraph has enough text");
        assert_eq!((p[0].index, p[1].index), (0, 1));
        assert_eq!(p[0].length, p[0].text.chars().count());
    }

    #[test]
    fn run_on_line_is_one_paragraph() {
        let p = segment("  one long line without any sentence terminator at all  ");
        assert_eq!(p.len(), 1);
        assert_eq!(p[0].text, "one long line without any sentence terminator at all");
    }

    #[test]
    fn sentences_are_regrouped_under_soft_cap() {
        let sentence = "이 문장은 재결합 테스트를 위해 충분히 길게 작성된 문장입니다. ";
        let text = sentence.repeat(30);
        let p = segment(&text);
        assert!(p.len() > 1, "{}", p.len());
        for para in &p {
            assert!(para.length < SENTENCE_SOFT_CAP);
            assert!(para.length > SENTENCE_FLUSH_MIN);
        }
    }

    #[test]
    fn decimals_do_not_split() {
        assert_eq!(sentence_spans("Version 1.5 shipped. Then 2.0 came."), vec![
            "Version 1.5 shipped.",
            "Then 2.0 came."
        ]);
    }

    #[test]
    fn long_unbroken_text_splits_on_connectives() {
        let part = "오늘은 여러 가지 이야기를 길게 나누어 보려고 합니다 ".repeat(12);
        let text = format!("{part}하지만 {part}그래서 {part}");
        assert!(text.chars().count() > KEYWORD_SPLIT_TEXT_MIN);
        let p = segment(&text);
        assert_eq!(p.len(), 3);
        assert!(p[1].text.starts_with("하지만"));
        assert!(p[2].text.starts_with("그래서"));
    }

    #[test]
    fn split_before_keeps_leading_fragment() {
        let parts = split_before(&NUMBERED_RE, "목차 1. 첫째 2. 둘째");
        assert_eq!(parts, vec!["목차", "1. 첫째", "2. 둘째"]);
    }

    #[test]
    fn navigation_text_is_filtered() {
        let s = Segmenter::default();
        for nav in ["다음글", "Category", "공감 12", "2024. 1. 3.", "더보기", "--"] {
            assert!(s.is_navigation_text(nav), "{nav}");
        }
        assert!(!s.is_navigation_text("오늘은 날씨가 좋네요"));
    }

    #[test]
    fn navigation_filter_keeps_order() {
        let text = "첫 번째 문단은 충분히 긴 내용을 담고 있습니다\n\n2024. 01. 03. 12:30 / 2024. 01. 04. 09:15\n\n세 번째 문단도 충분히 긴 내용을 담고 있습니다";
        let p = segment(text);
        assert_eq!(p.len(), 2);
        assert!(p[1].text.starts_with("세 번째"));
        assert_eq!(p.iter().map(|p| p.index).collect::<Vec<_>>(), vec![0, 1]);
    }
}
