use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::models::{Paragraph, StructuredSections};
use crate::normalize::{compile, phrase_alternation, strings, NormalizerRules, LINK_RE};
use crate::segment::Segmenter;

static PHONE_SHAPE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{2,3}-\d{3,4}-\d{4}").unwrap());

static UNIT_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+\s*(?:층|호)").unwrap());

static TOC_START_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.").unwrap());

const INTRO_HARD_CAP: usize = 1200;
const CLOSING_HARD_CAP: usize = 1000;
const EXPANSION_NEIGHBOURS: usize = 2;
const CLOSING_MIN_CANDIDATE: usize = 10;
const CLOSING_FALLBACK_MIN: usize = 50;
const SEPARATOR: &str = "\n\n";

// ── Roles ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Intro,
    Closing,
}

impl Role {
    /// Expansion never grows a selection past this many characters.
    pub fn hard_cap(self) -> usize {
        match self {
            Role::Intro => INTRO_HARD_CAP,
            Role::Closing => CLOSING_HARD_CAP,
        }
    }

    pub fn rules(self) -> &'static [ScoreRule] {
        match self {
            Role::Intro => INTRO_RULES,
            Role::Closing => CLOSING_RULES,
        }
    }
}

// ── Tables ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ScoringTables {
    pub intro_keywords: Vec<String>,
    pub closing_keywords: Vec<String>,
    /// Regex sources for sign-off phrasing; each match adds its weight once.
    pub closing_patterns: Vec<String>,
    pub address_fragments: Vec<String>,
    pub link_farm_phrases: Vec<String>,
    pub intro_window: usize,
    pub closing_window: usize,
    pub closing_threshold: i32,
    pub intro_min_len: usize,
    pub closing_min_len: usize,
}

impl Default for ScoringTables {
    fn default() -> Self {
        let normalizer = NormalizerRules::naver_blog();
        Self {
            intro_keywords: strings(&[
                "안녕하세요", "반갑습니다", "소개", "시작", "오늘", "이번", "여러분", "어머님",
                "부모님", "독자", "클릭", "글을", "포스팅", "hello", "welcome", "today",
            ]),
            closing_keywords: strings(&[
                "감사합니다", "고맙습니다", "마무리", "끝으로", "마지막으로", "결론", "정리하면",
                "요약", "연락", "문의", "상담", "예약", "도움이 되었", "참고하시", "바랍니다",
                "기원합니다", "thank you", "thanks", "in summary", "to sum up",
            ]),
            closing_patterns: strings(&[
                "읽어주셔서",
                "원장이었습니다",
                "센터.*?대표",
                "연락.*?주시면",
                "응대.*?드리고",
                "양해.*?부탁",
                "결정하시길",
                "바랄게요",
                "감사합니다",
                "(?i)thanks? for reading",
                "(?i)read(?:ing)? to the end",
            ]),
            address_fragments: normalizer.address_regions,
            link_farm_phrases: normalizer.link_farm_phrases,
            intro_window: 3,
            closing_window: 5,
            closing_threshold: 3,
            intro_min_len: 300,
            closing_min_len: 200,
        }
    }
}

// ── Rules ────────────────────────────────────────────────────────────────────

/// One additive heuristic: `weight` is added once per hit.
pub struct ScoreRule {
    pub name: &'static str,
    pub weight: i32,
    hits: fn(&RoleScorer, &Paragraph) -> usize,
}

impl ScoreRule {
    pub fn hits(&self, scorer: &RoleScorer, p: &Paragraph) -> usize {
        (self.hits)(scorer, p)
    }

    pub fn contribution(&self, scorer: &RoleScorer, p: &Paragraph) -> i32 {
        self.weight * self.hits(scorer, p) as i32
    }
}

impl std::fmt::Debug for ScoreRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreRule")
            .field("name", &self.name)
            .field("weight", &self.weight)
            .finish()
    }
}

pub const INTRO_RULES: &[ScoreRule] = &[
    ScoreRule { name: "length_ideal", weight: 10, hits: intro_length_ideal },
    ScoreRule { name: "length_fair", weight: 5, hits: intro_length_fair },
    ScoreRule { name: "intro_keyword", weight: 3, hits: intro_keyword_hits },
    ScoreRule { name: "terminal_punctuation", weight: 2, hits: terminal_punctuation },
    ScoreRule { name: "table_of_contents", weight: -5, hits: table_of_contents },
];

pub const CLOSING_RULES: &[ScoreRule] = &[
    ScoreRule { name: "length_ideal", weight: 15, hits: closing_length_ideal },
    ScoreRule { name: "length_wide", weight: 10, hits: closing_length_wide },
    ScoreRule { name: "length_some", weight: 5, hits: closing_length_some },
    ScoreRule { name: "closing_keyword", weight: 8, hits: closing_keyword_hits },
    ScoreRule { name: "closing_pattern", weight: 6, hits: closing_pattern_hits },
    ScoreRule { name: "contact_details", weight: -8, hits: contact_details },
    ScoreRule { name: "link_remnants", weight: -6, hits: link_remnants },
    ScoreRule { name: "link_farm", weight: -15, hits: link_farm },
];

fn hit(b: bool) -> usize {
    usize::from(b)
}

fn is_ideal(len: usize) -> bool {
    (100..=800).contains(&len)
}

fn is_wide(len: usize) -> bool {
    (50..=1000).contains(&len)
}

fn intro_length_ideal(_: &RoleScorer, p: &Paragraph) -> usize {
    hit(is_ideal(p.length))
}

fn intro_length_fair(_: &RoleScorer, p: &Paragraph) -> usize {
    hit(p.length > 50 && !is_ideal(p.length))
}

fn intro_keyword_hits(s: &RoleScorer, p: &Paragraph) -> usize {
    keyword_hits(&s.intro_keywords, &p.text)
}

fn terminal_punctuation(_: &RoleScorer, p: &Paragraph) -> usize {
    hit(p.text.trim_end().ends_with(['.', '!', '?']))
}

fn table_of_contents(_: &RoleScorer, p: &Paragraph) -> usize {
    hit(TOC_START_RE.is_match(&p.text) || (p.text.contains("1.") && p.text.contains("2.")))
}

fn closing_length_ideal(_: &RoleScorer, p: &Paragraph) -> usize {
    hit(is_ideal(p.length))
}

fn closing_length_wide(_: &RoleScorer, p: &Paragraph) -> usize {
    hit(is_wide(p.length) && !is_ideal(p.length))
}

fn closing_length_some(_: &RoleScorer, p: &Paragraph) -> usize {
    hit(p.length > 20 && !is_wide(p.length) && !is_ideal(p.length))
}

fn closing_keyword_hits(s: &RoleScorer, p: &Paragraph) -> usize {
    keyword_hits(&s.closing_keywords, &p.text)
}

fn closing_pattern_hits(s: &RoleScorer, p: &Paragraph) -> usize {
    s.closing_patterns.iter().filter(|re| re.is_match(&p.text)).count()
}

fn contact_details(s: &RoleScorer, p: &Paragraph) -> usize {
    hit(PHONE_SHAPE_RE.is_match(&p.text)
        || s.address.as_ref().is_some_and(|re| re.is_match(&p.text))
        || UNIT_SUFFIX_RE.is_match(&p.text))
}

fn link_remnants(_: &RoleScorer, p: &Paragraph) -> usize {
    hit(LINK_RE.find_iter(&p.text).count() > 1)
}

fn link_farm(s: &RoleScorer, p: &Paragraph) -> usize {
    hit(s.has_link_farm(&p.text))
}

fn keyword_hits(keywords: &[String], text: &str) -> usize {
    let lower = text.to_lowercase();
    keywords
        .iter()
        .filter(|k| !k.is_empty() && lower.contains(&k.to_lowercase()))
        .count()
}

// ── Scorer ───────────────────────────────────────────────────────────────────

/// Picks the opening and closing paragraphs of an article body.
#[derive(Debug, Clone)]
pub struct RoleScorer {
    segmenter: Segmenter,
    intro_keywords: Vec<String>,
    closing_keywords: Vec<String>,
    closing_patterns: Vec<Regex>,
    address: Option<Regex>,
    link_farm: Option<Regex>,
    intro_window: usize,
    closing_window: usize,
    closing_threshold: i32,
    intro_min_len: usize,
    closing_min_len: usize,
}

impl Default for RoleScorer {
    fn default() -> Self {
        Self::new(Segmenter::default(), &ScoringTables::default())
    }
}

impl RoleScorer {
    pub fn new(segmenter: Segmenter, tables: &ScoringTables) -> Self {
        let closing_patterns = tables
            .closing_patterns
            .iter()
            .filter_map(|p| compile(Some(p.clone())))
            .collect();
        Self {
            segmenter,
            intro_keywords: tables.intro_keywords.clone(),
            closing_keywords: tables.closing_keywords.clone(),
            closing_patterns,
            address: compile(phrase_alternation(&tables.address_fragments)),
            link_farm: compile(phrase_alternation(&tables.link_farm_phrases).map(|p| format!("(?i){p}"))),
            intro_window: tables.intro_window,
            closing_window: tables.closing_window,
            closing_threshold: tables.closing_threshold,
            intro_min_len: tables.intro_min_len,
            closing_min_len: tables.closing_min_len,
        }
    }

    pub fn segmenter(&self) -> &Segmenter {
        &self.segmenter
    }

    pub fn has_link_farm(&self, text: &str) -> bool {
        self.link_farm.as_ref().is_some_and(|re| re.is_match(text))
    }

    pub fn score(&self, role: Role, p: &Paragraph) -> i32 {
        role.rules().iter().map(|r| r.contribution(self, p)).sum()
    }

    /// Non-zero rule contributions, in table order.
    pub fn contributions(&self, role: Role, p: &Paragraph) -> Vec<(&'static str, i32)> {
        role.rules()
            .iter()
            .map(|r| (r.name, r.contribution(self, p)))
            .filter(|(_, c)| *c != 0)
            .collect()
    }

    pub fn find_first(&self, text: &str) -> Option<Paragraph> {
        let paragraphs = self.segmenter.segment(text);
        self.select_intro(&paragraphs).cloned()
    }

    pub fn find_closing(&self, text: &str) -> Option<Paragraph> {
        let paragraphs = self.segmenter.segment(text);
        self.select_closing(&paragraphs, None).cloned()
    }

    /// Highest intro score within the opening window; ties keep the earliest.
    pub fn select_intro<'a>(&self, paragraphs: &'a [Paragraph]) -> Option<&'a Paragraph> {
        let mut best: Option<(i32, &Paragraph)> = None;
        for p in paragraphs.iter().take(self.intro_window.max(1)) {
            let score = self.score(Role::Intro, p);
            if best.map_or(true, |(b, _)| score > b) {
                best = Some((score, p));
            }
        }
        best.map(|(_, p)| p)
    }

    /// Highest closing score within the trailing window; ties keep the
    /// earliest. Below the threshold the last substantial paragraph wins.
    pub fn select_closing<'a>(
        &self,
        paragraphs: &'a [Paragraph],
        exclude: Option<usize>,
    ) -> Option<&'a Paragraph> {
        let eligible: Vec<&Paragraph> =
            paragraphs.iter().filter(|p| Some(p.index) != exclude).collect();
        let start = eligible.len().saturating_sub(self.closing_window.max(1));

        let mut best: Option<(i32, &Paragraph)> = None;
        for p in &eligible[start..] {
            if p.text.trim().chars().count() < CLOSING_MIN_CANDIDATE {
                continue;
            }
            let score = self.score(Role::Closing, p);
            if best.map_or(true, |(b, _)| score > b) {
                best = Some((score, *p));
            }
        }

        if let Some((score, p)) = best {
            if score >= self.closing_threshold {
                return Some(p);
            }
            tracing::debug!(score, index = p.index, "closing score below threshold");
        }

        eligible
            .iter()
            .rev()
            .find(|p| p.length > CLOSING_FALLBACK_MIN && !self.has_link_farm(&p.text))
            .copied()
            .or(best.map(|(_, p)| p))
            .or_else(|| eligible.last().copied())
    }

    /// Selected paragraph for `role`, merged with up to two neighbours when it
    /// is shorter than `min_len`.
    pub fn expand(&self, text: &str, role: Role, min_len: usize) -> Option<String> {
        let paragraphs = self.segmenter.segment(text);
        let selected = match role {
            Role::Intro => self.select_intro(&paragraphs),
            Role::Closing => self.select_closing(&paragraphs, None),
        }?;
        Some(expand_selected(&paragraphs, selected, role, min_len))
    }

    pub fn extended_first(&self, text: &str) -> Option<String> {
        self.expand(text, Role::Intro, self.intro_min_len)
    }

    pub fn extended_closing(&self, text: &str) -> Option<String> {
        self.expand(text, Role::Closing, self.closing_min_len)
    }

    /// Expansion of the paragraph `sections` already picked for `role`.
    pub fn extend_section(&self, sections: &StructuredSections, role: Role) -> Option<String> {
        let (selected, min_len) = match role {
            Role::Intro => (sections.first_paragraph.as_ref()?, self.intro_min_len),
            Role::Closing => (sections.closing_paragraph.as_ref()?, self.closing_min_len),
        };
        Some(expand_selected(&sections.all_paragraphs, selected, role, min_len))
    }

    pub fn structured_sections(&self, text: &str) -> StructuredSections {
        let paragraphs = self.segmenter.segment(text);
        let first = self.select_intro(&paragraphs).cloned();
        let exclude = match (&first, paragraphs.len()) {
            (Some(f), n) if n > 1 => Some(f.index),
            _ => None,
        };
        let closing = self.select_closing(&paragraphs, exclude).cloned();

        StructuredSections {
            total_paragraphs: paragraphs.len(),
            total_length: text.chars().count(),
            all_paragraphs: paragraphs,
            first_paragraph: first,
            closing_paragraph: closing,
        }
    }
}

/// Grows `selected` toward its neighbours (forward for intro, backward for
/// closing) while the joined text stays within the role's hard cap. Source
/// order is kept.
pub fn expand_selected(
    paragraphs: &[Paragraph],
    selected: &Paragraph,
    role: Role,
    min_len: usize,
) -> String {
    if selected.length >= min_len {
        return selected.text.clone();
    }

    let neighbours: Vec<&Paragraph> = match role {
        Role::Intro => paragraphs
            .iter()
            .skip(selected.index + 1)
            .take(EXPANSION_NEIGHBOURS)
            .collect(),
        Role::Closing => paragraphs[..selected.index.min(paragraphs.len())]
            .iter()
            .rev()
            .take(EXPANSION_NEIGHBOURS)
            .collect(),
    };

    let mut chosen = vec![selected];
    chosen.extend(neighbours);
    chosen.sort_by_key(|p| p.index);

    let texts: Vec<&str> = chosen.iter().map(|p| p.text.as_str()).collect();
    match role {
        Role::Intro => combine_related(&texts, role.hard_cap()),
        Role::Closing => {
            let reversed: Vec<&str> = texts.iter().rev().copied().collect();
            let mut kept: Vec<&str> = combine_parts(&reversed, role.hard_cap());
            kept.reverse();
            kept.join(SEPARATOR)
        }
    }
}

/// Joins paragraphs in order with blank lines, stopping before the first one
/// that would push the result past `max_len` characters. The first paragraph
/// is always kept.
pub fn combine_related(paragraphs: &[&str], max_len: usize) -> String {
    combine_parts(paragraphs, max_len).join(SEPARATOR)
}

fn combine_parts<'a>(paragraphs: &[&'a str], max_len: usize) -> Vec<&'a str> {
    let sep = SEPARATOR.chars().count();
    let mut kept = Vec::new();
    let mut total = 0;
    for (i, p) in paragraphs.iter().enumerate() {
        let len = p.chars().count();
        let next = if i == 0 { len } else { total + sep + len };
        if i > 0 && next > max_len {
            break;
        }
        kept.push(*p);
        total = next;
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> RoleScorer {
        RoleScorer::default()
    }

    fn filler(n: usize) -> String {
        "내용".repeat(n / 2)
    }

    #[test]
    fn intro_prefers_greeting_paragraph() {
        let text = format!(
            "{}\n\n안녕하세요 여러분, 오늘은 제가 좋아하는 이야기를 소개하려고 합니다. {}\n\n{}",
            filler(120),
            filler(100),
            filler(120)
        );
        let p = scorer().find_first(&text).unwrap();
        assert_eq!(p.index, 1);
    }

    #[test]
    fn intro_ties_keep_earliest() {
        let text = format!("{}\n\n{}", filler(120), filler(120));
        assert_eq!(scorer().find_first(&text).unwrap().index, 0);
    }

    #[test]
    fn intro_penalizes_table_of_contents() {
        let s = scorer();
        let toc = Paragraph::new(format!("1. 준비 2. 실행 {}", filler(120)), 0);
        assert!(s.contributions(Role::Intro, &toc).contains(&("table_of_contents", -5)));
    }

    #[test]
    fn closing_prefers_thanks() {
        let text = format!(
            "{}\n\n{}\n\n끝까지 읽어주셔서 감사합니다. 궁금한 점은 언제든 문의 주세요. {}",
            filler(120),
            filler(120),
            filler(60)
        );
        let p = scorer().find_closing(&text).unwrap();
        assert_eq!(p.index, 2);
    }

    #[test]
    fn closing_ties_keep_earliest() {
        let s = scorer();
        let text = format!("{}\n\n{}\n\n{}", filler(150), filler(150), filler(150));
        let paragraphs = s.segmenter().segment(&text);
        let scores: Vec<i32> = paragraphs.iter().map(|p| s.score(Role::Closing, p)).collect();
        assert_eq!(scores, vec![15, 15, 15]);
        assert_eq!(s.find_closing(&text).unwrap().index, 0);
    }

    #[test]
    fn closing_skips_trailing_link_farm_block() {
        let text = format!(
            "{}\n\n그동안 긴 글 읽어주셔서 감사합니다. {}\n\n함께 읽으면 좋은 글\n[필독] 상담 접수 안내\nblog.naver.com/a/1\nblog.naver.com/a/2",
            filler(200),
            filler(100)
        );
        let s = scorer();
        let paragraphs = s.segmenter().segment(&text);
        assert_eq!(paragraphs.len(), 3);
        let closing = s.find_closing(&text).unwrap();
        assert_eq!(closing.index, 1);
        assert!(!closing.text.contains("함께 읽으면"));
    }

    #[test]
    fn low_scores_fall_back_to_last_substantial_paragraph() {
        let s = scorer();
        let noisy = |n: usize| format!("010-1234-5678 www.a.com www.b.com {}", filler(n));
        let text = format!("{}\n\n{}", noisy(100), noisy(40));
        let paragraphs = s.segmenter().segment(&text);
        assert!(s.score(Role::Closing, &paragraphs[0]) < 3);
        assert!(s.score(Role::Closing, &paragraphs[1]) < s.score(Role::Closing, &paragraphs[0]));
        assert_eq!(s.find_closing(&text).unwrap().index, 1);
    }

    #[test]
    fn contact_details_are_penalized_not_excluded() {
        let s = scorer();
        let p = Paragraph::new(format!("상담 예약은 02-123-4567 로 연락 주시면 됩니다. {}", filler(80)), 0);
        let parts = s.contributions(Role::Closing, &p);
        assert!(parts.contains(&("contact_details", -8)));
        assert!(s.score(Role::Closing, &p) > 3);
    }

    #[test]
    fn contributions_sum_to_score() {
        let s = scorer();
        let p = Paragraph::new("감사합니다. 끝까지 읽어주셔서 고맙습니다. www.a.com www.b.com", 0);
        let sum: i32 = s.contributions(Role::Closing, &p).iter().map(|(_, c)| c).sum();
        assert_eq!(sum, s.score(Role::Closing, &p));
    }

    #[test]
    fn length_tiers_are_exclusive() {
        let s = scorer();
        for len in [10, 30, 60, 150, 900, 1500] {
            let p = Paragraph::new("가".repeat(len), 0);
            let tiers = s
                .contributions(Role::Closing, &p)
                .into_iter()
                .filter(|(n, _)| n.starts_with("length_"))
                .count();
            assert!(tiers <= 1, "len {len}");
        }
    }

    #[test]
    fn no_paragraphs_means_no_roles() {
        let s = scorer();
        assert!(s.find_first("").is_none());
        assert!(s.find_closing("").is_none());
        assert!(s.expand("", Role::Intro, 300).is_none());
    }

    #[test]
    fn selected_roles_are_members_of_segmentation() {
        let s = scorer();
        let text = format!("{}\n\n짧은 문단이지만 스무 자는 넘습니다\n\n{}", filler(300), filler(90));
        let paragraphs = s.segmenter().segment(&text);
        let first = s.find_first(&text).unwrap();
        let closing = s.find_closing(&text).unwrap();
        assert!(paragraphs.contains(&first));
        assert!(paragraphs.contains(&closing));
    }

    #[test]
    fn intro_expansion_merges_forward_within_cap() {
        let s = scorer();
        let text = format!(
            "안녕하세요 여러분 오늘 소개할 글입니다.\n\n{}\n\n{}\n\n{}",
            filler(400),
            filler(900),
            filler(100)
        );
        let first = s.find_first(&text).unwrap();
        let expanded = s.expand(&text, Role::Intro, 300).unwrap();
        assert!(expanded.starts_with(&first.text));
        assert!(expanded.chars().count() >= first.length);
        assert!(expanded.chars().count() <= INTRO_HARD_CAP);
        assert_eq!(expanded.matches(SEPARATOR).count(), 1);
    }

    #[test]
    fn closing_expansion_merges_backward_and_keeps_selection() {
        let s = scorer();
        let text = format!(
            "{}\n\n{}\n\n{}\n\n끝까지 읽어주셔서 감사합니다. 다음에 또 만나요.",
            filler(900),
            filler(500),
            filler(300)
        );
        let closing = s.find_closing(&text).unwrap();
        let expanded = s.expand(&text, Role::Closing, 200).unwrap();
        assert!(expanded.ends_with(&closing.text));
        assert!(expanded.chars().count() <= CLOSING_HARD_CAP);
        assert!(expanded.chars().count() > closing.length);
    }

    #[test]
    fn long_selection_is_not_expanded() {
        let s = scorer();
        let text = format!("{}\n\n{}", filler(400), filler(400));
        assert_eq!(s.extended_first(&text).unwrap(), filler(400));
    }

    #[test]
    fn sections_keep_first_and_closing_distinct() {
        let s = scorer();
        let text = format!("{}\n\n{}", filler(120), filler(30));
        let sections = s.structured_sections(&text);
        assert_eq!(sections.total_paragraphs, 2);
        let first = sections.first_paragraph.unwrap();
        let closing = sections.closing_paragraph.unwrap();
        assert_ne!(first.index, closing.index);
        assert_eq!(sections.total_length, text.chars().count());
    }

    #[test]
    fn section_expansion_follows_the_reported_closing() {
        let s = scorer();
        let text = format!(
            "안녕하세요 여러분, 오늘 글을 끝까지 읽어주셔서 감사합니다. {}\n\n짧은 마지막 문단이지만 스무 자는 넘습니다",
            filler(100)
        );
        let sections = s.structured_sections(&text);
        let first = sections.first_paragraph.clone().unwrap();
        let closing = sections.closing_paragraph.clone().unwrap();
        assert_eq!((first.index, closing.index), (0, 1));

        let extended = s.extend_section(&sections, Role::Closing).unwrap();
        assert!(extended.ends_with(&closing.text), "{extended}");
        assert!(extended.chars().count() <= CLOSING_HARD_CAP);
        assert!(!s.extended_closing(&text).unwrap().ends_with(&closing.text));
    }

    #[test]
    fn single_paragraph_fills_both_roles() {
        let s = scorer();
        let sections = s.structured_sections("하나뿐인 문단이지만 충분히 길게 작성되었습니다.");
        assert_eq!(sections.first_paragraph, sections.closing_paragraph);
        assert!(sections.first_paragraph.is_some());
    }

    #[test]
    fn combine_related_respects_cap() {
        assert_eq!(combine_related(&["aaaa", "bbbb", "cccc"], 10), "aaaa\n\nbbbb");
        assert_eq!(combine_related(&["aaaaaaaaaaaa", "b"], 5), "aaaaaaaaaaaa");
    }

    #[test]
    fn synthetic_tables_drive_scores() {
        let tables = ScoringTables {
            intro_keywords: strings(&["zebra"]),
            ..ScoringTables::default()
        };
        let s = RoleScorer::new(Segmenter::default(), &tables);
        let p = Paragraph::new("a zebra walks by", 0);
        assert!(s.contributions(Role::Intro, &p).contains(&("intro_keyword", 3)));
    }
}
