use once_cell::sync::Lazy;
use regex::Regex;

// ── Fixed patterns ───────────────────────────────────────────────────────────

static INVISIBLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\u{200B}\u{200C}\u{200D}\u{2060}\u{FEFF}\u{00AD}]").unwrap());

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").unwrap());

pub(crate) static LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:https?://\S+|\bwww\.\S+|\b[a-z0-9][a-z0-9-]*(?:\.[a-z0-9-]+)*\.(?:com|net|org|kr|io|me|co\.kr)\b\S*)",
    )
    .unwrap()
});

static MAP_SCALE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\s*(?:m|km)$").unwrap());

static HSPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\u{00A0}\u{3000}]+").unwrap());

static LINE_EDGE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r" ?\n ?").unwrap());

static MULTI_NEWLINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Rules can expose new matches once neighbouring noise is gone, so a call
/// runs whole passes until the text stops changing.
const MAX_PASSES: usize = 6;

const PREVIEW_TITLE_MIN: usize = 5;
const PREVIEW_TITLE_MAX: usize = 100;
const PREVIEW_DESCRIPTION_MIN: usize = 10;
const PREVIEW_DESCRIPTION_MAX: usize = 200;
const LINK_LINE_RESIDUE: usize = 10;
const MAP_LINE_MAX: usize = 60;

// ── Rule tables ──────────────────────────────────────────────────────────────

/// Phrase tables driving the normalizer. Entries are literal text; a space
/// inside an entry matches any run of whitespace (including none).
#[derive(Debug, Clone)]
pub struct NormalizerRules {
    /// Area codes and service prefixes that open a phone number.
    pub phone_prefixes: Vec<String>,
    /// Engagement counters: the label followed by a count is removed as a
    /// token, and the label alone on a line is removed as a line.
    pub counter_labels: Vec<String>,
    /// Chrome phrases removed wherever they stand as whole tokens.
    pub chrome_phrases: Vec<String>,
    /// Province and metropolitan-city names that open an address.
    pub address_regions: Vec<String>,
    /// Text that only appears inside an embedded map widget.
    pub map_anchors: Vec<String>,
    /// Short lines a map widget leaks next to its anchors.
    pub map_legend: Vec<String>,
    /// Phrases that open a "related posts" block.
    pub link_farm_phrases: Vec<String>,
}

impl Default for NormalizerRules {
    fn default() -> Self {
        Self::naver_blog()
    }
}

impl NormalizerRules {
    pub fn naver_blog() -> Self {
        Self {
            phone_prefixes: strings(&[
                "010", "011", "016", "017", "018", "019", "070", "02", "031", "032", "033",
                "041", "042", "043", "044", "051", "052", "053", "054", "055", "061", "062",
                "063", "064", "1544", "1566", "1577", "1588", "1599", "1600", "1644", "1661",
                "1666", "1670", "1688", "1800", "1833", "1855", "1877", "1899",
            ]),
            counter_labels: strings(&[
                "공감", "댓글", "조회", "좋아요", "구독", "likes", "comments", "views",
            ]),
            chrome_phrases: strings(&[
                "이웃추가",
                "구독하기",
                "궁금할 땐 네이버 톡톡하세요!",
                "궁금할 땐 네이버 톡톡하세요",
                "subscribe",
                "add to favorites",
            ]),
            address_regions: strings(&[
                "서울특별시", "서울시", "부산광역시", "대구광역시", "인천광역시", "광주광역시",
                "대전광역시", "울산광역시", "세종특별자치시", "경기도", "강원특별자치도",
                "강원도", "충청북도", "충청남도", "전북특별자치도", "전라북도", "전라남도",
                "경상북도", "경상남도", "제주특별자치도",
            ]),
            map_anchors: strings(&["지도 데이터", "NAVER Corp", "OpenStreetMap"]),
            map_legend: strings(&[
                "x", "더보기", "지도 컨트롤러 범례", "부동산", "거리", "읍,면,동", "시,군,구",
                "시,도", "국가", "지도 보기", "길찾기",
            ]),
            link_farm_phrases: strings(&[
                "함께 읽으면 좋은 글",
                "함께 보면 좋은 글",
                "같이 보면 좋은 글",
                "see related posts",
            ]),
        }
    }
}

pub(crate) fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Alternation over literal phrases, longest first so a phrase never loses
/// to one of its own prefixes.
pub(crate) fn phrase_alternation(items: &[String]) -> Option<String> {
    alternation(items, false)
}

/// Like [`phrase_alternation`], but a phrase ending in a word character must
/// also end at a word boundary. Nothing after the phrase is consumed.
fn token_alternation(items: &[String]) -> Option<String> {
    alternation(items, true)
}

fn alternation(items: &[String], bounded: bool) -> Option<String> {
    let mut parts: Vec<String> = items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| {
            let body = s
                .split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s*");
            let word_end = s.chars().last().is_some_and(|c| c.is_alphanumeric() || c == '_');
            if bounded && word_end {
                format!(r"{body}\b")
            } else {
                body
            }
        })
        .collect();
    if parts.is_empty() {
        return None;
    }
    parts.sort_by_key(|p| std::cmp::Reverse(p.len()));
    Some(format!("(?:{})", parts.join("|")))
}

pub(crate) fn compile(pattern: Option<String>) -> Option<Regex> {
    let pattern = pattern?;
    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!(error = %e, "heuristic rule disabled");
            None
        }
    }
}

// ── Normalizer ───────────────────────────────────────────────────────────────

/// Pure, idempotent text cleaner for extracted article bodies.
#[derive(Debug, Clone)]
pub struct Normalizer {
    phone: Option<Regex>,
    counter_token: Option<Regex>,
    counter_line: Option<Regex>,
    chrome_phrase: Option<Regex>,
    address: Option<Regex>,
    map_anchor: Option<Regex>,
    map_legend: Vec<String>,
    link_farm: Option<Regex>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(&NormalizerRules::default())
    }
}

impl Normalizer {
    pub fn new(rules: &NormalizerRules) -> Self {
        let phone = phrase_alternation(&rules.phone_prefixes).map(|prefixes| {
            format!(r"(^|\D)(?:{prefixes}[-. ]?\d{{3,4}}[-. ]?\d{{4}}|\d{{2,4}}-\d{{3,4}}-\d{{4}})")
        });

        let counters = phrase_alternation(&rules.counter_labels);
        let counter_token = counters
            .as_ref()
            .map(|labels| format!(r"(?i)(^|\s){labels}\s*\d+\b"));
        let counter_line = counters
            .as_ref()
            .map(|labels| format!(r"(?im)^[ \t]*{labels}[ \t]*\d*[ \t]*$"));

        let chrome_phrase = token_alternation(&rules.chrome_phrases)
            .map(|phrases| format!(r"(?i)(^|\s){phrases}"));

        let address = phrase_alternation(&rules.address_regions).map(|regions| {
            format!(
                r"{regions}[^\n]{{0,60}}?(?:\d+(?:-\d+)?\s*층|\d+\s*호|(?:로|길)\s*\d+(?:-\d+)?)(?:\s*\d+\s*층)?(?:\s*\d+\s*호)?"
            )
        });

        let map_anchor = phrase_alternation(&rules.map_anchors);

        let link_farm = phrase_alternation(&rules.link_farm_phrases).map(|p| format!("(?i){p}"));

        Self {
            phone: compile(phone),
            counter_token: compile(counter_token),
            counter_line: compile(counter_line),
            chrome_phrase: compile(chrome_phrase),
            address: compile(address),
            map_anchor: compile(map_anchor),
            map_legend: rules.map_legend.iter().map(|s| s.trim().to_string()).collect(),
            link_farm: compile(link_farm),
        }
    }

    /// Run the rule passes until the text reaches a fixed point.
    pub fn normalize(&self, raw: &str) -> String {
        let mut current = self.pass(raw);
        for _ in 1..MAX_PASSES {
            let next = self.pass(&current);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    fn pass(&self, raw: &str) -> String {
        // 1. invisible markers
        let text = INVISIBLE_RE.replace_all(raw, "");

        // 2. link previews, emails, urls
        let text = drop_link_previews(&text);
        let text = EMAIL_RE.replace_all(&text, " ");
        let text = LINK_RE.replace_all(&text, " ");

        // 3. phone numbers
        let text = replace_opt(&self.phone, &text, "${1} ");

        // 4. platform chrome, token-bounded
        let text = replace_opt(&self.counter_token, &text, "${1}");
        let text = replace_opt(&self.counter_line, &text, "");
        let text = replace_opt(&self.chrome_phrase, &text, "${1}");

        // 5. addresses (best effort)
        let text = replace_opt(&self.address, &text, " ");

        // 6. map widget leakage
        let text = self.drop_map_widget(&text);

        // 7. related-posts tail
        let mut text = text;
        if let Some(cut) = self.link_farm.as_ref().and_then(|re| re.find(&text)).map(|m| m.start()) {
            text.truncate(cut);
        }

        // 8. whitespace
        collapse_whitespace(&text)
    }

    fn drop_map_widget(&self, text: &str) -> String {
        let Some(anchor) = self.map_anchor.as_ref() else {
            return text.to_string();
        };
        if !anchor.is_match(text) {
            return text.to_string();
        }

        let lines: Vec<&str> = text.split('\n').collect();
        let mut keep = vec![true; lines.len()];
        let mut i = 0;
        while i < lines.len() {
            if !self.is_map_line(lines[i]) {
                i += 1;
                continue;
            }
            let start = i;
            let mut anchored = false;
            while i < lines.len() && self.is_map_line(lines[i]) {
                anchored |= anchor.is_match(lines[i]);
                i += 1;
            }
            if anchored {
                keep[start..i].iter_mut().for_each(|k| *k = false);
            }
        }

        let kept: Vec<&str> = lines
            .iter()
            .zip(&keep)
            .filter(|(_, k)| **k)
            .map(|(l, _)| *l)
            .collect();
        let joined = kept.join("\n");

        // Anchors flattened into a longer line take the rest of that line.
        let tail = format!(r"{}[^\n]*", anchor.as_str());
        match Regex::new(&tail) {
            Ok(re) => re.replace_all(&joined, "").into_owned(),
            Err(_) => joined,
        }
    }

    fn is_map_line(&self, line: &str) -> bool {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return false;
        }
        if self.map_legend.iter().any(|l| l == trimmed) || MAP_SCALE_RE.is_match(trimmed) {
            return true;
        }
        trimmed.chars().count() <= MAP_LINE_MAX
            && (trimmed.starts_with('©')
                || self.map_anchor.as_ref().is_some_and(|re| re.is_match(trimmed)))
    }
}

fn replace_opt(re: &Option<Regex>, text: &str, rep: &str) -> String {
    match re {
        Some(re) => re.replace_all(text, rep).into_owned(),
        None => text.to_string(),
    }
}

/// Removes standalone link lines together with the preview card above them:
/// a title and a description, or a title alone.
fn drop_link_previews(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut keep = vec![true; lines.len()];

    for (i, line) in lines.iter().enumerate() {
        if !is_standalone_link_line(line) {
            continue;
        }
        keep[i] = false;

        let mut above = (0..i).rev().filter(|&j| !lines[j].trim().is_empty() && keep[j]);
        let first = above.next();
        let second = above.next();
        match (first, second) {
            (Some(desc), Some(title))
                if is_preview_description(lines[desc]) && is_preview_title(lines[title]) =>
            {
                keep[desc] = false;
                keep[title] = false;
            }
            (Some(title), _) if is_preview_title(lines[title]) => keep[title] = false,
            _ => {}
        }
    }

    if keep.iter().all(|k| *k) {
        return text.to_string();
    }
    lines
        .iter()
        .zip(&keep)
        .filter(|(_, k)| **k)
        .map(|(l, _)| *l)
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn is_standalone_link_line(line: &str) -> bool {
    let trimmed = line.trim();
    if !LINK_RE.is_match(trimmed) {
        return false;
    }
    let residue = LINK_RE.replace_all(trimmed, "");
    residue.trim().chars().count() < LINK_LINE_RESIDUE
}

fn is_preview_title(line: &str) -> bool {
    let trimmed = line.trim();
    let len = trimmed.chars().count();
    if !(PREVIEW_TITLE_MIN..=PREVIEW_TITLE_MAX).contains(&len) {
        return false;
    }
    (trimmed.starts_with('[') && trimmed.contains(']'))
        || (trimmed.starts_with('【') && trimmed.contains('】'))
        || trimmed.contains(" | ")
        || trimmed.contains(" - ")
}

fn is_preview_description(line: &str) -> bool {
    let trimmed = line.trim();
    let len = trimmed.chars().count();
    if !(PREVIEW_DESCRIPTION_MIN..=PREVIEW_DESCRIPTION_MAX).contains(&len) {
        return false;
    }
    let body = trimmed.trim_end_matches('.');
    ["입니다", "습니다", "해보세요"].iter().any(|end| body.ends_with(end))
        || trimmed.contains("확인")
        || trimmed.contains("자세히")
        || (16..150).contains(&len)
}

fn collapse_whitespace(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = HSPACE_RE.replace_all(&text, " ");
    let text = LINE_EDGE_RE.replace_all(&text, "\n");
    let text = MULTI_NEWLINE_RE.replace_all(&text, "\n\n");
    text.trim().to_string()
}
