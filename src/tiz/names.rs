//! Race name and stage recovery.
//!
//! The display name is whatever is left of an entry's text once the known
//! noise (stream annotations, links, date prefixes, time clauses, category
//! lists) has been stripped. Each cleanup pass is its own rewrite step and
//! [`STEPS`] fixes their order: later passes rely on earlier noise already
//! being gone.

use regex::Regex;
use std::sync::LazyLock;

/// A rewrite pass over the working name.
type Step = fn(&str) -> String;

/// Cleanup passes, applied in order.
const STEPS: &[Step] = &[
    strip_stream_annotations,
    strip_link_annotations,
    strip_date_prefix,
    strip_info_suffix,
    strip_time_clauses,
    strip_category_lists,
];

const WEEKDAYS: &str = "(?:Monday|Tuesday|Wednesday|Thursday|Friday|Saturday|Sunday)";

/// Longer tags first so "Women Elite" is tried before "Women".
const CATEGORY_ALTERNATION: &str = "(?:Women Elite|Men Elite|Women|Men|Elite|track|MTB|WE|ME|NC|JR|WC)";

static STREAM_ANNOTATION_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\s*-\s*LIVE\s*[^-]*",
        r"\s*-\s*POSSIBLE LIVE\s*[^-]*",
        r"\s*-\s*PROBABLE LIVE\s*[^-]*",
    ])
});

static LINK_ANNOTATION_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\s*-\s*Stream Page\b\s*(?:\([^)]*\))?[^-]*",
        r"\s*-\s*Link\b\s*(?:\([^)]*\))?[^-]*",
    ])
});

static DATE_PREFIX_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        &format!(r"^{WEEKDAYS}\s+\d+(?:st|nd|rd|th)\s+\w+\s+for\s+\d+\s+days?\s*-\s*"),
        &format!(r"^{WEEKDAYS}\s+\d+(?:st|nd|rd|th)\s+\w+\s*-\s*"),
    ])
});

static INFO_SUFFIX_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(&[r"\s*-\s*Info\s*$"]));

static TIME_CLAUSE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\s*-\s*(?:WE|ME|track|MTB)\s+\d+(?:[.:]\d+)?\s+UTC.*",
        r"\s*-\s*\d+(?:[.:]\d+)?\s+UTC.*",
    ])
});

static CATEGORY_LIST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\s*\({CATEGORY_ALTERNATION}(?:,\s*{CATEGORY_ALTERNATION})*\)\s*"
    ))
    .unwrap()
});

static STAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"stage\s+(\d+)\s*\(of\s+(\d+)\)").unwrap());

static DAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"day\s+(\d+)\s*\(of\s+(\d+)\)").unwrap());

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
}

fn remove_all(patterns: &[Regex], input: &str) -> String {
    patterns.iter().fold(input.to_owned(), |acc, re| {
        re.replace_all(&acc, "").into_owned()
    })
}

/// Drop " - LIVE ...", " - POSSIBLE LIVE ..." and " - PROBABLE LIVE ..." up
/// to the next dash.
pub(crate) fn strip_stream_annotations(input: &str) -> String {
    remove_all(&STREAM_ANNOTATION_RES, input)
}

/// Drop " - Stream Page" and " - Link (qualifier)" anchor annotations.
pub(crate) fn strip_link_annotations(input: &str) -> String {
    remove_all(&LINK_ANNOTATION_RES, input)
}

/// Drop a leading "Friday 6th February [for 3 days] - ".
pub(crate) fn strip_date_prefix(input: &str) -> String {
    remove_all(&DATE_PREFIX_RES, input)
}

pub(crate) fn strip_info_suffix(input: &str) -> String {
    remove_all(&INFO_SUFFIX_RES, input)
}

/// Drop "- [WE] 12.40 UTC ..." and everything after it.
pub(crate) fn strip_time_clauses(input: &str) -> String {
    remove_all(&TIME_CLAUSE_RES, input)
}

/// Drop parenthetical lists made only of whitelisted category tags.
pub(crate) fn strip_category_lists(input: &str) -> String {
    CATEGORY_LIST_RE.replace_all(input, " ").into_owned()
}

/// Display name for an entry, with residual dashes and whitespace trimmed.
pub fn clean_name(text: &str) -> String {
    let stripped = STEPS.iter().fold(text.to_owned(), |acc, step| step(&acc));
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches(|c: char| c == '-' || c.is_whitespace())
        .to_owned()
}

/// "stage N (of M)" or "day N (of M)"; a day descriptor wins over a stage.
pub fn extract_stage(text: &str) -> Option<String> {
    if let Some(caps) = DAY_RE.captures(text) {
        return Some(format!("day {} (of {})", &caps[1], &caps[2]));
    }
    STAGE_RE
        .captures(text)
        .map(|caps| format!("stage {} (of {})", &caps[1], &caps[2]))
}
