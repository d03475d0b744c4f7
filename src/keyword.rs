/// Topic tags in priority order; the first one found in the title wins.
pub const KEYWORDS: &[&str] = &[
    "war", "conflict", "election", "vote", "politics",
    "economy", "finance", "market",
    "technology", "ai", "cyber",
    "space", "rocket", "isro", "nasa",
    "cricket", "football", "sports",
    "india", "china", "russia", "usa",
];

pub const DEFAULT_KEYWORD: &str = "world";

/// Plain substring match on the lower-cased title, so "said" matches "ai".
pub fn extract_keyword(title: &str) -> &'static str {
    let t = title.to_lowercase();
    KEYWORDS
        .iter()
        .copied()
        .find(|k| t.contains(k))
        .unwrap_or(DEFAULT_KEYWORD)
}
