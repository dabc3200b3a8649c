use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

pub fn fuzzy_score(needle: &str, hay: &str) -> Option<i64> {
    let m = SkimMatcherV2::default();
    m.fuzzy_match(hay, needle)
}

/// Indices of `titles` matching `needle`, best match first. An empty needle keeps everything in order.
pub fn filter_titles<'a>(needle: &str, titles: impl IntoIterator<Item = &'a str>) -> Vec<usize> {
    let needle = needle.trim();
    if needle.is_empty() {
        return titles.into_iter().enumerate().map(|(i, _)| i).collect();
    }
    let mut hits: Vec<(usize, i64)> = titles
        .into_iter()
        .enumerate()
        .filter_map(|(i, t)| fuzzy_score(needle, t).map(|s| (i, s)))
        .collect();
    hits.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    hits.into_iter().map(|(i, _)| i).collect()
}
