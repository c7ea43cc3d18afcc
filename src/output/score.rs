//! Parsing of rating summaries such as `TrustScore 4.5|1,234 reviews`

use once_cell::sync::Lazy;
use regex::Regex;

/// Rating summary pattern; whitespace around `|` is tolerated so the
/// `TrustScore 0 | 0 reviews` sentinel parses too
static SCORE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"TrustScore ([\d.]+)\s*\|\s*([\d,]+) reviews")
        .expect("Score regex is hardcoded and valid")
});

/// Extracts `(trust_score, review_count)` from a rating summary
///
/// Anything that does not parse counts as 0.
pub fn parse_score(summary: &str) -> (f64, f64) {
    let Some(captures) = SCORE_PATTERN.captures(summary) else {
        return (0.0, 0.0);
    };

    let trust_score = captures[1].parse::<f64>().unwrap_or(0.0);
    let reviews = captures[2].replace(',', "").parse::<f64>().unwrap_or(0.0);

    (trust_score, reviews)
}
