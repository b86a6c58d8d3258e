//! Markdown rendering for judge outputs. Pure functions; callers decide where
//! the text goes.

mod aggregate;
mod document;

pub use aggregate::render_aggregate;
pub use document::render_document;

use crate::metrics::Bucket;

const MAX_STARS: u8 = 5;

/// Importance as filled/empty stars, e.g. `★★★☆☆` for 3.
pub(crate) fn stars(importance: u8) -> String {
    let filled = importance.min(MAX_STARS);
    format!(
        "{}{}",
        "★".repeat(usize::from(filled)),
        "☆".repeat(usize::from(MAX_STARS - filled))
    )
}

pub(crate) fn bucket_marker(score: u8) -> &'static str {
    match Bucket::from_score(score) {
        Bucket::Full => "🟢",
        Bucket::Partial => "🟡",
        Bucket::None => "🔴",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stars_saturate() {
        assert_eq!(stars(3), "★★★☆☆");
        assert_eq!(stars(0), "☆☆☆☆☆");
        assert_eq!(stars(9), "★★★★★");
    }

    #[test]
    fn markers_follow_buckets() {
        assert_eq!(bucket_marker(8), "🟢");
        assert_eq!(bucket_marker(4), "🟡");
        assert_eq!(bucket_marker(3), "🔴");
    }
}
