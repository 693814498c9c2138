//! String similarity used to rank suggestions.

/// A distance between two words; smaller is closer.
pub trait Metrics: Send + Sync {
    /// Distance between `a` and `b`.
    fn distance(&self, a: &str, b: &str) -> usize;
}

/// Unit-cost Levenshtein distance (insertion, deletion, substitution).
#[derive(Debug, Clone, Copy, Default)]
pub struct LevenshteinDistance;

impl LevenshteinDistance {
    /// The distance, or `None` if it exceeds `max`. Words whose lengths
    /// alone differ by more than `max` are rejected without computing it.
    pub fn distance_within(&self, a: &str, b: &str, max: usize) -> Option<usize> {
        let (a_len, b_len) = (a.chars().count(), b.chars().count());

        if a_len.max(b_len) - a_len.min(b_len) > max {
            return None;
        }

        Some(strsim::levenshtein(a, b)).filter(|d| *d <= max)
    }
}

impl Metrics for LevenshteinDistance {
    #[inline]
    fn distance(&self, a: &str, b: &str) -> usize {
        strsim::levenshtein(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_examples() {
        let m = LevenshteinDistance;
        assert_eq!(m.distance("kitten", "sitting"), 3);
        assert_eq!(m.distance("flaw", "lawn"), 2);
        assert_eq!(m.distance("", "abc"), 3);
        assert_eq!(m.distance("abc", ""), 3);
        assert_eq!(m.distance("same", "same"), 0);
        // a transposition costs two edits
        assert_eq!(m.distance("cta", "cat"), 2);
    }

    #[test]
    fn counts_characters_not_bytes() {
        let m = LevenshteinDistance;
        assert_eq!(m.distance("čáhci", "cahci"), 2);
        assert_eq!(m.distance("straße", "strasse"), 2);
    }

    #[test]
    fn bounded_agrees_with_unbounded() {
        let m = LevenshteinDistance;
        let words = ["", "a", "cat", "cats", "act", "tack", "attack", "čáhci", "čahcci"];
        for a in words.iter() {
            for b in words.iter() {
                let d = m.distance(a, b);
                assert_eq!(m.distance_within(a, b, d), Some(d), "{} / {}", a, b);
            }
        }
    }

    #[test]
    fn early_exit_when_bound_exceeded() {
        let m = LevenshteinDistance;
        assert_eq!(m.distance_within("kitten", "sitting", 3), Some(3));
        assert_eq!(m.distance_within("kitten", "sitting", 2), None);
        assert_eq!(m.distance_within("a", "abcdef", 2), None);
        assert_eq!(m.distance_within("abc", "abc", 0), Some(0));
    }
}
