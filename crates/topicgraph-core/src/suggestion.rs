//! Occasional "explore this as a new topic?" suggestions after a reply.

use rand::Rng;
use rand::seq::SliceRandom;

/// Chance that a qualifying message produces a suggestion.
pub const SUGGESTION_PROBABILITY: f64 = 0.2;

pub const SUGGESTED_TOPICS: [&str; 6] = [
    "Deep Dive Analysis",
    "Related Concepts",
    "Practical Applications",
    "Historical Context",
    "Future Implications",
    "Alternative Perspectives",
];

const TRIGGER_WORDS: [&str; 4] = ["how", "why", "what", "explain"];

/// True when one of the space-separated words is a question word.
pub fn asks_for_explanation(user_message: &str) -> bool {
    user_message
        .to_lowercase()
        .split(' ')
        .any(|word| TRIGGER_WORDS.contains(&word))
}

/// Rolls for a branch suggestion for `user_message`.
pub fn suggest_branch<R: Rng + ?Sized>(user_message: &str, rng: &mut R) -> Option<&'static str> {
    suggest_branch_with(user_message, SUGGESTION_PROBABILITY, rng)
}

/// Like [`suggest_branch`] with an explicit probability in `0.0..=1.0`.
pub fn suggest_branch_with<R: Rng + ?Sized>(
    user_message: &str,
    probability: f64,
    rng: &mut R,
) -> Option<&'static str> {
    if !rng.gen_bool(probability.clamp(0.0, 1.0)) {
        return None;
    }
    if !asks_for_explanation(user_message) {
        return None;
    }
    SUGGESTED_TOPICS.choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_trigger_words_match_whole_words_only() {
        assert!(asks_for_explanation("So how does this work"));
        assert!(asks_for_explanation("WHY"));
        assert!(!asks_for_explanation("however, whatever"));
        assert!(!asks_for_explanation("why?"));
    }

    #[test]
    fn test_suggestions_only_for_questions() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            assert_eq!(suggest_branch("tell me a story", &mut rng), None);
        }
    }

    #[test]
    fn test_certain_probability_always_suggests() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(suggest_branch_with("why is the sky blue", 1.0, &mut rng).is_some());
        assert!(suggest_branch_with("why is the sky blue", 0.0, &mut rng).is_none());
    }

    #[test]
    fn test_suggestions_fire_sometimes_and_pick_known_titles() {
        let mut rng = StdRng::seed_from_u64(42);
        let hits: Vec<&str> = (0..500)
            .filter_map(|_| suggest_branch("explain lifetimes", &mut rng))
            .collect();
        assert!(!hits.is_empty());
        assert!(hits.len() < 250);
        assert!(hits.iter().all(|t| SUGGESTED_TOPICS.contains(t)));
    }
}
