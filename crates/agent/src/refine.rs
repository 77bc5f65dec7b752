//! Keyword refinement
//!
//! Filters extracted keywords down to a bounded set of distinctive search
//! candidates. Pure function of the keyword list and the original question;
//! refining an already-refined list is a no-op.

use regex_lite::Regex;

/// Generic terms never kept as keywords on their own
const GENERIC_TERMS: &[&str] = &[
    "app",
    "software",
    "company",
    "business",
    "service",
    "product",
    "brand",
    "name",
    "the",
    "and",
    "or",
    "for",
    "with",
    "my",
    "can",
    "is",
    "are",
    "will",
    "would",
    "should",
    "could",
    "may",
    "might",
    "available",
    "trademark",
    "register",
    "use",
];

/// Generic tech terms dropped when they stand alone
const TECH_GENERIC: &[&str] = &[
    "tech", "digital", "online", "web", "mobile", "cloud", "data", "smart",
];

/// Generic business terms dropped when they stand alone
const BUSINESS_GENERIC: &[&str] = &["solutions", "systems", "group", "inc", "llc", "corp", "ltd"];

fn is_generic(word: &str) -> bool {
    GENERIC_TERMS.contains(&word.to_lowercase().as_str())
}

/// Distinctiveness sort key: longer strings first, then more spaces
/// (phrases over single words). A policy knob, not a similarity metric.
fn distinctiveness_key(keyword: &str) -> (usize, usize) {
    (keyword.len(), keyword.matches(' ').count())
}

/// Refine extracted keywords into the authoritative search list
///
/// Drops short and generic terms, prioritizes distinctive candidates when
/// more than `max_keywords` survive, and rescans the question for
/// capitalized words when nothing survives.
pub fn refine_keywords(keywords: &[String], question: &str, max_keywords: usize) -> Vec<String> {
    let mut refined: Vec<String> = Vec::new();

    for keyword in keywords {
        let clean = keyword.trim();
        if clean.is_empty() || clean.len() < 2 {
            continue;
        }

        let lower = clean.to_lowercase();
        if GENERIC_TERMS.contains(&lower.as_str()) {
            continue;
        }

        // A lone generic tech/business term carries no search value
        if (TECH_GENERIC.contains(&lower.as_str()) || BUSINESS_GENERIC.contains(&lower.as_str()))
            && clean.len() <= 5
        {
            continue;
        }

        let words: Vec<&str> = clean.split_whitespace().collect();
        if words.len() == 1 {
            if clean.len() >= 3 && !is_generic(clean) {
                refined.push(clean.to_string());
            }
        } else {
            let distinctive = words
                .iter()
                .filter(|w| !is_generic(w) && w.len() >= 2)
                .count();
            if distinctive >= 1 {
                refined.push(clean.to_string());
            }
        }
    }

    if refined.len() > max_keywords {
        refined.sort_by(|a, b| distinctiveness_key(b).cmp(&distinctiveness_key(a)));
        refined.truncate(max_keywords);
    }

    if refined.is_empty() {
        refined = rescue_from_question(question);
    }

    refined
}

/// Last-resort scan of the question for capitalized brand-like words
fn rescue_from_question(question: &str) -> Vec<String> {
    let pattern = Regex::new(r"\b[A-Z][a-z]{2,}\b").expect("valid rescue pattern");

    pattern
        .find_iter(question)
        .map(|m| m.as_str().to_string())
        .filter(|word| !is_generic(word))
        .take(2)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_drops_generic_and_short_terms() {
        let input = keywords(&["TechFlow", "app", "a", "software", "the"]);
        let refined = refine_keywords(&input, "", 3);
        assert_eq!(refined, vec!["TechFlow"]);
    }

    #[test]
    fn test_drops_lone_generic_tech_terms() {
        let input = keywords(&["cloud", "data", "Cloudberry"]);
        let refined = refine_keywords(&input, "", 3);
        assert_eq!(refined, vec!["Cloudberry"]);
    }

    #[test]
    fn test_keeps_phrase_with_distinctive_word() {
        let input = keywords(&["TechFlow Solutions"]);
        let refined = refine_keywords(&input, "", 3);
        assert_eq!(refined, vec!["TechFlow Solutions"]);
    }

    #[test]
    fn test_truncates_by_distinctiveness() {
        let input = keywords(&["Dino", "CloudSync Pro", "Zap", "Greenfield"]);
        let refined = refine_keywords(&input, "", 3);
        assert_eq!(refined.len(), 3);
        // Longest first, phrase preferred
        assert_eq!(refined[0], "CloudSync Pro");
        assert_eq!(refined[1], "Greenfield");
    }

    #[test]
    fn test_rescues_capitalized_words_from_question() {
        let input = keywords(&["ab"]);
        let refined = refine_keywords(&input, "Is Dino taken for my Waterloo project?", 2);
        assert_eq!(refined, vec!["Dino", "Waterloo"]);
    }

    #[test]
    fn test_rescue_skips_generic_capitalized_words() {
        let refined = refine_keywords(&[], "Can I register The Software?", 3);
        assert!(refined.is_empty());
    }

    #[test]
    fn test_refinement_is_idempotent() {
        let input = keywords(&["Dino", "CloudSync Pro", "Zap", "Greenfield", "app"]);
        let once = refine_keywords(&input, "", 3);
        let twice = refine_keywords(&once, "", 3);
        assert_eq!(once, twice);
    }
}
