//! Keyword rules: title bans, negative description phrases and filter keywords.
//!
//! Matching is plain case-insensitive substring search. Phrases are
//! lower-cased once when the rule set is built.

use crate::models::Config;

/// Static exclusion rules, loaded once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionRules {
    title_ban_phrases: Vec<String>,
    description_negative_phrases: Vec<String>,
}

impl ExclusionRules {
    pub fn new<T, D>(title_ban_phrases: T, description_negative_phrases: D) -> Self
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
        D: IntoIterator,
        D::Item: AsRef<str>,
    {
        Self {
            title_ban_phrases: normalize_phrases(title_ban_phrases),
            description_negative_phrases: normalize_phrases(description_negative_phrases),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.exclude_titles, &config.negative_keywords)
    }

    /// Title contains a ban phrase.
    pub fn title_banned(&self, title: &str) -> bool {
        contains_any(title, &self.title_ban_phrases)
    }

    /// Description contains a negative phrase.
    pub fn description_rejected(&self, description: &str) -> bool {
        contains_any(description, &self.description_negative_phrases)
    }

    pub fn is_empty(&self) -> bool {
        self.title_ban_phrases.is_empty() && self.description_negative_phrases.is_empty()
    }
}

/// Positive description keywords used in keyword-match mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordMatcher {
    keywords: Vec<String>,
}

impl KeywordMatcher {
    pub fn new<K>(keywords: K) -> Self
    where
        K: IntoIterator,
        K::Item: AsRef<str>,
    {
        Self {
            keywords: normalize_phrases(keywords),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.filter_keywords)
    }

    /// Keywords occurring in `text`, in configuration order.
    pub fn matches(&self, text: &str) -> Vec<String> {
        let haystack = text.to_lowercase();
        self.keywords
            .iter()
            .filter(|k| haystack.contains(k.as_str()))
            .cloned()
            .collect()
    }
}

/// Case-insensitive substring test against pre-lowered phrases.
pub fn contains_any(text: &str, phrases: &[String]) -> bool {
    if phrases.is_empty() {
        return false;
    }
    let haystack = text.to_lowercase();
    phrases.iter().any(|p| haystack.contains(p.as_str()))
}

fn normalize_phrases<I>(phrases: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    phrases
        .into_iter()
        .map(|p| p.as_ref().trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_ban_is_case_insensitive_substring() {
        let rules = ExclusionRules::new(["Defekt"], Vec::<String>::new());
        assert!(rules.title_banned("Laptop DEFEKT, Bastler"));
        assert!(rules.title_banned("laptopdefektiv"));
        assert!(!rules.title_banned("Laptop neuwertig"));
    }

    #[test]
    fn negative_phrase_rejects_description() {
        let rules = ExclusionRules::new(Vec::<String>::new(), ["nur abholung"]);
        assert!(rules.description_rejected("Preis VB. Nur Abholung in Köln."));
        assert!(!rules.description_rejected("Versand möglich"));
    }

    #[test]
    fn empty_rules_exclude_nothing() {
        let rules = ExclusionRules::default();
        assert!(rules.is_empty());
        assert!(!rules.title_banned("anything"));
        assert!(!rules.description_rejected("anything"));
    }

    #[test]
    fn blank_phrases_are_ignored() {
        let rules = ExclusionRules::new(["", "  "], [""]);
        assert!(rules.is_empty());
        assert!(!rules.title_banned("title"));
    }

    #[test]
    fn keyword_matcher_keeps_config_order() {
        let matcher = KeywordMatcher::new(["i7", "I5", "ryzen"]);
        assert_eq!(
            matcher.matches("Ryzen 5 oder i5? Hier: i5-8250U"),
            vec!["i5".to_string(), "ryzen".to_string()]
        );
        assert!(matcher.matches("Celeron").is_empty());
    }
}
