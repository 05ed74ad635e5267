use serde::{Deserialize, Serialize};
use tally_core::Category;
use thiserror::Error;

/// Canonical keyword table. Checked top to bottom; the first keyword found
/// anywhere in the lowercased merchant name decides the category, so more
/// specific keywords must come before the general ones they contain.
pub const DEFAULT_KEYWORDS: &[(&str, Category)] = &[
    // Dining out
    ("starbucks", Category::DiningOut),
    ("uber eats", Category::DiningOut),
    ("doordash", Category::DiningOut),
    ("grubhub", Category::DiningOut),
    ("mcdonald", Category::DiningOut),
    ("chipotle", Category::DiningOut),
    ("restaurant", Category::DiningOut),
    ("pizza", Category::DiningOut),
    ("coffee", Category::DiningOut),
    ("cafe", Category::DiningOut),
    // Entertainment
    ("netflix", Category::Entertainment),
    ("spotify", Category::Entertainment),
    ("hulu", Category::Entertainment),
    ("disney+", Category::Entertainment),
    ("youtube", Category::Entertainment),
    ("cinema", Category::Entertainment),
    ("theater", Category::Entertainment),
    ("steam", Category::Entertainment),
    ("concert", Category::Entertainment),
    // Transportation
    ("uber", Category::Transportation),
    ("lyft", Category::Transportation),
    ("chevron", Category::Transportation),
    ("exxon", Category::Transportation),
    ("parking", Category::Transportation),
    ("transit", Category::Transportation),
    ("metro", Category::Transportation),
    ("airline", Category::Transportation),
    // Groceries
    ("whole foods", Category::Groceries),
    ("trader joe", Category::Groceries),
    ("kroger", Category::Groceries),
    ("safeway", Category::Groceries),
    ("aldi", Category::Groceries),
    ("grocery", Category::Groceries),
    ("supermarket", Category::Groceries),
    // Bills
    ("electric", Category::Bills),
    ("utility", Category::Bills),
    ("water bill", Category::Bills),
    ("internet", Category::Bills),
    ("comcast", Category::Bills),
    ("verizon", Category::Bills),
    ("at&t", Category::Bills),
    ("insurance", Category::Bills),
    ("mortgage", Category::Bills),
    ("landlord", Category::Bills),
    // Personal care
    ("pharmacy", Category::PersonalCare),
    ("walgreens", Category::PersonalCare),
    ("cvs", Category::PersonalCare),
    ("salon", Category::PersonalCare),
    ("barber", Category::PersonalCare),
    ("dentist", Category::PersonalCare),
    // Education
    ("tuition", Category::Education),
    ("university", Category::Education),
    ("coursera", Category::Education),
    ("udemy", Category::Education),
    ("bookstore", Category::Education),
    // Lifestyle
    ("gym", Category::Lifestyle),
    ("fitness", Category::Lifestyle),
    ("airbnb", Category::Lifestyle),
    ("hotel", Category::Lifestyle),
    ("petco", Category::Lifestyle),
    // Shopping
    ("amazon", Category::Shopping),
    ("target", Category::Shopping),
    ("walmart", Category::Shopping),
    ("costco", Category::Shopping),
    ("ebay", Category::Shopping),
    ("ikea", Category::Shopping),
    ("best buy", Category::Shopping),
];

/// Suggest a category for a merchant name using the canonical table.
pub fn suggest_category(name: &str) -> Option<Category> {
    let name = name.to_lowercase();
    DEFAULT_KEYWORDS
        .iter()
        .find(|(keyword, _)| name.contains(keyword))
        .map(|(_, category)| *category)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub keyword: String,
    pub category: Category,
}

impl KeywordRule {
    pub fn new(keyword: &str, category: Category) -> Self {
        Self {
            keyword: keyword.to_string(),
            category,
        }
    }
}

#[derive(Debug, Error)]
pub enum SuggestionError {
    #[error("Failed to parse keyword rules: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Keyword rule {0} has an empty keyword")]
    EmptyKeyword(usize),
}

#[derive(Deserialize)]
struct KeywordFile {
    #[serde(default, rename = "rule")]
    rules: Vec<KeywordRule>,
}

/// Ordered keyword matcher. Rule order is the tie-break: earlier wins.
#[derive(Debug, Clone)]
pub struct SuggestionEngine {
    rules: Vec<KeywordRule>,
}

impl Default for SuggestionEngine {
    fn default() -> Self {
        Self::new(
            DEFAULT_KEYWORDS
                .iter()
                .map(|(keyword, category)| KeywordRule::new(keyword, *category))
                .collect(),
        )
    }
}

impl SuggestionEngine {
    /// Builds an engine from rules in priority order. Keywords are lowercased
    /// and blank ones dropped, since an empty keyword would match every name.
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        let rules = rules
            .into_iter()
            .filter(|r| !r.keyword.trim().is_empty())
            .map(|r| KeywordRule {
                keyword: r.keyword.to_lowercase(),
                category: r.category,
            })
            .collect();
        Self { rules }
    }

    /// Custom rules ahead of the canonical table.
    pub fn with_defaults(extra: Vec<KeywordRule>) -> Self {
        let mut rules = extra;
        rules.extend(SuggestionEngine::default().rules);
        Self::new(rules)
    }

    /// Parses `[[rule]]` tables with `keyword` and `category` keys.
    pub fn from_toml(toml_content: &str) -> Result<Self, SuggestionError> {
        let file: KeywordFile = toml::from_str(toml_content)?;
        if let Some(idx) = file.rules.iter().position(|r| r.keyword.trim().is_empty()) {
            return Err(SuggestionError::EmptyKeyword(idx + 1));
        }
        Ok(Self::new(file.rules))
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    pub fn suggest(&self, name: &str) -> Option<Category> {
        let name = name.to_lowercase();
        self.rules
            .iter()
            .find(|r| name.contains(&r.keyword))
            .map(|r| r.category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_keyword_case_insensitively() {
        assert_eq!(suggest_category("STARBUCKS #1234"), Some(Category::DiningOut));
        assert_eq!(suggest_category("Netflix Monthly"), Some(Category::Entertainment));
        assert_eq!(suggest_category("uber trip"), Some(Category::Transportation));
    }

    #[test]
    fn no_match_is_none() {
        assert_eq!(suggest_category("Aunt Mabel"), None);
        assert_eq!(suggest_category(""), None);
    }

    #[test]
    fn earlier_keyword_wins() {
        // "uber eats" precedes "uber" in the table.
        assert_eq!(suggest_category("UBER EATS ORDER"), Some(Category::DiningOut));
        // Both "starbucks" and "coffee" match; "starbucks" is listed first.
        assert_eq!(suggest_category("Starbucks Coffee"), Some(Category::DiningOut));
        // "amazon" (Shopping) appears after "netflix" (Entertainment).
        assert_eq!(
            suggest_category("Amazon Netflix bundle"),
            Some(Category::Entertainment)
        );
    }

    #[test]
    fn default_engine_agrees_with_free_function() {
        let engine = SuggestionEngine::default();
        for name in ["Whole Foods Market", "CVS Pharmacy", "Random Person", "IKEA"] {
            assert_eq!(engine.suggest(name), suggest_category(name));
        }
        assert_eq!(engine.rules().len(), DEFAULT_KEYWORDS.len());
    }

    #[test]
    fn custom_rules_take_priority_over_defaults() {
        let engine =
            SuggestionEngine::with_defaults(vec![KeywordRule::new("Starbucks", Category::Bills)]);
        assert_eq!(engine.suggest("starbucks reserve"), Some(Category::Bills));
        assert_eq!(engine.suggest("netflix"), Some(Category::Entertainment));
    }

    #[test]
    fn blank_keywords_are_dropped() {
        let engine = SuggestionEngine::new(vec![KeywordRule::new("  ", Category::Bills)]);
        assert!(engine.rules().is_empty());
        assert_eq!(engine.suggest("anything"), None);
    }

    #[test]
    fn from_toml_preserves_order() {
        let toml = r#"
            [[rule]]
            keyword = "gym"
            category = "Personal Care"

            [[rule]]
            keyword = "gym"
            category = "Lifestyle"
        "#;
        let engine = SuggestionEngine::from_toml(toml).unwrap();
        assert_eq!(engine.rules().len(), 2);
        assert_eq!(engine.suggest("Planet Gym"), Some(Category::PersonalCare));
    }

    #[test]
    fn from_toml_rejects_unknown_category() {
        let toml = r#"
            [[rule]]
            keyword = "gym"
            category = "All Transactions"
        "#;
        assert!(matches!(
            SuggestionEngine::from_toml(toml),
            Err(SuggestionError::Toml(_))
        ));
    }

    #[test]
    fn from_toml_rejects_empty_keyword() {
        let toml = r#"
            [[rule]]
            keyword = ""
            category = "Bills"
        "#;
        assert!(matches!(
            SuggestionEngine::from_toml(toml),
            Err(SuggestionError::EmptyKeyword(1))
        ));
    }
}
