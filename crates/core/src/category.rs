use serde::{Deserialize, Serialize};
use std::fmt;

/// Label used by the dashboard's "show everything" filter. Never a valid
/// per-transaction category.
pub const ALL_TRANSACTIONS: &str = "All Transactions";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Entertainment,
    Bills,
    #[serde(rename = "Dining Out")]
    DiningOut,
    #[serde(rename = "Personal Care")]
    PersonalCare,
    General,
    Groceries,
    Transportation,
    Lifestyle,
    Shopping,
    Education,
}

impl Category {
    /// Every valid category, in the order the dashboard lists them.
    pub const ALL: [Category; 10] = [
        Category::Entertainment,
        Category::Bills,
        Category::DiningOut,
        Category::PersonalCare,
        Category::General,
        Category::Groceries,
        Category::Transportation,
        Category::Lifestyle,
        Category::Shopping,
        Category::Education,
    ];

    /// Catch-all used when nothing better is known.
    pub const DEFAULT: Category = Category::General;

    pub fn label(self) -> &'static str {
        match self {
            Category::Entertainment => "Entertainment",
            Category::Bills => "Bills",
            Category::DiningOut => "Dining Out",
            Category::PersonalCare => "Personal Care",
            Category::General => "General",
            Category::Groceries => "Groceries",
            Category::Transportation => "Transportation",
            Category::Lifestyle => "Lifestyle",
            Category::Shopping => "Shopping",
            Category::Education => "Education",
        }
    }

    /// Exact, case-sensitive lookup against the canonical labels.
    pub fn from_label(label: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::DEFAULT
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::from_label(s).ok_or_else(|| format!("Unknown category: '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn labels_round_trip_through_from_str() {
        for category in Category::ALL {
            assert_eq!(Category::from_str(category.label()).unwrap(), category);
        }
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert_eq!(Category::from_label("Dining Out"), Some(Category::DiningOut));
        assert_eq!(Category::from_label("dining out"), None);
        assert_eq!(Category::from_label("GENERAL"), None);
    }

    #[test]
    fn all_transactions_is_not_a_category() {
        assert!(Category::from_str(ALL_TRANSACTIONS).is_err());
    }

    #[test]
    fn general_is_the_default() {
        assert_eq!(Category::default(), Category::General);
    }

    #[test]
    fn serializes_as_label() {
        let json = serde_json::to_string(&Category::PersonalCare).unwrap();
        assert_eq!(json, "\"Personal Care\"");
        let back: Category = serde_json::from_str("\"Dining Out\"").unwrap();
        assert_eq!(back, Category::DiningOut);
    }
}
