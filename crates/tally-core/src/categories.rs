//! # Category Catalog
//!
//! The ten predefined categories plus any user categories loaded from
//! configuration. Lookups are by exact name.

use crate::primitives::{DEFAULT_CATEGORY_COLOR, DEFAULT_CATEGORY_ICON, INCOME_CATEGORY};
use crate::Category;

/// Predefined categories: (id, name, color, icon).
pub const PREDEFINED_CATEGORIES: &[(u32, &str, &str, &str)] = &[
    (1, "Food & Dining", "#ef4444", "UtensilsCrossed"),
    (2, "Transportation", "#3b82f6", "Car"),
    (3, "Shopping", "#f59e0b", "ShoppingBag"),
    (4, "Entertainment", "#8b5cf6", "Music"),
    (5, "Bills & Utilities", "#06b6d4", "Receipt"),
    (6, "Healthcare", "#10b981", "Heart"),
    (7, "Education", "#f97316", "GraduationCap"),
    (8, "Travel", "#ec4899", "Plane"),
    (9, INCOME_CATEGORY, "#22c55e", "DollarSign"),
    (10, "Other", "#6b7280", "MoreHorizontal"),
];

/// Ordered set of known categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCatalog {
    categories: Vec<Category>,
}

impl Default for CategoryCatalog {
    fn default() -> Self {
        Self::predefined()
    }
}

impl CategoryCatalog {
    /// Catalog holding only the predefined categories.
    #[must_use]
    pub fn predefined() -> Self {
        let categories = PREDEFINED_CATEGORIES
            .iter()
            .map(|&(id, name, color, icon)| Category {
                id,
                name: name.to_string(),
                color: color.to_string(),
                icon: icon.to_string(),
            })
            .collect();
        Self { categories }
    }

    /// Append a user category.
    ///
    /// Returns `false` (and changes nothing) when the name is already taken
    /// or blank. Ids continue after the highest existing id. A color that is
    /// not `#rrggbb` is replaced by the neutral default.
    pub fn add(&mut self, name: &str, color: Option<&str>, icon: Option<&str>) -> bool {
        let name = name.trim();
        if name.is_empty() || self.contains(name) {
            return false;
        }
        let id = self.categories.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        let color = color
            .filter(|c| is_hex_color(c))
            .unwrap_or(DEFAULT_CATEGORY_COLOR);
        self.categories.push(Category {
            id,
            name: name.to_string(),
            color: color.to_string(),
            icon: icon.unwrap_or(DEFAULT_CATEGORY_ICON).to_string(),
        });
        true
    }

    /// All categories in catalog order.
    #[must_use]
    pub fn all(&self) -> &[Category] {
        &self.categories
    }

    /// Look up a category by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Color of a category, or the neutral default for unknown names.
    #[must_use]
    pub fn color_of(&self, name: &str) -> &str {
        self.get(name)
            .map(|c| c.color.as_str())
            .unwrap_or(DEFAULT_CATEGORY_COLOR)
    }

    /// Categories that may carry a budget (everything except income).
    pub fn budgetable(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(|c| c.name != INCOME_CATEGORY)
    }

    #[must_use]
    pub fn is_budgetable(&self, name: &str) -> bool {
        name != INCOME_CATEGORY && self.contains(name)
    }
}

/// Whether `color` is a `#rrggbb` hex color.
#[must_use]
pub fn is_hex_color(color: &str) -> bool {
    let bytes = color.as_bytes();
    bytes.len() == 7 && bytes[0] == b'#' && bytes[1..].iter().all(u8::is_ascii_hexdigit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predefined_has_ten_categories_in_order() {
        let catalog = CategoryCatalog::predefined();
        let names: Vec<_> = catalog.all().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names.len(), 10);
        assert_eq!(names[0], "Food & Dining");
        assert_eq!(names[9], "Other");
    }

    #[test]
    fn unknown_category_gets_default_color() {
        let catalog = CategoryCatalog::predefined();
        assert_eq!(catalog.color_of("Travel"), "#ec4899");
        assert_eq!(catalog.color_of("Gardening"), DEFAULT_CATEGORY_COLOR);
    }

    #[test]
    fn income_is_not_budgetable() {
        let catalog = CategoryCatalog::predefined();
        assert!(!catalog.is_budgetable(INCOME_CATEGORY));
        assert!(catalog.is_budgetable("Shopping"));
        assert_eq!(catalog.budgetable().count(), 9);
    }

    #[test]
    fn user_categories_continue_ids_and_reject_duplicates() {
        let mut catalog = CategoryCatalog::predefined();
        assert!(catalog.add("Pets", Some("#a16207"), None));
        assert!(!catalog.add("Pets", None, None));
        assert!(!catalog.add("Travel", None, None));
        assert!(!catalog.add("   ", None, None));

        let pets = catalog.get("Pets").expect("pets");
        assert_eq!(pets.id, 11);
        assert_eq!(pets.color, "#a16207");
        assert_eq!(pets.icon, DEFAULT_CATEGORY_ICON);
    }

    #[test]
    fn malformed_colors_fall_back_to_default() {
        assert!(is_hex_color("#A16207"));
        assert!(!is_hex_color("red"));
        assert!(!is_hex_color("#a1620"));
        assert!(!is_hex_color("#gggggg"));

        let mut catalog = CategoryCatalog::predefined();
        assert!(catalog.add("Pets", Some("brown"), None));
        assert!(catalog.add("Garden", Some("#15803d"), None));
        assert_eq!(catalog.color_of("Pets"), DEFAULT_CATEGORY_COLOR);
        assert_eq!(catalog.color_of("Garden"), "#15803d");
    }
}
