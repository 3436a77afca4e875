//! Task activity categories.
//!
//! Each category is identified in the markup by a single emoji glyph.
//! When a line somehow carries more than one glyph, the last match in
//! table order wins; the scan below preserves that policy.

use serde::{Deserialize, Serialize};

/// Closed category enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Chat,
    Reading,
    Coding,
    Writing,
    Thinking,
    Research,
    Chore,
    #[default]
    None,
}

/// Display metadata for one category.
pub struct CategoryMeta {
    pub code: &'static str,
    pub glyph: &'static str,
    pub label: &'static str,
}

/// All categories in declared table order. The scan order matters: see
/// [`Category::scan`].
pub const CATEGORIES: [Category; 8] = [
    Category::Chat,
    Category::Reading,
    Category::Coding,
    Category::Writing,
    Category::Thinking,
    Category::Research,
    Category::Chore,
    Category::None,
];

impl Category {
    pub fn meta(self) -> &'static CategoryMeta {
        match self {
            Category::Chat => &CategoryMeta {
                code: "chat",
                glyph: "💬",
                label: "Talk to someone",
            },
            Category::Reading => &CategoryMeta {
                code: "reading",
                glyph: "📚",
                label: "Reading",
            },
            Category::Coding => &CategoryMeta {
                code: "coding",
                glyph: "💾",
                label: "Coding",
            },
            Category::Writing => &CategoryMeta {
                code: "writing",
                glyph: "✏️",
                label: "Writing",
            },
            Category::Thinking => &CategoryMeta {
                code: "thinking",
                glyph: "💡",
                label: "Thinking",
            },
            Category::Research => &CategoryMeta {
                code: "research",
                glyph: "🔭",
                label: "Research",
            },
            Category::Chore => &CategoryMeta {
                code: "chore",
                glyph: "👔",
                label: "Chore",
            },
            Category::None => &CategoryMeta {
                code: "none",
                glyph: "❌",
                label: "No Category",
            },
        }
    }

    pub fn code(self) -> &'static str {
        self.meta().code
    }

    pub fn glyph(self) -> &'static str {
        self.meta().glyph
    }

    pub fn label(self) -> &'static str {
        self.meta().label
    }

    /// Parse a short code used in CLI arguments and config.
    pub fn from_code(code: &str) -> Option<Category> {
        CATEGORIES
            .iter()
            .copied()
            .find(|category| category.code().eq_ignore_ascii_case(code))
    }

    /// Find the category glyph in a raw line. Iterates the table in
    /// declared order; the last category whose glyph appears wins. `None`'s
    /// ❌ participates in the scan (it is read, never written back).
    pub fn scan(line: &str) -> Category {
        let mut found = Category::None;
        for category in CATEGORIES {
            if line.contains(category.glyph()) {
                found = category;
            }
        }
        found
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
