//! Brand-to-colour assignment for charts.
//!
//! One palette is built per report and passed to every chart builder, so the
//! same brand keeps the same colour across all charts of that report.

use std::collections::HashMap;

/// Reserved colour for the focus brand.
pub const FOCUS_COLOR: &str = "#6366F1";

/// Competitor colours, handed out in first-seen order.
pub const COMPETITOR_COLORS: &[&str] = &[
    "#F59E0B", "#10B981", "#EF4444", "#0EA5E9", "#A855F7", "#EC4899", "#84CC16", "#64748B",
];

#[derive(Debug, Clone, Default)]
pub struct BrandPalette {
    focus: Option<String>,
    assigned: HashMap<String, &'static str>,
    next: usize,
}

impl BrandPalette {
    #[must_use]
    pub fn new(focus: Option<&str>) -> Self {
        Self {
            focus: focus.map(normalize),
            assigned: HashMap::new(),
            next: 0,
        }
    }

    /// Colour for `brand`, assigning the next free palette entry on first sight.
    ///
    /// Names are matched case-insensitively with surrounding whitespace ignored.
    /// The palette wraps once every entry has been handed out.
    pub fn color_for(&mut self, brand: &str) -> &'static str {
        let key = normalize(brand);
        if self.focus.as_deref() == Some(key.as_str()) {
            return FOCUS_COLOR;
        }
        if let Some(color) = self.assigned.get(&key) {
            return color;
        }
        let color = COMPETITOR_COLORS[self.next % COMPETITOR_COLORS.len()];
        self.next += 1;
        self.assigned.insert(key, color);
        color
    }

    /// Hex colour with an alpha channel appended, for translucent fills.
    pub fn fill_for(&mut self, brand: &str, alpha: u8) -> String {
        format!("{}{alpha:02X}", self.color_for(brand))
    }

    #[must_use]
    pub fn is_focus(&self, brand: &str) -> bool {
        self.focus.as_deref() == Some(normalize(brand).as_str())
    }

    /// Forget all competitor assignments; the focus brand stays pinned.
    pub fn reset(&mut self) {
        self.assigned.clear();
        self.next = 0;
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_gets_same_color() {
        let mut palette = BrandPalette::new(Some("Acme"));
        let first = palette.color_for("Globex");
        let second = palette.color_for("Globex");
        assert_eq!(first, second);
    }

    #[test]
    fn focus_is_primary_regardless_of_order() {
        let mut palette = BrandPalette::new(Some("Acme"));
        palette.color_for("Globex");
        palette.color_for("Initech");
        assert_eq!(palette.color_for("Acme"), FOCUS_COLOR);
        assert_eq!(palette.color_for("  acme "), FOCUS_COLOR);
    }

    #[test]
    fn competitors_follow_first_seen_order() {
        let mut palette = BrandPalette::new(Some("Acme"));
        assert_eq!(palette.color_for("Initech"), COMPETITOR_COLORS[0]);
        assert_eq!(palette.color_for("Globex"), COMPETITOR_COLORS[1]);
        assert_eq!(palette.color_for("Initech"), COMPETITOR_COLORS[0]);
    }

    #[test]
    fn reset_restarts_assignment() {
        let mut palette = BrandPalette::new(Some("Acme"));
        palette.color_for("Initech");
        palette.color_for("Globex");
        palette.reset();
        assert_eq!(palette.color_for("Globex"), COMPETITOR_COLORS[0]);
        assert_eq!(palette.color_for("Acme"), FOCUS_COLOR);
    }

    #[test]
    fn fill_appends_alpha() {
        let mut palette = BrandPalette::new(Some("Acme"));
        assert_eq!(palette.fill_for("Acme", 0x40), "#6366F140");
    }
}
