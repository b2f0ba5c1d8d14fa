//! Category colors.

/// Categories offered when creating a timer, in display order.
pub const PREDEFINED_CATEGORIES: [&str; 8] = [
    "Workout",
    "Study",
    "Break",
    "Work",
    "Cooking",
    "Reading",
    "Meditation",
    "Other",
];

/// Color used for any category outside the palette.
pub const FALLBACK_COLOR: &str = "#A8A8A8";

const PALETTE: [(&str, &str); 8] = [
    ("Workout", "#FF6B6B"),
    ("Study", "#4ECDC4"),
    ("Break", "#45B7D1"),
    ("Work", "#96CEB4"),
    ("Cooking", "#FFEAA7"),
    ("Reading", "#DDA0DD"),
    ("Meditation", "#98D8C8"),
    ("Other", FALLBACK_COLOR),
];

/// Hex color for a category name. Matching is exact (case-sensitive).
pub fn category_color(category: &str) -> &'static str {
    PALETTE
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, color)| *color)
        .unwrap_or(FALLBACK_COLOR)
}

/// Whether the name is one of the predefined categories.
pub fn is_predefined(category: &str) -> bool {
    PREDEFINED_CATEGORIES.contains(&category)
}

/// The full palette, in display order.
pub fn palette() -> impl Iterator<Item = (&'static str, &'static str)> {
    PALETTE.iter().copied()
}
