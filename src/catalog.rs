/// Fixed catalogs of falling items.
///
/// Every spawned entity copies its name, glyph and base point value from
/// one of these tables.

use crate::entities::EntityCategory;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub glyph: &'static str,
    pub points: u32,
}

const fn entry(name: &'static str, glyph: &'static str, points: u32) -> CatalogEntry {
    CatalogEntry { name, glyph, points }
}

/// Temptations the player must shoot down.
pub const HAZARDS: &[CatalogEntry] = &[
    entry("Alcohol", "🍺", 100),
    entry("Cigarettes", "🚬", 100),
    entry("Pills", "💊", 150),
    entry("Gambling", "🎰", 120),
    entry("Stress", "😰", 80),
    entry("Isolation", "🏚", 80),
];

/// Recovery tools the player collects by touching them.
pub const BENEFITS: &[CatalogEntry] = &[
    entry("Meditation", "🧘", 100),
    entry("Exercise", "🏃", 100),
    entry("Support Group", "🤝", 150),
    entry("Journaling", "📓", 75),
    entry("Therapy", "💬", 150),
    entry("Healthy Sleep", "😴", 75),
];

pub fn entries(category: EntityCategory) -> &'static [CatalogEntry] {
    match category {
        EntityCategory::Hazard => HAZARDS,
        EntityCategory::Benefit => BENEFITS,
    }
}

/// Look up a catalog entry by its display name.
pub fn find(category: EntityCategory, name: &str) -> Option<&'static CatalogEntry> {
    entries(category).iter().find(|e| e.name == name)
}
