//! Measurement schema registry: the static mapping from (gender, garment
//! category) to the ordered list of measurement fields to collect.
//!
//! The registry is a lookup table, not polymorphic dispatch. Orders snapshot
//! the field list at creation time, so editing this table never changes the
//! measurement keys of existing orders.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Gender {
    Men,
    Women,
}

type CategoryFields = (&'static str, &'static [&'static str]);

const WOMEN_CATEGORIES: &[CategoryFields] = &[
    (
        "blouse",
        &["Chest", "Waist", "Hip", "Height", "Length", "Shoulder", "Sleeve Length", "Armhole", "Neck"],
    ),
    (
        "dress",
        &["Chest", "Waist", "Hip", "Length", "Shoulder", "Sleeve Length", "Armhole", "Neck"],
    ),
    ("top", &["Chest", "Waist", "Length", "Shoulder", "Sleeve Length"]),
    (
        "kurti",
        &["Chest", "Waist", "Hip", "Length", "Shoulder", "Sleeve Length", "Slit Length"],
    ),
    ("lehenga", &["Waist", "Hip", "Length", "Flare"]),
    (
        "saree_blouse",
        &["Chest", "Waist", "Length", "Shoulder", "Sleeve Length", "Back Neck Depth", "Front Neck Depth"],
    ),
    ("salwar", &["Waist", "Hip", "Length", "Bottom", "Thigh"]),
    ("churidar", &["Waist", "Hip", "Length", "Knee", "Bottom", "Thigh"]),
];

const MEN_CATEGORIES: &[CategoryFields] = &[
    (
        "shirt",
        &["Chest", "Waist", "Length", "Shoulder", "Sleeve Length", "Collar", "Armhole"],
    ),
    ("pant", &["Waist", "Hip", "Length", "Inseam", "Thigh", "Knee", "Bottom"]),
    (
        "kurta",
        &["Chest", "Waist", "Length", "Shoulder", "Sleeve Length", "Collar"],
    ),
    (
        "coat",
        &["Chest", "Waist", "Length", "Shoulder", "Sleeve Length", "Back Length"],
    ),
    ("blazer", &["Chest", "Waist", "Length", "Shoulder", "Sleeve Length"]),
    (
        "sherwani",
        &["Chest", "Waist", "Hip", "Length", "Shoulder", "Sleeve Length", "Collar"],
    ),
    ("waistcoat", &["Chest", "Waist", "Length"]),
];

/// All categories defined for a gender, in registry order.
pub fn categories(gender: Gender) -> &'static [CategoryFields] {
    match gender {
        Gender::Women => WOMEN_CATEGORIES,
        Gender::Men => MEN_CATEGORIES,
    }
}

/// Ordered measurement fields for (gender, category), or None if the
/// category is not defined for that gender.
pub fn fields(gender: Gender, category: &str) -> Option<&'static [&'static str]> {
    categories(gender)
        .iter()
        .find(|(key, _)| *key == category)
        .map(|(_, fields)| *fields)
}

/// Human-readable category label: underscores replaced with spaces.
pub fn category_label(category: &str) -> String {
    category.replace('_', " ")
}
