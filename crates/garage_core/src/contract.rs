//! Schema contract for the garage database.
//!
//! # Responsibility
//! - Define the single source of truth for table/column names and
//!   resource addressing consumed by the store.
//! - Define the fixed car color enumeration and its packed RGB codes.
//!
//! # Invariants
//! - Aliased color names (`silver`, `other`) resolve to one canonical code.
//! - Unrecognized color codes and names decode to the default, white.

use serde::{Deserialize, Serialize};

/// URI authority for garage resources.
pub const AUTHORITY: &str = "garage";
/// Path segment addressing the cars collection.
pub const PATH_CARS: &str = "cars";

/// Table holding one row per tracked car.
pub const TABLE_CARS: &str = "cars";

pub const COL_ID: &str = "_id";
pub const COL_MAKE: &str = "make";
pub const COL_MODEL: &str = "model";
pub const COL_YEAR: &str = "year";
pub const COL_COLOR: &str = "color";
pub const COL_PLATE: &str = "plate";

/// Every column of the cars table, in persisted order.
pub const COLUMNS: &[&str] = &[COL_ID, COL_MAKE, COL_MODEL, COL_YEAR, COL_COLOR, COL_PLATE];

/// Columns a caller may supply in a write field map.
///
/// `_id` is storage-assigned and immutable, so it is deliberately absent.
pub const WRITABLE_COLUMNS: &[&str] = &[COL_MAKE, COL_MODEL, COL_YEAR, COL_COLOR, COL_PLATE];

/// Text columns that must be present and non-blank on insert.
pub const REQUIRED_COLUMNS: &[&str] = &[COL_MAKE, COL_MODEL, COL_YEAR, COL_PLATE];

/// Renders the collection URI, `garage://cars`.
pub fn collection_uri() -> String {
    format!("{AUTHORITY}://{PATH_CARS}")
}

/// Renders an item URI, `garage://cars/{id}`.
pub fn item_uri(id: i64) -> String {
    format!("{AUTHORITY}://{PATH_CARS}/{id}")
}

/// Fixed color palette for cars.
///
/// Persisted in the `color` column as a packed `0xRRGGBB` code. Gray and
/// silver are the same physical paint as far as the garage cares, so both
/// names map to one canonical code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarColor {
    #[default]
    White,
    Black,
    Gray,
    Brown,
    Red,
    Blue,
    Green,
    Yellow,
    Orange,
    Purple,
}

impl CarColor {
    /// Every palette entry, in display order.
    pub const ALL: [CarColor; 10] = [
        CarColor::White,
        CarColor::Black,
        CarColor::Gray,
        CarColor::Brown,
        CarColor::Red,
        CarColor::Blue,
        CarColor::Green,
        CarColor::Yellow,
        CarColor::Orange,
        CarColor::Purple,
    ];

    /// Canonical packed RGB code persisted in the `color` column.
    pub fn code(self) -> i64 {
        match self {
            CarColor::White => 0xFFFFFF,
            CarColor::Black => 0x000000,
            CarColor::Gray => 0x888888,
            CarColor::Brown => 0x795548,
            CarColor::Red => 0xFF0000,
            CarColor::Blue => 0x0000FF,
            CarColor::Green => 0x00FF00,
            CarColor::Yellow => 0xFFFF00,
            CarColor::Orange => 0xFF9800,
            CarColor::Purple => 0x9C27B0,
        }
    }

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            CarColor::White => "white",
            CarColor::Black => "black",
            CarColor::Gray => "gray",
            CarColor::Brown => "brown",
            CarColor::Red => "red",
            CarColor::Blue => "blue",
            CarColor::Green => "green",
            CarColor::Yellow => "yellow",
            CarColor::Orange => "orange",
            CarColor::Purple => "purple",
        }
    }

    /// Decodes a stored color code. Unknown codes fall back to white.
    pub fn from_code(code: i64) -> Self {
        Self::ALL
            .into_iter()
            .find(|color| color.code() == code)
            .unwrap_or_default()
    }

    /// Looks up a color by name, case-insensitively.
    ///
    /// Accepts the aliases `silver` (gray's canonical code) and `other`
    /// (white). Unknown names fall back to white.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "white" | "other" => CarColor::White,
            "black" => CarColor::Black,
            "gray" | "silver" => CarColor::Gray,
            "brown" => CarColor::Brown,
            "red" => CarColor::Red,
            "blue" => CarColor::Blue,
            "green" => CarColor::Green,
            "yellow" => CarColor::Yellow,
            "orange" => CarColor::Orange,
            "purple" => CarColor::Purple,
            _ => CarColor::White,
        }
    }
}
