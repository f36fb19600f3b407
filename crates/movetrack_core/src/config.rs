//! Configured selection lists for item classification.
//!
//! # Responsibility
//! - Carry the category/location/owner sets offered by the editing UI.
//! - Answer write-path membership checks for categories and locations.
//!
//! # Invariants
//! - An empty list disables the corresponding membership check.
//! - Owners are offered to the UI but never validated; owner stays free text.

/// Enumerated dropdown options owned by one session.
///
/// Constructed explicitly and passed in rather than read from globals, so
/// several sessions or tests can run with independent lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionLists {
    pub categories: Vec<String>,
    pub locations: Vec<String>,
    pub owners: Vec<String>,
}

impl Default for OptionLists {
    fn default() -> Self {
        Self {
            categories: to_strings(&[
                "Bed and Bath",
                "Eris stuff",
                "Family stuff",
                "Furniture",
                "Kilo stuff",
                "Kitchen",
                "Rec",
                "Tools",
                "Work",
            ]),
            locations: to_strings(&[
                "Baltimore",
                "California",
                "Connecticut",
                "Hawaii",
                "In-Transit",
                "Sold",
                "Sydney",
                "Trash/Donate",
                "Uhaul Container",
                "Uncertain",
            ]),
            owners: to_strings(&["Andy", "Lucia", "NA"]),
        }
    }
}

impl OptionLists {
    /// Lists with every check disabled.
    pub fn unrestricted() -> Self {
        Self {
            categories: Vec::new(),
            locations: Vec::new(),
            owners: Vec::new(),
        }
    }

    /// Returns whether `value` passes the category check.
    pub fn allows_category(&self, value: &str) -> bool {
        self.categories.is_empty() || self.categories.iter().any(|known| known == value)
    }

    /// Returns whether `value` passes the location check.
    pub fn allows_location(&self, value: &str) -> bool {
        self.locations.is_empty() || self.locations.iter().any(|known| known == value)
    }

    /// Fallback category applied when a form leaves the field blank.
    ///
    /// Empty when no categories are configured.
    pub fn default_category(&self) -> &str {
        self.categories.first().map_or("", String::as_str)
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}
