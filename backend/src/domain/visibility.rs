//! Visibility flags shared by courses, components and products.
//!
//! One vocabulary is used everywhere: `visibleOnHome` controls the home page
//! listing and `visibleOnCatalog` controls the resource's own catalogue page.

use serde::{Deserialize, Serialize};

/// Visibility state stored on every publishable record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visibility {
    pub visible_on_home: bool,
    pub visible_on_catalog: bool,
}

impl Default for Visibility {
    fn default() -> Self {
        Self {
            visible_on_home: false,
            visible_on_catalog: true,
        }
    }
}

impl Visibility {
    /// Apply the flags present in `patch`, leaving the others untouched.
    #[must_use]
    pub fn apply(self, patch: VisibilityPatch) -> Self {
        Self {
            visible_on_home: patch.visible_on_home.unwrap_or(self.visible_on_home),
            visible_on_catalog: patch.visible_on_catalog.unwrap_or(self.visible_on_catalog),
        }
    }
}

/// Partial visibility update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_on_home: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_on_catalog: Option<bool>,
}

impl VisibilityPatch {
    /// `true` when the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.visible_on_home.is_none() && self.visible_on_catalog.is_none()
    }
}

/// List filter over visibility flags; `None` matches either value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisibilityFilter {
    pub visible_on_home: Option<bool>,
    pub visible_on_catalog: Option<bool>,
}

impl VisibilityFilter {
    /// Whether `visibility` satisfies every constrained flag.
    #[must_use]
    pub fn matches(&self, visibility: &Visibility) -> bool {
        self.visible_on_home
            .is_none_or(|want| want == visibility.visible_on_home)
            && self
                .visible_on_catalog
                .is_none_or(|want| want == visibility.visible_on_catalog)
    }
}

/// Resource families that carry visibility flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Course records, keyed by slug or record id.
    Courses,
    /// Hardware components.
    Components,
    /// Marketplace products.
    Products,
}

impl ResourceKind {
    /// Singular label for messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Courses => "course",
            Self::Components => "component",
            Self::Products => "product",
        }
    }
}
