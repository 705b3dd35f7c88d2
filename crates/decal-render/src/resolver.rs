//! Template key resolution.
//!
//! The mapping from `(title, variant descriptor)` to a template bundle key
//! is a convention shared with the asset-authoring side, and it has
//! changed shape across revisions (casing, separators, hyphen escaping).
//! It is therefore carried as an injected, versioned configuration value
//! rather than inline string mangling: convention changes touch only
//! [`TemplateNaming`] and its tests, never the orchestrator.

use serde::{Deserialize, Serialize};

/// Identifier of the naming convention revision this default encodes.
pub const NAMING_CONVENTION_VERSION: &str = "v2";

/// The template bundle naming convention.
///
/// `resolve` is total and pure: the same inputs always yield the same key
/// for one configuration value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateNaming {
    /// Separator joining normalized title words.
    pub word_separator: String,
    /// Replacement for a literal `-` inside a title word, so hyphenated
    /// tokens cannot collide with the word separator convention.
    pub hyphen_escape: String,
    /// Case-insensitive substrings of the variant descriptor that select
    /// the light template.
    pub light_markers: Vec<String>,
    /// Suffix appended for light-background variants.
    pub light_suffix: String,
    /// Suffix appended for everything else.
    pub dark_suffix: String,
    /// Bundle file extension, including the dot.
    pub extension: String,
}

impl Default for TemplateNaming {
    fn default() -> Self {
        Self {
            word_separator: "_".to_string(),
            hyphen_escape: "--".to_string(),
            light_markers: vec![
                "white".to_string(),
                "golden yellow".to_string(),
                "cream".to_string(),
                "natural".to_string(),
            ],
            light_suffix: "_FOR_LIGHT".to_string(),
            dark_suffix: "_FOR_DARK".to_string(),
            extension: ".zip".to_string(),
        }
    }
}

impl TemplateNaming {
    /// Resolves the template bundle key for a line item.
    ///
    /// Title normalization: uppercase, collapse all whitespace runs, escape
    /// hyphens inside tokens, join tokens with the word separator. The
    /// variant descriptor then selects the light or dark suffix.
    #[must_use]
    pub fn resolve(&self, title: &str, variant: Option<&str>) -> String {
        let normalized = title
            .split_whitespace()
            .map(|word| word.to_uppercase().replace('-', &self.hyphen_escape))
            .collect::<Vec<_>>()
            .join(&self.word_separator);

        let suffix = if self.is_light(variant) {
            &self.light_suffix
        } else {
            &self.dark_suffix
        };

        format!("{normalized}{suffix}{}", self.extension)
    }

    /// Classifies a variant descriptor as light-background.
    ///
    /// Membership is by case-insensitive substring, so `"White / L"` and
    /// `"Vintage White"` both match the `white` marker. An absent variant
    /// selects the dark template.
    #[must_use]
    pub fn is_light(&self, variant: Option<&str>) -> bool {
        let Some(variant) = variant else {
            return false;
        };
        let lowered = variant.to_lowercase();
        self.light_markers
            .iter()
            .any(|marker| lowered.contains(marker.as_str()))
    }
}
