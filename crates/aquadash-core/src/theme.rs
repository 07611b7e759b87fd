//! Theme palette for chart rendering.
//!
//! The dashboard ships two themes. Their wire names (`light` / `dracula`)
//! are what gets persisted and what the UI layer applies as a document
//! attribute; the core only selects colors from the matching palette.

use serde::{Deserialize, Serialize};

/// Light or dark color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    /// Default light theme.
    Light,
    /// Dark theme ("dracula").
    Dark,
}

impl Theme {
    /// The persisted theme name.
    pub fn name(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dracula",
        }
    }

    /// Resolve a persisted theme name; unknown names fall back to light.
    pub fn from_name(name: &str) -> Theme {
        if name == Theme::Dark.name() {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    /// The other theme.
    pub fn toggled(&self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Color palette for this theme.
    pub fn palette(&self) -> &'static Palette {
        match self {
            Theme::Light => &LIGHT_PALETTE,
            Theme::Dark => &DARK_PALETTE,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Light
    }
}

/// Opacity applied to background threshold bands, as a hex alpha suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandOpacity {
    /// Heavier tint for the two outer (critical) bands.
    Critical,
    /// Lighter tint for the inner bands.
    Normal,
}

impl BandOpacity {
    /// Two-digit hex alpha appended to a palette color.
    pub fn suffix(&self) -> &'static str {
        match self {
            BandOpacity::Critical => "20",
            BandOpacity::Normal => "10",
        }
    }
}

/// Append a hex alpha suffix to a palette color.
pub fn with_opacity(color: &str, opacity: BandOpacity) -> String {
    format!("{}{}", color, opacity.suffix())
}

/// Chart color palette for one theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    /// Text color for titles and axis labels.
    pub base_content: &'static str,
    /// Color of the measurement series line.
    pub line_color: &'static str,
    /// Color for the normal threshold band/zone.
    pub success: &'static str,
    /// Color for warning bands/zones.
    pub warning: &'static str,
    /// Color for critical bands/zones.
    pub danger: &'static str,
}

/// Palette for [`Theme::Light`].
pub static LIGHT_PALETTE: Palette = Palette {
    base_content: "#1f2937",
    line_color: "#0067cd",
    success: "#00a992",
    warning: "#ffbf00",
    danger: "#ff5555",
};

/// Palette for [`Theme::Dark`].
pub static DARK_PALETTE: Palette = Palette {
    base_content: "#f8f8f2",
    line_color: "#d3edff",
    success: "#60cc96",
    warning: "#f1fa8c",
    danger: "#ff5555",
};
