//! Headline font sizing.
//!
//! Two heuristics live here and they must stay separate. The export size
//! targets a fixed 1080×1080 canvas and depends only on character count.
//! The editing size approximates on-screen fit while typing and also
//! penalises word count.

/// Default width assumed by the editing heuristic, in logical pixels.
pub const DEFAULT_EDITING_WIDTH: f64 = 320.0;

const EDITING_MIN_PX: f64 = 32.0;
const EDITING_MAX_PX: f64 = 80.0;
const WORD_PENALTY: f64 = 0.8;

/// Export font size for a headline of `text_length` characters.
///
/// | length  | size |
/// |---------|------|
/// | ≤ 30    | 120  |
/// | 31..=60 | 90   |
/// | > 60    | 70   |
pub fn compute_export_font_size(text_length: usize) -> u32 {
    if text_length <= 30 {
        120
    } else if text_length <= 60 {
        90
    } else {
        70
    }
}

/// Number of words as the editor counts them: pieces between single spaces.
pub fn editing_word_count(text: &str) -> usize {
    text.split(' ').count()
}

/// Unbucketed editing font size in pixels.
pub fn editing_font_px(text: &str, container_width: f64) -> f64 {
    let length = text.chars().count() as f64;
    let mut size = (container_width / (length * 0.8)).clamp(EDITING_MIN_PX, EDITING_MAX_PX);

    let words = editing_word_count(text);
    if words > 3 {
        size *= WORD_PENALTY;
    }
    if words > 6 {
        size *= WORD_PENALTY;
    }
    size
}

/// Discrete size classes used on the live card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EditingFontSize {
    Xl,
    Xl2,
    Xl3,
    Xl4,
    Xl5,
    Xl6,
    Xl7,
}

impl EditingFontSize {
    pub const ALL: [EditingFontSize; 7] = [
        Self::Xl,
        Self::Xl2,
        Self::Xl3,
        Self::Xl4,
        Self::Xl5,
        Self::Xl6,
        Self::Xl7,
    ];

    /// Bucket a raw pixel size. Thresholds are inclusive lower bounds.
    pub fn from_px(px: f64) -> Self {
        if px >= 72.0 {
            Self::Xl7
        } else if px >= 60.0 {
            Self::Xl6
        } else if px >= 48.0 {
            Self::Xl5
        } else if px >= 36.0 {
            Self::Xl4
        } else if px >= 30.0 {
            Self::Xl3
        } else if px >= 24.0 {
            Self::Xl2
        } else {
            Self::Xl
        }
    }

    /// Bucket for `text` rendered into a container of the given width.
    pub fn for_text(text: &str, container_width: f64) -> Self {
        Self::from_px(editing_font_px(text, container_width))
    }

    /// Utility class carried by the headline node.
    pub fn class_name(self) -> &'static str {
        match self {
            Self::Xl => "text-xl",
            Self::Xl2 => "text-2xl",
            Self::Xl3 => "text-3xl",
            Self::Xl4 => "text-4xl",
            Self::Xl5 => "text-5xl",
            Self::Xl6 => "text-6xl",
            Self::Xl7 => "text-7xl",
        }
    }

    /// Nominal rendered size of the class.
    pub fn px(self) -> f32 {
        match self {
            Self::Xl => 20.0,
            Self::Xl2 => 24.0,
            Self::Xl3 => 30.0,
            Self::Xl4 => 36.0,
            Self::Xl5 => 48.0,
            Self::Xl6 => 60.0,
            Self::Xl7 => 72.0,
        }
    }

    pub fn from_class(class: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|size| size.class_name() == class)
    }
}
