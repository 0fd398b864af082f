//! Rating → tier / color presentation.
//!
//! Ratings are bucketed by truncation, never rounding: `1.29` and `1.20`
//! both land in tier `1.2`. Tiers from `1.3` up get a gradient background,
//! lower tiers are drawn as plain colored text.

use serde::Serialize;

/// Lowest tier rendered with a gradient background.
pub const GRADIENT_THRESHOLD: f64 = 1.3;

/// Highest defined tier.
pub const MAX_TIER: f64 = 2.0;

/// (background, border) per tenth, index 0 = tier 0.0 … index 20 = tier 2.0.
const PALETTE: [(&str, &str); 21] = [
    ("hsl(0, 70%, 70%)", "hsl(0, 70%, 60%)"),
    ("hsl(0, 80%, 65%)", "hsl(0, 80%, 55%)"),
    ("hsl(4, 85%, 60%)", "hsl(4, 85%, 50%)"),
    ("hsl(8, 90%, 55%)", "hsl(8, 90%, 45%)"),
    ("hsl(15, 95%, 50%)", "hsl(15, 95%, 40%)"),
    ("hsl(30, 90%, 55%)", "hsl(30, 90%, 45%)"),
    ("hsl(45, 85%, 60%)", "hsl(45, 85%, 50%)"),
    ("hsl(60, 80%, 60%)", "hsl(60, 80%, 55%)"),
    ("hsl(80, 70%, 60%)", "hsl(80, 70%, 50%)"),
    ("hsl(90, 65%, 55%)", "hsl(90, 65%, 45%)"),
    ("hsl(100, 70%, 50%)", "hsl(100, 70%, 40%)"),
    ("hsl(110, 75%, 45%)", "hsl(110, 75%, 35%)"),
    ("hsl(120, 80%, 40%)", "hsl(120, 80%, 30%)"),
    (
        "linear-gradient(135deg, hsl(140, 100%, 35%), hsl(160, 100%, 45%))",
        "hsl(150, 100%, 30%)",
    ),
    (
        "linear-gradient(135deg, hsl(160, 100%, 35%), hsl(180, 80%, 45%))",
        "hsl(170, 80%, 25%)",
    ),
    (
        "linear-gradient(135deg, hsl(180, 100%, 35%), hsl(200, 100%, 45%))",
        "hsl(190, 100%, 25%)",
    ),
    (
        "linear-gradient(135deg, hsl(200, 100%, 60%), hsl(220, 100%, 70%))",
        "hsl(210, 100%, 50%)",
    ),
    (
        "linear-gradient(135deg, hsl(220, 100%, 60%), hsl(240, 100%, 70%))",
        "hsl(230, 100%, 50%)",
    ),
    (
        "linear-gradient(135deg, hsl(240, 100%, 60%), hsl(260, 100%, 70%))",
        "hsl(250, 100%, 50%)",
    ),
    (
        "linear-gradient(135deg, hsl(260, 100%, 60%), hsl(280, 100%, 70%))",
        "hsl(270, 100%, 50%)",
    ),
    (
        "linear-gradient(135deg, hsl(280, 100%, 60%), hsl(300, 100%, 70%))",
        "hsl(290, 100%, 50%)",
    ),
];

/// How a rating badge is painted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ColorStyle {
    Gradient {
        background: &'static str,
        border: &'static str,
    },
    Plain {
        color: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingStyle {
    pub tier: f64,
    pub style: ColorStyle,
}

/// Tier list heading colors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingColor {
    pub background: String,
    pub border: String,
}

/// `floor(rating * 10) / 10`.
pub fn tier(rating: f64) -> f64 {
    (rating * 10.0).floor() / 10.0
}

/// Palette index for a rating's tier, clamped to `0..=20`.
/// `None` when the tier is not a number at all.
fn palette_index(rating: f64) -> Option<usize> {
    let tenths = (rating * 10.0).floor();
    if tenths.is_nan() {
        return None;
    }
    Some(tenths.clamp(0.0, 20.0) as usize)
}

/// Tier plus paint for `rating`.
pub fn rating_style(rating: f64) -> RatingStyle {
    let idx = palette_index(rating).unwrap_or(0);
    let (background, border) = PALETTE[idx];
    let style = if idx >= 13 {
        ColorStyle::Gradient { background, border }
    } else {
        ColorStyle::Plain { color: border }
    };
    RatingStyle {
        tier: tier(rating),
        style,
    }
}

/// The two-decimal quip rating, truncated: `1.2399` → `"1.23"`.
pub fn display_rating(rating: f64) -> String {
    format!("{:.2}", (rating * 100.0).floor() / 100.0)
}

/// Heading swatch for a tier row: hue grows 120° per whole rating point.
pub fn tier_heading_color(tier: f64) -> HeadingColor {
    let hue = (tier * 10.0).round() as i64 * 12;
    HeadingColor {
        background: format!("hsl({hue}, 70%, 50%)"),
        border: format!("hsl({hue}, 70%, 40%)"),
    }
}
