/// Deterministic palette cycling for chart colors.
///
/// Colors are a pure function of an index: the same index always yields the
/// same color, so re-rendering a report never reshuffles its charts.
use std::fmt;

/// A single RGBA color as understood by the charting engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Same hue at full opacity.
    #[must_use]
    pub fn opaque(self) -> Self {
        Self { a: 1.0, ..self }
    }

    /// CSS `rgb(...)` form of the same hue, dropping the alpha channel.
    #[must_use]
    pub fn solid(&self) -> String {
        format!("rgb({},{},{})", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({},{},{},{})", self.r, self.g, self.b, self.a)
    }
}

// ── Palette ──────────────────────────────────────────────────────────

pub const PALETTE: [Rgba; 15] = [
    Rgba::new(26, 188, 156, 0.65),  // teal
    Rgba::new(52, 152, 219, 0.65),  // blue
    Rgba::new(155, 89, 182, 0.65),  // purple
    Rgba::new(241, 196, 15, 0.75),  // yellow
    Rgba::new(230, 126, 34, 0.65),  // orange
    Rgba::new(231, 76, 60, 0.65),   // red
    Rgba::new(46, 204, 113, 0.65),  // green
    Rgba::new(243, 156, 18, 0.75),  // darker orange
    Rgba::new(52, 73, 94, 0.65),    // dark blue-gray
    Rgba::new(149, 165, 166, 0.65), // mid gray
    Rgba::new(22, 160, 133, 0.65),  // darker teal
    Rgba::new(41, 128, 185, 0.65),  // darker blue
    Rgba::new(125, 60, 152, 0.65),  // darker purple
    Rgba::new(211, 84, 0, 0.65),    // burnt orange
    Rgba::new(189, 195, 199, 0.65), // light gray
];

/// Fixed separator color drawn between pie and doughnut slices.
pub const SLICE_SEPARATOR: &str = "#fff";

/// Palette entry for `index`, cycling through the 15 base colors.
///
/// Border variants are always fully opaque; fill variants keep the palette
/// entry's own alpha.
#[must_use]
pub fn color_at(index: usize, is_border: bool) -> Rgba {
    let base = PALETTE[index % PALETTE.len()];
    if is_border { base.opaque() } else { base }
}
