//! Colors for panels, axes and lines.
//!
//! Line colors come from a fixed ten-color cycle indexed by line-domain
//! position, so the same line value has the same color on every panel and
//! the shared legend stays truthful.

/// RGBA color with 8-bit components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct Rgba {
    /// Red component (0-255).
    pub r: u8,
    /// Green component (0-255).
    pub g: u8,
    /// Blue component (0-255).
    pub b: u8,
    /// Alpha component (0-255, 255 = fully opaque).
    pub a: u8,
}

impl Rgba {
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    /// Light grey used for panel borders.
    pub const GREY: Self = Self::new(190, 190, 190, 255);

    /// Create a new RGBA color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color (alpha = 255).
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Create a color with modified alpha.
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Convert to array representation.
    #[must_use]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Fixed categorical color cycle for lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct Palette;

impl Palette {
    /// Tableau-10 categorical colors.
    const CYCLE: [Rgba; 10] = [
        Rgba::rgb(31, 119, 180),
        Rgba::rgb(255, 127, 14),
        Rgba::rgb(44, 160, 44),
        Rgba::rgb(214, 39, 40),
        Rgba::rgb(148, 103, 189),
        Rgba::rgb(140, 86, 75),
        Rgba::rgb(227, 119, 194),
        Rgba::rgb(127, 127, 127),
        Rgba::rgb(188, 189, 34),
        Rgba::rgb(23, 190, 207),
    ];

    /// Color for the line at `index` in the line domain; wraps after ten.
    #[must_use]
    pub const fn line_color(index: usize) -> Rgba {
        Self::CYCLE[index % Self::CYCLE.len()]
    }
}
