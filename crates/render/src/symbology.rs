use scene::Color;

/// Ordered choropleth palette over a numeric domain `[0, domain_max]`.
///
/// The same palette instance drives both region fills and the legend, so
/// the two can never disagree. Zero totals take the lowest swatch;
/// positive totals quantize over the remaining swatches.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Color>,
    domain_max: f64,
    min_label: String,
    max_label: String,
}

const BASE_COLORS: [&str; 5] = ["#e3d9ff", "#bea9f8", "#9879ee", "#6e48e2", "#3700d4"];

impl Palette {
    pub fn new(
        colors: Vec<Color>,
        domain_max: f64,
        min_label: impl Into<String>,
        max_label: impl Into<String>,
    ) -> Self {
        Self {
            colors,
            domain_max: domain_max.max(1.0),
            min_label: min_label.into(),
            max_label: max_label.into(),
        }
    }

    /// County-level palette for the national view.
    pub fn national() -> Self {
        Self::new(base_colors(), 5.0, "0", "4+")
    }

    /// Country-level palette for the world view.
    pub fn world() -> Self {
        Self::new(base_colors(), 40.0, "0", "40+")
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn domain_max(&self) -> f64 {
        self.domain_max
    }

    /// Discrete bin index for a value; values at or beyond the domain end
    /// saturate in the highest bin, and anything at or below zero (or a
    /// missing total) lands in the lowest.
    pub fn bin_for(&self, value: f64) -> usize {
        let n = self.colors.len();
        if n <= 1 || !(value > 0.0) {
            return 0;
        }
        let spread = (n - 1) as f64;
        let bin = 1 + (value / self.domain_max * spread).floor() as usize;
        bin.min(n - 1)
    }

    pub fn color_for(&self, value: f64) -> Color {
        self.colors[self.bin_for(value)]
    }

    pub fn lowest(&self) -> Color {
        self.colors[0]
    }

    pub fn highest(&self) -> Color {
        self.colors[self.colors.len() - 1]
    }

    pub fn legend(&self) -> Legend {
        Legend {
            swatches: self.colors.clone(),
            minimum: self.min_label.clone(),
            maximum: self.max_label.clone(),
        }
    }
}

/// Legend description handed to the surrounding UI.
#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub swatches: Vec<Color>,
    pub minimum: String,
    pub maximum: String,
}

fn base_colors() -> Vec<Color> {
    BASE_COLORS
        .iter()
        .map(|hex| parse_hex_color(hex).expect("static palette entry"))
        .collect()
}

/// Parse `#rrggbb` or `#rrggbbaa` into an RGBA color.
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#')?;
    let (rgb, alpha) = match digits.len() {
        6 => (digits, 255u8),
        8 => (
            &digits[..6],
            u8::from_str_radix(&digits[6..8], 16).ok()?,
        ),
        _ => return None,
    };
    let r = u8::from_str_radix(&rgb[0..2], 16).ok()?;
    let g = u8::from_str_radix(&rgb[2..4], 16).ok()?;
    let b = u8::from_str_radix(&rgb[4..6], 16).ok()?;
    Some([
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        alpha as f32 / 255.0,
    ])
}

/// Hover feedback: scale the RGB channels toward black, alpha untouched.
pub fn darken(color: Color, amount: f64) -> Color {
    let factor = 0.7f64.powf(amount) as f32;
    [
        color[0] * factor,
        color[1] * factor,
        color[2] * factor,
        color[3],
    ]
}

#[cfg(test)]
mod tests {
    use super::{Palette, darken, parse_hex_color};

    #[test]
    fn national_bins_match_totals() {
        let p = Palette::national();
        assert_eq!(p.bin_for(0.0), 0);
        assert_eq!(p.bin_for(1.0), 1);
        assert_eq!(p.bin_for(2.0), 2);
        assert_eq!(p.bin_for(3.0), 3);
        assert_eq!(p.bin_for(4.0), 4);
        // Saturates past the domain end.
        assert_eq!(p.bin_for(12.0), 4);
    }

    #[test]
    fn world_zero_takes_lowest_swatch() {
        let p = Palette::world();
        assert_eq!(p.bin_for(0.0), 0);
        assert_eq!(p.bin_for(5.0), 1);
        assert_eq!(p.bin_for(39.0), 4);
        assert_eq!(p.bin_for(400.0), 4);
    }

    #[test]
    fn legend_and_fill_share_swatches() {
        let p = Palette::national();
        let legend = p.legend();
        assert_eq!(legend.swatches.len(), p.colors().len());
        assert_eq!(legend.swatches[0], p.color_for(0.0));
        assert_eq!(legend.minimum, "0");
        assert_eq!(legend.maximum, "4+");
    }

    #[test]
    fn hex_parsing() {
        assert_eq!(parse_hex_color("#ff0000"), Some([1.0, 0.0, 0.0, 1.0]));
        let translucent = parse_hex_color("#ff000040").unwrap();
        assert!((translucent[3] - 64.0 / 255.0).abs() < 1e-6);
        assert_eq!(parse_hex_color("red"), None);
        assert_eq!(parse_hex_color("#abcd"), None);
    }

    #[test]
    fn darken_scales_rgb_only() {
        let c = darken([0.5, 0.5, 0.5, 0.8], 1.0);
        assert!((c[0] - 0.35).abs() < 1e-6);
        assert!((c[3] - 0.8).abs() < 1e-6);
    }
}
