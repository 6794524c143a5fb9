use std::str::FromStr;

use eframe::egui::Color32;
use palette::Srgb;

// ---------------------------------------------------------------------------
// Plot colours
// ---------------------------------------------------------------------------

/// Marker colour for catalog stars (matplotlib's default blue).
pub const STAR_HEX: &str = "#1f77b4";

/// Marker opacity for catalog stars.
pub const STAR_ALPHA: u8 = 128;

/// Isochrone line colour per age, in `ISOCHRONE_AGES` order.
pub const ISOCHRONE_HEX: [&str; 5] = ["#0000ff", "#89fe05", "#000000", "#dbb40c", "#ff0000"];

/// Parse a `#rrggbb` / `#rgb` code; unparsable codes fall back to grey.
pub fn hex_color(hex: &str) -> Color32 {
    match Srgb::<u8>::from_str(hex) {
        Ok(rgb) => Color32::from_rgb(rgb.red, rgb.green, rgb.blue),
        Err(e) => {
            log::warn!("Bad colour code '{hex}': {e}");
            Color32::GRAY
        }
    }
}

/// Translucent marker colour for catalog stars.
pub fn star_color() -> Color32 {
    let c = hex_color(STAR_HEX);
    Color32::from_rgba_unmultiplied(c.r(), c.g(), c.b(), STAR_ALPHA)
}

/// Line colour for the isochrone at position `slot` of the age list.
pub fn isochrone_color(slot: usize) -> Color32 {
    ISOCHRONE_HEX
        .get(slot)
        .map(|hex| hex_color(hex))
        .unwrap_or(Color32::GRAY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_codes() {
        assert_eq!(hex_color("#89fe05"), Color32::from_rgb(0x89, 0xfe, 0x05));
        assert_eq!(hex_color("#000000"), Color32::BLACK);
        assert_eq!(hex_color("not a colour"), Color32::GRAY);
    }

    #[test]
    fn isochrone_colours_are_distinct() {
        let colours: Vec<Color32> = (0..ISOCHRONE_HEX.len()).map(isochrone_color).collect();
        for (i, a) in colours.iter().enumerate() {
            for b in &colours[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(isochrone_color(99), Color32::GRAY);
    }

    #[test]
    fn star_colour_is_translucent() {
        assert_eq!(star_color().a(), STAR_ALPHA);
    }
}
