use image::Rgba;

/// Swatches offered on a fresh session.
pub const DEFAULT_PALETTE: [&str; 8] = [
    "#000000", "#FFFFFF", "#FF0000", "#00FF00", "#0000FF", "#FFFF00", "#FF00FF", "#00FFFF",
];

/// Parse `#rrggbb` or `#rrggbbaa` (leading `#` optional, case-insensitive).
/// Six-digit colours are opaque.
pub fn parse_hex(text: &str) -> Option<Rgba<u8>> {
    let hex = text.trim().trim_start_matches('#');
    if !hex.is_ascii() || !(hex.len() == 6 || hex.len() == 8) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let a = if hex.len() == 8 { channel(6)? } else { 255 };
    Some(Rgba([channel(0)?, channel(2)?, channel(4)?, a]))
}

/// `#RRGGBB`, alpha dropped.
pub fn to_hex(color: Rgba<u8>) -> String {
    format!("#{:02X}{:02X}{:02X}", color[0], color[1], color[2])
}

pub fn default_palette() -> Vec<Rgba<u8>> {
    DEFAULT_PALETTE.iter().filter_map(|h| parse_hex(h)).collect()
}

/// Parse a stored palette, skipping entries that aren't valid hex.
pub fn palette_from_hex<S: AsRef<str>>(entries: &[S]) -> Vec<Rgba<u8>> {
    entries.iter().filter_map(|h| parse_hex(h.as_ref())).collect()
}

pub fn palette_to_hex(palette: &[Rgba<u8>]) -> Vec<String> {
    palette.iter().map(|c| to_hex(*c)).collect()
}
