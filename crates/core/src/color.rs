pub const DEFAULT_ITEM_COLOR: &str = "#8B4513";
pub const DEFAULT_ITEM_MATERIAL: &str = "wood";
pub const PLACEHOLDER_COLOR: [f32; 3] = [0.5019608, 0.5019608, 0.5019608];

/// Parses `#rrggbb`, `#rgb` (with or without the leading `#`) into 0..1 sRGB.
pub fn parse_hex_color(value: &str) -> Option<[f32; 3]> {
    let hex = value.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        // #rrggbbaa: alpha is not part of the item model
        8 => hex[..6].to_string(),
        _ => return None,
    };
    let channel = |start: usize| -> Option<f32> {
        u8::from_str_radix(&expanded[start..start + 2], 16)
            .ok()
            .map(|v| v as f32 / 255.0)
    };
    Some([channel(0)?, channel(2)?, channel(4)?])
}

pub fn color_or_placeholder(value: &str) -> [f32; 3] {
    parse_hex_color(value).unwrap_or(PLACEHOLDER_COLOR)
}

pub fn to_hex_color(rgb: [f32; 3]) -> String {
    let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!("#{:02x}{:02x}{:02x}", byte(rgb[0]), byte(rgb[1]), byte(rgb[2]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_forms() {
        let brown = parse_hex_color("#8B4513").expect("brown");
        assert!((brown[0] - 139.0 / 255.0).abs() < 1.0e-6);
        assert!((brown[1] - 69.0 / 255.0).abs() < 1.0e-6);
        assert!((brown[2] - 19.0 / 255.0).abs() < 1.0e-6);
        assert_eq!(parse_hex_color("fff"), Some([1.0, 1.0, 1.0]));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_hex_color("#12"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
        assert_eq!(color_or_placeholder("nope"), PLACEHOLDER_COLOR);
    }

    #[test]
    fn hex_round_trip_is_stable() {
        assert_eq!(to_hex_color(parse_hex_color("#808080").expect("grey")), "#808080");
    }
}
