const UNITS: [&str; 5] = ["B", "K", "M", "G", "T"];

/// Render Drive's decimal-string `size` field with 1024-based units, e.g. `12B`, `3.5M`.
/// Folders and native Google documents carry no size and render as `-`.
pub fn format_size_field(size: Option<&str>) -> String {
    let Some(bytes) = size.and_then(|s| s.parse::<u64>().ok()) else {
        return "-".to_string();
    };

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes}B")
    } else {
        format!("{value:.1}{}", UNITS[unit])
    }
}
