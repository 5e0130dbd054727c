//! Mapping editor font families onto the PDF standard 14 fonts

/// Map a CSS-ish font family (plus weight) to a standard font name.
///
/// Handles generic families ("serif", "monospace"), common system faces
/// ("Arial", "Georgia", "Consolas") and names that already carry a style.
pub fn standard_font(family: Option<&str>, bold: bool) -> &'static str {
    let lower = family.unwrap_or("").to_lowercase();
    let bold = bold || lower.contains("bold");
    let italic = lower.contains("italic") || lower.contains("oblique");

    let base = if lower == "serif"
        || lower.contains("times")
        || lower.contains("georgia")
        || lower.contains("garamond")
    {
        "Times"
    } else if lower == "monospace"
        || lower.contains("courier")
        || lower.contains("mono")
        || lower.contains("consolas")
        || lower.contains("monaco")
    {
        "Courier"
    } else {
        "Helvetica"
    };

    match (base, bold, italic) {
        ("Times", true, true) => "Times-BoldItalic",
        ("Times", true, false) => "Times-Bold",
        ("Times", false, true) => "Times-Italic",
        ("Times", false, false) => "Times-Roman",
        ("Courier", true, true) => "Courier-BoldOblique",
        ("Courier", true, false) => "Courier-Bold",
        ("Courier", false, true) => "Courier-Oblique",
        ("Courier", false, false) => "Courier",
        (_, true, true) => "Helvetica-BoldOblique",
        (_, true, false) => "Helvetica-Bold",
        (_, false, true) => "Helvetica-Oblique",
        _ => "Helvetica",
    }
}

/// Page resource name for a standard font, e.g. `AnnHelveticaBold`
pub fn resource_name(base_font: &str) -> String {
    format!("Ann{}", base_font.replace('-', ""))
}

/// Encode text for a WinAnsi-encoded simple font; unmappable characters become `?`
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7E | 0xA0..=0xFF => c as u32 as u8,
            0x2022 => 0x95,
            0x2013 => 0x96,
            0x2014 => 0x97,
            0x2018 => 0x91,
            0x2019 => 0x92,
            0x201C => 0x93,
            0x201D => 0x94,
            0x20AC => 0x80,
            0x2026 => 0x85,
            _ => b'?',
        })
        .collect()
}

/// Rough advance width of `text` for a standard font at `size`
pub fn approx_text_width(text: &str, size: f64) -> f64 {
    text.chars().count() as f64 * size * 0.5
}
