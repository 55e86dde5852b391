//! Entity-name normalization.
//!
//! Remote entity names frequently carry decorative glyph prefixes
//! ("🎯 Work") while templates and CLI flags refer to them in plain text
//! ("Work"). Index keys and lookup queries are both passed through
//! [`normalize`] so the two spellings compare equal.

/// Normalize an entity name for comparison: strip pictographic symbols,
/// trim surrounding whitespace and lower-case the rest.
pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !is_pictographic(*c))
        .collect::<String>()
        .trim()
        .to_lowercase()
}

/// True for characters in the common pictographic and symbol ranges.
fn is_pictographic(c: char) -> bool {
    matches!(
        u32::from(c),
        0x2600..=0x26FF     // miscellaneous symbols
        | 0x2700..=0x27BF   // dingbats
        | 0x2B00..=0x2BFF   // miscellaneous symbols and arrows
        | 0x1F000..=0x1FAFF // emoji planes, incl. pictographs and emoticons
        | 0xFE00..=0xFE0F   // variation selectors
        | 0x200D            // zero-width joiner
        | 0x20E3            // combining enclosing keycap
    )
}
