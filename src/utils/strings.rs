/// Loose comparison used when scoring typed input: full-width ASCII matches
/// its half-width form, the ideographic space matches a plain space, and the
/// dash family matches the long vowel mark.
pub fn are_characters_visually_equal(c1: char, c2: char) -> bool {
    if c1 == c2 {
        return true;
    }

    if fold_width(c1) == fold_width(c2) {
        return true;
    }
    if is_long_vowel_like(c1) && is_long_vowel_like(c2) {
        return true;
    }

    false
}

/// Maps full-width ASCII (U+FF01..U+FF5E) and U+3000 onto their half-width
/// forms; every other character is returned unchanged.
pub fn fold_width(c: char) -> char {
    match c {
        '\u{3000}' => ' ',
        '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
        _ => c,
    }
}

/// Number of positions where `input` matches `target`, compared pairwise.
pub fn count_matching(input: &str, target: &str) -> usize {
    input
        .chars()
        .zip(target.chars())
        .filter(|(typed, expected)| are_characters_visually_equal(*typed, *expected))
        .count()
}

fn is_long_vowel_like(c: char) -> bool {
    matches!(c, 'ー' | '-' | '－' | '―' | '‐' | '—' | '–')
}
