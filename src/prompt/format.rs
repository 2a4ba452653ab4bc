//! Pure text transforms used to lay out a prompt and the countdown label.

/// One display row: a slice of the kanji line and the kana slice at the same
/// position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptRow {
    pub text: String,
    pub kana: String,
}

/// Splits `s` into consecutive pieces of `width` characters, the last one
/// possibly shorter. Widths below 1 are treated as 1.
pub fn chunk(s: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let chars: Vec<char> = s.chars().collect();
    chars
        .chunks(width)
        .map(|piece| piece.iter().collect())
        .collect()
}

/// Pairs the chunks of `text` and `kana` row by row. The shorter side renders
/// as an empty string, and there is always at least one row.
pub fn rows(text: &str, kana: &str, width: usize) -> Vec<PromptRow> {
    let text_chunks = chunk(text, width);
    let kana_chunks = chunk(kana, width);
    let count = text_chunks.len().max(kana_chunks.len()).max(1);

    let mut text_iter = text_chunks.into_iter();
    let mut kana_iter = kana_chunks.into_iter();
    (0..count)
        .map(|_| PromptRow {
            text: text_iter.next().unwrap_or_default(),
            kana: kana_iter.next().unwrap_or_default(),
        })
        .collect()
}

/// Formats seconds as `HH:MM:SS`. Hours keep counting past 99 and widen the
/// field rather than wrapping.
pub fn format_hms(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
