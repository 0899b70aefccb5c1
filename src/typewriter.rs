// Typewriter animation: text revealed one character at a time.

use std::io::Write;
use std::time::Duration;

/// Successive prefixes of `text`, from empty to complete, split on char boundaries.
pub fn frames(text: &str) -> impl Iterator<Item = &str> + '_ {
    std::iter::once(0)
        .chain(text.char_indices().map(|(i, c)| i + c.len_utf8()))
        .map(move |end| &text[..end])
}

/// Writes `text` to `out` one character per `interval`, then a newline.
pub async fn play<W: Write>(text: &str, interval: Duration, out: &mut W) -> std::io::Result<()> {
    let mut shown = 0;
    // The first frame is empty; each later one adds a single character.
    for frame in frames(text).skip(1) {
        out.write_all(frame[shown..].as_bytes())?;
        out.flush()?;
        shown = frame.len();
        if !interval.is_zero() {
            tokio::time::sleep(interval).await;
        }
    }
    writeln!(out)?;
    out.flush()
}
