//! Splits result lines into ordered message chunks.

/// Lines per delivered chunk.
pub const RESULT_CHUNK_LINES: usize = 60;

/// Groups `lines` into newline-joined chunks of at most `chunk_size` lines, preserving order.
pub fn chunk_result_lines(lines: &[String], chunk_size: usize) -> Vec<String> {
    lines
        .chunks(chunk_size.max(1))
        .map(|chunk| chunk.join("\n"))
        .collect()
}
