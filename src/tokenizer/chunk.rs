//! Splitting large inputs into independently scannable chunks.
//!
//! A chunk always ends right after a `}` that closes a top-level block (or
//! a stray top-level `}`), so scanning the chunks one after another yields
//! the same tokens as scanning the whole input. Comments, strings and
//! escapes are skipped with the same rules the scanner uses.

/// Default upper bound for a chunk before a split point is searched.
pub const CHUNK_SIZE: usize = 128 * 1024;

/// Split `source` into `(offset, chunk)` pairs of roughly `max_len` bytes.
pub fn split(source: &str, max_len: usize) -> Vec<(usize, &str)> {
    if source.len() <= max_len {
        return vec![(0, source)];
    }

    let bytes = source.as_bytes();
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = match memchr::memmem::find(&bytes[i + 2..], b"*/") {
                    Some(end) => i + 2 + end + 2,
                    None => bytes.len(),
                };
                continue;
            }
            quote @ (b'"' | b'\'') => {
                i = skip_string(bytes, i + 1, quote);
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 && i + 1 - start >= max_len {
                    chunks.push((start, &source[start..i + 1]));
                    start = i + 1;
                }
            }
            _ => {}
        }
        i += 1;
    }

    if start < bytes.len() {
        chunks.push((start, &source[start..]));
    }

    chunks
}

/// Index just past the closing quote, or of the newline ending a bad string.
fn skip_string(bytes: &[u8], mut i: usize, quote: u8) -> usize {
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => return i,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_input_is_one_chunk() {
        assert_eq!(split("a{color:red}", 1024), vec![(0, "a{color:red}")]);
    }

    #[test]
    fn test_split_only_at_top_level_braces() {
        let css = "@media print{a{color:red}}b{top:0}c{top:1}";
        let chunks = split(css, 4);
        assert_eq!(
            chunks,
            vec![
                (0, "@media print{a{color:red}}"),
                (26, "b{top:0}"),
                (34, "c{top:1}"),
            ]
        );
    }

    #[test]
    fn test_braces_in_strings_and_comments_do_not_split() {
        let css = "a{content:\"}\"}/* } */b{top:0}";
        let chunks = split(css, 1);
        assert_eq!(chunks[0], (0, "a{content:\"}\"}"));
        assert_eq!(chunks[1], (15, "/* } */b{top:0}"));
    }
}
