pub(super) fn is_line_comment_start(bytes: &[u8], idx: usize) -> bool {
    match bytes.get(idx) {
        Some(b'-') => bytes.get(idx + 1) == Some(&b'-'),
        // ClickHouse also takes `# ` and `#!` as line comments
        Some(b'#') => matches!(bytes.get(idx + 1), Some(b' ' | b'!')),
        _ => false,
    }
}

pub(super) fn is_block_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'/') && bytes.get(idx + 1) == Some(&b'*')
}

pub(super) fn is_block_comment_end(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'*') && bytes.get(idx + 1) == Some(&b'/')
}

/// Quote characters that open a literal or identifier in ClickHouse SQL.
pub(super) fn closing_quote(b: u8) -> Option<u8> {
    match b {
        b'\'' | b'"' | b'`' => Some(b),
        _ => None,
    }
}

/// Heredoc opener (`$$` or `$tag$`) at `start`; returns the byte range of the tag.
pub(super) fn heredoc_tag(bytes: &[u8], start: usize) -> Option<(usize, usize)> {
    let tag_start = start + 1;
    let mut idx = tag_start;
    while let Some(&b) = bytes.get(idx) {
        if b == b'$' {
            return Some((tag_start, idx));
        }
        if !(b.is_ascii_alphanumeric() || b == b'_') {
            return None;
        }
        idx += 1;
    }
    None
}

pub(super) fn closes_heredoc(bytes: &[u8], idx: usize, tag: &[u8]) -> bool {
    let end = idx + 1 + tag.len();
    bytes.get(idx) == Some(&b'$')
        && bytes.get(idx + 1..end) == Some(tag)
        && bytes.get(end) == Some(&b'$')
}
