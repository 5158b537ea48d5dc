use super::parsers::{
    closes_heredoc, closing_quote, heredoc_tag, is_block_comment_end, is_block_comment_start,
    is_line_comment_start,
};

#[derive(Clone, Copy)]
enum State {
    Normal,
    Quoted(u8),
    LineComment,
    BlockComment(u32),
    /// Inside `$tag$ … $tag$`; holds the tag's byte range.
    Heredoc(usize, usize),
}

/// Byte offsets of every `?` placeholder outside literals, quoted identifiers, heredocs and
/// comments.
pub(super) fn placeholder_offsets(sql: &str) -> Vec<usize> {
    let bytes = sql.as_bytes();
    let mut offsets = Vec::new();
    let mut state = State::Normal;
    let mut idx = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => {
                if b == b'?' {
                    offsets.push(idx);
                } else if let Some(quote) = closing_quote(b) {
                    state = State::Quoted(quote);
                } else if is_line_comment_start(bytes, idx) {
                    state = State::LineComment;
                    idx += 1;
                } else if is_block_comment_start(bytes, idx) {
                    state = State::BlockComment(1);
                    idx += 1;
                } else if b == b'$'
                    && let Some((tag_start, tag_end)) = heredoc_tag(bytes, idx)
                {
                    state = State::Heredoc(tag_start, tag_end);
                    idx = tag_end;
                }
            }
            State::Quoted(quote) => {
                if b == b'\\' {
                    idx += 1; // backslash escapes the next byte
                } else if b == quote {
                    if bytes.get(idx + 1) == Some(&quote) {
                        idx += 1; // doubled quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment(depth) => {
                if is_block_comment_start(bytes, idx) {
                    state = State::BlockComment(depth + 1);
                    idx += 1;
                } else if is_block_comment_end(bytes, idx) {
                    state = if depth == 1 {
                        State::Normal
                    } else {
                        State::BlockComment(depth - 1)
                    };
                    idx += 1;
                }
            }
            State::Heredoc(tag_start, tag_end) => {
                if closes_heredoc(bytes, idx, &bytes[tag_start..tag_end]) {
                    state = State::Normal;
                    idx += 1 + (tag_end - tag_start);
                }
            }
        }
        idx += 1;
    }

    offsets
}
