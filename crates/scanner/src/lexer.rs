//! Comment stripping and literal-aware brace counting
//!
//! The scanner never builds a syntax tree. Instead every line is run through a
//! small lexer that drops comments, keeps string and character literals intact
//! and counts the braces that are actually code. Block comments carry their
//! state from one line to the next through [`LexState`].

/// Lexical state carried across line boundaries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LexState {
    in_block_comment: bool,
}

/// One source line with comments removed and its code braces counted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeLine {
    /// Line text without comments; literals are kept verbatim
    pub code: String,
    pub opens: usize,
    pub closes: usize,
    /// Code braces with their byte offset into `code`, in order
    pub braces: Vec<(usize, char)>,
}

impl CodeLine {
    /// Net brace change over the line
    pub fn delta(&self) -> i64 {
        self.opens as i64 - self.closes as i64
    }

    /// True when nothing but whitespace remains after stripping comments
    pub fn is_blank(&self) -> bool {
        self.code.trim().is_empty()
    }

    pub fn trimmed(&self) -> &str {
        self.code.trim()
    }
}

/// Lexes a single line, updating the cross-line state
pub fn scan_line(line: &str, state: &mut LexState) -> CodeLine {
    let chars: Vec<char> = line.chars().collect();
    let mut out = CodeLine::default();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        if state.in_block_comment {
            if c == '*' && next == Some('/') {
                state.in_block_comment = false;
                i += 2;
            } else {
                i += 1;
            }
            continue;
        }

        match c {
            '/' if next == Some('/') => break,
            '/' if next == Some('*') => {
                // Keep neighbouring tokens apart: `int/*x*/a` must not become `inta`
                if out.code.chars().last().is_some_and(|p| !p.is_whitespace()) {
                    out.code.push(' ');
                }
                state.in_block_comment = true;
                i += 2;
            }
            '\'' if i > 0 && chars[i - 1].is_ascii_alphanumeric() => {
                // Digit separator, e.g. 1'000'000
                out.code.push(c);
                i += 1;
            }
            '"' | '\'' => {
                out.code.push(c);
                i += 1;
                while i < chars.len() {
                    let d = chars[i];
                    out.code.push(d);
                    i += 1;
                    if d == '\\' {
                        if let Some(&escaped) = chars.get(i) {
                            out.code.push(escaped);
                            i += 1;
                        }
                        continue;
                    }
                    if d == c {
                        break;
                    }
                }
            }
            '{' => {
                out.opens += 1;
                out.braces.push((out.code.len(), c));
                out.code.push(c);
                i += 1;
            }
            '}' => {
                out.closes += 1;
                out.braces.push((out.code.len(), c));
                out.code.push(c);
                i += 1;
            }
            _ => {
                out.code.push(c);
                i += 1;
            }
        }
    }

    out
}

/// Lexes every line of a file in order
pub fn code_lines<S: AsRef<str>>(lines: &[S]) -> Vec<CodeLine> {
    let mut state = LexState::default();
    lines
        .iter()
        .map(|line| scan_line(line.as_ref(), &mut state))
        .collect()
}

/// Removes `//` and `/* */` comments from text
///
/// Newlines that fall inside a block comment are removed along with it, so
/// line numbers of the result do not match the input. Use
/// [`strip_comments_preserving_lines`] when they must.
pub fn strip_comments(text: &str) -> String {
    strip(text, false)
}

/// Removes comments but keeps every newline of the input
pub fn strip_comments_preserving_lines(text: &str) -> String {
    strip(text, true)
}

fn strip(text: &str, keep_newlines: bool) -> String {
    let mut state = LexState::default();
    let mut out = String::with_capacity(text.len());
    for segment in text.split_inclusive('\n') {
        let (body, newline) = match segment.strip_suffix('\n') {
            Some(body) => (body, true),
            None => (segment, false),
        };
        let (body, cr) = match body.strip_suffix('\r') {
            Some(body) => (body, "\r"),
            None => (body, ""),
        };
        let line = scan_line(body, &mut state);
        out.push_str(&line.code);
        if newline && (keep_newlines || !state.in_block_comment) {
            out.push_str(cr);
            out.push('\n');
        }
    }
    out
}

/// Prefix rule for lines that are comments as a whole
///
/// Lines opening with `//`, `/*` or a `*` continuation count as comments.
pub fn is_comment_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("//") || trimmed.starts_with("/*") || trimmed.starts_with('*')
}
