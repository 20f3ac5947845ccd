//! Indentation-aware line builder for generated C++

/// Accumulates generated lines at a moving indentation level
///
/// Blank lines are always emitted empty, never as trailing whitespace.
#[derive(Debug, Clone)]
pub struct CodeWriter {
    unit: String,
    level: usize,
    lines: Vec<String>,
}

impl CodeWriter {
    pub fn new(unit: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            level: 0,
            lines: Vec::new(),
        }
    }

    /// Writes one line at the current level
    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        let text = text.as_ref();
        if text.trim().is_empty() {
            self.lines.push(String::new());
        } else {
            self.lines.push(format!("{}{text}", self.unit.repeat(self.level)));
        }
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(String::new());
        self
    }

    pub fn indent(&mut self) -> &mut Self {
        self.level += 1;
        self
    }

    pub fn dedent(&mut self) -> &mut Self {
        self.level = self.level.saturating_sub(1);
        self
    }

    /// Writes `header` and indents what follows
    pub fn open(&mut self, header: impl AsRef<str>) -> &mut Self {
        self.line(header).indent()
    }

    /// Dedents and writes `closer`
    pub fn close(&mut self, closer: impl AsRef<str>) -> &mut Self {
        self.dedent().line(closer)
    }

    /// Writes a `{ ... }` block whose body is produced by `body`
    pub fn block<F>(&mut self, header: impl AsRef<str>, body: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        self.open(format!("{} {{", header.as_ref()));
        body(self);
        self.close("}")
    }

    /// Appends already generated lines, re-indented to the current level
    pub fn extend<I, S>(&mut self, lines: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.line(line);
        }
        self
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn finish(self) -> Vec<String> {
        self.lines
    }

    /// Joins the lines with `\n`, without a trailing newline
    pub fn render(self) -> String {
        self.lines.join("\n")
    }
}

/// Prefixes every non-blank line with `indent`
pub fn indent_lines<S: AsRef<str>>(lines: &[S], indent: &str) -> Vec<String> {
    lines
        .iter()
        .map(|line| {
            let line = line.as_ref();
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{indent}{line}")
            }
        })
        .collect()
}
