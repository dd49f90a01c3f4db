//! Text sink used by every emitter.
//!
//! Templates reference variables as `$name$`; `$$` prints a literal dollar
//! sign. Indentation is applied at the start of every non-empty line, so a
//! template can be written flush left and printed at any nesting depth.

use super::objc_gen::variables::VariableMap;
use thiserror::Error;

const INDENT_WIDTH: usize = 2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PrinterError {
    #[error("template references unknown variable '{0}'")]
    UnknownVariable(String),

    #[error("unterminated variable in template: {0:?}")]
    UnterminatedVariable(String),

    #[error("outdent without matching indent")]
    UnbalancedOutdent,
}

#[derive(Debug)]
pub struct Printer {
    output: String,
    indent: usize,
    at_line_start: bool,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

impl Printer {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            indent: 0,
            at_line_start: true,
        }
    }

    /// Print `template`, substituting `$key$` from `vars`.
    pub fn print(&mut self, vars: &VariableMap, template: &str) -> Result<(), PrinterError> {
        let mut rest = template;
        while let Some(start) = rest.find('$') {
            self.write_text(&rest[..start]);
            let after = &rest[start + 1..];
            let Some(end) = after.find('$') else {
                return Err(PrinterError::UnterminatedVariable(template.to_string()));
            };
            let key = &after[..end];
            if key.is_empty() {
                self.write_text("$");
            } else {
                let value = vars
                    .lookup(key)
                    .ok_or_else(|| PrinterError::UnknownVariable(key.to_string()))?;
                self.write_text(value);
            }
            rest = &after[end + 1..];
        }
        self.write_text(rest);
        Ok(())
    }

    /// Print text verbatim (still indented).
    pub fn print_raw(&mut self, text: &str) {
        self.write_text(text);
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn outdent(&mut self) -> Result<(), PrinterError> {
        if self.indent == 0 {
            return Err(PrinterError::UnbalancedOutdent);
        }
        self.indent -= 1;
        Ok(())
    }

    /// Run `body` one indentation level deeper.
    pub fn with_indent<T, E>(
        &mut self,
        body: impl FnOnce(&mut Self) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<PrinterError>,
    {
        self.indent();
        let result = body(self);
        self.outdent()?;
        result
    }

    pub fn as_str(&self) -> &str {
        &self.output
    }

    pub fn into_string(self) -> String {
        self.output
    }

    fn write_text(&mut self, text: &str) {
        for piece in text.split_inclusive('\n') {
            if self.at_line_start && piece != "\n" {
                self.output
                    .extend(std::iter::repeat_n(' ', self.indent * INDENT_WIDTH));
            }
            self.output.push_str(piece);
            self.at_line_start = piece.ends_with('\n');
        }
    }
}
