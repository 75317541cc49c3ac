/**
 * @file diagnostics.rs
 * @author Nguyen Le Duy
 * @date 12/04/2025
 * @brief Source diagnostics reported by the mock analyzer.
 */
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delimiter {
    Brace,
    Paren,
}

impl Delimiter {
    pub fn pair(self) -> (char, char) {
        match self {
            Delimiter::Brace => ('{', '}'),
            Delimiter::Paren => ('(', ')'),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Delimiter::Brace => "braces",
            Delimiter::Paren => "parentheses",
        }
    }
}

impl std::fmt::Display for Delimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryPoint {
    Setup,
    Loop,
}

impl EntryPoint {
    pub fn name(self) -> &'static str {
        match self {
            EntryPoint::Setup => "setup",
            EntryPoint::Loop => "loop",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error(
        "Mismatched {delimiter}: expected every '{open}' to be closed by '{close}', found {opened} '{open}' and {closed} '{close}'",
        open = .delimiter.pair().0,
        close = .delimiter.pair().1
    )]
    Unbalanced {
        delimiter: Delimiter,
        opened: usize,
        closed: usize,
    },

    #[error("Missing required function: void {}()", .entry.name())]
    MissingEntryPoint { entry: EntryPoint },

    #[error("Line {line}: possible missing semicolon: {text}")]
    MissingSemicolon { line: usize, text: String },
}

impl Diagnostic {
    /// Errors stop the build, everything else is advisory.
    pub fn is_error(&self) -> bool {
        !matches!(self, Diagnostic::MissingSemicolon { .. })
    }
}
