/**
 * @file analyzer.rs
 * @author Nguyen Le Duy
 * @date 12/04/2025
 * @brief Offline stand-in for the compile service.
 *
 * The checks here are lexical heuristics only: delimiters inside strings,
 * character literals and comments are counted like any other. Its binary is
 * a placeholder that must never be flashed.
 */
use api_types::CompileResponse;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::future::{self, BoxFuture, FutureExt};

use crate::board::TargetFamily;
use crate::compile::{CompileError, Compiler, Sketch};
use crate::diagnostics::{Delimiter, Diagnostic, EntryPoint};

/// Lines starting with one of these never need a trailing semicolon.
const EXEMPT_KEYWORDS: &[&str] = &[
    "if",
    "else",
    "for",
    "while",
    "do",
    "switch",
    "case",
    "default",
    "void",
    "class",
    "struct",
    "enum",
    "union",
    "namespace",
    "template",
    "typedef",
    "public",
    "private",
    "protected",
];

pub struct MockCompiler;

impl Compiler for MockCompiler {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn compile(&self, sketch: Sketch) -> BoxFuture<'_, Result<CompileResponse, CompileError>> {
        future::ready(Ok(analyze(&sketch))).boxed()
    }

    fn is_online(&self) -> BoxFuture<'_, bool> {
        future::ready(true).boxed()
    }
}

/// Run every check over the sketch and fake a build when none of them fail.
pub fn analyze(sketch: &Sketch) -> CompileResponse {
    let mut output = vec![format!("Compiling sketch for {} (offline mock)...", sketch.fqbn)];

    if sketch.verbose {
        for lib in &sketch.libraries {
            output.push(format!("Using library {} (not installed in mock mode)", lib));
        }
        output.push("Checking delimiters...".to_string());
    }

    let mut diagnostics = check_delimiters(&sketch.code);

    if sketch.verbose {
        output.push("Checking entry points...".to_string());
    }
    diagnostics.extend(check_entry_points(&sketch.code));

    if sketch.verbose {
        output.push("Checking statements...".to_string());
    }
    diagnostics.extend(check_semicolons(&sketch.code));

    let (errors, warnings): (Vec<_>, Vec<_>) = diagnostics.iter().partition(|d| d.is_error());
    let errors: Vec<String> = errors.iter().map(|d| d.to_string()).collect();
    let warnings: Vec<String> = warnings.iter().map(|d| d.to_string()).collect();

    if !errors.is_empty() {
        output.push(format!("Compilation failed with {} error(s)", errors.len()));

        return CompileResponse {
            success: false,
            errors,
            warnings,
            output,
            ..Default::default()
        };
    }

    let family = TargetFamily::from_fqbn(&sketch.fqbn);
    let size = estimate_size(family, sketch.code.chars().count());
    let percent = (size as f64 / family.flash_size() as f64 * 100.0).round() as u64;

    output.push(format!(
        "Sketch uses {} bytes ({}%) of program storage space. Maximum is {} bytes.",
        size,
        percent,
        family.flash_size()
    ));
    output.push("Mock build: the binary is a placeholder and cannot be flashed".to_string());

    CompileResponse {
        success: true,
        binary: Some(placeholder_binary(&sketch.fqbn, size)),
        size: Some(size),
        errors: Vec::new(),
        warnings,
        output,
    }
}

/// Base size of the family plus 1.2 bytes per source character, rounded.
pub fn estimate_size(family: TargetFamily, code_len: usize) -> u64 {
    family.base_size() + (code_len as f64 * 1.2).round() as u64
}

fn placeholder_binary(fqbn: &str, size: u64) -> String {
    STANDARD.encode(format!("MOCK_BINARY:{}:{}", fqbn, size))
}

fn check_delimiters(code: &str) -> Vec<Diagnostic> {
    [Delimiter::Brace, Delimiter::Paren]
        .into_iter()
        .filter_map(|delimiter| {
            let (open, close) = delimiter.pair();
            let opened = code.chars().filter(|&c| c == open).count();
            let closed = code.chars().filter(|&c| c == close).count();

            (opened != closed).then_some(Diagnostic::Unbalanced {
                delimiter,
                opened,
                closed,
            })
        })
        .collect()
}

fn check_entry_points(code: &str) -> Vec<Diagnostic> {
    [EntryPoint::Setup, EntryPoint::Loop]
        .into_iter()
        .filter(|entry| {
            let name = entry.name();
            let tight = format!("void {}()", name);
            let spaced = format!("void {} ()", name);
            !code.contains(&tight) && !code.contains(&spaced)
        })
        .map(|entry| Diagnostic::MissingEntryPoint { entry })
        .collect()
}

fn check_semicolons(code: &str) -> Vec<Diagnostic> {
    code.lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            let line = line.trim();
            looks_unterminated(line).then(|| Diagnostic::MissingSemicolon {
                line: idx + 1,
                text: line.to_string(),
            })
        })
        .collect()
}

/// `line` must already be trimmed.
fn looks_unterminated(line: &str) -> bool {
    if line.chars().count() <= 3
        || is_skipped(line)
        || line.contains("//")
        || line.ends_with(')')
    {
        return false;
    }

    line.chars()
        .last()
        .is_some_and(|c| c.is_ascii_alphanumeric() || matches!(c, ']' | '"' | '\''))
}

fn is_skipped(line: &str) -> bool {
    line.is_empty()
        || line.starts_with("//")
        || line.starts_with("/*")
        || line.starts_with('*')
        || line.starts_with('#')
        || line.chars().all(|c| matches!(c, '{' | '}' | ';') || c.is_whitespace())
        || EXEMPT_KEYWORDS
            .iter()
            .any(|keyword| starts_with_keyword(line, keyword))
}

fn starts_with_keyword(line: &str, keyword: &str) -> bool {
    line.strip_prefix(keyword).is_some_and(|rest| {
        !rest
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}
