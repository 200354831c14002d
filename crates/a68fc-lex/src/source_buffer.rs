//! Component A: source buffer — whole-file read, line splicing, prelude/postlude.
//!
//! Splices backslash-continued lines into their successor, strips a leading `#!`
//! line, and brackets the user text with a stropping-dependent prelude and postlude.
//! The scanner walks the resulting text through a [`crate::cursor::Cursor`]; this
//! module is only responsible for producing that text.

use a68fc_util::options::StroppingMode;

/// The prelude/postlude text bracketing the user's source, one line per `Vec` entry.
///
/// In a full implementation these would declare the standard-prelude modes and
/// operators; here they are minimal placeholders that still differ by stropping mode,
/// so that mode-dependent scanning is exercised even before a real prelude is linked
/// in.
fn prelude_lines(mode: StroppingMode) -> &'static [&'static str] {
    match mode {
        StroppingMode::Upper => &["BEGIN"],
        StroppingMode::Quote => &["'BEGIN'"],
    }
}

fn postlude_lines(mode: StroppingMode) -> &'static [&'static str] {
    match mode {
        StroppingMode::Upper => &["END"],
        StroppingMode::Quote => &["'END'"],
    }
}

/// Splice trailing-backslash line continuations, strip a leading `#!` line, normalize
/// `\r\n` to `\n`, and bracket the result with prelude/postlude lines for `mode`.
///
/// Returns the spliced buffer ready for scanning.
pub fn prepare_source(raw: &str, mode: StroppingMode) -> String {
    let normalized = raw.replace("\r\n", "\n");
    let mut lines: Vec<&str> = normalized.lines().collect();

    if let Some(first) = lines.first() {
        if first.starts_with("#!") {
            lines.remove(0);
        }
    }

    let mut spliced_lines: Vec<String> = Vec::with_capacity(lines.len());
    let mut pending = String::new();
    for line in lines {
        if let Some(stripped) = line.strip_suffix('\\') {
            pending.push_str(stripped);
        } else {
            pending.push_str(line);
            spliced_lines.push(std::mem::take(&mut pending));
        }
    }
    if !pending.is_empty() {
        spliced_lines.push(pending);
    }

    let mut out = String::new();
    for line in prelude_lines(mode) {
        out.push_str(line);
        out.push('\n');
    }
    for line in &spliced_lines {
        out.push_str(line);
        out.push('\n');
    }
    for line in postlude_lines(mode) {
        out.push_str(line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_shebang_line() {
        let out = prepare_source("#!/usr/bin/a68\nprint(1)\n", StroppingMode::Upper);
        assert!(!out.contains("#!/usr/bin"));
    }

    #[test]
    fn splices_backslash_continuation() {
        let out = prepare_source("print(\\\n1)\n", StroppingMode::Upper);
        assert!(out.contains("print(1)"));
    }

    #[test]
    fn brackets_with_stropping_dependent_prelude() {
        let upper = prepare_source("skip\n", StroppingMode::Upper);
        let quote = prepare_source("skip\n", StroppingMode::Quote);
        assert!(upper.starts_with("BEGIN"));
        assert!(quote.starts_with("'BEGIN'"));
    }
}
