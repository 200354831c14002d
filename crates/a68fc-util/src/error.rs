//! Core error types shared by every front-end crate.
//!
//! Per-concern `thiserror` enums for the foundation types (symbols, source map, index
//! vectors, diagnostics) plus the phase-level `LexError`/`ParseError`/`FatalPhaseError`
//! family that stands in for the original's non-local-jump error protocol.

use thiserror::Error;

/// Error type for symbol interning operations
#[derive(Debug, Error)]
pub enum SymbolError {
    /// Failed to intern a symbol
    #[error("Failed to intern symbol: {0}")]
    InternFailed(String),

    /// Symbol not found in the interner
    #[error("Symbol not found: index {index}")]
    NotFound { index: u32 },
}

/// Error type for source map operations
#[derive(Debug, Error)]
pub enum SourceMapError {
    /// File not found in the source map
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Invalid span range
    #[error("Invalid span: start {start} > end {end}")]
    InvalidSpan { start: usize, end: usize },

    /// Span out of bounds for file
    #[error("Span out of bounds: file has {file_len} bytes, span is {span_start}..{span_end}")]
    SpanOutOfBounds {
        file_len: usize,
        span_start: usize,
        span_end: usize,
    },

    /// Invalid line number
    #[error("Invalid line number: {line} (file has {max_lines} lines)")]
    InvalidLineNumber { line: usize, max_lines: usize },

    /// Failed to extract source snippet
    #[error("Failed to extract source: {0}")]
    ExtractFailed(String),
}

/// Error type for index vector operations
#[derive(Debug, Error)]
pub enum IndexVecError {
    /// Index out of bounds
    #[error("Index out of bounds: index {index}, length {length}")]
    OutOfBounds { index: usize, length: usize },

    /// Invalid index
    #[error("Invalid index: {0}")]
    InvalidIndex(String),
}

/// Error type for diagnostic operations
#[derive(Debug, Error)]
pub enum DiagnosticError {
    /// Failed to format diagnostic
    #[error("Failed to format diagnostic: {0}")]
    FormatFailed(String),

    /// Invalid diagnostic code
    #[error("Invalid diagnostic code: {0}")]
    InvalidCode(String),
}

/// Result type alias for symbol operations
pub type SymbolResult<T> = std::result::Result<T, SymbolError>;

/// Result type alias for source map operations
pub type SourceMapResult<T> = std::result::Result<T, SourceMapError>;

/// Result type alias for index vector operations
pub type IndexVecResult<T> = std::result::Result<T, IndexVecError>;

/// Result type alias for diagnostic operations
pub type DiagnosticResult<T> = std::result::Result<T, DiagnosticError>;

/// Fatal errors raised by the scanner (component B).
///
/// These abort the scan phase outright rather than accumulating as ordinary
/// diagnostics — an unterminated string or comment leaves the cursor with no sane
/// place to resume.
#[derive(Debug, Error)]
pub enum LexError {
    /// A string denotation was never closed before end of line/file.
    #[error("unterminated string literal starting at offset {start}")]
    UnterminatedString { start: usize },

    /// A `#…#`/`CO…CO`/`COMMENT…COMMENT` comment was never closed.
    #[error("unterminated comment starting at offset {start}")]
    UnterminatedComment { start: usize },

    /// A format text's `$…$` delimiters were not balanced.
    #[error("unterminated format text starting at offset {start}")]
    UnterminatedFormat { start: usize },

    /// A `PREPROCESSOR`/`NOPREPROCESSOR` pragmat named a file that could not be read.
    #[error("could not read include file {path:?}: {source}")]
    IncludeReadFailed {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The error cap (`CompileOptions::max_errors`) was exceeded mid-scan.
    #[error("error limit reached during scanning")]
    ErrorLimitReached,
}

/// Fatal errors raised by the parenthesis checker, framer, reducer, or fixup passes
/// (components D through I).
#[derive(Debug, Error)]
pub enum ParseError {
    /// A closing bracket does not match the innermost open bracket, or end of file was
    /// reached with brackets still open.
    #[error("bracket mismatch: {0}")]
    BracketMismatch(String),

    /// A clause could not be framed into any recognized bracketed form.
    #[error("could not frame clause: {0}")]
    UnframableClause(String),

    /// The error cap (`CompileOptions::max_errors`) was exceeded mid-parse.
    #[error("error limit reached during parsing")]
    ErrorLimitReached,
}

/// The error type returned by each phase driver, standing in for the non-local jump
/// the original implementation used to abandon a phase.
///
/// A phase driver returns `Result<T, FatalPhaseError>`; `?` propagation plays the role of
/// the jump buffer. The pipeline catches this at the phase boundary, emits whatever
/// diagnostics have accumulated, and decides whether to continue to the next phase.
#[derive(Debug, Error)]
pub enum FatalPhaseError {
    /// Fatal error from the scanner.
    #[error(transparent)]
    Lex(#[from] LexError),

    /// Fatal error from a later phase.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Too many diagnostics accumulated; the pipeline should stop.
    #[error("error limit reached ({count} errors)")]
    ErrorLimitReached { count: usize },
}
