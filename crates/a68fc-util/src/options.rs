//! Compile-time options threaded explicitly through the pipeline.
//!
//! There are no globals: every phase that needs to know the stropping regime, whether
//! bracket equivalence is on, or how many errors to tolerate before giving up, takes a
//! `&CompileOptions` (or a clone of the relevant field) as an explicit argument.

/// Which spelling convention distinguishes reserved words from identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StroppingMode {
    /// Runs of uppercase letters/`_` are bold tags (e.g. `BEGIN`, `INT`); the common case.
    Upper,
    /// Bold tags are written `'upper'…'upper'`; lowercase runs are identifiers.
    Quote,
}

impl Default for StroppingMode {
    fn default() -> Self {
        StroppingMode::Upper
    }
}

/// Whether `[` `]` and `{` `}` are accepted as synonyms for `(` `)` in formats and slices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BracketEquivalence {
    /// `[/]` and `{/}` are accepted wherever `(/)` is.
    Allowed,
    /// Only `(/)` is accepted; `[/]`/`{/}` keep their slice/bounds-only meaning.
    Disallowed,
}

impl Default for BracketEquivalence {
    fn default() -> Self {
        BracketEquivalence::Allowed
    }
}

/// Options controlling a single compilation, passed explicitly rather than read from
/// thread-local or global state.
///
/// # Examples
///
/// ```
/// use a68fc_util::options::{CompileOptions, StroppingMode};
///
/// let opts = CompileOptions::default();
/// assert_eq!(opts.stropping, StroppingMode::Upper);
/// assert!(opts.bracket_equivalence.is_allowed());
/// assert!(opts.pragmats_enabled);
/// assert_eq!(opts.max_errors, Some(20));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CompileOptions {
    /// Stropping regime in force for the whole compilation.
    pub stropping: StroppingMode,
    /// Whether `[/]`/`{/}` are accepted as synonyms for `(/)`.
    pub bracket_equivalence: BracketEquivalence,
    /// Whether `PRAGMAT`/`PR` comments are scanned for option-setting content.
    pub pragmats_enabled: bool,
    /// Stop compilation once this many errors have been reported. `None` means unbounded.
    pub max_errors: Option<usize>,
}

impl CompileOptions {
    /// Construct options with the stated stropping mode and all other fields defaulted.
    pub fn with_stropping(stropping: StroppingMode) -> Self {
        Self {
            stropping,
            ..Self::default()
        }
    }
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            stropping: StroppingMode::Upper,
            bracket_equivalence: BracketEquivalence::Allowed,
            pragmats_enabled: true,
            max_errors: Some(20),
        }
    }
}

impl BracketEquivalence {
    /// True if `[/]`/`{/}` are accepted wherever `(/)` is.
    pub fn is_allowed(&self) -> bool {
        matches!(self, BracketEquivalence::Allowed)
    }
}

impl StroppingMode {
    /// True if this is the quote-stropping regime (`'upper'…'upper'` bold tags).
    pub fn is_quote(&self) -> bool {
        matches!(self, StroppingMode::Quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_match_spec_defaults() {
        let opts = CompileOptions::default();
        assert_eq!(opts.stropping, StroppingMode::Upper);
        assert_eq!(opts.bracket_equivalence, BracketEquivalence::Allowed);
        assert!(opts.pragmats_enabled);
        assert_eq!(opts.max_errors, Some(20));
    }

    #[test]
    fn with_stropping_overrides_only_that_field() {
        let opts = CompileOptions::with_stropping(StroppingMode::Quote);
        assert!(opts.stropping.is_quote());
        assert!(opts.bracket_equivalence.is_allowed());
        assert!(opts.pragmats_enabled);
    }

    #[test]
    fn bracket_equivalence_predicate() {
        assert!(BracketEquivalence::Allowed.is_allowed());
        assert!(!BracketEquivalence::Disallowed.is_allowed());
    }
}
