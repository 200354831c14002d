//! The tagged-attribute model shared by the scanner and the parser.
//!
//! `Attribute` is the single enumeration that tags both lexical tokens (produced here)
//! and the non-terminal nodes the reducer builds later — the same design the node/token
//! unification in the data model calls for. It lives in this crate, not in `a68fc-par`,
//! because the scanner has to stamp every token with one of these values before the
//! parser ever sees it; `a68fc-par` re-exports this type rather than defining its own.
//!
//! The full original attribute set runs into the hundreds of values (one per grammar
//! production). This is trimmed to the productions the reducer in this workspace
//! actually builds: every terminal the scanner emits, plus the non-terminals named in
//! the bottom-up reduction order.

use a68fc_util::Symbol;
use a68fc_util::span::Span;

/// Tag carried by every `Node`/`Token` — terminal (scanner-produced) or non-terminal
/// (reducer-produced).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Attribute {
    // --- end of stream / error ---
    Eof,
    ErrorSymbol,

    // --- brackets & frame delimiters ---
    OpenSymbol,
    CloseSymbol,
    SubSymbol,
    BusSymbol,
    BeginSymbol,
    EndSymbol,
    FormatDelimSymbol,
    FormatOpenSymbol,
    FormatCloseSymbol,

    // --- conditional / case / loop keywords ---
    IfSymbol,
    ThenSymbol,
    ElifSymbol,
    ElseSymbol,
    FiSymbol,
    CaseSymbol,
    InSymbol,
    OuseSymbol,
    OutSymbol,
    EsacSymbol,
    DoSymbol,
    AltDoSymbol,
    OdSymbol,
    UntilSymbol,
    ForSymbol,
    FromSymbol,
    BySymbol,
    ToSymbol,
    DownToSymbol,
    WhileSymbol,
    ParSymbol,
    GotoSymbol,
    ExitSymbol,

    // --- declaration-introducing keywords ---
    ModeSymbol,
    PrioSymbol,
    OpSymbol,
    ProcSymbol,
    RefSymbol,
    StructSymbol,
    UnionSymbol,
    LocSymbol,
    HeapSymbol,
    NewSymbol,
    FlexSymbol,
    LongSymbol,
    ShortSymbol,

    // --- miscellaneous reserved words ---
    SkipSymbol,
    NilSymbol,
    TrueSymbol,
    FalseSymbol,
    IsSymbol,
    IsntSymbol,
    AndSymbol,
    OrSymbol,
    AtSymbol,
    OfSymbol,

    // --- punctuation ---
    Semicolon,
    Comma,
    Colon,
    BecomesSymbol,
    EqualsSymbol,
    AltEqualsSymbol,
    FullStopSymbol,

    // --- denotations (terminal, carry `symbol`) ---
    IntDenotation,
    RealDenotation,
    BitsDenotation,
    StringDenotation,

    // --- tags (terminal, carry `symbol`; role is elaborated by the definition extractor) ---
    BoldTag,
    Identifier,
    Indicant,
    Operator,
    Label,

    // --- format-text single-letter items ---
    FormatItem,
    FormatInsertion,
    FormatReplication,

    // --- non-terminals built by the top-down framer ---
    ParticularProgram,
    ClosedClause,
    ConditionalClause,
    CaseClause,
    IntegerCaseClause,
    UnitedCaseClause,
    CollateralClause,
    EnclosedClause,
    SomeClause,
    LoopClause,
    ForPart,
    FromPart,
    ByPart,
    ToPart,
    WhilePart,
    DoPart,
    AltDoPart,
    /// The `UNTIL` part trailing a `DO` body inside `AltDoPart` — a non-terminal, not
    /// the `UntilSymbol` keyword leaf that introduces it.
    UntilPart,
    IfPart,
    ThenPart,
    ElifPart,
    ElsePart,
    CasePart,
    InPart,
    OusePart,
    OutPart,
    FormatText,

    // --- non-terminals built by the definition extractor ---
    DefiningIndicant,
    Qualifier,

    // --- non-terminals built by the declarer-scaffolding / declarer passes ---
    Longety,
    Shortety,
    Declarer,
    StructurePack,
    UnionPack,
    FormalDeclarers,
    ParameterPack,
    Specifier,
    OperatorPlan,

    // --- non-terminals from the primary/secondary/formula passes ---
    Denotation,
    Jump,
    Selector,
    Selection,
    Generator,
    Primary,
    Secondary,
    Tertiary,
    Cast,
    Specification,
    /// A `SPECIFICATION`'s parenthesized run — the `SomeClause` a call/slice's actual
    /// parameters framed as, retagged once it's recognized as an argument list rather
    /// than a plain parenthesized enclosed clause.
    GenericArgument,
    MonadicFormula,
    Formula,
    IdentityRelation,
    AndFunction,
    OrFunction,
    RoutineText,
    Assertion,
    Assignation,
    Nihil,
    Unit,

    // --- serial/enquiry/collateral plumbing ---
    DeclarationList,
    InitialiserSeries,
    LabeledUnit,
    SerialClause,
    EnquiryClause,

    // --- declarations ---
    /// Transient: `DECLARER`/`PROC` + defining identifier + `=`/`:=`, marked before the
    /// primary/secondary/formula ladder runs so the defining identifier isn't folded
    /// into `PRIMARY`/`TERTIARY` like a using occurrence. Consumed again once the
    /// initializer tokens that follow it have reduced to a `UNIT`; never survives to
    /// the final tree.
    DeclarationHead,
    IdentityDeclaration,
    VariableDeclaration,
    ProcedureDeclaration,
    ModeDeclaration,
    PriorityDeclaration,
    OperatorDeclaration,

    // --- recovery-synthesized / miscellaneous ---
    Recovered,
}

impl Attribute {
    /// True for attributes the scanner itself produces; false for attributes only the
    /// reducer (component G) builds.
    pub fn is_terminal(self) -> bool {
        use Attribute::*;
        matches!(
            self,
            Eof | ErrorSymbol
                | OpenSymbol
                | CloseSymbol
                | SubSymbol
                | BusSymbol
                | BeginSymbol
                | EndSymbol
                | FormatDelimSymbol
                | FormatOpenSymbol
                | FormatCloseSymbol
                | IfSymbol
                | ThenSymbol
                | ElifSymbol
                | ElseSymbol
                | FiSymbol
                | CaseSymbol
                | InSymbol
                | OuseSymbol
                | OutSymbol
                | EsacSymbol
                | DoSymbol
                | AltDoSymbol
                | OdSymbol
                | UntilSymbol
                | ForSymbol
                | FromSymbol
                | BySymbol
                | ToSymbol
                | DownToSymbol
                | WhileSymbol
                | ParSymbol
                | GotoSymbol
                | ExitSymbol
                | ModeSymbol
                | PrioSymbol
                | OpSymbol
                | ProcSymbol
                | RefSymbol
                | StructSymbol
                | UnionSymbol
                | LocSymbol
                | HeapSymbol
                | NewSymbol
                | FlexSymbol
                | LongSymbol
                | ShortSymbol
                | SkipSymbol
                | NilSymbol
                | TrueSymbol
                | FalseSymbol
                | IsSymbol
                | IsntSymbol
                | AndSymbol
                | OrSymbol
                | AtSymbol
                | OfSymbol
                | Semicolon
                | Comma
                | Colon
                | BecomesSymbol
                | EqualsSymbol
                | AltEqualsSymbol
                | FullStopSymbol
                | IntDenotation
                | RealDenotation
                | BitsDenotation
                | StringDenotation
                | BoldTag
                | Identifier
                | Indicant
                | Operator
                | Label
                | FormatItem
                | FormatInsertion
                | FormatReplication
        )
    }

    /// The priority a monadic operator occurrence is given before the definitions pass
    /// looks it up in the operator table.
    pub const MONADIC_PRIORITY: u8 = 10;

    /// Highest dyadic priority a `PRIO` declaration may assign.
    pub const MAX_PRIORITY: u8 = 9;
}

/// A single lexical item produced by the scanner: an attribute tag, the interned text
/// that produced it (absent for pure punctuation), its source span, and — for
/// `Operator` tokens only — the dyadic priority once the definitions pass has filled
/// it in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    pub attribute: Attribute,
    pub symbol: Option<Symbol>,
    pub span: Span,
    pub priority: Option<u8>,
}

impl Token {
    pub fn new(attribute: Attribute, symbol: Option<Symbol>, span: Span) -> Self {
        Self {
            attribute,
            symbol,
            span,
            priority: None,
        }
    }

    pub fn punct(attribute: Attribute, span: Span) -> Self {
        Self::new(attribute, None, span)
    }

    pub fn text(attribute: Attribute, symbol: Symbol, span: Span) -> Self {
        Self::new(attribute, Some(symbol), span)
    }

    pub fn is_eof(&self) -> bool {
        self.attribute == Attribute::Eof
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_classification() {
        assert!(Attribute::BeginSymbol.is_terminal());
        assert!(Attribute::Identifier.is_terminal());
        assert!(!Attribute::ClosedClause.is_terminal());
        assert!(!Attribute::Unit.is_terminal());
    }

    #[test]
    fn punct_token_has_no_symbol() {
        let tok = Token::punct(Attribute::Semicolon, Span::DUMMY);
        assert!(tok.symbol.is_none());
        assert_eq!(tok.priority, None);
    }

    #[test]
    fn text_token_carries_symbol() {
        let sym = Symbol::intern("x");
        let tok = Token::text(Attribute::Identifier, sym, Span::DUMMY);
        assert_eq!(tok.symbol, Some(sym));
    }
}
