//! Edge-case tests for the scanner, exercised end to end through `Lexer::tokenize_all`.
