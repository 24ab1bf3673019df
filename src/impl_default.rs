use crate::{Encoding, GrammarParser, ParserOptions, ValidatorOptions};

impl Default for Encoding {
    fn default() -> Self {
        Encoding::Ascii
    }
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            allow_unix_newlines: true,
            allow_omitting_final_newline: true,
            encoding: Encoding::default(),
        }
    }
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            allow_unix_newlines: true,
            encoding: Encoding::default(),
        }
    }
}

impl Default for GrammarParser {
    fn default() -> Self {
        GrammarParser::new(ParserOptions::default())
    }
}
