use crate::{Grammar, GrammarParser, ParserOptions};

/// The `number` grammar from RFC 8259 §6, the JSON number syntax.
pub fn json_number_grammar() -> Grammar {
    let text = concat!(
        "number        = [ minus ] int [ frac ] [ exp ]\r\n",
        "decimal-point = %x2E\r\n",
        "digit1-9      = %x31-39\r\n",
        "e             = %x65 / %x45\r\n",
        "exp           = e [ minus / plus ] 1*DIGIT\r\n",
        "frac          = decimal-point 1*DIGIT\r\n",
        "int           = zero / ( digit1-9 *DIGIT )\r\n",
        "minus         = %x2D\r\n",
        "plus          = %x2B\r\n",
        "zero          = %x30\r\n",
    );
    GrammarParser::new(ParserOptions::default())
        .parse(text)
        .unwrap()
}
