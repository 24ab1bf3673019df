use crate::{Grammar, GrammarParser, ParserOptions};

/// The postal address grammar from RFC 5234 §3.2, including the incremental
/// `name-part =/` alternative.
pub fn postal_address_grammar() -> Grammar {
    let text = concat!(
        "postal-address = name-part street zip-part\r\n",
        "name-part      = *(personal-part SP) last-name [SP suffix] CRLF\r\n",
        "name-part      =/ personal-part CRLF\r\n",
        "personal-part  = first-name / (initial \".\")\r\n",
        "first-name     = *ALPHA\r\n",
        "initial        = ALPHA\r\n",
        "last-name      = *ALPHA\r\n",
        "suffix         = (\"Jr.\" / \"Sr.\" / 1*(\"I\" / \"V\" / \"X\"))\r\n",
        "street         = [apt SP] house-num SP street-name CRLF\r\n",
        "apt            = 1*4DIGIT\r\n",
        "house-num      = 1*8(DIGIT / ALPHA)\r\n",
        "street-name    = 1*VCHAR\r\n",
        "zip-part       = town-name \",\" SP state 1*2SP zip-code CRLF\r\n",
        "town-name      = 1*(ALPHA / SP)\r\n",
        "state          = 2ALPHA\r\n",
        "zip-code       = 5DIGIT [\"-\" 4DIGIT]\r\n",
    );
    GrammarParser::new(ParserOptions::default())
        .parse(text)
        .unwrap()
}
