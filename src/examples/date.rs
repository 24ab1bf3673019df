use crate::{Element, Grammar, Rule};

/// The `full-date` grammar from RFC 3339, assembled with the checked element
/// constructors instead of being parsed from text.
pub fn date_grammar() -> Grammar {
    let two_digits = || {
        Element::repetition(Element::rule_ref("DIGIT").unwrap(), 2, Some(2)).unwrap()
    };
    let dash = || Element::literal("-", false).unwrap();

    let full_date = Rule::new(
        "full-date",
        Element::concatenation(vec![
            Element::rule_ref("date-fullyear").unwrap(),
            dash(),
            Element::rule_ref("date-month").unwrap(),
            dash(),
            Element::rule_ref("date-mday").unwrap(),
        ])
        .unwrap(),
    )
    .unwrap();
    let full_year = Rule::new(
        "date-fullyear",
        Element::repetition(Element::rule_ref("DIGIT").unwrap(), 4, Some(4)).unwrap(),
    )
    .unwrap();
    let month = Rule::new("date-month", two_digits()).unwrap();
    let mday = Rule::new("date-mday", two_digits()).unwrap();

    Grammar::from_rules(vec![full_date, full_year, month, mday]).unwrap()
}
