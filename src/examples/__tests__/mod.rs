use crate::examples::{date_grammar, postal_address_grammar};
use crate::{Validator, ValidatorOptions};

#[test]
pub fn postal_address_test() {
    let grammar = postal_address_grammar();
    let validator = Validator::new(&grammar, ValidatorOptions::default());

    let address = "J. Doe IX\r\n1234 Main St.\r\nAnytown, CA 90210\r\n";
    match validator.validate(address) {
        Ok(tree) => {
            tree.print().unwrap();
            assert_eq!(tree.matched, address);
            assert_eq!(tree.rule_name(), Some("postal-address"));
            assert_eq!(tree.find_rule("state").unwrap().matched, "CA");
            assert_eq!(tree.find_rule("zip-code").unwrap().matched, "90210");
        }
        Err(err) => {
            panic!("{}", err);
        }
    }

    validator
        .validate("J. Doe IX\r\n1234 Main St.\r\nAnytown, XYZ 90210\r\n")
        .expect_err("A three letter state code should fail to validate.");
}

#[test]
pub fn name_part_entry_test() {
    let grammar = postal_address_grammar();
    let validator = Validator::new(&grammar, ValidatorOptions::default());

    let tree = validator.validate_entry("J. Doe IX\r\n", "name-part").unwrap();
    assert_eq!(tree.rule_name(), Some("name-part"));
    assert_eq!(tree.find_rule("suffix").map(|t| t.matched.as_str()), Some("IX"));

    validator
        .validate_entry("J. Doe 9X\r\n", "name-part")
        .expect_err("A digit can start neither a last name nor a suffix.");
}

#[test]
pub fn date_test() {
    let grammar = date_grammar();
    let validator = Validator::new(&grammar, ValidatorOptions::default());

    let tree = validator.validate("2023-04-01").unwrap();
    assert_eq!(tree.rule_name(), Some("full-date"));
    assert_eq!(tree.find_rule("date-fullyear").unwrap().matched, "2023");
    assert_eq!(tree.find_rule("date-month").unwrap().matched, "04");
    assert_eq!(tree.find_rule("date-mday").unwrap().matched, "01");

    validator
        .validate("2023-4-01")
        .expect_err("A single digit month should fail to validate.");
}
