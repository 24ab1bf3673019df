//! Ready-made grammars demonstrating the two ways of constructing a [Grammar](crate::Grammar):
//! parsing RFC 5234 text ([postal_address_grammar], [json_number_grammar]) and assembling
//! rules programmatically with the checked constructors ([date_grammar]).

mod date;
mod json_number;
mod postal_address;

#[cfg(test)]
mod __tests__;

pub use date::date_grammar;
pub use json_number::json_number_grammar;
pub use postal_address::postal_address_grammar;
