mod parsers;

pub use parsers::{is_clash_document, parse_clash_yaml, ClashDocument, CLASH_SIGNATURE};
