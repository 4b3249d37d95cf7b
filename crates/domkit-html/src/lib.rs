//! domkit-html - HTML5 parsing
//!
//! Parses markup into the domkit arena DOM, for whole documents and for
//! fragments (inner-markup writes).

mod parser;

pub use parser::{HtmlParser, ParseError};
