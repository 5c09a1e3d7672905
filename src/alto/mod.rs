//! ALTO 4 page files: data model and parser.

mod page;
mod parser;

pub use page::{BoundingBox, Page, TextBlock, TextLine};
pub use parser::{parse_page, parse_page_file};
