//! Text helpers for harvested speeches
//!
//! - Speaker names: split academic and honorific titles from the name
//! - Speech text: split into words

mod titles;
mod words;

pub use titles::{parse_titles, ParsedName};
pub use words::split_words;
