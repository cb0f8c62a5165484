//! Speaker name parsing
//!
//! Transcript speaker lines look like `Prof. Ing. Jan Novák, CSc.`: titles
//! before the name carry a dot, titles after it follow a comma.

/// A speaker name with its titles separated out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    /// The name without any titles
    pub clean_name: String,

    /// Titles before the name, then titles after it
    pub titles: Vec<String>,
}

/// Splits titles from a speaker name
///
/// `ml.` and `st.` (junior, senior) are part of the name, so they are
/// spelled out before any dot-based splitting.
///
/// # Example
///
/// ```
/// use steno_harvest::text::parse_titles;
///
/// let parsed = parse_titles("Ing. Jan Novák, CSc.");
/// assert_eq!(parsed.clean_name, "Jan Novák");
/// assert_eq!(parsed.titles, vec!["Ing.", "CSc."]);
/// ```
pub fn parse_titles(name: &str) -> ParsedName {
    let expanded = name.replace("ml.", "mladší").replace("st.", "starší");

    let (head, after) = match expanded.split_once(',') {
        Some((head, rest)) => {
            let rest = rest.split(',').collect::<Vec<_>>().join(" ");
            let after: Vec<String> = rest
                .trim()
                .split(' ')
                .filter(|t| !t.is_empty())
                .map(|t| t.trim().to_string())
                .collect();
            (head, after)
        }
        None => (expanded.as_str(), Vec::new()),
    };

    let mut titles: Vec<String> = head
        .split(' ')
        .filter(|t| t.contains('.'))
        .map(str::to_string)
        .collect();
    titles.extend(after);

    let clean_name = head.rsplit('.').next().unwrap_or(head).trim().to_string();

    ParsedName { clean_name, titles }
}
