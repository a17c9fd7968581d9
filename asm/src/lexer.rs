//! Line-by-line classification of `.tk` source: strip comments, then tell
//! a section directive from a label definition from a code/data item.

use crate::error::AssembleError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    Code,
    Data,
}

#[derive(Debug)]
pub enum Line<'a> {
    Blank,
    Section(Section),
    LabelDef(&'a str),
    Item(&'a str),
}

/// Drops a trailing `;` comment, then trims trailing whitespace. Leading
/// whitespace is left alone: it is what tells a label definition (column
/// zero) apart from a code/data item (tab-indented).
pub fn strip_comment_and_trim(line: &str) -> &str {
    let without_comment = match line.find(';') {
        Some(idx) => &line[..idx],
        None => line,
    };
    without_comment.trim_end()
}

fn parse_label_def(line: &str) -> Result<&str, AssembleError> {
    let rest = &line[1..];
    let mut chars = rest.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '.' => {}
        _ => return Err(AssembleError::MalformedLabel(line.to_owned())),
    }
    if !rest.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.') {
        return Err(AssembleError::MalformedLabel(line.to_owned()));
    }
    Ok(rest)
}

/// Classifies one already comment-stripped, trailing-trimmed line.
///
/// Section directives match by *prefix* (`.code`/`.data`, not exact
/// equality) and label definitions (`:name`/`@name`, interchangeable
/// sigils) must consume the entire remainder of the line — any trailing
/// garbage after the identifier is a hard error, not silently ignored.
pub fn classify(line: &str) -> Result<Line<'_>, AssembleError> {
    if line.is_empty() {
        return Ok(Line::Blank);
    }
    if line.starts_with(".code") {
        return Ok(Line::Section(Section::Code));
    }
    if line.starts_with(".data") {
        return Ok(Line::Section(Section::Data));
    }
    if line.starts_with(':') || line.starts_with('@') {
        return Ok(Line::LabelDef(parse_label_def(line)?));
    }
    if let Some(rest) = line.strip_prefix('\t') {
        return Ok(Line::Item(rest.trim_start()));
    }
    Err(AssembleError::SyntaxError(line.to_owned()))
}

/// Splits an item's text on runs of whitespace and/or commas, the same
/// tokenization a code or data line gets before any per-mnemonic parsing.
pub fn split_words(s: &str) -> Vec<&str> {
    s.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .collect()
}

pub fn count_commas(s: &str) -> usize {
    s.chars().filter(|&c| c == ',').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_is_stripped_before_classification() {
        assert_eq!(strip_comment_and_trim("\thalt ; stop here"), "\thalt");
    }

    #[test]
    fn section_directives_match_by_prefix() {
        assert!(matches!(classify(".code").unwrap(), Line::Section(Section::Code)));
        assert!(matches!(classify(".dataSegment").unwrap(), Line::Section(Section::Data)));
    }

    #[test]
    fn label_definition_rejects_trailing_garbage() {
        assert!(classify(":loop!").is_err());
        assert!(matches!(classify(":loop").unwrap(), Line::LabelDef("loop")));
        assert!(matches!(classify("@loop").unwrap(), Line::LabelDef("loop")));
    }

    #[test]
    fn item_lines_require_a_single_leading_tab() {
        assert!(matches!(classify("\tadd r1, r2, r3").unwrap(), Line::Item("add r1, r2, r3")));
        assert!(classify("add r1, r2, r3").is_err());
    }

    #[test]
    fn split_words_treats_commas_and_whitespace_the_same() {
        assert_eq!(split_words("add r1, r2, r3"), vec!["add", "r1", "r2", "r3"]);
    }
}
