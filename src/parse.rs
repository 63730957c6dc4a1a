//! Line handling shared by the puzzle file readers.

use crate::error::{Error, Result};

/// Non-empty lines with `#` comments stripped, paired with their 1-based
/// line numbers.
pub(crate) fn content_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines().enumerate().filter_map(|(index, line)| {
        let line = line.split('#').next().unwrap_or_default().trim();
        (!line.is_empty()).then_some((index + 1, line))
    })
}

/// Parses a whitespace separated token as a non-negative integer.
pub(crate) fn number(line: usize, token: &str) -> Result<usize> {
    token
        .parse::<usize>()
        .map_err(|e| Error::parse(line, format!("invalid number '{token}': {e}")))
}

/// Reads the four coordinates of a `<tag> r1 c1 r2 c2` clue line.
pub(crate) fn cell_pair(
    line: usize,
    tokens: &[&str],
) -> Result<((usize, usize), (usize, usize))> {
    let [r1, c1, r2, c2] = tokens else {
        return Err(Error::parse(
            line,
            format!("expected four coordinates, found {}", tokens.len()),
        ));
    };
    Ok((
        (number(line, r1)?, number(line, c1)?),
        (number(line, r2)?, number(line, c2)?),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_lines_skip_comments_and_blanks() {
        let text = "# header\n1 2\n\n  3 4  # trailing\n";
        let lines: Vec<_> = content_lines(text).collect();
        assert_eq!(lines, vec![(2, "1 2"), (4, "3 4")]);
    }

    #[test]
    fn test_cell_pair() {
        assert_eq!(cell_pair(1, &["0", "1", "2", "3"]).unwrap(), ((0, 1), (2, 3)));
        assert!(cell_pair(7, &["0", "1"]).is_err());
        assert!(cell_pair(7, &["0", "x", "1", "1"]).is_err());
    }
}
