//! Target list files: one target per line.

use anyhow::{Context, Result};
use std::path::Path;

/// Targets from `text`, skipping blank lines and `#` comments.
pub fn parse_targets(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}

pub fn read_targets_file(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read targets file {}", path.display()))?;
    Ok(parse_targets(&text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_blank_lines_and_comments() {
        let text = "# playlists\nhttps://a.example/list=1\n\n   \n  \
                    https://b.example/list=2  \n#https://c\n";
        assert_eq!(
            parse_targets(text),
            vec!["https://a.example/list=1", "https://b.example/list=2"]
        );
    }

    #[test]
    fn keeps_extra_tool_arguments_on_a_line() {
        assert_eq!(parse_targets("url --no-playlist\n"), vec!["url --no-playlist"]);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_targets_file(&dir.path().join("nope.txt")).unwrap_err();
        assert!(format!("{:#}", err).contains("read targets file"));
    }
}
