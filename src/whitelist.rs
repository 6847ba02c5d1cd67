//! Set of tags allowed to operate the laser

use log::debug;
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Whitelist {
    tags: HashSet<String>,
}

impl Whitelist {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// One tag per line. Blank lines and `#` comments are skipped.
    pub fn parse(text: &str) -> Self {
        Self::new(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }
}

#[derive(Debug, Error)]
pub enum WhitelistError {
    #[error("failed to read whitelist {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("whitelist source unavailable: {0}")]
    Unavailable(String),
}

/// Where the control loop gets a fresh whitelist from. Each load replaces
/// the previous set wholesale.
pub trait WhitelistSource {
    fn load(&mut self) -> Result<Whitelist, WhitelistError>;
}

/// Whitelist kept in a plain text file
#[derive(Debug, Clone)]
pub struct FileWhitelist {
    path: PathBuf,
}

impl FileWhitelist {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl WhitelistSource for FileWhitelist {
    fn load(&mut self) -> Result<Whitelist, WhitelistError> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| WhitelistError::Io {
            path: self.path.clone(),
            source,
        })?;
        let whitelist = Whitelist::parse(&text);
        debug!("Read {} tags from {}", whitelist.len(), self.path.display());
        Ok(whitelist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_skips_blanks_and_comments() {
        let list = Whitelist::parse("# members\nABC123\n\n  DEF456  \r\n#GHI789\n");
        assert_eq!(list.len(), 2);
        assert!(list.contains("ABC123"));
        assert!(list.contains("DEF456"));
        assert!(!list.contains("GHI789"));
    }

    #[test]
    fn test_contains_is_exact() {
        let list = Whitelist::new(["ABC123"]);
        assert!(list.contains("ABC123"));
        assert!(!list.contains("abc123"));
        assert!(!list.contains("ABC12"));
    }

    #[test]
    fn test_file_whitelist_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ABC123").unwrap();
        writeln!(file, "DEF456").unwrap();

        let mut source = FileWhitelist::new(file.path());
        let list = source.load().unwrap();
        assert_eq!(list, Whitelist::new(["ABC123", "DEF456"]));
    }

    #[test]
    fn test_file_whitelist_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = FileWhitelist::new(dir.path().join("missing.txt"));
        assert!(matches!(source.load(), Err(WhitelistError::Io { .. })));
    }
}
