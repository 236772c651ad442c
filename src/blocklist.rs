use std::collections::HashSet;
use std::path::Path;

/// Static set of hostnames refused with 403. Compared case-sensitively
/// against the parsed `Host` field, matching the reference behavior — block
/// lists are typically maintained by exact domain, and silently
/// case-folding could let a differently-cased bypass slip through review.
#[derive(Debug, Clone, Default)]
pub struct BlockList {
    hosts: HashSet<String>,
}

impl BlockList {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_hosts<I: IntoIterator<Item = String>>(hosts: I) -> Self {
        Self {
            hosts: hosts.into_iter().collect(),
        }
    }

    /// Loads a newline-delimited host list. Blank lines and `#`-prefixed
    /// comment lines are ignored.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::from_hosts(
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(str::to_string),
        ))
    }

    pub fn is_blocked(&self, host: &str) -> bool {
        self.hosts.contains(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_blocks_nothing() {
        let list = BlockList::empty();
        assert!(!list.is_blocked("anything.test"));
    }

    #[test]
    fn blocks_exact_match() {
        let list = BlockList::from_hosts(["www.blockedwebsite.com".to_string()]);
        assert!(list.is_blocked("www.blockedwebsite.com"));
        assert!(!list.is_blocked("other.test"));
    }

    #[test]
    fn comparison_is_case_sensitive() {
        let list = BlockList::from_hosts(["Blocked.Test".to_string()]);
        assert!(!list.is_blocked("blocked.test"));
        assert!(list.is_blocked("Blocked.Test"));
    }

    #[test]
    fn load_skips_blank_and_comment_lines() {
        let dir = std::env::temp_dir().join(format!("wgproxy-blocklist-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("blocklist.txt");
        std::fs::write(&path, "# comment\n\nwww.blockedwebsite.com\n  \nother.test\n").unwrap();

        let list = BlockList::load(&path).unwrap();
        assert!(list.is_blocked("www.blockedwebsite.com"));
        assert!(list.is_blocked("other.test"));
        assert_eq!(list.hosts.len(), 2);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn load_missing_file_errors() {
        let result = BlockList::load(Path::new("/nonexistent/path/blocklist.txt"));
        assert!(result.is_err());
    }
}
