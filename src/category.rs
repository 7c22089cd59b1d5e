//! Category paths of the form `group/subgroup/folder`.

use std::fmt;

/// Folder value that is replaced with the entry's own file or directory name.
pub const FOLDER_FROM_NAME: &str = "!";

/// The three levels of a Johnny Decimal category.
///
/// Components never contain a `/`. An empty component means that level is not set yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CategoryPath {
    pub group: String,
    pub subgroup: String,
    pub folder: String,
}

impl CategoryPath {
    #[must_use]
    pub fn new(group: impl Into<String>, subgroup: impl Into<String>, folder: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            subgroup: subgroup.into(),
            folder: folder.into(),
        }
    }

    /// Split a category string on the first two slashes.
    ///
    /// Missing components default to an empty string.
    /// Anything after a third slash is dropped so no component ever contains a `/`.
    ///
    /// ```rust
    /// use johnny_decimal::category::CategoryPath;
    ///
    /// assert_eq!(CategoryPath::parse("group/subgroup"), CategoryPath::new("group", "subgroup", ""));
    /// assert_eq!(CategoryPath::parse("//folder"), CategoryPath::new("", "", "folder"));
    /// ```
    #[must_use]
    pub fn parse(category: &str) -> Self {
        let mut parts = category.split('/');
        let group = parts.next().unwrap_or_default();
        let subgroup = parts.next().unwrap_or_default();
        let folder = parts.next().unwrap_or_default();
        Self::new(group, subgroup, folder)
    }

    /// True when all three levels are set.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        !self.group.is_empty() && !self.subgroup.is_empty() && !self.folder.is_empty()
    }

    /// True when no level is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.group.is_empty() && self.subgroup.is_empty() && self.folder.is_empty()
    }

    /// True when the folder should be named after the entry itself.
    #[must_use]
    pub fn folder_from_name(&self) -> bool {
        self.folder == FOLDER_FROM_NAME
    }
}

impl fmt::Display for CategoryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.group, self.subgroup, self.folder)
    }
}

#[cfg(test)]
mod category_tests {
    use super::*;

    #[test]
    fn parses_positional_components() {
        let cases = [
            ("group/subgroup/folder", ("group", "subgroup", "folder")),
            ("//folder", ("", "", "folder")),
            ("group", ("group", "", "")),
            ("", ("", "", "")),
            ("group/subgroup", ("group", "subgroup", "")),
        ];

        for (input, (group, subgroup, folder)) in cases {
            assert_eq!(
                CategoryPath::parse(input),
                CategoryPath::new(group, subgroup, folder),
                "Unexpected parse result for: {input:?}"
            );
        }
    }

    #[test]
    fn components_never_contain_slash() {
        let inputs = ["a/b/c/d", "///", "a//b/c/", "/x/y/z/w/", "no slashes", "a/b/"];
        for input in inputs {
            let category = CategoryPath::parse(input);
            assert!(!category.group.contains('/'), "{input}");
            assert!(!category.subgroup.contains('/'), "{input}");
            assert!(!category.folder.contains('/'), "{input}");
        }
    }

    #[test]
    fn completeness() {
        assert!(CategoryPath::parse("a/b/c").is_complete());
        assert!(!CategoryPath::parse("a/b").is_complete());
        assert!(!CategoryPath::parse("misc//").is_complete());
        assert!(CategoryPath::parse("").is_empty());
        assert!(CategoryPath::parse("//").is_empty());
        assert!(!CategoryPath::parse("a").is_empty());
    }

    #[test]
    fn displays_three_components() {
        assert_eq!(CategoryPath::parse("a").to_string(), "a//");
        assert_eq!(CategoryPath::parse("a/b/c").to_string(), "a/b/c");
    }

    #[test]
    fn detects_folder_directive() {
        assert!(CategoryPath::parse("finance/invoices/!").folder_from_name());
        assert!(!CategoryPath::parse("finance/invoices/x").folder_from_name());
    }
}
