//! Require-path arithmetic.
//!
//! All paths here are forward-slash require specifiers relative to the
//! output root; none of them touch the filesystem.

/// Relative path from directory `from` to directory `to`.
///
/// Both are output-root-relative; `to` may step outside the root with
/// leading `..` components (the core package usually lives there).
pub(crate) fn relative(from: &str, to: &str) -> String {
    let from_parts: Vec<&str> = from.split('/').filter(|s| !s.is_empty()).collect();
    let to_parts: Vec<&str> = to.split('/').filter(|s| !s.is_empty()).collect();

    let mut common = 0;
    while common < from_parts.len()
        && common < to_parts.len()
        && from_parts[common] == to_parts[common]
    {
        common += 1;
    }

    let mut parts: Vec<&str> = vec![".."; from_parts.len() - common];
    parts.extend(&to_parts[common..]);
    parts.join("/")
}

/// Join a relative directory and a file stem.
pub(crate) fn join_path(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Require specifiers must be explicitly relative.
pub(crate) fn path_for_require(path: &str) -> String {
    if path.starts_with('.') {
        path.to_string()
    } else {
        format!("./{}", path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sibling_directories() {
        assert_eq!(relative("date/vars", "date/constants"), "../constants");
    }

    #[test]
    fn same_directory() {
        assert_eq!(relative("date/vars", "date/vars"), "");
        assert_eq!(path_for_require(&join_path("", "pad")), "./pad");
    }

    #[test]
    fn into_subdirectory() {
        assert_eq!(relative("date", "date/vars"), "vars");
        assert_eq!(relative("", "string"), "string");
    }

    #[test]
    fn across_modules() {
        assert_eq!(relative("date/vars", "common/internal"), "../../common/internal");
    }

    #[test]
    fn outside_the_output_root() {
        assert_eq!(
            relative("date/vars", "../../../lib/core"),
            "../../../../../lib/core"
        );
        assert_eq!(relative("", "../../../lib/core"), "../../../lib/core");
    }
}
