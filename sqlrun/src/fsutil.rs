//! Small filesystem predicates.

use std::path::Path;

/// Case-insensitive extension test.
///
/// The extension is everything after the *first* dot of the file name, so
/// `dump.sql.gz` has extension `sql.gz`, not `gz`. A name with no dot is
/// compared whole.
pub fn has_extension(path: &Path, expected: &str) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let extension = name.find('.').map(|i| &name[i + 1..]).unwrap_or(name);
    extension.eq_ignore_ascii_case(expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_extension() {
        assert!(has_extension(Path::new("schema.sql"), "sql"));
        assert!(has_extension(Path::new("/a/b/schema.SQL"), "sql"));
        assert!(!has_extension(Path::new("schema.sql"), "txt"));
    }

    #[test]
    fn first_dot_wins() {
        assert!(has_extension(Path::new("dump.sql.gz"), "sql.gz"));
        assert!(!has_extension(Path::new("dump.sql.gz"), "gz"));
    }

    #[test]
    fn dotless_name_compared_whole() {
        assert!(has_extension(Path::new("sql"), "sql"));
        assert!(!has_extension(Path::new("script"), "sql"));
    }

    #[test]
    fn no_file_name() {
        assert!(!has_extension(Path::new("/"), "sql"));
    }
}
