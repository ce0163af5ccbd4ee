use std::path::{Component, Path, PathBuf};

/// Renders a path for messages: canonical when it exists, otherwise made
/// absolute against the working directory and lexically cleaned up.
pub trait BestEffortPathExt {
    fn best_effort_path_display(&self) -> String;
}

impl BestEffortPathExt for Path {
    fn best_effort_path_display(&self) -> String {
        if let Ok(canonical) = self.canonicalize() {
            return canonical.display().to_string();
        }
        let absolute = match std::env::current_dir() {
            Ok(current_dir) if self.is_relative() => current_dir.join(self),
            _ => self.to_path_buf(),
        };
        lexically_clean(&absolute).display().to_string()
    }
}

fn lexically_clean(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Popping never climbs above the root or a prefix
                cleaned.pop();
            }
            other => cleaned.push(other),
        }
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case("/a/./b/../c", "/a/c")]
    #[case("/../x", "/x")]
    #[case("/a/b/.", "/a/b")]
    fn test_lexically_clean(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(lexically_clean(Path::new(raw)), PathBuf::from(expected));
    }

    #[test]
    fn test_missing_path_is_made_absolute() {
        let display = Path::new("missing-dir/./store.lpy").best_effort_path_display();
        assert!(Path::new(&display).is_absolute());
        assert!(display.ends_with("missing-dir/store.lpy"));
    }

    #[test]
    fn test_existing_path_is_canonical() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join(".").join("file");
        std::fs::write(&nested, "").unwrap();
        assert_eq!(
            nested.best_effort_path_display(),
            dir.path().canonicalize().unwrap().join("file").display().to_string()
        );
    }
}
