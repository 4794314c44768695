//! Project naming for the session store.
use std::path::Path;

/// Session-store key for a project directory: its sanitized base name.
///
/// Example: `/home/user/work/My App` -> `my_app`
pub fn project_name(dir: &Path) -> String {
    let base = dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    sanitize_project_name(&base)
}

/// Sanitize a project name so it is safe as a directory name
///
/// Rules:
/// - Keep only letters, numbers, hyphens, underscores, dots
/// - Convert to lowercase
/// - Collapse runs of underscores
/// - Strip leading/trailing separators
/// - Limit to 64 characters
pub fn sanitize_project_name(raw: &str) -> String {
    let mut sanitized: String = raw
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .to_lowercase();

    while sanitized.contains("__") {
        sanitized = sanitized.replace("__", "_");
    }

    sanitized = sanitized
        .trim_matches(|c: char| c == '_' || c == '-' || c == '.')
        .to_string();

    if sanitized.chars().count() > 64 {
        sanitized = sanitized.chars().take(64).collect();
    }

    if sanitized.is_empty() {
        "default".to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_unix_path() {
        let path = PathBuf::from("/home/user/projects/my-app");
        assert_eq!(project_name(&path), "my-app");
    }

    #[test]
    fn test_path_with_spaces() {
        let path = PathBuf::from("/srv/Test Project");
        assert_eq!(project_name(&path), "test_project");
    }

    #[test]
    fn test_root_and_empty() {
        assert_eq!(project_name(&PathBuf::from("/")), "default");
        assert_eq!(project_name(&PathBuf::from("")), "default");
    }

    #[test]
    fn test_traversal_is_neutralised() {
        assert_eq!(sanitize_project_name("../etc"), "etc");
        assert_eq!(sanitize_project_name("a/b"), "a_b");
    }

    #[test]
    fn test_length_limit() {
        let long = "segment".repeat(20);
        assert!(sanitize_project_name(&long).len() <= 64);
    }
}
