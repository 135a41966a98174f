use std::path::{Component, Path, PathBuf};

/// Express `path` relative to `root`, climbing out with `..` when it lives elsewhere.
///
/// Paths that are already relative are returned as they are.
pub fn relativize(root: &Path, path: &Path) -> PathBuf {
    if !path.is_absolute() {
        return path.to_path_buf();
    }

    let root_parts = normal_components(root);
    let path_parts = normal_components(path);

    let shared = root_parts
        .iter()
        .zip(path_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut result = PathBuf::new();
    for _ in shared..root_parts.len() {
        result.push("..");
    }
    for part in &path_parts[shared..] {
        result.push(part.as_os_str());
    }

    result
}

pub fn display_relative(root: &Path, path: &Path) -> String {
    relativize(root, path).display().to_string()
}

fn normal_components(path: &Path) -> Vec<Component<'_>> {
    path.components().filter(|c| !matches!(c, Component::CurDir)).collect()
}
