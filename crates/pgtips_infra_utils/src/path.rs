use std::fs;
use std::path::PathBuf;

#[cfg(test)]
#[path = "path_test.rs"]
mod path_test;

/// Resolves a relative path from the project root directory and returns its absolute path.
///
/// # Arguments
/// * `relative_path` - A string slice representing the relative path from the project root.
///
/// # Returns
/// * A `PathBuf` representing the resolved path starting from the project root.
pub fn resolve_project_relative_path(relative_path: &str) -> Result<PathBuf, std::io::Error> {
    let base_dir = path_of_project_root();
    let path = base_dir.join(relative_path);
    let absolute_path = fs::canonicalize(path)?;

    Ok(absolute_path)
}

/// Returns the absolute path of the project root directory.
pub fn project_path() -> Result<PathBuf, std::io::Error> {
    resolve_project_relative_path(".")
}

fn path_of_project_root() -> PathBuf {
    // This crate lives in `<root>/crates/pgtips_infra_utils`.
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).ancestors().nth(2).expect("Cannot navigate up").into()
}
