use std::env;
use std::path::Path;

/// Absolute, symlink-resolved form of a module path, always with forward slashes.
/// Paths that do not exist are made absolute but otherwise left alone.
pub fn canonicalize_path(source_path: &str) -> String {
    let path = Path::new(source_path);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir().unwrap_or_default().join(path)
    };

    // dunce avoids the \\?\ prefix std::fs::canonicalize adds on Windows
    let canonical = dunce::canonicalize(&absolute).unwrap_or(absolute);

    let mut final_path = canonical.to_string_lossy().replace('\\', "/");

    // Windows Drive Letter Normalization (C:/ not c:/)
    if cfg!(windows) && final_path.chars().nth(1) == Some(':') {
        let drive: String = final_path.chars().take(1).flat_map(char::to_uppercase).collect();
        final_path = format!("{}{}", drive, &final_path[1..]);
    }

    final_path
}

/// Last path component, or the whole string when there is none.
pub fn file_name_of(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().filter(|s| !s.is_empty()).unwrap_or(path)
}
