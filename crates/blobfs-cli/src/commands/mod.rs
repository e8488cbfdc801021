pub mod cat;
pub mod df;
pub mod ls;
pub mod mkdir;
pub mod mv;
pub mod rm;
pub mod rmdir;
pub mod stat;
pub mod touch;
pub mod write;

/// Normalize a container path to start with `/` and carry no trailing `/`.
/// This makes paths like `docs/` work the same as `/docs`.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    format!("/{trimmed}")
}

/// Path of `name` inside the directory `parent`.
pub fn join_path(parent: &str, name: &str) -> String {
    if parent == "/" {
        format!("/{name}")
    } else {
        format!("{parent}/{name}")
    }
}
