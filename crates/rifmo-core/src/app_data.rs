//! Where Rifmo keeps its own files (config only, for now).
//!
//! Poems stay in the folder the user picks; nothing here touches them.

use std::path::PathBuf;

/// Returns the directory holding Rifmo's config.
/// On Linux: `~/.local/share/rifmo/`; on macOS: `~/Library/Application Support/app.Rifmo.Rifmo/`.
/// Creates the directory if needed; `None` if there is no home to resolve against.
pub fn app_data_dir() -> Option<PathBuf> {
    let dir = directories::ProjectDirs::from("app", "Rifmo", "Rifmo")?
        .data_local_dir()
        .to_path_buf();
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_exists_when_resolved() {
        if let Some(dir) = app_data_dir() {
            assert!(dir.is_dir());
        }
    }
}
