//! Reading poems from a user-chosen directory.
//!
//! The poems root belongs to the user; we only read it.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use walkdir::WalkDir;

use crate::syllables::{count_syllables, strip_hints};

const POEM_EXTENSIONS: [&str; 2] = ["md", "txt"];

/// A poem file: path, title and text with frontmatter and syllable hints removed.
#[derive(Debug, Clone)]
pub struct Poem {
    pub path: PathBuf,
    /// Frontmatter `title`, else the file stem.
    pub title: String,
    /// Raw file content.
    pub raw: String,
    pub body: String,
}

impl Poem {
    /// Non-blank lines.
    pub fn line_count(&self) -> usize {
        self.body.lines().filter(|l| !l.trim().is_empty()).count()
    }

    pub fn syllable_count(&self) -> usize {
        count_syllables(&self.body)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FrontMatter {
    title: Option<String>,
}

/// Scans `root` for `.md` and `.txt` files, sorted by path.
/// Hidden files and directories are skipped; symlinked directories are not followed.
pub fn scan_poems(root: &Path) -> Result<Vec<Poem>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }
    let mut poems = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
    {
        let entry = entry.map_err(|e| ScanError::Walk(e.to_string()))?;
        let path = entry.path();
        if is_poem_file(path) && path.is_file() {
            poems.push(read_poem(path)?);
        }
    }
    Ok(poems)
}

/// Reads one poem file.
pub fn read_poem(path: &Path) -> Result<Poem, ScanError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ScanError::Read(path.to_path_buf(), e))?;
    let (front, body) = split_frontmatter(&raw);
    let title = front
        .and_then(|yaml| match serde_yaml::from_str::<FrontMatter>(yaml) {
            Ok(fm) => fm.title,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "unreadable frontmatter");
                None
            }
        })
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| file_stem(path));
    let body = strip_hints(body);
    Ok(Poem {
        path: path.to_path_buf(),
        title,
        raw,
        body,
    })
}

fn is_poem_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| POEM_EXTENSIONS.contains(&e))
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Splits optional YAML frontmatter (between a leading `---` and the next `---` line) from the body.
fn split_frontmatter(content: &str) -> (Option<&str>, &str) {
    let s = content.trim_start();
    let Some(after_first) = s.strip_prefix("---") else {
        return (None, content);
    };
    match after_first.find("\n---") {
        Some(end) => {
            let yaml = after_first[..end].trim();
            let body = after_first[end + 4..].trim_start();
            (Some(yaml), body)
        }
        None => (None, content),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("walk error: {0}")]
    Walk(String),
    #[error("read error for {0}: {1}")]
    Read(PathBuf, std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_frontmatter_plain() {
        assert_eq!(split_frontmatter("Hello world."), (None, "Hello world."));
    }

    #[test]
    fn split_frontmatter_with_yaml() {
        let s = "---\ntitle: Осень\ndate: 2024-01-01\n---\n\nЛистья падают.";
        let (yaml, body) = split_frontmatter(s);
        assert_eq!(yaml, Some("title: Осень\ndate: 2024-01-01"));
        assert_eq!(body, "Листья падают.");
    }

    #[test]
    fn unterminated_frontmatter_is_body() {
        let s = "---\ntitle: x\nno end";
        assert_eq!(split_frontmatter(s), (None, s));
    }

    #[test]
    fn scan_reads_titles_and_strips_hints() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("autumn.md"),
            "---\ntitle: Осень\n---\nЛистья ·2\nпадают ·3\n",
        )
        .unwrap();
        std::fs::create_dir(dir.path().join("drafts")).unwrap();
        std::fs::write(dir.path().join("drafts/кот.txt"), "Мой верный кот").unwrap();
        std::fs::write(dir.path().join("ignored.rs"), "fn main() {}").unwrap();
        std::fs::create_dir(dir.path().join(".hidden")).unwrap();
        std::fs::write(dir.path().join(".hidden/secret.md"), "тайна").unwrap();

        let poems = scan_poems(dir.path()).unwrap();
        assert_eq!(poems.len(), 2);

        assert_eq!(poems[0].title, "Осень");
        assert_eq!(poems[0].body, "Листья\nпадают\n");
        assert_eq!(poems[0].line_count(), 2);
        assert_eq!(poems[0].syllable_count(), 5);

        assert_eq!(poems[1].title, "кот");
        assert_eq!(poems[1].syllable_count(), 4);
    }

    #[test]
    fn bad_frontmatter_falls_back_to_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draft.md");
        std::fs::write(&path, "---\ntitle: [unclosed\n---\nтекст").unwrap();
        let poem = read_poem(&path).unwrap();
        assert_eq!(poem.title, "draft");
        assert_eq!(poem.body, "текст");
    }

    #[test]
    fn scan_rejects_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.md");
        std::fs::write(&path, "x").unwrap();
        assert!(matches!(scan_poems(&path), Err(ScanError::NotADirectory(_))));
    }
}
