use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;
use crate::core::error::{Error, ErrorKind, Result};

/// Finds text documents and feeds them, or their lines, to a callback.
///
/// Shared by the sequential and parallel builders and query runners; only
/// the per-unit callback differs between them.
#[derive(Debug, Clone)]
pub struct SourceWalker {
    pub extensions: Vec<String>,   // Lowercase, without the leading dot
}

impl SourceWalker {
    pub fn new(extensions: &[String]) -> Self {
        SourceWalker {
            extensions: extensions.iter().map(|ext| ext.to_lowercase()).collect(),
        }
    }

    /// True if the file name ends in a recognised extension, ignoring case
    pub fn is_text_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .is_some_and(|ext| self.extensions.iter().any(|known| *known == ext))
    }

    /// Text files under `root`, recursively, in file-name order.
    ///
    /// Lazy; call again to restart. Unreadable directory entries are
    /// yielded as errors.
    pub fn text_files(&self, root: &Path) -> impl Iterator<Item = Result<PathBuf>> {
        WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(move |entry| match entry {
                Ok(entry) if entry.file_type().is_file() && self.is_text_file(entry.path()) => {
                    Some(Ok(entry.into_path()))
                }
                Ok(_) => None,
                Err(err) => Some(Err(Error::from(err))),
            })
    }

    /// Calls `f` for every text document at `path`: each text file under a
    /// directory, or `path` itself if it is a text file.
    ///
    /// A failing document is logged and skipped. Returns how many documents
    /// were handled successfully.
    pub fn for_each_document<F>(&self, path: &Path, mut f: F) -> Result<usize>
    where
        F: FnMut(&Path) -> Result<()>,
    {
        if !path.exists() {
            return Err(Error::new(
                ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            ));
        }

        let mut handled = 0;
        if path.is_dir() {
            for file in self.text_files(path) {
                let outcome = file.and_then(|file| f(&file).map_err(|err| annotate(&file, err)));
                match outcome {
                    Ok(()) => handled += 1,
                    Err(err) => warn!("skipping document: {}", err),
                }
            }
        } else if self.is_text_file(path) {
            match f(path) {
                Ok(()) => handled += 1,
                Err(err) => warn!("skipping document: {}", annotate(path, err)),
            }
        } else {
            debug!(path = %path.display(), "not a text file, ignored");
        }

        Ok(handled)
    }

    /// Calls `f` for every line of every text document at `path`.
    pub fn for_each_line<F>(&self, path: &Path, mut f: F) -> Result<usize>
    where
        F: FnMut(&str) -> Result<()>,
    {
        self.for_each_document(path, |file| read_lines(file, &mut f))
    }
}

/// Calls `f` for each line of `file`, stopping at the first error
pub fn read_lines<F>(file: &Path, mut f: F) -> Result<()>
where
    F: FnMut(&str) -> Result<()>,
{
    let reader = BufReader::new(File::open(file)?);
    for line in reader.lines() {
        f(&line?)?;
    }
    Ok(())
}

fn annotate(path: &Path, err: Error) -> Error {
    if err.context.contains(&path.display().to_string()) {
        err
    } else {
        Error::new(err.kind, format!("{}: {}", path.display(), err.context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn walker() -> SourceWalker {
        SourceWalker::new(&["txt".to_string(), "text".to_string()])
    }

    #[test]
    fn recognises_extensions_ignoring_case() {
        let walker = walker();
        assert!(walker.is_text_file(Path::new("a/b.txt")));
        assert!(walker.is_text_file(Path::new("a/B.TEXT")));
        assert!(walker.is_text_file(Path::new("notes.TxT")));
        assert!(!walker.is_text_file(Path::new("a/b.md")));
        assert!(!walker.is_text_file(Path::new("txt")));
    }

    #[test]
    fn finds_text_files_recursively_in_order() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("nested/deeper")).unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("a.TEXT"), "a").unwrap();
        fs::write(dir.path().join("skip.md"), "x").unwrap();
        fs::write(dir.path().join("nested/deeper/c.txt"), "c").unwrap();

        let walker = walker();
        let first: Vec<PathBuf> = walker.text_files(dir.path()).map(Result::unwrap).collect();
        let names: Vec<String> = first
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 3);
        assert!(names.contains(&"c.txt".to_string()));
        assert!(!names.contains(&"skip.md".to_string()));

        let second: Vec<PathBuf> = walker.text_files(dir.path()).map(Result::unwrap).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn failing_documents_are_skipped() {
        let dir = TempDir::new().unwrap();
        for name in ["1.txt", "2.txt", "3.txt"] {
            fs::write(dir.path().join(name), name).unwrap();
        }

        let mut seen = Vec::new();
        let handled = walker()
            .for_each_document(dir.path(), |file| {
                let name = file.file_name().unwrap().to_string_lossy().into_owned();
                seen.push(name.clone());
                if name == "2.txt" {
                    Err(Error::new(ErrorKind::Io, "unreadable".to_string()))
                } else {
                    Ok(())
                }
            })
            .unwrap();

        assert_eq!(handled, 2);
        assert_eq!(seen, vec!["1.txt", "2.txt", "3.txt"]);
    }

    #[test]
    fn missing_root_is_reported() {
        let err = walker()
            .for_each_document(Path::new("/definitely/not/here"), |_| Ok(()))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[test]
    fn single_non_text_file_is_ignored() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("data.csv");
        fs::write(&file, "a,b").unwrap();

        let handled = walker().for_each_document(&file, |_| panic!("not a text file")).unwrap();
        assert_eq!(handled, 0);
    }

    #[test]
    fn lines_are_visited_in_order() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("queries.txt");
        fs::write(&file, "first line\n\nthird\n").unwrap();

        let mut lines = Vec::new();
        walker()
            .for_each_line(&file, |line| {
                lines.push(line.to_string());
                Ok(())
            })
            .unwrap();
        assert_eq!(lines, vec!["first line", "", "third"]);
    }
}
