use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

/// What the walk should do after a visitor callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitSignal {
    Continue,
    /// Prune everything under the directory just entered.
    SkipSubtree,
    /// Stop the walk now. Not an error; partial results stay valid.
    Terminate,
}

/// Callbacks driven by [`walk_tree`]. One visitor per crawl run; the
/// visitor owns all per-run state.
pub trait FileVisitor {
    fn enter_directory(&mut self, dir: &Path) -> VisitSignal;
    fn visit_file(&mut self, file: &Path) -> VisitSignal;
    /// The filesystem layer failed to produce an entry (permission
    /// error, broken symlink target, I/O error).
    fn visit_failed(&mut self, path: Option<&Path>, detail: &str) -> VisitSignal;
}

/// Depth-first walk of `root`, dispatching every entry to `visitor`.
///
/// Links are not followed. The standard gitignore-style filters are
/// off: every file under the root is visited, and exclusion happens in
/// the visitor through the configured ignore rules. Only `.git` and
/// `.trawler` directories are pruned. `SkipSubtree` is honored by
/// dropping subsequent entries under the skipped directory;
/// `Terminate` stops the walk immediately.
pub fn walk_tree(root: &Path, visitor: &mut dyn FileVisitor) {
    let walker = WalkBuilder::new(root)
        .follow_links(false)
        .standard_filters(false)
        .filter_entry(|entry| {
            if entry.file_type().map_or(false, |ft| ft.is_dir()) {
                let name = entry.file_name().to_string_lossy();
                return name != ".git" && name != ".trawler";
            }
            true
        })
        .build();

    let mut skip_prefix: Option<PathBuf> = None;
    for result in walker {
        let entry = match result {
            Ok(e) => e,
            Err(err) => {
                let detail = err.to_string();
                if visitor.visit_failed(error_path(&err), &detail) == VisitSignal::Terminate {
                    break;
                }
                continue;
            }
        };

        if let Some(prefix) = &skip_prefix {
            if entry.path().starts_with(prefix) {
                continue;
            }
            skip_prefix = None;
        }

        let is_dir = entry.file_type().map_or(false, |ft| ft.is_dir());
        let signal = if is_dir {
            visitor.enter_directory(entry.path())
        } else if entry.file_type().map_or(false, |ft| ft.is_file()) {
            visitor.visit_file(entry.path())
        } else {
            VisitSignal::Continue
        };

        match signal {
            VisitSignal::Continue => {}
            VisitSignal::SkipSubtree => {
                if is_dir {
                    skip_prefix = Some(entry.path().to_path_buf());
                }
            }
            VisitSignal::Terminate => break,
        }
    }
}

fn error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[derive(Default)]
    struct Recorder {
        dirs: Vec<String>,
        files: Vec<String>,
        skip_dir_named: Option<String>,
        terminate_after_files: Option<usize>,
    }

    impl Recorder {
        fn name_of(path: &Path) -> String {
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        }
    }

    impl FileVisitor for Recorder {
        fn enter_directory(&mut self, dir: &Path) -> VisitSignal {
            let name = Self::name_of(dir);
            if self.skip_dir_named.as_deref() == Some(name.as_str()) {
                return VisitSignal::SkipSubtree;
            }
            self.dirs.push(name);
            VisitSignal::Continue
        }

        fn visit_file(&mut self, file: &Path) -> VisitSignal {
            self.files.push(Self::name_of(file));
            if let Some(limit) = self.terminate_after_files {
                if self.files.len() >= limit {
                    return VisitSignal::Terminate;
                }
            }
            VisitSignal::Continue
        }

        fn visit_failed(&mut self, _path: Option<&Path>, _detail: &str) -> VisitSignal {
            VisitSignal::Continue
        }
    }

    fn fixture() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("src")).unwrap();
        fs::create_dir_all(tmp.path().join("vendor/dep")).unwrap();
        fs::create_dir_all(tmp.path().join(".git")).unwrap();
        fs::write(tmp.path().join("src/main.rs"), "fn main() {}\n").unwrap();
        fs::write(tmp.path().join("src/lib.rs"), "pub fn lib() {}\n").unwrap();
        fs::write(tmp.path().join("vendor/dep/dep.js"), "module.exports = 1;\n").unwrap();
        fs::write(tmp.path().join(".git/HEAD"), "ref: refs/heads/main\n").unwrap();
        tmp
    }

    #[test]
    fn visits_all_files_and_prunes_git() {
        let tmp = fixture();
        let mut recorder = Recorder::default();
        walk_tree(tmp.path(), &mut recorder);

        recorder.files.sort();
        assert_eq!(recorder.files, vec!["dep.js", "lib.rs", "main.rs"]);
        assert!(!recorder.dirs.iter().any(|d| d == ".git"));
    }

    #[test]
    fn skip_subtree_prunes_descendants() {
        let tmp = fixture();
        let mut recorder = Recorder {
            skip_dir_named: Some("vendor".to_string()),
            ..Recorder::default()
        };
        walk_tree(tmp.path(), &mut recorder);

        recorder.files.sort();
        assert_eq!(recorder.files, vec!["lib.rs", "main.rs"]);
        assert!(!recorder.dirs.iter().any(|d| d == "dep"));
    }

    #[test]
    fn terminate_stops_the_walk() {
        let tmp = fixture();
        let mut recorder = Recorder {
            terminate_after_files: Some(1),
            ..Recorder::default()
        };
        walk_tree(tmp.path(), &mut recorder);

        assert_eq!(recorder.files.len(), 1);
    }
}
