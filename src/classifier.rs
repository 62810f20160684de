/// Language tag used when nothing matches.
pub const UNKNOWN_LANGUAGE: &str = "Unknown";

/// Decides a language tag from a file name and its content.
///
/// Injected into the crawl so tests can substitute a double.
pub trait Classifier {
    fn guess_language(&self, file_name: &str, lines: &[String]) -> &'static str;
}

/// Extension-table classifier with a shebang fallback for
/// extension-less scripts.
pub struct ExtensionClassifier;

impl Classifier for ExtensionClassifier {
    fn guess_language(&self, file_name: &str, lines: &[String]) -> &'static str {
        if let Some(lang) = by_extension(file_name) {
            return lang;
        }
        if let Some(first) = lines.first() {
            if let Some(lang) = by_shebang(first) {
                return lang;
            }
        }
        UNKNOWN_LANGUAGE
    }
}

fn by_extension(file_name: &str) -> Option<&'static str> {
    let ext = file_name.rsplit('.').next()?;
    if ext == file_name {
        // No dot at all
        return None;
    }
    match ext.to_ascii_lowercase().as_str() {
        "rs" => Some("rust"),
        "py" | "pyi" => Some("python"),
        "go" => Some("go"),
        "js" | "jsx" | "mjs" | "cjs" => Some("javascript"),
        "ts" | "tsx" | "mts" | "cts" => Some("typescript"),
        "java" => Some("java"),
        "c" | "h" => Some("c"),
        "cc" | "cpp" | "cxx" | "hpp" | "hh" => Some("cpp"),
        "cs" => Some("csharp"),
        "rb" => Some("ruby"),
        "php" => Some("php"),
        "sh" | "bash" => Some("shell"),
        "kt" | "kts" => Some("kotlin"),
        "swift" => Some("swift"),
        "scala" => Some("scala"),
        "ex" | "exs" => Some("elixir"),
        "pl" | "pm" => Some("perl"),
        "lua" => Some("lua"),
        "hs" => Some("haskell"),
        "sql" => Some("sql"),
        "html" | "htm" => Some("html"),
        "css" => Some("css"),
        "md" | "markdown" => Some("markdown"),
        "json" => Some("json"),
        "yml" | "yaml" => Some("yaml"),
        "toml" => Some("toml"),
        "xml" => Some("xml"),
        _ => None,
    }
}

fn by_shebang(first_line: &str) -> Option<&'static str> {
    let line = first_line.trim();
    if !line.starts_with("#!") {
        return None;
    }
    if line.contains("python") {
        Some("python")
    } else if line.contains("bash") || line.contains("/sh") {
        Some("shell")
    } else if line.contains("node") {
        Some("javascript")
    } else if line.contains("perl") {
        Some("perl")
    } else if line.contains("ruby") {
        Some("ruby")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guess(file_name: &str, first_line: &str) -> &'static str {
        let lines = vec![first_line.to_string()];
        ExtensionClassifier.guess_language(file_name, &lines)
    }

    #[test]
    fn known_extensions() {
        assert_eq!(guess("foo.rs", ""), "rust");
        assert_eq!(guess("bar.py", ""), "python");
        assert_eq!(guess("baz.go", ""), "go");
        assert_eq!(guess("qux.tsx", ""), "typescript");
        assert_eq!(guess("legacy.PHP", ""), "php");
        assert_eq!(guess("notes.md", ""), "markdown");
    }

    #[test]
    fn shebang_beats_missing_extension() {
        assert_eq!(guess("deploy", "#!/usr/bin/env bash"), "shell");
        assert_eq!(guess("migrate", "#!/usr/bin/env python3"), "python");
        assert_eq!(guess("run", "#!/bin/sh"), "shell");
    }

    #[test]
    fn unknown_falls_through() {
        assert_eq!(guess("LICENSE", "MIT License"), UNKNOWN_LANGUAGE);
        assert_eq!(guess("data.unknownext", ""), UNKNOWN_LANGUAGE);
        assert_eq!(guess("Makefile", "all: build"), UNKNOWN_LANGUAGE);
    }

    #[test]
    fn empty_content_is_safe() {
        let lines: Vec<String> = Vec::new();
        assert_eq!(
            ExtensionClassifier.guess_language("script", &lines),
            UNKNOWN_LANGUAGE
        );
    }
}
