use std::path::Path;

/// Average non-blank line length above which a file counts as minified.
pub const MINIFIED_LINE_LENGTH: usize = 255;

const BINARY_SAMPLE_CHARS: usize = 10_000;
const BINARY_CONTROL_RATIO: f64 = 0.25;

/// Result of the line-extraction stage.
#[derive(Debug)]
pub enum LineExtraction {
    Extracted(Vec<String>),
    /// The detail goes straight into the report entry.
    Failed(String),
}

/// Reads a file as lines, bounded by `max_file_size` and strict UTF-8.
///
/// Failure here means the path is treated as "not present": the
/// visitor drops it from the observed set in addition to reporting it.
pub fn extract_lines(path: &Path, max_file_size: u64) -> LineExtraction {
    let metadata = match path.metadata() {
        Ok(m) => m,
        Err(err) => return LineExtraction::Failed(format!("cannot stat: {}", err)),
    };
    if metadata.len() > max_file_size {
        return LineExtraction::Failed(format!(
            "file size {} exceeds limit {}",
            metadata.len(),
            max_file_size
        ));
    }

    let raw = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => return LineExtraction::Failed(format!("cannot read: {}", err)),
    };

    match String::from_utf8(raw) {
        Ok(text) => LineExtraction::Extracted(text.lines().map(|l| l.to_string()).collect()),
        Err(_) => LineExtraction::Failed("not valid UTF-8".to_string()),
    }
}

#[derive(Debug)]
pub struct MinifiedVerdict {
    pub minified: bool,
    pub avg_line_length: usize,
}

/// Minified heuristic: a `.min.js`/`.min.css` name, or an average
/// trimmed non-blank line length above [`MINIFIED_LINE_LENGTH`].
pub fn check_minified(lines: &[String], file_name: &str) -> MinifiedVerdict {
    if file_name.ends_with(".min.js") || file_name.ends_with(".min.css") {
        return MinifiedVerdict {
            minified: true,
            avg_line_length: 0,
        };
    }

    let mut total = 0usize;
    let mut count = 0usize;
    for line in lines {
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            total += trimmed.chars().count();
            count += 1;
        }
    }
    let avg_line_length = if count == 0 { 0 } else { total / count };

    MinifiedVerdict {
        minified: avg_line_length > MINIFIED_LINE_LENGTH,
        avg_line_length,
    }
}

/// True when the file has no non-blank lines.
pub fn is_empty(lines: &[String]) -> bool {
    lines.iter().all(|line| line.trim().is_empty())
}

#[derive(Debug)]
pub struct BinaryVerdict {
    pub binary: bool,
    pub reason: &'static str,
}

/// Content-sniffing binary heuristic over already-decoded lines: a NUL
/// byte anywhere in the sample, or too many non-whitespace control
/// characters. Binary paths are dropped from the observed set, same as
/// extraction failures.
pub fn check_binary(lines: &[String]) -> BinaryVerdict {
    let mut total = 0usize;
    let mut control = 0usize;

    'sample: for line in lines {
        for ch in line.chars() {
            if ch == '\0' {
                return BinaryVerdict {
                    binary: true,
                    reason: "binary content (NUL byte)",
                };
            }
            if ch.is_control() && ch != '\t' {
                control += 1;
            }
            total += 1;
            if total >= BINARY_SAMPLE_CHARS {
                break 'sample;
            }
        }
    }

    if total > 0 && control as f64 / total as f64 > BINARY_CONTROL_RATIO {
        return BinaryVerdict {
            binary: true,
            reason: "binary content (control characters)",
        };
    }

    BinaryVerdict {
        binary: false,
        reason: "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn lines_of(text: &str) -> Vec<String> {
        text.lines().map(|l| l.to_string()).collect()
    }

    #[test]
    fn extracts_plain_text() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "fn main() {{}}").unwrap();
        writeln!(file, "// done").unwrap();

        match extract_lines(file.path(), 1_048_576) {
            LineExtraction::Extracted(lines) => assert_eq!(lines.len(), 2),
            LineExtraction::Failed(detail) => panic!("unexpected failure: {}", detail),
        }
    }

    #[test]
    fn rejects_invalid_utf8() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xff, 0xfe, 0x41, 0x42]).unwrap();

        match extract_lines(file.path(), 1_048_576) {
            LineExtraction::Failed(detail) => assert!(detail.contains("UTF-8")),
            LineExtraction::Extracted(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn rejects_oversized_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&vec![b'a'; 2048]).unwrap();

        match extract_lines(file.path(), 1024) {
            LineExtraction::Failed(detail) => assert!(detail.contains("exceeds limit")),
            LineExtraction::Extracted(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn min_js_name_is_minified() {
        let verdict = check_minified(&lines_of("var a = 1;"), "vendor.min.js");
        assert!(verdict.minified);
    }

    #[test]
    fn long_average_line_is_minified() {
        let long_line = "x".repeat(400);
        let verdict = check_minified(&lines_of(&long_line), "bundle.js");
        assert!(verdict.minified);
        assert_eq!(verdict.avg_line_length, 400);
    }

    #[test]
    fn normal_source_is_not_minified() {
        let verdict = check_minified(
            &lines_of("fn main() {\n    println!(\"hi\");\n}"),
            "main.rs",
        );
        assert!(!verdict.minified);
    }

    #[test]
    fn blank_lines_are_empty() {
        assert!(is_empty(&lines_of("\n\n   \n\t\n")));
        assert!(is_empty(&[]));
        assert!(!is_empty(&lines_of("\n\nx\n")));
    }

    #[test]
    fn nul_byte_is_binary() {
        let verdict = check_binary(&["data\0data".to_string()]);
        assert!(verdict.binary);
        assert!(verdict.reason.contains("NUL"));
    }

    #[test]
    fn control_characters_are_binary() {
        let junk: String = "\u{1}\u{2}\u{3}\u{4}".repeat(10);
        let verdict = check_binary(&[junk]);
        assert!(verdict.binary);
    }

    #[test]
    fn source_code_is_not_binary() {
        let verdict = check_binary(&lines_of("fn main() {\n\tprintln!(\"ok\");\n}"));
        assert!(!verdict.binary);
    }
}
