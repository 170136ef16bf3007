use crate::types::Bucket;
use anyhow::Result;
use regex::Regex;

/// Edits the import statements of the files that used the old stylesheet.
pub struct ImportRewriter {
    first_import: Regex,
}

impl ImportRewriter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            first_import: Regex::new(r"(?m)^import\b")?,
        })
    }

    /// Replace the first occurrence of `from` with `to`.
    /// Returns `None` when `from` does not occur.
    pub fn rewrite_entry_import(&self, text: &str, from: &str, to: &str) -> Option<String> {
        if !text.contains(from) {
            return None;
        }
        Some(text.replacen(from, to, 1))
    }

    /// Insert `import_line` on its own line right before the first import
    /// statement.
    ///
    /// Returns `None` when the file already contains `import_line` verbatim,
    /// or when it has no import statement to anchor on. Imports of the same
    /// stylesheet written differently (other quotes, a trailing `;`) are not
    /// recognised.
    pub fn insert_page_import(&self, text: &str, import_line: &str) -> Option<String> {
        if text.contains(import_line) {
            return None;
        }

        let anchor = self.first_import.find(text)?.start();
        let mut rewritten = String::with_capacity(text.len() + import_line.len() + 1);
        rewritten.push_str(&text[..anchor]);
        rewritten.push_str(import_line);
        rewritten.push('\n');
        rewritten.push_str(&text[anchor..]);
        Some(rewritten)
    }
}

/// `import '<base>/<bucket>.css'`
pub fn page_import_line(import_base: &str, bucket: Bucket) -> String {
    format!(
        "import '{}/{}'",
        import_base.trim_end_matches('/'),
        bucket.file_name()
    )
}
