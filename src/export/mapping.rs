use std::collections::HashMap;
use std::path::Path;

/// Category/parameter name to mapped name, read from a tab-delimited file.
#[derive(Debug, Clone, Default)]
pub struct ParameterMapping {
    entries: HashMap<(String, String), String>,
}

impl ParameterMapping {
    /// Reads the table from `path`.
    ///
    /// A missing or unreadable file is logged and gives an empty table.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let mapping = Self::parse(&text);
                tracing::debug!(path = %path.display(), entries = mapping.len(), "Loaded parameter mapping");
                mapping
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Parameter mapping unavailable");
                Self::default()
            }
        }
    }

    /// Parses table text: three tab-separated columns per line. Blank
    /// lines, `#` comments and malformed lines are skipped.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut entries = HashMap::new();
        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
            match fields.as_slice() {
                [category, name, mapped]
                    if !category.is_empty() && !name.is_empty() && !mapped.is_empty() =>
                {
                    entries.insert(((*category).to_owned(), (*name).to_owned()), (*mapped).to_owned());
                }
                _ => tracing::debug!(line = line_no + 1, "Skipping malformed mapping line"),
            }
        }
        Self { entries }
    }

    /// Mapped name for a parameter of a category.
    #[must_use]
    pub fn translate(&self, category: &str, name: &str) -> Option<&str> {
        self.entries
            .get(&(category.to_owned(), name.to_owned()))
            .map(String::as_str)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
