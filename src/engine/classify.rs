//! Read/write classification of submitted statements

/// Leading keywords of statements that can only return rows
const READ_PREFIXES: [&str; 3] = ["select", "pragma", "with"];

/// Whether a statement may mutate the data source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementClass {
    /// Returns rows, never persisted
    Read,
    /// Anything else; persisted on success
    Write,
}

impl StatementClass {
    /// Classify by case-insensitive prefix of the trimmed text.
    ///
    /// Empty statements are write-class.
    pub fn of(sql: &str) -> Self {
        let lowered = sql.trim().to_lowercase();
        if READ_PREFIXES.iter().any(|p| lowered.starts_with(p)) {
            StatementClass::Read
        } else {
            StatementClass::Write
        }
    }
}
