//! Input handling for file reading and stdin support.

use anyhow::{Context, Result};
use std::io::{self, Read};
use std::path::Path;

/// Statement graphed by `--example`.
pub const EXAMPLE_SQL: &str = "SELECT users.id, users.name, orders.order_date, orders.total \n\
FROM users \n\
JOIN orders ON users.id = orders.user_id \n\
WHERE orders.status = 'completed' \n\
ORDER BY orders.order_date DESC";

/// Read the SQL statement from a file, or from stdin when no file is given.
pub fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => read_from_file(path),
        None => read_from_stdin(),
    }
}

fn read_from_stdin() -> Result<String> {
    let mut content = String::new();
    io::stdin()
        .read_to_string(&mut content)
        .context("Failed to read from stdin")?;
    Ok(content)
}

fn read_from_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "SELECT * FROM users").unwrap();

        let sql = read_input(Some(file.path())).unwrap();
        assert!(sql.contains("SELECT * FROM users"));
    }

    #[test]
    fn test_read_missing_file() {
        let result = read_input(Some(Path::new("/nonexistent/file.sql")));
        assert!(result.is_err());
    }

    #[test]
    fn test_example_has_a_join() {
        assert!(EXAMPLE_SQL.contains("JOIN orders ON users.id = orders.user_id"));
    }
}
