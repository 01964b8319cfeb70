use std::fs;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

/// Write a finished document in one step: the bytes go to a sibling `.tmp`
/// file which is then renamed over `path`, so a failed write never leaves a
/// half-written export behind.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp = tmp_path(path);
    if let Err(e) = fs::write(&tmp, bytes) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    fs::rename(&tmp, path)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Markdown table of the first `max_rows` rows, or `(no rows)`.
pub fn table_rows<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StudyRecord;

    #[test]
    fn test_write_atomic_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("prediction.json");
        write_atomic(&path, b"[]").unwrap();
        write_atomic(&path, b"[1]").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"[1]");
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn test_table_rows() {
        let rows = vec![
            StudyRecord::new("Asha", "Math", 6.0, "Normal"),
            StudyRecord::new("Ben", "Art", 2.0, "Fast"),
        ];
        let table = table_rows(&rows, 1);
        assert!(table.contains("| Student"));
        assert!(table.contains("60.00"));
        assert!(!table.contains("Ben"));
        assert_eq!(table_rows::<StudyRecord>(&[], 5), "(no rows)");
    }
}
