use std::path::PathBuf;

use abi::{Error, Record};
use tokio::fs;
use tracing::{debug, warn};

/// A data file holding one [`Record`] per line. Every save rewrites the
/// whole file.
#[derive(Debug, Clone)]
pub struct FlatFile {
    path: PathBuf,
}

impl FlatFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read every record up to the first malformed line. A file that is
    /// missing or unreadable loads as empty.
    pub async fn load<T: Record>(&self) -> Vec<T> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) => {
                warn!(
                    "unable to read {}, starting empty: {}",
                    self.path.display(),
                    e
                );
                return vec![];
            }
        };

        let mut records = vec![];
        for (n, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match T::from_line(line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(
                        "{}:{}: {}, ignoring the rest of the file",
                        self.path.display(),
                        n + 1,
                        e
                    );
                    break;
                }
            }
        }
        debug!("loaded {} record(s) from {}", records.len(), self.path.display());
        records
    }

    pub async fn save<T: Record>(&self, records: &[T]) -> Result<(), Error> {
        let mut content = String::new();
        for record in records {
            content.push_str(&record.to_line());
            content.push('\n');
        }
        fs::write(&self.path, content).await?;
        debug!("saved {} record(s) to {}", records.len(), self.path.display());
        Ok(())
    }
}
