use crate::error::ScrapeError;
use crate::results::OutputRecord;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Destination for scraped records
pub trait OutputSink: Send + Sync {
    fn push_data(&self, record: &OutputRecord) -> Result<(), ScrapeError>;
}

/// Stores each record as its own numbered JSON file (`000000001.json`, ...) in a directory
#[derive(Debug)]
pub struct DatasetSink {
    dir: PathBuf,
    next_index: Mutex<usize>,
}

impl DatasetSink {
    /// Open (and create) the dataset directory, continuing after any items already in it
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, ScrapeError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        // Items may have gaps; resume after the highest index, not the count
        let mut max_index = 0;
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            if let Some(index) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.parse::<usize>().ok())
            {
                max_index = max_index.max(index);
            }
        }
        ::log::debug!(
            "Dataset {} resumes after item {}",
            dir.display(),
            max_index
        );

        Ok(Self {
            dir,
            next_index: Mutex::new(max_index + 1),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl OutputSink for DatasetSink {
    fn push_data(&self, record: &OutputRecord) -> Result<(), ScrapeError> {
        let mut next_index = self
            .next_index
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let path = self.dir.join(format!("{:09}.json", *next_index));
        fs::write(&path, serde_json::to_vec_pretty(record)?)?;
        *next_index += 1;

        ::log::debug!("Stored record for {} at {}", record.url, path.display());
        Ok(())
    }
}

/// Keeps records in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<OutputRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<OutputRecord> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl OutputSink for MemorySink {
    fn push_data(&self, record: &OutputRecord) -> Result<(), ScrapeError> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(record.clone());
        Ok(())
    }
}
