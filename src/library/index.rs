use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::library::naming::id_marker;

/// Ids materialized so far, one per line, appended as items are written.
pub const INDEX_FILE: &str = ".tubestrm-index";
pub const SHOW_SIDECAR: &str = "tvshow.nfo";

/// What already exists in one collection's target directory.
///
/// An id counts as present if the index file lists it or any filename
/// carries its `yt-{id}` marker, so directories written before the index
/// file existed are still recognised.
pub struct LibraryIndex {
    dir: PathBuf,
    filenames: Vec<String>,
    recorded: HashSet<String>,
}

impl LibraryIndex {
    pub async fn scan(dir: &Path) -> std::io::Result<Self> {
        let mut filenames = Vec::new();
        let mut entries = fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if let Some(name) = entry.file_name().to_str() {
                filenames.push(name.to_string());
            }
        }

        let recorded = match fs::read_to_string(dir.join(INDEX_FILE)).await {
            Ok(content) => content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            Err(e) if e.kind() == ErrorKind::NotFound => HashSet::new(),
            Err(e) => return Err(e),
        };

        Ok(Self {
            dir: dir.to_path_buf(),
            filenames,
            recorded,
        })
    }

    pub fn contains(&self, id: &str) -> bool {
        if self.recorded.contains(id) {
            return true;
        }
        let marker = id_marker(id);
        self.filenames.iter().any(|name| name.contains(&marker))
    }

    pub fn has_show_sidecar(&self) -> bool {
        self.filenames.iter().any(|name| name == SHOW_SIDECAR)
    }

    pub async fn record(&mut self, id: &str) -> std::io::Result<()> {
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.dir.join(INDEX_FILE))
            .await?;
        file.write_all(format!("{}\n", id).as_bytes()).await?;
        file.flush().await?;

        self.recorded.insert(id.to_string());
        Ok(())
    }
}
