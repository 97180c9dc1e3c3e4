use crate::adapters::memory::{scores_in_pack, top_entries};
use crate::domain::model::{PackId, ScoreEntry};
use crate::domain::ports::ScoreRepository;
use crate::utils::error::{GameError, Result};
use async_trait::async_trait;
use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

/// 以 JSON 檔保存排行榜。寫入時先寫暫存檔再替換，避免寫到一半的檔案。
#[derive(Debug, Clone)]
pub struct JsonFileScoreRepository {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl JsonFileScoreRepository {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<ScoreEntry>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(GameError::persistence(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            GameError::persistence(format!("Corrupt leaderboard {}: {}", self.path.display(), e))
        })
    }

    fn save(&self, entries: &[ScoreEntry]) -> Result<()> {
        let parent_dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let write = || -> std::result::Result<(), Box<dyn std::error::Error>> {
            fs::create_dir_all(parent_dir)?;
            let temp_file = NamedTempFile::new_in(parent_dir)?;
            let mut writer = BufWriter::new(&temp_file);
            serde_json::to_writer_pretty(&mut writer, entries)?;
            writer.flush()?;
            drop(writer);
            temp_file.persist(&self.path)?;
            Ok(())
        };

        write().map_err(|e| {
            GameError::persistence(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }
}

#[async_trait]
impl ScoreRepository for JsonFileScoreRepository {
    async fn submit(&self, entry: ScoreEntry) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load()?;
        entries.push(entry);
        self.save(&entries)?;
        tracing::debug!(
            "Leaderboard {} now holds {} entries",
            self.path.display(),
            entries.len()
        );
        Ok(())
    }

    async fn top_scores(&self, pack_id: PackId, limit: usize) -> Result<Vec<ScoreEntry>> {
        let _guard = self.write_lock.lock().await;
        Ok(top_entries(&self.load()?, pack_id, limit))
    }

    async fn all_scores(&self, pack_id: PackId) -> Result<Vec<u32>> {
        let _guard = self.write_lock.lock().await;
        Ok(scores_in_pack(&self.load()?, pack_id))
    }
}
