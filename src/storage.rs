// ============================================
// src/storage.rs
// キーと値の永続化（統計データ・テーマ）
// ============================================

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::QuizError;

/// 統計データ全体を保存するキー
pub const STATS_KEY: &str = "jlpt_n5_stats";
/// テーマ（light / dark）を保存するキー
pub const THEME_KEY: &str = "jlpt_n5_theme";

/// 文字列の値をキーごとに丸ごと読み書きするストア
pub trait KeyValueStore {
    /// キーがなければ `Ok(None)`
    fn get(&self, key: &str) -> Result<Option<String>, QuizError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), QuizError>;
    fn remove(&mut self, key: &str) -> Result<(), QuizError>;
}

/// データディレクトリにキー名のファイルとして保存するストア
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// ディレクトリがまだなければ作成する
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, QuizError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, QuizError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), QuizError> {
        // 一時ファイルに書いてから置き換える（途中で落ちても前の内容が残る）
        let path = self.path_for(key);
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), QuizError> {
        match fs::remove_file(self.path_for(key)) {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

/// メモリ上だけのストア（テストや一時的なプレイ用）
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, QuizError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), QuizError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), QuizError> {
        self.entries.remove(key);
        Ok(())
    }
}
