// ============================================
// src/config.rs
// データ保存先とログ設定
// ============================================

use std::path::PathBuf;

use directories::ProjectDirs;
use log::LevelFilter;

const LOG_FILE: &str = "narabe.log";

/// 練習モードで出題する問題数
pub const PRACTICE_SIZE: usize = 15;
/// タイマーの上限（秒）
pub const MAX_TIMER_SECONDS: u32 = 3600;
/// タイマーのプリセット（分）
pub const TIMER_PRESETS: [u32; 4] = [1, 3, 5, 10];
/// 残り時間がこれ以下なら警告表示
pub const TIMER_WARNING_SECONDS: u32 = 10;

/// 起動時に決まる設定
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    /// None なら RUST_LOG（未設定なら info）に従う
    pub log_level: Option<LevelFilter>,
}

impl Config {
    pub fn new(data_dir: Option<PathBuf>, log_level: Option<LevelFilter>) -> Self {
        Self {
            data_dir: data_dir.unwrap_or_else(default_data_dir),
            log_level,
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE)
    }
}

// MARK:OSごとのデータ保存用ディレクトリ
fn default_data_dir() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("jp", "narabe", "NARABE") {
        return proj_dirs.data_dir().to_path_buf();
    }
    // 取得できなかったらカレントディレクトリに（フォールバック）
    PathBuf::from(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_data_dir_wins() {
        let config = Config::new(Some(PathBuf::from("/tmp/narabe-test")), None);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/narabe-test"));
        assert_eq!(config.log_path(), PathBuf::from("/tmp/narabe-test/narabe.log"));
    }

    #[test]
    fn default_data_dir_is_not_empty() {
        let config = Config::new(None, Some(LevelFilter::Debug));
        assert!(!config.data_dir.as_os_str().is_empty());
        assert_eq!(config.log_level, Some(LevelFilter::Debug));
    }

    #[test]
    fn timer_presets_fit_within_the_limit() {
        assert!(TIMER_PRESETS.iter().all(|&m| m > 0 && m * 60 <= MAX_TIMER_SECONDS));
        assert!(TIMER_WARNING_SECONDS < MAX_TIMER_SECONDS);
    }
}
