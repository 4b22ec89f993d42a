// ============================================
// src/error.rs
// クイズ全体で使うエラー型
// ============================================

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("select at least one question to practice")]
    EmptySelection,
    #[error("select all {required} options in order ({picked} selected)")]
    IncompleteAnswer { picked: usize, required: usize },
    #[error("this question has already been answered")]
    AlreadyAnswered,
    #[error("timer must be between 1 and 3600 seconds (got {0})")]
    InvalidTimerDuration(u32),
    #[error("no question with number {0}")]
    UnknownOrdinal(usize),
    #[error(transparent)]
    Storage(#[from] std::io::Error),
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}
