// ============================================
// src/lib.rs
// JLPT N5 文法「★ ならべかえ」クイズ
// 問題集・統計・出題ロジックはここに、端末 UI は main.rs から使う
// ============================================

pub mod app;
pub mod config;
pub mod error;
pub mod furigana;
pub mod questions;
pub mod selection;
pub mod session;
pub mod stats;
pub mod storage;
pub mod theme;
pub mod ui;

pub use error::QuizError;
