// ============================================
// src/theme.rs
// ライト / ダークテーマの保存と配色
// ============================================

use ratatui::style::Color;

use crate::error::QuizError;
use crate::storage::{KeyValueStore, THEME_KEY};

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// 画面描画で使う色
#[derive(Debug, Copy, Clone)]
pub struct Palette {
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub star: Color,
    pub correct: Color,
    pub incorrect: Color,
    pub selected: Color,
    pub background: Color,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// 保存値から読み取る。不明な値はライト
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "dark" => Self::Dark,
            _ => Self::Light,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// MARK:保存されたテーマを読み込む（なければライト）
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(THEME_KEY) {
            Ok(Some(value)) => Self::parse(&value),
            Ok(None) => Self::default(),
            Err(err) => {
                log::warn!("could not read theme, using light: {err}");
                Self::default()
            }
        }
    }

    pub fn save(self, store: &mut dyn KeyValueStore) -> Result<(), QuizError> {
        store.set(THEME_KEY, self.as_str())
    }

    /// 切り替えボタンの表示（切り替え先を示す）
    pub fn toggle_label(self) -> &'static str {
        match self {
            Self::Light => "🌙 Dark Mode",
            Self::Dark => "☀️ Light Mode",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Self::Light => Palette {
                text: Color::Black,
                muted: Color::DarkGray,
                accent: Color::Blue,
                star: Color::Magenta,
                correct: Color::Green,
                incorrect: Color::Red,
                selected: Color::LightBlue,
                background: Color::White,
            },
            Self::Dark => Palette {
                text: Color::White,
                muted: Color::Gray,
                accent: Color::Cyan,
                star: Color::Yellow,
                correct: Color::LightGreen,
                incorrect: Color::LightRed,
                selected: Color::Blue,
                background: Color::Black,
            },
        }
    }
}
