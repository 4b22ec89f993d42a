// ============================================
// src/app.rs
// 画面の状態遷移とキー入力の処理
// ============================================

use std::collections::BTreeSet;
use std::time::Instant;

use crossterm::event::KeyCode;

use crate::config::TIMER_PRESETS;
use crate::error::QuizError;
use crate::questions::Catalog;
use crate::selection::{self, SessionKind};
use crate::session::{
    PracticeResults, PracticeSession, StudyCursor, Submission, TimedResults, TimedSession,
};
use crate::stats::{self, StatisticsStore};
use crate::storage::KeyValueStore;
use crate::theme::Theme;

/// メインメニューの項目
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MenuItem {
    Practice,
    Timer,
    Study,
    Statistics,
    Theme,
    Quit,
}

pub const MENU_ITEMS: [MenuItem; 6] = [
    MenuItem::Practice,
    MenuItem::Timer,
    MenuItem::Study,
    MenuItem::Statistics,
    MenuItem::Theme,
    MenuItem::Quit,
];

/// 統計画面の状態
#[derive(Debug, Clone, Default)]
pub struct StatsView {
    pub stats: StatisticsStore,
    /// 正答率順リストの中のカーソル位置
    pub cursor: usize,
    /// 復習用に選ばれた問題番号
    pub selected: BTreeSet<usize>,
    /// 「全消去しますか？」の確認中
    pub confirm_clear: bool,
}

impl StatsView {
    fn new(stats: StatisticsStore) -> Self {
        Self {
            stats,
            ..Self::default()
        }
    }

    fn move_cursor(&mut self, down: bool) {
        let len = self.stats.len();
        if len == 0 {
            return;
        }
        self.cursor = if down {
            (self.cursor + 1).min(len - 1)
        } else {
            self.cursor.saturating_sub(1)
        };
    }

    /// カーソル位置の問題を選択 / 解除する（問題集にない番号は選べない）
    fn toggle_selected(&mut self, catalog: &Catalog) {
        let ordinal = self
            .stats
            .rank()
            .get(self.cursor)
            .and_then(|(_, agg)| agg.ordinal)
            .filter(|&ordinal| catalog.get(ordinal).is_some());
        if let Some(ordinal) = ordinal {
            if !self.selected.remove(&ordinal) {
                self.selected.insert(ordinal);
            }
        }
    }
}

pub enum Screen<'a> {
    Menu { selected: usize },
    Practice { session: PracticeSession<'a>, review: bool },
    PracticeResults { results: PracticeResults, review: bool },
    TimerSetup { preset: usize },
    Timed(TimedSession<'a>),
    TimedResults(TimedResults<'a>),
    Study(StudyCursor),
    Stats(StatsView),
}

/// アプリ全体の状態を管理する
pub struct App<'a> {
    catalog: &'a Catalog,
    store: Box<dyn KeyValueStore>,
    theme: Theme,
    show_readings: bool,
    screen: Screen<'a>,
    /// 画面下に出す一行メッセージ（警告など）
    status: Option<String>,
    should_quit: bool,
}

impl<'a> App<'a> {
    pub fn new(catalog: &'a Catalog, store: Box<dyn KeyValueStore>) -> Self {
        let theme = Theme::load(&*store);
        Self {
            catalog,
            store,
            theme,
            show_readings: true,
            screen: Screen::Menu { selected: 0 },
            status: None,
            should_quit: false,
        }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    pub fn screen(&self) -> &Screen<'a> {
        &self.screen
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn show_readings(&self) -> bool {
        self.show_readings
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        &*self.store
    }

    // --------------------------------------------------
    // モード開始
    // --------------------------------------------------

    pub fn back_to_menu(&mut self) {
        self.screen = Screen::Menu { selected: 0 };
    }

    /// ランダム 15 問の練習
    pub fn start_practice(&mut self) {
        let questions = selection::sample(self.catalog, SessionKind::Practice, &mut rand::rng());
        match PracticeSession::new(questions) {
            Ok(session) => {
                log::info!("practice started with {} questions", session.progress().1);
                self.screen = Screen::Practice {
                    session,
                    review: false,
                };
            }
            Err(err) => self.status = Some(err.to_string()),
        }
    }

    /// 選んだ問題だけで練習（復習）
    pub fn start_review<I>(&mut self, ordinals: I) -> Result<(), QuizError>
    where
        I: IntoIterator<Item = usize>,
    {
        let questions = selection::resolve(self.catalog, ordinals)?;
        let session = PracticeSession::new(questions)?;
        log::info!("review started with {} questions", session.progress().1);
        self.screen = Screen::Practice {
            session,
            review: true,
        };
        Ok(())
    }

    pub fn start_timer(&mut self, seconds: u32, now: Instant) {
        let questions = selection::sample(self.catalog, SessionKind::Timed, &mut rand::rng());
        match TimedSession::new(questions, seconds, now) {
            Ok(session) => {
                log::info!("timed challenge started: {seconds}s");
                self.screen = Screen::Timed(session);
            }
            Err(err) => self.status = Some(err.to_string()),
        }
    }

    /// 学習モードを `ordinal` 番の問題から始める
    pub fn start_study(&mut self, ordinal: usize) -> Result<(), QuizError> {
        let question = selection::lookup(self.catalog, ordinal)?;
        log::debug!("study mode from #{ordinal}: {}", question.identity());
        let cursor = StudyCursor::at(ordinal, self.catalog.len())
            .ok_or(QuizError::UnknownOrdinal(ordinal))?;
        self.screen = Screen::Study(cursor);
        Ok(())
    }

    pub fn open_stats(&mut self) {
        let stats = StatisticsStore::load(&*self.store);
        self.screen = Screen::Stats(StatsView::new(stats));
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        log::info!("theme switched to {}", self.theme.as_str());
        if let Err(err) = self.theme.save(&mut *self.store) {
            log::warn!("could not save theme: {err}");
            self.status = Some(format!("Theme not saved: {err}"));
        }
    }

    // --------------------------------------------------
    // 入力処理
    // --------------------------------------------------

    /// タイマーを進める（イベントループから毎回呼ぶ）
    pub fn tick(&mut self, now: Instant) {
        if let Screen::Timed(session) = &mut self.screen {
            if let Some(results) = session.tick(now) {
                self.screen = Screen::TimedResults(results);
            }
        }
    }

    pub fn handle_key(&mut self, code: KeyCode, now: Instant) {
        // 読みがなの表示切り替えはどの画面でも
        if code == KeyCode::Char('f') {
            self.show_readings = !self.show_readings;
            return;
        }
        self.status = None;

        match self.screen {
            Screen::Menu { .. } => self.handle_menu_key(code),
            Screen::Practice { .. } => self.handle_practice_key(code),
            Screen::Timed(_) => self.handle_timed_key(code),
            Screen::TimerSetup { .. } => self.handle_timer_setup_key(code, now),
            Screen::Study(_) => self.handle_study_key(code),
            Screen::Stats(_) => self.handle_stats_key(code),
            Screen::PracticeResults { .. } | Screen::TimedResults(_) => {
                if matches!(code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q')) {
                    self.back_to_menu();
                }
            }
        }
    }

    fn handle_menu_key(&mut self, code: KeyCode) {
        let Screen::Menu { selected } = &mut self.screen else {
            return;
        };
        let item = match code {
            KeyCode::Up => {
                *selected = selected.saturating_sub(1);
                return;
            }
            KeyCode::Down => {
                *selected = (*selected + 1).min(MENU_ITEMS.len() - 1);
                return;
            }
            KeyCode::Enter => MENU_ITEMS[*selected],
            KeyCode::Char(c @ '1'..='6') => MENU_ITEMS[c as usize - '1' as usize],
            KeyCode::Char('t') => MenuItem::Theme,
            KeyCode::Esc | KeyCode::Char('q') => MenuItem::Quit,
            _ => return,
        };

        match item {
            MenuItem::Practice => self.start_practice(),
            MenuItem::Timer => self.screen = Screen::TimerSetup { preset: 2 },
            MenuItem::Study => {
                if let Err(err) = self.start_study(1) {
                    self.status = Some(err.to_string());
                }
            }
            MenuItem::Statistics => self.open_stats(),
            MenuItem::Theme => self.toggle_theme(),
            MenuItem::Quit => self.should_quit = true,
        }
    }

    fn handle_timer_setup_key(&mut self, code: KeyCode, now: Instant) {
        let Screen::TimerSetup { preset } = &mut self.screen else {
            return;
        };
        match code {
            KeyCode::Up | KeyCode::Left => *preset = preset.saturating_sub(1),
            KeyCode::Down | KeyCode::Right => {
                *preset = (*preset + 1).min(TIMER_PRESETS.len() - 1)
            }
            KeyCode::Char(c @ '1'..='4') => *preset = c as usize - '1' as usize,
            KeyCode::Enter => {
                let seconds = TIMER_PRESETS[*preset] * 60;
                self.start_timer(seconds, now);
            }
            KeyCode::Esc => self.back_to_menu(),
            _ => {}
        }
    }

    fn handle_practice_key(&mut self, code: KeyCode) {
        let Screen::Practice { session, review } = &mut self.screen else {
            return;
        };
        match code {
            KeyCode::Char(c @ '1'..='4') => session.toggle(c as u8 - b'0'),
            KeyCode::Char('s') => {
                session.skip();
            }
            KeyCode::Enter if session.reveal().is_some() => {
                if !session.next() {
                    let results = session.results();
                    log::info!("practice finished: {}/{}", results.score, results.total);
                    let review = *review;
                    self.screen = Screen::PracticeResults { results, review };
                }
            }
            KeyCode::Enter => match session.submit() {
                Ok(submission) => {
                    self.status = record_attempt(&mut *self.store, self.catalog, submission);
                }
                Err(err) => self.status = Some(err.to_string()),
            },
            KeyCode::Esc => {
                log::info!("practice abandoned");
                self.back_to_menu();
            }
            _ => {}
        }
    }

    fn handle_timed_key(&mut self, code: KeyCode) {
        let Screen::Timed(session) = &mut self.screen else {
            return;
        };
        match code {
            KeyCode::Char(c @ '1'..='4') => session.toggle(c as u8 - b'0'),
            KeyCode::Char('s') => {
                if let Some(submission) = session.skip() {
                    self.status = record_attempt(&mut *self.store, self.catalog, submission);
                }
            }
            KeyCode::Enter if session.reveal().is_some() => {
                if let Some(results) = session.next() {
                    self.screen = Screen::TimedResults(results);
                }
            }
            KeyCode::Enter => match session.submit() {
                Ok(submission) => {
                    self.status = record_attempt(&mut *self.store, self.catalog, submission);
                }
                Err(err) => self.status = Some(err.to_string()),
            },
            KeyCode::Esc => {
                // 途中でやめた場合は結果を出さずに戻る
                session.finish();
                log::info!("timed challenge abandoned");
                self.back_to_menu();
            }
            _ => {}
        }
    }

    fn handle_study_key(&mut self, code: KeyCode) {
        let Screen::Study(cursor) = &mut self.screen else {
            return;
        };
        match code {
            KeyCode::Left | KeyCode::Char('p') => cursor.previous(),
            KeyCode::Right | KeyCode::Enter | KeyCode::Char('n') => {
                if !cursor.next() {
                    self.back_to_menu();
                }
            }
            KeyCode::Esc => self.back_to_menu(),
            _ => {}
        }
    }

    fn handle_stats_key(&mut self, code: KeyCode) {
        let Screen::Stats(view) = &mut self.screen else {
            return;
        };

        if view.confirm_clear {
            view.confirm_clear = false;
            if code == KeyCode::Char('y') {
                match StatisticsStore::reset(&mut *self.store) {
                    Ok(()) => *view = StatsView::default(),
                    Err(err) => self.status = Some(format!("Could not clear statistics: {err}")),
                }
            }
            return;
        }

        match code {
            KeyCode::Up => view.move_cursor(false),
            KeyCode::Down => view.move_cursor(true),
            KeyCode::Char(' ') => view.toggle_selected(self.catalog),
            KeyCode::Char('c') if !view.stats.is_empty() => view.confirm_clear = true,
            KeyCode::Enter => {
                let selected: Vec<usize> = view.selected.iter().copied().collect();
                if let Err(err) = self.start_review(selected) {
                    self.status = Some(err.to_string());
                }
            }
            KeyCode::Esc => self.back_to_menu(),
            _ => {}
        }
    }
}

/// 統計に 1 回分を記録する。保存に失敗したら画面に出す警告文を返す
fn record_attempt(
    store: &mut dyn KeyValueStore,
    catalog: &Catalog,
    submission: Submission<'_>,
) -> Option<String> {
    match stats::record(store, catalog, submission.question, submission.correct) {
        Ok(()) => None,
        Err(err) => {
            log::warn!("could not save statistics: {err}");
            Some(format!("⚠ Statistics not saved: {err}"))
        }
    }
}
