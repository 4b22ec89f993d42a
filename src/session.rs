// ============================================
// src/session.rs
// 出題中の状態（練習・タイムアタック・学習モード）
// ============================================

use std::time::{Duration, Instant};

use crate::config::{MAX_TIMER_SECONDS, TIMER_WARNING_SECONDS};
use crate::error::QuizError;
use crate::questions::{OPTION_COUNT, Question};

/// 解答が正しいか（順番も含めて完全一致）。長さが違えば不正解
pub fn evaluate(user_order: &[u8], correct_order: &[u8]) -> bool {
    user_order == correct_order
}

/// 分と秒から制限時間を作る（1 〜 3600 秒）
pub fn timer_seconds(minutes: u32, seconds: u32) -> Result<u32, QuizError> {
    let total = minutes.saturating_mul(60).saturating_add(seconds);
    if total == 0 || total > MAX_TIMER_SECONDS {
        return Err(QuizError::InvalidTimerDuration(total));
    }
    Ok(total)
}

// --------------------------------------------------
// 選択肢の選択
// --------------------------------------------------

/// ユーザーが選んだ選択肢番号（1 始まり）の並び
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerPicks {
    order: Vec<u8>,
}

impl AnswerPicks {
    /// 選択済みなら外し、未選択なら末尾に追加する（最大 4 つ）
    pub fn toggle(&mut self, option: u8) {
        if let Some(pos) = self.position_of(option) {
            self.order.remove(pos);
        } else if self.order.len() < OPTION_COUNT && (1..=OPTION_COUNT as u8).contains(&option) {
            self.order.push(option);
        }
    }

    /// 何番目に選ばれたか（0 始まり）
    pub fn position_of(&self, option: u8) -> Option<usize> {
        self.order.iter().position(|&n| n == option)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.order.len() == OPTION_COUNT
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }
}

// --------------------------------------------------
// 出題の共通部分
// --------------------------------------------------

/// 現在の問題に対する結果表示の状態
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Reveal {
    Correct,
    Incorrect,
    Skipped,
}

/// 解答済みの 1 問（結果画面の復習用）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsweredQuestion<'a> {
    pub question: &'a Question,
    pub user_answer: Vec<u8>,
    pub correct: bool,
}

/// 統計に記録すべき 1 回分の結果
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Submission<'a> {
    pub question: &'a Question,
    pub correct: bool,
}

/// 出題リストとカーソル、選択状態をまとめたもの
#[derive(Debug, Clone)]
struct Round<'a> {
    questions: Vec<&'a Question>,
    cursor: usize,
    picks: AnswerPicks,
    reveal: Option<Reveal>,
    answered: Vec<AnsweredQuestion<'a>>,
    correct_count: usize,
}

impl<'a> Round<'a> {
    fn new(questions: Vec<&'a Question>) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::EmptySelection);
        }
        Ok(Self {
            questions,
            cursor: 0,
            picks: AnswerPicks::default(),
            reveal: None,
            answered: Vec::new(),
            correct_count: 0,
        })
    }

    fn current(&self) -> Option<&'a Question> {
        self.questions.get(self.cursor).copied()
    }

    fn toggle(&mut self, option: u8) {
        if self.reveal.is_none() {
            self.picks.toggle(option);
        }
    }

    fn submit(&mut self) -> Result<Submission<'a>, QuizError> {
        if self.reveal.is_some() {
            return Err(QuizError::AlreadyAnswered);
        }
        let question = self.current().ok_or(QuizError::AlreadyAnswered)?;
        if !self.picks.is_complete() {
            return Err(QuizError::IncompleteAnswer {
                picked: self.picks.len(),
                required: OPTION_COUNT,
            });
        }

        let correct = evaluate(self.picks.as_slice(), &question.correct_order);
        if correct {
            self.correct_count += 1;
        }
        self.answered.push(AnsweredQuestion {
            question,
            user_answer: self.picks.as_slice().to_vec(),
            correct,
        });
        self.reveal = Some(if correct { Reveal::Correct } else { Reveal::Incorrect });
        Ok(Submission { question, correct })
    }

    fn skip(&mut self) -> Option<&'a Question> {
        if self.reveal.is_some() {
            return None;
        }
        let question = self.current()?;
        self.reveal = Some(Reveal::Skipped);
        Some(question)
    }

    /// 次の問題へ。もう問題がなければ false
    fn advance(&mut self) -> bool {
        self.cursor += 1;
        self.picks.clear();
        self.reveal = None;
        self.cursor < self.questions.len()
    }
}

// --------------------------------------------------
// 練習モード
// --------------------------------------------------

/// 練習モードの結果
#[derive(Debug, Clone, PartialEq)]
pub struct PracticeResults {
    pub score: usize,
    pub total: usize,
    pub percent: f64,
    pub message: &'static str,
}

/// 練習モード（ランダム 15 問、または選んだ問題の復習）
#[derive(Debug, Clone)]
pub struct PracticeSession<'a> {
    round: Round<'a>,
}

impl<'a> PracticeSession<'a> {
    pub fn new(questions: Vec<&'a Question>) -> Result<Self, QuizError> {
        Ok(Self {
            round: Round::new(questions)?,
        })
    }

    pub fn current(&self) -> Option<&'a Question> {
        self.round.current()
    }

    /// (何問目, 全体) 1 始まり
    pub fn progress(&self) -> (usize, usize) {
        (self.round.cursor + 1, self.round.questions.len())
    }

    pub fn picks(&self) -> &AnswerPicks {
        &self.round.picks
    }

    pub fn reveal(&self) -> Option<Reveal> {
        self.round.reveal
    }

    pub fn score(&self) -> usize {
        self.round.correct_count
    }

    pub fn toggle(&mut self, option: u8) {
        self.round.toggle(option);
    }

    pub fn submit(&mut self) -> Result<Submission<'a>, QuizError> {
        self.round.submit()
    }

    /// 答えを見る。得点にも統計にも数えない
    pub fn skip(&mut self) -> Option<&'a Question> {
        self.round.skip()
    }

    /// 次の問題へ。最後の問題だったら false（結果表示へ）
    pub fn next(&mut self) -> bool {
        self.round.advance()
    }

    pub fn results(&self) -> PracticeResults {
        let score = self.round.correct_count;
        let total = self.round.questions.len();
        PracticeResults {
            score,
            total,
            percent: percent(score, total),
            message: practice_message(score, total),
        }
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

fn practice_message(score: usize, total: usize) -> &'static str {
    let ratio = if total == 0 { 0.0 } else { score as f64 / total as f64 };
    if score == total {
        "🌟 Perfect! You're ready for N5! 🌟"
    } else if ratio >= 0.8 {
        "👍 Great work! Keep practicing!"
    } else if ratio >= 0.6 {
        "📚 Good progress! Review the explanations and try again."
    } else {
        "💪 Keep studying! Practice makes perfect!"
    }
}

// --------------------------------------------------
// タイマー
// --------------------------------------------------

/// 1 秒ごとに減るカウントダウン
#[derive(Debug, Clone)]
pub struct Countdown {
    remaining: u32,
    next_tick: Instant,
    cancelled: bool,
}

impl Countdown {
    pub fn start(seconds: u32, now: Instant) -> Self {
        Self {
            remaining: seconds,
            next_tick: now + Duration::from_secs(1),
            cancelled: false,
        }
    }

    /// 経過した秒数分だけ減らし、残り秒数を返す
    pub fn poll(&mut self, now: Instant) -> u32 {
        while !self.cancelled && self.remaining > 0 && now >= self.next_tick {
            self.remaining -= 1;
            self.next_tick += Duration::from_secs(1);
        }
        self.remaining
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    /// 止める。最初の 1 回だけ true
    pub fn cancel(&mut self) -> bool {
        !std::mem::replace(&mut self.cancelled, true)
    }

    pub fn is_warning(&self) -> bool {
        self.remaining <= TIMER_WARNING_SECONDS
    }

    /// "m:ss" 形式
    pub fn display(&self) -> String {
        format!("{}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}

// --------------------------------------------------
// タイムアタック
// --------------------------------------------------

/// タイムアタックの結果
#[derive(Debug, Clone, PartialEq)]
pub struct TimedResults<'a> {
    pub correct: usize,
    pub answered: usize,
    pub accuracy_percent: f64,
    pub message: &'static str,
    /// 間違えた（スキップした）問題
    pub to_review: Vec<&'a Question>,
}

/// タイムアタック（全問をランダム順で、時間切れまで）
#[derive(Debug, Clone)]
pub struct TimedSession<'a> {
    round: Round<'a>,
    countdown: Countdown,
    finished: bool,
}

impl<'a> TimedSession<'a> {
    pub fn new(questions: Vec<&'a Question>, seconds: u32, now: Instant) -> Result<Self, QuizError> {
        Ok(Self {
            round: Round::new(questions)?,
            countdown: Countdown::start(seconds, now),
            finished: false,
        })
    }

    pub fn current(&self) -> Option<&'a Question> {
        if self.finished {
            return None;
        }
        self.round.current()
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn picks(&self) -> &AnswerPicks {
        &self.round.picks
    }

    pub fn reveal(&self) -> Option<Reveal> {
        self.round.reveal
    }

    /// (正解数, 解答数)
    pub fn tally(&self) -> (usize, usize) {
        (self.round.correct_count, self.round.answered.len())
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn toggle(&mut self, option: u8) {
        if !self.finished {
            self.round.toggle(option);
        }
    }

    pub fn submit(&mut self) -> Result<Submission<'a>, QuizError> {
        if self.finished {
            return Err(QuizError::AlreadyAnswered);
        }
        self.round.submit()
    }

    /// スキップは不正解として数える
    pub fn skip(&mut self) -> Option<Submission<'a>> {
        if self.finished {
            return None;
        }
        let question = self.round.skip()?;
        self.round.answered.push(AnsweredQuestion {
            question,
            user_answer: Vec::new(),
            correct: false,
        });
        Some(Submission {
            question,
            correct: false,
        })
    }

    /// 次の問題へ。問題を出し切ったら終了して結果を返す
    pub fn next(&mut self) -> Option<TimedResults<'a>> {
        if self.finished {
            return None;
        }
        if self.round.advance() {
            None
        } else {
            self.finish()
        }
    }

    /// タイマーを進める。時間切れになったら終了して結果を返す
    pub fn tick(&mut self, now: Instant) -> Option<TimedResults<'a>> {
        if self.countdown.poll(now) == 0 {
            self.finish()
        } else {
            None
        }
    }

    /// 終了処理。何度呼んでも結果を返すのは最初の 1 回だけ
    pub fn finish(&mut self) -> Option<TimedResults<'a>> {
        if self.finished {
            return None;
        }
        self.finished = true;
        self.countdown.cancel();

        let (correct, answered) = self.tally();
        let accuracy_percent = percent(correct, answered);
        log::info!("timed challenge finished: {correct}/{answered}");
        Some(TimedResults {
            correct,
            answered,
            accuracy_percent,
            message: timed_message(correct, answered, accuracy_percent),
            to_review: self
                .round
                .answered
                .iter()
                .filter(|a| !a.correct)
                .map(|a| a.question)
                .collect(),
        })
    }
}

fn timed_message(correct: usize, answered: usize, accuracy_percent: f64) -> &'static str {
    if correct == answered && answered > 0 {
        "🌟 Perfect! You didn't miss a single question! 🌟"
    } else if accuracy_percent >= 80.0 {
        "⚡ Excellent speed and accuracy!"
    } else if accuracy_percent >= 60.0 {
        "👍 Good work! Keep practicing to improve your speed!"
    } else {
        "💪 Keep practicing! Focus on accuracy before speed!"
    }
}

// --------------------------------------------------
// 学習モード
// --------------------------------------------------

/// 問題集を順番に眺めるためのカーソル（0 始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StudyCursor {
    index: usize,
    len: usize,
}

impl StudyCursor {
    /// `ordinal` は 1 始まり。範囲外なら None
    pub fn at(ordinal: usize, len: usize) -> Option<Self> {
        let index = ordinal.checked_sub(1)?;
        (index < len).then_some(Self { index, len })
    }

    pub fn ordinal(&self) -> usize {
        self.index + 1
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.len
    }

    pub fn previous(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    /// 次へ。最後の問題なら false（学習終了）
    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.index += 1;
        true
    }
}
