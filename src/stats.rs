// ============================================
// src/stats.rs
// 問題ごとの正誤統計の構造と読み書き・集計ロジック
// ============================================

use std::io::ErrorKind;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::QuizError;
use crate::questions::{Catalog, Question};
use crate::storage::{KeyValueStore, STATS_KEY};

/// 1 つの問題（キー）に対する累計
///
/// `total == correct + incorrect` を常に保つ。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptAggregate {
    pub correct: u32,
    pub incorrect: u32,
    pub total: u32,
    #[serde(default)]
    pub translation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_answer: Option<String>,
    /// 問題集の番号（1 始まり）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordinal: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_attempt: Option<DateTime<Utc>>,
}

impl AttemptAggregate {
    fn new(catalog: &Catalog, question: &Question) -> Self {
        Self {
            correct: 0,
            incorrect: 0,
            total: 0,
            translation: question.translation.to_string(),
            full_answer: Some(question.full_answer()),
            ordinal: catalog.ordinal_of(question),
            last_attempt: None,
        }
    }

    /// 正答率（0.0 〜 1.0）
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        f64::from(self.correct) / f64::from(self.total)
    }

    pub fn accuracy_percent(&self) -> f64 {
        self.accuracy() * 100.0
    }

    pub fn strength(&self) -> Strength {
        Strength::from_percent(self.accuracy_percent())
    }
}

/// 正答率による分類
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Strength {
    Weak,   // 50% 未満
    Medium, // 50% 以上 80% 未満
    Strong, // 80% 以上
}

impl Strength {
    pub fn from_percent(percent: f64) -> Self {
        if percent < 50.0 {
            Self::Weak
        } else if percent < 80.0 {
            Self::Medium
        } else {
            Self::Strong
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Weak => "weak",
            Self::Medium => "medium",
            Self::Strong => "strong",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Weak => "❌",
            Self::Medium => "⚠️",
            Self::Strong => "✅",
        }
    }
}

/// 全体の成績
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverallSummary {
    pub attempts: u32,
    pub correct: u32,
    pub incorrect: u32,
    /// 0.0 〜 100.0。挑戦がなければ 0
    pub accuracy_percent: f64,
}

/// キー（"前★後"）→ 累計 の対応表。保存・読み込みは常に丸ごと
///
/// 挿入順を保つので、同じ正答率の問題は最初に記録された順に並ぶ。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatisticsStore {
    entries: IndexMap<String, AttemptAggregate>,
}

impl StatisticsStore {
    /// MARK:ストアから読み込む（なければ空、中身が壊れていても空）
    ///
    /// 読み込み自体の失敗（I/O エラー）はそのまま返す。
    pub fn try_load(store: &dyn KeyValueStore) -> Result<Self, QuizError> {
        let raw = match store.get(STATS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(Self::default()),
            // UTF-8 として読めないのは中身が壊れている扱い
            Err(QuizError::Storage(err)) if err.kind() == ErrorKind::InvalidData => {
                log::warn!("statistics document is not valid text, treating as empty: {err}");
                return Ok(Self::default());
            }
            Err(err) => return Err(err),
        };

        match serde_json::from_str(&raw) {
            Ok(stats) => Ok(stats),
            Err(err) => {
                // 壊れたデータは捨てて空から始める（次の保存で上書きされる）
                log::warn!("statistics document is corrupted, treating as empty: {err}");
                Ok(Self::default())
            }
        }
    }

    /// 表示用の読み込み。失敗したら警告を出して空にする
    pub fn load(store: &dyn KeyValueStore) -> Self {
        Self::try_load(store).unwrap_or_else(|err| {
            log::warn!("could not read statistics, showing none: {err}");
            Self::default()
        })
    }

    /// MARK:ストアへ丸ごと保存する
    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), QuizError> {
        let json = serde_json::to_string_pretty(self)?;
        store.set(STATS_KEY, &json)?;
        log::debug!("saved statistics for {} questions", self.entries.len());
        Ok(())
    }

    /// 保存されている統計をすべて消す
    pub fn reset(store: &mut dyn KeyValueStore) -> Result<(), QuizError> {
        store.remove(STATS_KEY)?;
        log::info!("statistics cleared");
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, identity: &str) -> Option<&AttemptAggregate> {
        self.entries.get(identity)
    }

    /// 1 回分の結果を加算する（メモリ上のみ）
    pub fn apply(
        &mut self,
        catalog: &Catalog,
        question: &Question,
        was_correct: bool,
        at: DateTime<Utc>,
    ) {
        let entry = self
            .entries
            .entry(question.identity())
            .or_insert_with(|| AttemptAggregate::new(catalog, question));

        if was_correct {
            entry.correct += 1;
        } else {
            entry.incorrect += 1;
        }
        entry.total += 1;
        entry.last_attempt = Some(at);
    }

    /// 正答率の低い順に並べる。同じ正答率なら元の順序を保つ（安定ソート）
    pub fn rank(&self) -> Vec<(&str, &AttemptAggregate)> {
        let mut ranked: Vec<(&str, &AttemptAggregate)> = self
            .entries
            .iter()
            .map(|(key, agg)| (key.as_str(), agg))
            .collect();
        ranked.sort_by(|a, b| a.1.accuracy().total_cmp(&b.1.accuracy()));
        ranked
    }

    pub fn summary(&self) -> OverallSummary {
        let (attempts, correct, incorrect) =
            self.entries.values().fold((0, 0, 0), |(t, c, i), agg| {
                (t + agg.total, c + agg.correct, i + agg.incorrect)
            });
        let accuracy_percent = if attempts > 0 {
            f64::from(correct) / f64::from(attempts) * 100.0
        } else {
            0.0
        };
        OverallSummary {
            attempts,
            correct,
            incorrect,
            accuracy_percent,
        }
    }
}

/// 解答を 1 回記録する: 全体を読み込み、加算し、全体を書き戻す
///
/// 読み込みに失敗したときは何も書かない。
pub fn record(
    store: &mut dyn KeyValueStore,
    catalog: &Catalog,
    question: &Question,
    was_correct: bool,
) -> Result<(), QuizError> {
    let mut stats = StatisticsStore::try_load(store)?;
    stats.apply(catalog, question, was_correct, Utc::now());
    stats.save(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questions::QUESTIONS_LIST;
    use crate::storage::MemoryStore;
    use std::cell::Cell;

    /// 次の 1 回だけ読み込みに失敗するストア
    struct FlakyStore {
        inner: MemoryStore,
        fail_next_get: Cell<bool>,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>, QuizError> {
            if self.fail_next_get.replace(false) {
                return Err(std::io::Error::other("EIO").into());
            }
            self.inner.get(key)
        }
        fn set(&mut self, key: &str, value: &str) -> Result<(), QuizError> {
            self.inner.set(key, value)
        }
        fn remove(&mut self, key: &str) -> Result<(), QuizError> {
            self.inner.remove(key)
        }
    }

    fn question(before: &'static str, after: &'static str) -> Question {
        Question {
            before,
            after,
            ..QUESTIONS_LIST[0]
        }
    }

    #[test]
    fn record_creates_entry_with_cached_fields() {
        let catalog = Catalog::builtin();
        let q = catalog.questions()[4];
        let mut store = MemoryStore::new();

        record(&mut store, &catalog, &q, true).unwrap();

        let stats = StatisticsStore::load(&store);
        let agg = stats.get(&q.identity()).unwrap();
        assert_eq!((agg.correct, agg.incorrect, agg.total), (1, 0, 1));
        assert_eq!(agg.translation, q.translation);
        assert_eq!(agg.full_answer.as_deref(), Some(q.full_answer().as_str()));
        assert_eq!(agg.ordinal, Some(5));
        assert!(agg.last_attempt.is_some());
    }

    #[test]
    fn counters_keep_total_invariant() {
        let catalog = Catalog::builtin();
        let mut stats = StatisticsStore::default();
        let outcomes = [true, false, false, true, true, false, true];
        for (i, ok) in outcomes.into_iter().enumerate() {
            let q = &catalog.questions()[i % 3];
            stats.apply(&catalog, q, ok, Utc::now());
            for (_, agg) in stats.rank() {
                assert_eq!(agg.total, agg.correct + agg.incorrect);
            }
        }
        assert_eq!(stats.len(), 3);
    }

    #[test]
    fn corrupted_document_loads_as_empty() {
        let mut store = MemoryStore::new();
        store.set(STATS_KEY, "{not json").unwrap();
        assert!(StatisticsStore::load(&store).is_empty());

        // 壊れた状態から記録すると、新しい内容で上書きされる
        let catalog = Catalog::builtin();
        record(&mut store, &catalog, &catalog.questions()[0], false).unwrap();
        assert_eq!(StatisticsStore::load(&store).len(), 1);
    }

    #[test]
    fn read_error_keeps_existing_statistics() {
        let catalog = Catalog::builtin();
        let mut inner = MemoryStore::new();
        for q in &catalog.questions()[..10] {
            record(&mut inner, &catalog, q, true).unwrap();
        }
        let mut store = FlakyStore {
            inner,
            fail_next_get: Cell::new(true),
        };

        let err = record(&mut store, &catalog, &catalog.questions()[10], false).unwrap_err();
        assert!(matches!(err, QuizError::Storage(_)));
        // 何も書き込まれていない
        let stats = StatisticsStore::try_load(&store).unwrap();
        assert_eq!(stats.len(), 10);
        assert!(stats.get(&catalog.questions()[10].identity()).is_none());

        // 次の記録は普通に成功する
        record(&mut store, &catalog, &catalog.questions()[10], false).unwrap();
        assert_eq!(StatisticsStore::load(&store).len(), 11);
    }

    #[test]
    fn load_falls_back_to_empty_on_read_error() {
        let store = FlakyStore {
            inner: MemoryStore::new(),
            fail_next_get: Cell::new(true),
        };
        assert!(StatisticsStore::load(&store).is_empty());
    }

    #[test]
    fn reads_documents_without_optional_fields() {
        let mut store = MemoryStore::new();
        store
            .set(
                STATS_KEY,
                r#"{"a★b":{"correct":2,"incorrect":1,"total":3,"translation":"t","fullAnswer":"a x b"}}"#,
            )
            .unwrap();
        let stats = StatisticsStore::load(&store);
        let agg = stats.get("a★b").unwrap();
        assert_eq!(agg.ordinal, None);
        assert_eq!(agg.last_attempt, None);
        assert_eq!(agg.full_answer.as_deref(), Some("a x b"));
    }

    #[test]
    fn saved_document_uses_camel_case_keys() {
        let catalog = Catalog::builtin();
        let mut store = MemoryStore::new();
        record(&mut store, &catalog, &catalog.questions()[0], true).unwrap();
        let raw = store.get(STATS_KEY).unwrap().unwrap();
        assert!(raw.contains("\"fullAnswer\""));
        assert!(raw.contains("\"lastAttempt\""));
    }

    #[test]
    fn rank_sorts_by_accuracy_and_keeps_ties_in_order() {
        let q_a = question("a", "1");
        let q_b = question("b", "2");
        let q_c = question("c", "3");
        let catalog = Catalog::new(vec![q_a, q_b, q_c]);
        let mut stats = StatisticsStore::default();
        let now = Utc::now();

        // a: 1/2, b: 0/1, c: 1/2
        stats.apply(&catalog, &q_a, true, now);
        stats.apply(&catalog, &q_a, false, now);
        stats.apply(&catalog, &q_b, false, now);
        stats.apply(&catalog, &q_c, false, now);
        stats.apply(&catalog, &q_c, true, now);

        let keys: Vec<&str> = stats.rank().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b★2", "a★1", "c★3"]);
    }

    #[test]
    fn rank_of_empty_store_is_empty() {
        assert!(StatisticsStore::default().rank().is_empty());
    }

    #[test]
    fn strength_thresholds() {
        assert_eq!(Strength::from_percent(0.0), Strength::Weak);
        assert_eq!(Strength::from_percent(49.9), Strength::Weak);
        assert_eq!(Strength::from_percent(50.0), Strength::Medium);
        assert_eq!(Strength::from_percent(79.9), Strength::Medium);
        assert_eq!(Strength::from_percent(80.0), Strength::Strong);
        assert_eq!(Strength::from_percent(100.0), Strength::Strong);
    }

    #[test]
    fn summary_totals_all_entries() {
        let catalog = Catalog::builtin();
        let mut stats = StatisticsStore::default();
        assert_eq!(stats.summary().accuracy_percent, 0.0);

        let now = Utc::now();
        stats.apply(&catalog, &catalog.questions()[0], true, now);
        stats.apply(&catalog, &catalog.questions()[1], true, now);
        stats.apply(&catalog, &catalog.questions()[1], false, now);
        stats.apply(&catalog, &catalog.questions()[2], true, now);

        let summary = stats.summary();
        assert_eq!((summary.attempts, summary.correct, summary.incorrect), (4, 3, 1));
        assert!((summary.accuracy_percent - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn colliding_questions_share_one_aggregate() {
        let first = question("同じ", "文");
        let second = Question {
            correct_order: [4, 3, 2, 1],
            ..first
        };
        let catalog = Catalog::new(vec![first, second]);
        let mut stats = StatisticsStore::default();
        stats.apply(&catalog, &second, true, Utc::now());
        stats.apply(&catalog, &first, false, Utc::now());

        assert_eq!(stats.len(), 1);
        let agg = stats.get("同じ★文").unwrap();
        assert_eq!(agg.total, 2);
        // 番号は最初に記録した問題のもの
        assert_eq!(agg.ordinal, Some(2));
    }

    #[test]
    fn reset_removes_everything() {
        let catalog = Catalog::builtin();
        let mut store = MemoryStore::new();
        record(&mut store, &catalog, &catalog.questions()[0], true).unwrap();
        StatisticsStore::reset(&mut store).unwrap();
        assert!(StatisticsStore::load(&store).is_empty());
    }
}
