use narabe::QuizError;
use narabe::questions::{Catalog, QUESTIONS_LIST, Question};
use narabe::selection::{self, SessionKind};
use narabe::session::{PracticeSession, evaluate};
use narabe::stats::{self, StatisticsStore, Strength};
use narabe::storage::{FileStore, KeyValueStore, STATS_KEY};

fn single_question() -> Question {
    Question {
        correct_order: [1, 2, 3, 4],
        ..QUESTIONS_LIST[0]
    }
}

#[test]
fn one_right_one_wrong_is_medium() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::open(dir.path()).unwrap();
    let q = single_question();
    let catalog = Catalog::new(vec![q]);

    stats::record(&mut store, &catalog, &q, true).unwrap();
    stats::record(&mut store, &catalog, &q, false).unwrap();

    let stats = StatisticsStore::load(&store);
    let agg = stats.get(&q.identity()).unwrap();
    assert_eq!((agg.correct, agg.incorrect, agg.total), (1, 1, 2));
    assert!((agg.accuracy_percent() - 50.0).abs() < f64::EPSILON);
    assert_eq!(agg.strength(), Strength::Medium);
    assert_eq!(agg.strength().label(), "medium");
    assert_eq!(agg.ordinal, Some(1));
}

#[test]
fn statistics_survive_reopening_the_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = Catalog::builtin();
    {
        let mut store = FileStore::open(dir.path()).unwrap();
        for q in &catalog.questions()[..3] {
            stats::record(&mut store, &catalog, q, false).unwrap();
        }
        stats::record(&mut store, &catalog, &catalog.questions()[1], true).unwrap();
    }

    let store = FileStore::open(dir.path()).unwrap();
    let ranked: Vec<usize> = StatisticsStore::load(&store)
        .rank()
        .into_iter()
        .filter_map(|(_, agg)| agg.ordinal)
        .collect();
    // 0% の 1 と 3 が記録順に並び、50% の 2 が最後
    assert_eq!(ranked, vec![1, 3, 2]);
}

#[test]
fn corrupted_file_degrades_to_empty_and_is_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(STATS_KEY), "\u{0}\u{1}garbage").unwrap();
    let mut store = FileStore::open(dir.path()).unwrap();
    let catalog = Catalog::builtin();

    assert!(StatisticsStore::load(&store).rank().is_empty());
    stats::record(&mut store, &catalog, &catalog.questions()[0], true).unwrap();

    let raw = store.get(STATS_KEY).unwrap().unwrap();
    assert!(serde_json::from_str::<serde_json::Value>(&raw).is_ok());
}

#[test]
fn non_utf8_file_degrades_to_empty_and_is_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(STATS_KEY), [0xff, 0xfe, 0x7b]).unwrap();
    let mut store = FileStore::open(dir.path()).unwrap();
    let catalog = Catalog::builtin();

    assert!(StatisticsStore::try_load(&store).unwrap().is_empty());
    stats::record(&mut store, &catalog, &catalog.questions()[0], false).unwrap();
    assert_eq!(StatisticsStore::load(&store).len(), 1);
}

#[test]
fn ranked_selection_becomes_a_review_session() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::open(dir.path()).unwrap();
    let catalog = Catalog::builtin();
    for ordinal in [9, 4, 12] {
        let q = catalog.get(ordinal).unwrap();
        stats::record(&mut store, &catalog, q, false).unwrap();
    }

    let stats = StatisticsStore::load(&store);
    let chosen: Vec<usize> = stats.rank().iter().filter_map(|(_, a)| a.ordinal).collect();
    let questions = selection::resolve(&catalog, chosen).unwrap();
    let ordinals: Vec<Option<usize>> = questions.iter().map(|q| catalog.ordinal_of(q)).collect();
    assert_eq!(ordinals, vec![Some(4), Some(9), Some(12)]);

    let mut session = PracticeSession::new(questions).unwrap();
    let first = session.current().unwrap();
    for n in first.correct_order {
        session.toggle(n);
    }
    assert!(session.submit().unwrap().correct);
}

#[test]
fn empty_selection_blocks_the_session() {
    let catalog = Catalog::builtin();
    let err = selection::resolve(&catalog, [0, catalog.len() + 1]).unwrap_err();
    assert!(matches!(err, QuizError::EmptySelection));
}

#[test]
fn sampled_practice_can_be_answered_end_to_end() {
    let catalog = Catalog::builtin();
    let mut rng = rand::rng();
    let questions = selection::sample(&catalog, SessionKind::Practice, &mut rng);
    let mut session = PracticeSession::new(questions).unwrap();

    loop {
        let q = session.current().unwrap();
        assert!(evaluate(&q.correct_order, &q.correct_order));
        for n in q.correct_order {
            session.toggle(n);
        }
        session.submit().unwrap();
        if !session.next() {
            break;
        }
    }

    let results = session.results();
    assert_eq!((results.score, results.total), (15, 15));
    assert!(results.message.contains("Perfect"));
}
