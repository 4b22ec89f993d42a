// ============================================
// src/selection.rs
// 出題する問題の選び方（ランダム・全問・ユーザー指定）
// ============================================

use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::config::PRACTICE_SIZE;
use crate::error::QuizError;
use crate::questions::{Catalog, Question};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionKind {
    /// ランダムに最大 15 問
    Practice,
    /// 全問をランダムな順で（時間切れか出し切ったら終了）
    Timed,
}

/// 問題集を一様にシャッフルして出題リストを作る
pub fn sample<'a, R: Rng + ?Sized>(
    catalog: &'a Catalog,
    kind: SessionKind,
    rng: &mut R,
) -> Vec<&'a Question> {
    let mut picked: Vec<&Question> = catalog.questions().iter().collect();
    picked.shuffle(rng);
    if kind == SessionKind::Practice {
        picked.truncate(PRACTICE_SIZE);
    }
    picked
}

/// ユーザーが選んだ番号（1 始まり）から出題リストを作る
///
/// 番号順に並べ、範囲外の番号は無視する。1 問も残らなければエラー。
pub fn resolve<I>(catalog: &Catalog, selected: I) -> Result<Vec<&Question>, QuizError>
where
    I: IntoIterator<Item = usize>,
{
    let ordinals: BTreeSet<usize> = selected.into_iter().collect();
    let questions: Vec<&Question> = ordinals
        .into_iter()
        .filter_map(|ordinal| {
            let found = catalog.get(ordinal);
            if found.is_none() {
                log::debug!("ignoring unknown question number {ordinal}");
            }
            found
        })
        .collect();

    if questions.is_empty() {
        return Err(QuizError::EmptySelection);
    }
    Ok(questions)
}

/// 番号を指定して 1 問取得する
pub fn lookup(catalog: &Catalog, ordinal: usize) -> Result<&Question, QuizError> {
    catalog.get(ordinal).ok_or(QuizError::UnknownOrdinal(ordinal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questions::QUESTIONS_LIST;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn catalog_of(n: usize) -> Catalog {
        Catalog::new(QUESTIONS_LIST.iter().copied().cycle().take(n).collect())
    }

    #[test]
    fn practice_takes_fifteen_distinct_questions() {
        let catalog = Catalog::builtin();
        let mut rng = StdRng::seed_from_u64(7);
        let picked = sample(&catalog, SessionKind::Practice, &mut rng);

        assert_eq!(picked.len(), PRACTICE_SIZE);
        let distinct: HashSet<*const Question> = picked.iter().map(|q| *q as *const _).collect();
        assert_eq!(distinct.len(), PRACTICE_SIZE);
    }

    #[test]
    fn practice_on_small_catalog_returns_everything() {
        let catalog = catalog_of(10);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(sample(&catalog, SessionKind::Practice, &mut rng).len(), 10);
    }

    #[test]
    fn timed_uses_the_whole_catalog() {
        let catalog = Catalog::builtin();
        let mut rng = StdRng::seed_from_u64(3);
        let picked = sample(&catalog, SessionKind::Timed, &mut rng);
        assert_eq!(picked.len(), catalog.len());
    }

    #[test]
    fn shuffle_visits_every_position() {
        // 一様性の簡易チェック: 先頭に来る問題が偏らない
        let catalog = catalog_of(4);
        let mut rng = StdRng::seed_from_u64(42);
        let mut firsts = HashSet::new();
        for _ in 0..200 {
            let picked = sample(&catalog, SessionKind::Timed, &mut rng);
            firsts.insert(catalog.ordinal_of(picked[0]));
        }
        assert_eq!(firsts.len(), 4);
    }

    #[test]
    fn resolve_sorts_by_ordinal() {
        let catalog = catalog_of(10);
        let picked = resolve(&catalog, [3, 1, 5]).unwrap();
        let expected: Vec<&Question> = [1, 3, 5].iter().map(|&n| catalog.get(n).unwrap()).collect();
        assert_eq!(picked, expected);
    }

    #[test]
    fn resolve_drops_out_of_range() {
        let catalog = catalog_of(10);
        let picked = resolve(&catalog, [0, 2, 11, 99]).unwrap();
        assert_eq!(picked, vec![catalog.get(2).unwrap()]);
    }

    #[test]
    fn resolve_rejects_empty_result() {
        let catalog = catalog_of(10);
        assert!(matches!(resolve(&catalog, Vec::<usize>::new()), Err(QuizError::EmptySelection)));
        assert!(matches!(resolve(&catalog, [42]), Err(QuizError::EmptySelection)));
    }

    #[test]
    fn lookup_rejects_unknown_ordinal() {
        let catalog = catalog_of(3);
        assert!(lookup(&catalog, 3).is_ok());
        assert!(matches!(lookup(&catalog, 4), Err(QuizError::UnknownOrdinal(4))));
    }
}
