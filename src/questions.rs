/*
 * src/questions.rs
 * 並べ替え問題（文法 ★ 問題）のデータを管理するモジュール
 */

use crate::furigana;

/// 選択肢の数（並べる語の数）
pub const OPTION_COUNT: usize = 4;
/// ★ が付く位置（0 始まりで 3 番目: ___ ___ ★ ___）
pub const STAR_SLOT: usize = 2;

/// 1 問分の並べ替え問題
///
/// テキストは「漢字(かんじ)」形式の読みがな付きで持つ。
/// `correct_order` は 1 始まりの選択肢番号の並び（`options[n - 1]`）。
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Question {
    pub is_dialogue: bool,
    pub speaker_a: &'static str,        // 会話問題の A さんのセリフ（会話でなければ空）
    pub before: &'static str,           // 空欄の前
    pub after: &'static str,            // 空欄の後
    pub options: [&'static str; OPTION_COUNT],
    pub correct_order: [u8; OPTION_COUNT],
    pub translation: &'static str,
    pub explanation: &'static str,
}

impl Question {
    /// 統計のキー。空欄の前後のテキストから作る（"前★後"）
    ///
    /// 前後のテキストが同じ問題は同じキーになり、統計を共有する。
    pub fn identity(&self) -> String {
        format!("{}★{}", furigana::strip(self.before), furigana::strip(self.after))
    }

    /// 正しい順に並べた選択肢
    pub fn correct_sequence(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.correct_order
            .iter()
            .filter_map(|&n| self.options.get(usize::from(n).checked_sub(1)?).copied())
    }

    /// ★ の位置に入る語
    pub fn star_word(&self) -> Option<&'static str> {
        self.correct_sequence().nth(STAR_SLOT)
    }

    /// 完成した文（強調なし・読みがななし）
    pub fn full_answer(&self) -> String {
        let mut full = furigana::strip(self.before);
        for word in self.correct_sequence() {
            full.push(' ');
            full.push_str(&furigana::strip(word));
        }
        full.push(' ');
        full.push_str(&furigana::strip(self.after));
        full
    }

    /// "2 → 4 → 1 → 3" のような正解順の表記
    pub fn order_label(&self) -> String {
        self.correct_order
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(" → ")
    }
}

/// 問題集。並び順は固定で、番号（ordinal）は 1 始まり
#[derive(Debug, Clone)]
pub struct Catalog {
    questions: Vec<Question>,
}

impl Catalog {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// 組み込みの N5 問題集
    pub fn builtin() -> Self {
        Self::new(QUESTIONS_LIST.to_vec())
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// 1 始まりの番号で問題を取得する。範囲外は None
    pub fn get(&self, ordinal: usize) -> Option<&Question> {
        self.questions.get(ordinal.checked_sub(1)?)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// 問題の番号を線形探索で求める（前後テキストと正解順が一致する最初の問題）
    pub fn ordinal_of(&self, question: &Question) -> Option<usize> {
        self.questions
            .iter()
            .position(|q| {
                q.before == question.before
                    && q.after == question.after
                    && q.correct_order == question.correct_order
            })
            .map(|idx| idx + 1)
    }
}

// --------------------------------------------------
// 問題リスト
// --------------------------------------------------

pub const QUESTIONS_LIST: &[Question] = &[
    Question {
        is_dialogue: false,
        speaker_a: "",
        before: "あそこで",
        after: "田中(たなか)さんです。",
        options: ["いる", "人(ひと)は", "新聞(しんぶん)を", "読(よ)んで"],
        correct_order: [3, 4, 1, 2],
        translation: "The person reading a newspaper over there is Mr. Tanaka.",
        explanation: "Verb て-form + いる can modify a noun: 新聞を読んでいる人.",
    },
    Question {
        is_dialogue: false,
        speaker_a: "",
        before: "わたしは",
        after: "すきです。",
        options: ["の", "朝(あさ)", "が", "走(はし)る"],
        correct_order: [2, 4, 1, 3],
        translation: "I like running in the morning.",
        explanation: "Dictionary form + の turns a verb into a noun: 走るのがすきです.",
    },
    Question {
        is_dialogue: true,
        speaker_a: "きのうは 何(なに)を しましたか。",
        before: "友(とも)だちと",
        after: "行(い)きました。",
        options: ["を", "見(み)に", "えいが", "いっしょに"],
        correct_order: [4, 3, 1, 2],
        translation: "I went to see a movie together with a friend.",
        explanation: "ます-stem + に + 行く expresses the purpose of going: 見に行きました.",
    },
    Question {
        is_dialogue: false,
        speaker_a: "",
        before: "この",
        after: "ください。",
        options: ["すわないで", "で", "部屋(へや)", "たばこを"],
        correct_order: [3, 2, 4, 1],
        translation: "Please do not smoke in this room.",
        explanation: "ない-form + でください is a polite request not to do something.",
    },
    Question {
        is_dialogue: false,
        speaker_a: "",
        before: "つくえの",
        after: "あります。",
        options: ["本(ほん)が", "三(さん)さつ", "上(うえ)", "に"],
        correct_order: [3, 4, 1, 2],
        translation: "There are three books on the desk.",
        explanation: "Place + に + thing + が + counter + あります describes where things are.",
    },
    Question {
        is_dialogue: false,
        speaker_a: "",
        before: "きょうは",
        after: "です。",
        options: ["あたたかい", "天気(てんき)が", "とても", "よくて"],
        correct_order: [2, 4, 3, 1],
        translation: "Today the weather is good and it is very warm.",
        explanation: "The て-form of いい is よくて; it joins two descriptions.",
    },
    Question {
        is_dialogue: true,
        speaker_a: "その かばんは だれのですか。",
        before: "これは",
        after: "です。",
        options: ["買(か)った", "かばん", "姉(あね)", "が"],
        correct_order: [3, 4, 1, 2],
        translation: "This is a bag my older sister bought.",
        explanation: "A clause with が can modify a noun: 姉が買ったかばん.",
    },
    Question {
        is_dialogue: false,
        speaker_a: "",
        before: "ごはんを",
        after: "出(で)かけます。",
        options: ["から", "食(た)べて", "みがいて", "はを"],
        correct_order: [2, 1, 4, 3],
        translation: "After eating, I brush my teeth and go out.",
        explanation: "て-form + から means \"after doing\".",
    },
    Question {
        is_dialogue: false,
        speaker_a: "",
        before: "駅(えき)まで",
        after: "かかりますか。",
        options: ["ぐらい", "バス", "何分(なんぷん)", "で"],
        correct_order: [2, 4, 3, 1],
        translation: "About how many minutes does it take to the station by bus?",
        explanation: "で marks the means; ぐらい after an amount means \"about\".",
    },
    Question {
        is_dialogue: false,
        speaker_a: "",
        before: "わたしは",
        after: "行(い)きたいです。",
        options: ["日本(にほん)", "あそびに", "へ", "夏休(なつやす)みに"],
        correct_order: [4, 1, 3, 2],
        translation: "I want to go to Japan for fun during summer vacation.",
        explanation: "ます-stem + たい expresses a wish; ます-stem + に + 行く gives the purpose.",
    },
    Question {
        is_dialogue: false,
        speaker_a: "",
        before: "あしたは",
        after: "でしょう。",
        options: ["雨(あめ)が", "から", "ふる", "午後(ごご)"],
        correct_order: [4, 2, 1, 3],
        translation: "It will probably rain from the afternoon tomorrow.",
        explanation: "Plain form + でしょう expresses a guess.",
    },
    Question {
        is_dialogue: true,
        speaker_a: "日本語(にほんご)の べんきょうは どうですか。",
        before: "かんじが",
        after: "です。",
        options: ["むずかしい", "多(おお)くて", "少(すこ)し", "まだ"],
        correct_order: [2, 4, 3, 1],
        translation: "There are many kanji, so it is still a little difficult.",
        explanation: "い-adjective stem + くて links a reason to what follows.",
    },
    Question {
        is_dialogue: false,
        speaker_a: "",
        before: "へやの",
        after: "ください。",
        options: ["ねて", "から", "でんきを", "けして"],
        correct_order: [3, 4, 2, 1],
        translation: "Please turn off the light in the room before you go to bed.",
        explanation: "て-form + から: finish the first action, then do the second.",
    },
    Question {
        is_dialogue: false,
        speaker_a: "",
        before: "わたしの",
        after: "です。",
        options: ["こと", "とる", "しゅみは", "写真(しゃしん)を"],
        correct_order: [3, 4, 2, 1],
        translation: "My hobby is taking photos.",
        explanation: "Dictionary form + こと turns a verb phrase into a noun.",
    },
    Question {
        is_dialogue: false,
        speaker_a: "",
        before: "田中(たなか)さんは",
        after: "います。",
        options: ["話(はな)して", "で", "友(とも)だちと", "電話(でんわ)"],
        correct_order: [4, 2, 3, 1],
        translation: "Mr. Tanaka is talking with a friend on the phone.",
        explanation: "て-form + いる expresses an action in progress.",
    },
    Question {
        is_dialogue: false,
        speaker_a: "",
        before: "この 店(みせ)の",
        after: "です。",
        options: ["おいしい", "ケーキは", "あまくて", "とても"],
        correct_order: [2, 4, 3, 1],
        translation: "The cake at this shop is very sweet and delicious.",
        explanation: "あまい becomes あまくて to join two adjectives.",
    },
    Question {
        is_dialogue: true,
        speaker_a: "いっしょに 昼(ひる)ごはんを 食(た)べませんか。",
        before: "すみません、",
        after: "あります。",
        options: ["たくさん", "きょうは", "しゅくだいが", "まだ"],
        correct_order: [2, 4, 3, 1],
        translation: "Sorry, I still have a lot of homework today.",
        explanation: "まだ means \"still\"; たくさん comes right before the verb.",
    },
    Question {
        is_dialogue: false,
        speaker_a: "",
        before: "ねる",
        after: "飲(の)みます。",
        options: ["を", "くすり", "まえに", "この"],
        correct_order: [3, 4, 2, 1],
        translation: "I take this medicine before going to sleep.",
        explanation: "Dictionary form + まえに means \"before doing\".",
    },
    Question {
        is_dialogue: false,
        speaker_a: "",
        before: "山田(やまだ)さんは",
        after: "人(ひと)です。",
        options: ["やさしい", "とても", "せが", "高(たか)くて"],
        correct_order: [3, 4, 2, 1],
        translation: "Mr. Yamada is tall and a very kind person.",
        explanation: "せがたかい means \"tall\"; its て-form 高くて joins the next description.",
    },
    Question {
        is_dialogue: true,
        speaker_a: "しゅうまつ どこかへ 行(い)きましたか。",
        before: "いいえ、",
        after: "いました。",
        options: ["うちに", "どこ", "行(い)かないで", "へも"],
        correct_order: [2, 4, 3, 1],
        translation: "No, I didn't go anywhere and stayed home.",
        explanation: "Question word + へも + negative means \"nowhere\"; ないで means \"without doing\".",
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_correct_order_is_a_permutation() {
        for (idx, q) in QUESTIONS_LIST.iter().enumerate() {
            let mut order = q.correct_order;
            order.sort_unstable();
            assert_eq!(order, [1, 2, 3, 4], "question {}", idx + 1);
        }
    }

    #[test]
    fn builtin_identities_do_not_collide() {
        let keys: HashSet<String> = QUESTIONS_LIST.iter().map(Question::identity).collect();
        assert_eq!(keys.len(), QUESTIONS_LIST.len());
    }

    #[test]
    fn identity_is_stable_and_reading_free() {
        let q = QUESTIONS_LIST[0];
        assert_eq!(q.identity(), q.identity());
        assert_eq!(q.identity(), "あそこで★田中さんです。");
    }

    #[test]
    fn full_answer_joins_correct_sequence_without_star() {
        let q = QUESTIONS_LIST[0];
        assert_eq!(q.full_answer(), "あそこで 新聞を 読んで いる 人は 田中さんです。");
        assert!(!q.full_answer().contains('★'));
        assert_eq!(q.star_word(), Some("いる"));
    }

    #[test]
    fn order_label_uses_arrows() {
        assert_eq!(QUESTIONS_LIST[1].order_label(), "2 → 4 → 1 → 3");
    }

    #[test]
    fn catalog_lookup_is_one_based() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.get(1), Some(&QUESTIONS_LIST[0]));
        assert_eq!(catalog.get(0), None);
        assert_eq!(catalog.get(catalog.len() + 1), None);
    }

    #[test]
    fn ordinal_of_returns_first_match() {
        let q = QUESTIONS_LIST[2];
        let catalog = Catalog::new(vec![QUESTIONS_LIST[0], q, q]);
        assert_eq!(catalog.ordinal_of(&q), Some(2));
        assert_eq!(catalog.ordinal_of(&QUESTIONS_LIST[5]), None);
    }
}
