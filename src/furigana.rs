// ============================================
// src/furigana.rs
// 「漢字(かんじ)」形式の読みがな表記を扱う
// ============================================

use std::borrow::Cow;

/// 直後に読みがなを付けられる文字（漢字・カタカナ・々 など）
fn takes_reading(c: char) -> bool {
    matches!(c, '一'..='龯' | 'ァ'..='ヶ' | 'ｦ'..='ﾟ' | '々' | '〆' | '〤')
}

/// 読みがなを取り除いた表記を返す（例: "新聞(しんぶん)を" -> "新聞を"）
///
/// 括弧の直前が漢字・カタカナでない場合や、閉じ括弧がない場合はそのまま残す。
pub fn strip(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('(') {
        let (head, tail) = rest.split_at(open);
        out.push_str(head);

        match tail.find(')') {
            // 空の括弧 "()" は読みとみなさない
            Some(close) if close > 1 && out.chars().last().is_some_and(takes_reading) => {
                rest = &tail[close + 1..];
            }
            _ => {
                out.push('(');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// 表示用: 読みがな表示が ON ならそのまま、OFF なら取り除く
pub fn display(text: &str, show_readings: bool) -> Cow<'_, str> {
    if show_readings {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(strip(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_readings_after_kanji() {
        assert_eq!(strip("新聞(しんぶん)を"), "新聞を");
        assert_eq!(strip("駅(えき)まで 何分(なんぷん)"), "駅まで 何分");
    }

    #[test]
    fn keeps_plain_hiragana() {
        assert_eq!(strip("はを みがいて"), "はを みがいて");
    }

    #[test]
    fn keeps_parentheses_that_are_not_readings() {
        assert_eq!(strip("あ(い)"), "あ(い)");
        assert_eq!(strip("本()"), "本()");
        assert_eq!(strip("本(ほん"), "本(ほん");
    }

    #[test]
    fn katakana_can_carry_readings() {
        assert_eq!(strip("ケーキ(けーき)は"), "ケーキは");
    }

    #[test]
    fn display_toggles_readings() {
        assert_eq!(display("山(やま)", true), "山(やま)");
        assert_eq!(display("山(やま)", false), "山");
    }
}
