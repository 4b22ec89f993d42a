// ============================================
// src/ui.rs
// UI描画（画面ごと）
// ============================================

use ratatui::{
    prelude::*,
    style::{Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::app::{App, MENU_ITEMS, MenuItem, Screen, StatsView};
use crate::config::TIMER_PRESETS;
use crate::furigana;
use crate::questions::{Catalog, Question, STAR_SLOT};
use crate::session::{
    AnswerPicks, PracticeResults, PracticeSession, Reveal, TimedResults, TimedSession,
};
use crate::stats::Strength;
use crate::theme::Palette;

pub fn ui(f: &mut Frame, app: &App) {
    let palette = app.theme().palette();
    let size = f.area();

    // 枠線を描画
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" JLPT N5 文法 ★ ならべかえ ")
        .title_bottom(Line::from(format!(" {} (menu: t) ", app.theme().toggle_label())).right_aligned())
        .style(Style::default().fg(palette.text).bg(palette.background));
    let inner_area = block.inner(size);
    f.render_widget(block, size);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // [0] 画面本体
            Constraint::Length(1), // [1] ステータス
            Constraint::Length(1), // [2] 操作ヘルプ
        ])
        .split(inner_area);

    let readings = app.show_readings();
    let help = match app.screen() {
        Screen::Menu { selected } => {
            draw_menu(f, chunks[0], app, *selected, &palette);
            "↑↓ move · Enter select · 1-6 shortcut · f readings · q quit"
        }
        Screen::Practice { session, review } => {
            draw_practice(f, chunks[0], session, *review, readings, &palette);
            "1-4 pick order · Enter submit/next · s show answer · f readings · Esc quit"
        }
        Screen::PracticeResults { results, review } => {
            draw_practice_results(f, chunks[0], results, *review, &palette);
            "Enter back to menu"
        }
        Screen::TimerSetup { preset } => {
            draw_timer_setup(f, chunks[0], *preset, &palette);
            "←→ choose · 1-4 preset · Enter start · Esc back"
        }
        Screen::Timed(session) => {
            draw_timed(f, chunks[0], session, readings, &palette);
            "1-4 pick order · Enter submit/next · s skip · f readings · Esc end"
        }
        Screen::TimedResults(results) => {
            draw_timed_results(f, chunks[0], results, readings, &palette);
            "Enter back to menu"
        }
        Screen::Study(cursor) => {
            if let Some(q) = app.catalog().get(cursor.ordinal()) {
                draw_study(f, chunks[0], q, cursor.ordinal(), cursor.len(), readings, &palette);
            }
            "← previous · → next · f readings · Esc menu"
        }
        Screen::Stats(view) => {
            draw_stats(f, chunks[0], view, app.catalog(), &palette);
            if view.confirm_clear {
                "Clear all statistics? This cannot be undone. y: yes · any other key: no"
            } else {
                "↑↓ move · Space select · Enter practice selected · c clear · Esc menu"
            }
        }
    };

    if let Some(status) = app.status() {
        f.render_widget(
            Paragraph::new(status).style(Style::default().fg(palette.incorrect)),
            chunks[1],
        );
    }
    f.render_widget(
        Paragraph::new(help).style(Style::default().fg(palette.muted)),
        chunks[2],
    );
}

// --------------------------------------------------
// 共通パーツ
// --------------------------------------------------

/// 問題文（空欄と ★ 付き）
fn question_lines(q: &Question, readings: bool, palette: &Palette) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let label = if q.is_dialogue {
        "Complete Speaker B's response:"
    } else {
        "Arrange the words in the correct order:"
    };
    lines.push(Line::styled(label, Style::default().fg(palette.muted)));
    if q.is_dialogue {
        lines.push(Line::from(format!("A: {}", furigana::display(q.speaker_a, readings))));
    }

    let prefix = if q.is_dialogue { "B: " } else { "" };
    let mut spans = vec![Span::raw(format!(
        "{prefix}{} ",
        furigana::display(q.before, readings)
    ))];
    for slot in 0..q.options.len() {
        if slot == STAR_SLOT {
            spans.push(Span::styled("★", Style::default().fg(palette.star).bold()));
        } else {
            spans.push(Span::raw("___"));
        }
        spans.push(Span::raw(" "));
    }
    spans.push(Span::raw(furigana::display(q.after, readings).into_owned()));
    lines.push(Line::from(spans).bold());
    lines
}

/// 選択肢（選んだ順番付き）
fn option_lines(q: &Question, picks: &AnswerPicks, readings: bool, palette: &Palette) -> Vec<Line<'static>> {
    q.options
        .iter()
        .enumerate()
        .map(|(idx, option)| {
            let number = idx as u8 + 1;
            let text = format!("[{number}] {}", furigana::display(option, readings));
            match picks.position_of(number) {
                Some(pos) => Line::from(vec![
                    Span::styled(text, Style::default().fg(palette.text).bg(palette.selected)),
                    Span::styled(format!("  ({})", pos + 1), Style::default().fg(palette.accent).bold()),
                ]),
                None => Line::raw(text),
            }
        })
        .collect()
}

/// 正解の文（★ の語を強調）
fn answer_sentence(q: &Question, readings: bool, palette: &Palette) -> Line<'static> {
    let prefix = if q.is_dialogue { "B: " } else { "" };
    let mut spans = vec![Span::raw(format!("{prefix}{} ", furigana::display(q.before, readings)))];
    for (slot, word) in q.correct_sequence().enumerate() {
        let word = furigana::display(word, readings).into_owned();
        if slot == STAR_SLOT {
            spans.push(Span::styled(format!("★{word}★"), Style::default().fg(palette.star).bold()));
        } else {
            spans.push(Span::raw(word));
        }
        spans.push(Span::raw(" "));
    }
    spans.push(Span::raw(furigana::display(q.after, readings).into_owned()));
    Line::from(spans)
}

/// 答え合わせの表示
fn answer_lines(
    q: &Question,
    reveal: Reveal,
    readings: bool,
    with_explanation: bool,
    palette: &Palette,
) -> Vec<Line<'static>> {
    let header = match reveal {
        Reveal::Correct => Line::styled("✅ CORRECT!", Style::default().fg(palette.correct).bold()),
        Reveal::Incorrect => Line::styled("❌ Not quite right", Style::default().fg(palette.incorrect).bold()),
        Reveal::Skipped => Line::styled("👀 Answer", Style::default().fg(palette.accent).bold()),
    };

    let mut lines = vec![Line::raw(""), header];
    if q.is_dialogue {
        lines.push(Line::from(format!("A: {}", furigana::display(q.speaker_a, readings))));
    }
    lines.push(answer_sentence(q, readings, palette));
    lines.push(Line::from(format!("📖 Translation: {}", q.translation)));
    if with_explanation {
        lines.push(Line::from(format!("💡 Grammar Point: {}", q.explanation)));
    }
    lines
}

// --------------------------------------------------
// 各画面
// --------------------------------------------------

fn draw_menu(f: &mut Frame, area: Rect, app: &App, selected: usize, palette: &Palette) {
    let items: Vec<ListItem> = MENU_ITEMS
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let label = match item {
                MenuItem::Practice => "📝 Practice Mode (15 random questions)".to_string(),
                MenuItem::Timer => "⏱ Timed Challenge".to_string(),
                MenuItem::Study => "📚 Study Mode".to_string(),
                MenuItem::Statistics => "📊 Statistics & Review".to_string(),
                MenuItem::Theme => app.theme().toggle_label().to_string(),
                MenuItem::Quit => "🚪 Quit".to_string(),
            };
            ListItem::new(format!("{}. {label}", idx + 1))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().title("JLPT N5 Grammar Practice").borders(Borders::NONE))
        .highlight_style(Style::default().fg(palette.accent).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(selected));
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_practice(
    f: &mut Frame,
    area: Rect,
    session: &PracticeSession,
    review: bool,
    readings: bool,
    palette: &Palette,
) {
    let Some(q) = session.current() else {
        return;
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    // 進捗ゲージ
    let (index, total) = session.progress();
    let title = if review { "Review" } else { "Question" };
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(palette.accent).bg(palette.background))
        .ratio(index as f64 / total as f64)
        .label(format!("{title} {index}/{total}"));
    f.render_widget(gauge, chunks[0]);

    let mut lines = question_lines(q, readings, palette);
    lines.push(Line::raw(""));
    lines.extend(option_lines(q, session.picks(), readings, palette));
    if let Some(reveal) = session.reveal() {
        lines.extend(answer_lines(q, reveal, readings, true, palette));
    }
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), chunks[1]);
}

fn draw_practice_results(
    f: &mut Frame,
    area: Rect,
    results: &PracticeResults,
    review: bool,
    palette: &Palette,
) {
    let title = if review { "Review finished" } else { "Practice finished" };
    let lines = vec![
        Line::styled(title, Style::default().fg(palette.muted)),
        Line::styled(
            format!("{}/{}", results.score, results.total),
            Style::default().fg(palette.accent).bold(),
        ),
        Line::from(format!("{:.1}% Correct", results.percent)),
        Line::from(results.message),
    ];
    f.render_widget(Paragraph::new(lines).centered(), area);
}

fn draw_timer_setup(f: &mut Frame, area: Rect, preset: usize, palette: &Palette) {
    let mut spans = Vec::new();
    for (idx, minutes) in TIMER_PRESETS.iter().enumerate() {
        let label = format!(" {minutes} min ");
        if idx == preset {
            spans.push(Span::styled(label, Style::default().fg(palette.background).bg(palette.accent)));
        } else {
            spans.push(Span::raw(label));
        }
        spans.push(Span::raw("  "));
    }
    let lines = vec![
        Line::from("⏱ Timed Challenge"),
        Line::raw(""),
        Line::from("Answer as many questions as you can before time runs out."),
        Line::raw(""),
        Line::from(spans),
        Line::raw(""),
        Line::styled(
            "Custom time: narabe timer --minutes M --seconds S",
            Style::default().fg(palette.muted),
        ),
    ];
    f.render_widget(Paragraph::new(lines).centered(), area);
}

fn draw_timed(f: &mut Frame, area: Rect, session: &TimedSession, readings: bool, palette: &Palette) {
    let Some(q) = session.current() else {
        return;
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let countdown = session.countdown();
    let timer_style = if countdown.is_warning() {
        Style::default().fg(palette.incorrect).bold()
    } else {
        Style::default().fg(palette.accent).bold()
    };
    let (correct, answered) = session.tally();
    let header = Line::from(vec![
        Span::styled(format!("⏱ {}", countdown.display()), timer_style),
        Span::raw(format!("   Questions: {answered}   Correct: {correct}")),
    ]);
    f.render_widget(Paragraph::new(header), chunks[0]);

    let mut lines = question_lines(q, readings, palette);
    lines.push(Line::raw(""));
    lines.extend(option_lines(q, session.picks(), readings, palette));
    if let Some(reveal) = session.reveal() {
        lines.extend(answer_lines(q, reveal, readings, false, palette));
    }
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), chunks[1]);
}

fn draw_timed_results(
    f: &mut Frame,
    area: Rect,
    results: &TimedResults,
    readings: bool,
    palette: &Palette,
) {
    let mut lines = vec![
        Line::styled(
            format!("{}/{}", results.correct, results.answered),
            Style::default().fg(palette.accent).bold(),
        )
        .centered(),
        Line::from(format!("{:.1}% Accuracy", results.accuracy_percent)).centered(),
        Line::from(results.message).centered(),
        Line::from(format!("Questions Answered: {}", results.answered)).centered(),
    ];

    if !results.to_review.is_empty() {
        lines.push(Line::raw(""));
        lines.push(Line::from("📋 Questions to Review:").bold());
        for (idx, q) in results.to_review.iter().enumerate() {
            lines.push(Line::styled(format!("Question {}", idx + 1), Style::default().fg(palette.muted)));
            if q.is_dialogue {
                lines.push(Line::from(format!("A: {}", furigana::display(q.speaker_a, readings))));
            }
            lines.push(answer_sentence(q, readings, palette));
            lines.push(Line::from(format!("📖 {}", q.translation)));
        }
    }
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn draw_study(
    f: &mut Frame,
    area: Rect,
    q: &Question,
    ordinal: usize,
    len: usize,
    readings: bool,
    palette: &Palette,
) {
    let mut lines = vec![
        Line::styled(format!("Question {ordinal}/{len}"), Style::default().fg(palette.muted)),
        Line::raw(""),
    ];
    lines.extend(question_lines(q, readings, palette));
    lines.push(Line::raw(""));
    lines.push(Line::from("Options:"));
    for (idx, option) in q.options.iter().enumerate() {
        lines.push(Line::from(format!("{}. {}", idx + 1, furigana::display(option, readings))));
    }
    lines.push(Line::raw(""));
    lines.push(Line::styled("✅ Correct Answer", Style::default().fg(palette.correct).bold()));
    lines.push(answer_sentence(q, readings, palette));
    lines.push(Line::from(format!("📖 Translation: {}", q.translation)));
    lines.push(Line::from(format!("💡 Grammar Point: {}", q.explanation)));
    lines.push(Line::from(format!("Order: {}", q.order_label())));
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn draw_stats(f: &mut Frame, area: Rect, view: &StatsView, catalog: &Catalog, palette: &Palette) {
    if view.stats.is_empty() {
        let lines = vec![
            Line::from("📊"),
            Line::from("No statistics yet!").bold(),
            Line::from("Start practicing to build your stats."),
        ];
        f.render_widget(Paragraph::new(lines).centered(), area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    // 全体の成績
    let summary = view.stats.summary();
    let overall = vec![
        Line::from("📈 Overall Performance").bold(),
        Line::from(format!(
            "Total Attempts: {}   Correct ✅: {}   Incorrect ❌: {}   Accuracy: {:.1}%",
            summary.attempts, summary.correct, summary.incorrect, summary.accuracy_percent
        )),
    ];
    f.render_widget(Paragraph::new(overall), chunks[0]);

    // 正答率の低い順
    let items: Vec<ListItem> = view
        .stats
        .rank()
        .into_iter()
        .map(|(key, agg)| {
            let strength = agg.strength();
            let color = match strength {
                Strength::Weak => palette.incorrect,
                Strength::Medium => palette.star,
                Strength::Strong => palette.correct,
            };
            let mark = match agg.ordinal {
                Some(ordinal) if view.selected.contains(&ordinal) => "[x]",
                Some(ordinal) if catalog.get(ordinal).is_some() => "[ ]",
                _ => "   ",
            };
            let text = agg.full_answer.as_deref().unwrap_or(key);
            let last = agg
                .last_attempt
                .map(|at| format!("   Last: {}", at.format("%Y-%m-%d %H:%M")))
                .unwrap_or_default();
            ListItem::new(Text::from(vec![
                Line::from(vec![
                    Span::raw(format!("{mark} {} ", strength.icon())),
                    Span::styled(text.to_string(), Style::default().fg(color)),
                ]),
                Line::styled(format!("      {}", agg.translation), Style::default().fg(palette.muted)),
                Line::from(format!(
                    "      Attempts: {}   Correct: {}   Incorrect: {}   Accuracy: {:.1}%{last}",
                    agg.total,
                    agg.correct,
                    agg.incorrect,
                    agg.accuracy_percent()
                )),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(format!("📝 Questions Needing Practice ({} selected)", view.selected.len()))
                .borders(Borders::TOP),
        )
        .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));
    let mut state = ListState::default().with_selected(Some(view.cursor));
    f.render_stateful_widget(list, chunks[1], &mut state);
}
