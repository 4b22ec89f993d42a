// ============================================
// src/main.rs (メインファイル)
// ============================================

use std::fs::OpenOptions;
use std::io::{self, Result, stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use console::style;
use crossterm::{
    ExecutableCommand,
    cursor::{Hide, Show},
    event::{self, Event},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use dialoguer::Confirm;
use log::LevelFilter;
use ratatui::prelude::*;

use narabe::app::App;
use narabe::config::Config;
use narabe::questions::Catalog;
use narabe::session::timer_seconds;
use narabe::stats::StatisticsStore;
use narabe::storage::FileStore;
use narabe::ui::ui;

// --------------------------------------------------
// コマンドライン引数
// --------------------------------------------------

#[derive(Debug, Parser)]
#[command(name = "narabe", version, about = "JLPT N5 grammar sentence-ordering quiz")]
struct Cli {
    /// 統計とテーマの保存先
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// ログレベル（off, error, warn, info, debug, trace）
    #[arg(long, global = true)]
    log_level: Option<LevelFilter>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Practice 15 random questions
    Practice,
    /// Timed challenge over the whole catalog
    Timer {
        #[arg(short, long, default_value_t = 5)]
        minutes: u32,
        #[arg(short, long, default_value_t = 0)]
        seconds: u32,
    },
    /// Browse every question with its answer
    Study {
        /// Question number to start from
        #[arg(long, default_value_t = 1)]
        from: usize,
    },
    /// Show statistics
    Stats {
        /// Print to stdout instead of opening the terminal UI
        #[arg(long)]
        plain: bool,
    },
    /// Delete all statistics
    ClearStats {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

// --------------------------------------------------
// メイン関数
// --------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::new(cli.data_dir, cli.log_level);

    let store = FileStore::open(&config.data_dir).map_err(io::Error::other)?;
    init_logger(&config)?;
    log::info!("data directory: {}", store.dir().display());

    let catalog = Catalog::builtin();
    let mut app = App::new(&catalog, Box::new(store));

    match cli.command {
        None => {}
        Some(Command::Practice) => app.start_practice(),
        Some(Command::Timer { minutes, seconds }) => {
            let total = timer_seconds(minutes, seconds)
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
            app.start_timer(total, Instant::now());
        }
        Some(Command::Study { from }) => app
            .start_study(from)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?,
        Some(Command::Stats { plain: true }) => {
            print_stats(&StatisticsStore::load(app.store()));
            return Ok(());
        }
        Some(Command::Stats { plain: false }) => app.open_stats(),
        Some(Command::ClearStats { yes }) => return clear_stats(&config, yes),
    }

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut app);
    restore_terminal(&mut terminal)?;
    result
}

/// TUI が画面を使うので、ログはデータディレクトリのファイルに書く
fn init_logger(config: &Config) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.log_path())?;

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = config.log_level {
        builder.filter_level(level);
    }
    builder.target(env_logger::Target::Pipe(Box::new(file)));
    // 二重初期化は無視する
    if let Err(err) = builder.try_init() {
        log::debug!("logger already initialised: {err}");
    }
    Ok(())
}

fn setup_terminal() -> Result<Terminal<impl Backend>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?; // 代替スクリーンを使用
    stdout().execute(Hide)?; // カーソルを非表示
    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend)
}

fn restore_terminal(_terminal: &mut Terminal<impl Backend>) -> Result<()> {
    stdout().execute(Show)?; // カーソルを再表示
    stdout().execute(LeaveAlternateScreen)?; // 代替スクリーンを終了
    disable_raw_mode()?;
    Ok(())
}

fn run_app(terminal: &mut Terminal<impl Backend>, app: &mut App) -> Result<()> {
    loop {
        app.tick(Instant::now());
        terminal.draw(|f| ui(f, app))?;

        if app.should_quit() {
            break;
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == event::KeyEventKind::Press {
                    app.handle_key(key.code, Instant::now());
                }
            }
        }
    }
    Ok(())
}

// --------------------------------------------------
// 端末 UI を使わないコマンド
// --------------------------------------------------

fn print_stats(stats: &StatisticsStore) {
    if stats.is_empty() {
        println!("📊 No statistics yet! Start practicing to build your stats.");
        return;
    }

    let summary = stats.summary();
    println!("{}", style("📈 Overall Performance").bold());
    println!(
        "  Total Attempts: {}  Correct: {}  Incorrect: {}  Accuracy: {:.1}%",
        summary.attempts,
        style(summary.correct).green(),
        style(summary.incorrect).red(),
        summary.accuracy_percent
    );
    println!();
    println!("{}", style("📝 Questions Needing Practice").bold());
    for (key, agg) in stats.rank() {
        let text = agg.full_answer.as_deref().unwrap_or(key);
        let number = agg.ordinal.map(|n| format!("#{n} ")).unwrap_or_default();
        let percent = format!("{:.1}%", agg.accuracy_percent());
        let percent = match agg.strength() {
            narabe::stats::Strength::Weak => style(percent).red(),
            narabe::stats::Strength::Medium => style(percent).yellow(),
            narabe::stats::Strength::Strong => style(percent).green(),
        };
        println!("{} {number}{text}  {percent}", agg.strength().icon());
        println!(
            "    {}  ({}/{} correct)",
            style(&agg.translation).dim(),
            agg.correct,
            agg.total
        );
    }
}

fn clear_stats(config: &Config, yes: bool) -> Result<()> {
    let confirmed = yes
        || Confirm::new()
            .with_prompt("Are you sure you want to clear all statistics? This action cannot be undone.")
            .default(false)
            .interact()
            .map_err(io::Error::other)?;
    if !confirmed {
        println!("Cancelled.");
        return Ok(());
    }

    let mut store = FileStore::open(&config.data_dir).map_err(io::Error::other)?;
    StatisticsStore::reset(&mut store).map_err(io::Error::other)?;
    println!("{}", style("Statistics cleared.").green());
    Ok(())
}
