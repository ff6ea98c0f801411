use std::io::{BufRead, Write};
use std::sync::Arc;

use quiz_core::model::{CardId, Category, CategoryId, Flashcard, SetId};
use quiz_core::streak::WeekCalendar;
use services::{Clock, LoginService, QuizService, QuizServiceError, QuizStep};
use storage::repository::Storage;

mod config;
mod terminal;

use config::{Config, prepare_sqlite_file};
use terminal::TerminalNotifier;

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  app seed    [--db <sqlite_url>]");
    eprintln!("  app quiz    --set <id> [--db <sqlite_url>] [--level-up-xp <n>] [--currency-per-level <n>]");
    eprintln!("  app login   [--db <sqlite_url>]");
    eprintln!("  app history [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  -v, --verbose   debug logging (RUST_LOG overrides)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_LEVEL_UP_XP, QUIZ_CURRENCY_PER_LEVEL, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Seed,
    Quiz,
    Login,
    History,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "seed" => Some(Self::Seed),
            "quiz" => Some(Self::Quiz),
            "login" => Some(Self::Login),
            "history" => Some(Self::History),
            _ => None,
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);

    let cmd = match argv.next().as_deref() {
        None | Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    let config = Config::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    init_logging(config.verbose);

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&config.db_url)?;
    let storage = Storage::sqlite(&config.db_url).await?;
    tracing::debug!(db = %config.db_url, "storage ready");

    let clock = Clock::system();
    let notifier = Arc::new(TerminalNotifier);

    match cmd {
        Command::Seed => seed(&storage).await,
        Command::Quiz => {
            let set_id = config.require_set()?;
            // A quiz run is a session start: it rolls the streak and the reward period.
            let logins = LoginService::new(clock, Arc::clone(&storage.profiles), notifier.clone());
            let login = logins.record_login().await?;
            if login.gate_reset {
                println!("New day: every set can earn rewards again.");
            }
            let quiz = QuizService::from_storage(clock, config.policy, &storage, notifier);
            run_quiz(&quiz, set_id).await
        }
        Command::Login => {
            let logins = LoginService::new(clock, Arc::clone(&storage.profiles), notifier);
            let summary = logins.record_login().await?;
            println!("Streak: {} day(s)", summary.streak);
            if summary.gate_reset {
                println!("New day: every set can earn rewards again.");
            }
            print_week(&summary.week);
            Ok(())
        }
        Command::History => history(&storage).await,
    }
}

async fn seed(storage: &Storage) -> Result<(), Box<dyn std::error::Error>> {
    let decks: [(u64, &str, u64, &[(&str, &str)]); 2] = [
        (
            1,
            "Capitals",
            1,
            &[
                ("Capital of France?", "Paris"),
                ("Capital of Japan?", "Tokyo"),
                ("Capital of Canada?", "Ottawa"),
                ("Capital of Kenya?", "Nairobi"),
            ],
        ),
        (
            2,
            "Spanish",
            2,
            &[
                ("dog", "perro"),
                ("house", "casa"),
                ("water", "agua"),
            ],
        ),
    ];

    let mut next_card = 1;
    for (category_id, name, set_id, cards) in decks {
        let category_id = CategoryId::new(category_id);
        if storage.categories.find_category(category_id).await?.is_none() {
            storage
                .categories
                .upsert_category(&Category::new(category_id, name, 0))
                .await?;
        }
        for (prompt, solution) in cards {
            let card = Flashcard::new(
                CardId::new(next_card),
                *prompt,
                *solution,
                category_id,
                SetId::new(set_id),
            )?;
            storage.cards.upsert_flashcard(&card).await?;
            next_card += 1;
        }
        println!("seeded set {set_id} ({name}, {} cards)", cards.len());
    }
    Ok(())
}

async fn run_quiz(quiz: &QuizService, set_id: SetId) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = quiz.start_quiz(set_id).await?;
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    println!(
        "Quiz on set {set_id}: {} cards, a level every {} XP. Empty line quits.",
        session.total_questions(),
        quiz.policy().level_up_condition().xp_per_level()
    );
    loop {
        let (Some(card), Some(progress)) = (session.current_card(), session.progress()) else {
            break;
        };
        print!("[{}/{}] {} > ", progress.position, progress.total, card.prompt());
        std::io::stdout().flush()?;
        let solution = card.solution().to_owned();

        let answer = match lines.next() {
            Some(line) => line?,
            None => String::new(),
        };
        if answer.trim().is_empty() {
            quiz.cancel(session)?;
            println!("Quiz cancelled.");
            return Ok(());
        }

        if quiz.answer(&mut session, &answer)? {
            println!("Correct!");
        } else {
            println!("Wrong, the answer was: {solution}");
        }

        let step = match quiz.advance(&mut session).await {
            Ok(step) => step,
            Err(QuizServiceError::Unsaved { report, .. }) => {
                tracing::info!(set_id = %report.set_id(), "retrying result save");
                QuizStep::Completed(Box::new(quiz.complete(*report).await?))
            }
            Err(err) => return Err(err.into()),
        };
        if let QuizStep::Completed(done) = step {
            let s = done.summary;
            println!();
            println!("RESULTS");
            println!("  score  {}/{}", s.raw_score, s.total_questions);
            println!("  grade  {}%", s.grade_percent);
            println!("  {} level  {}", done.category_name.to_uppercase(), s.category_level);
            println!("  {} XP     {:.0} / 100", done.category_name.to_uppercase(), s.xp_percent);
            break;
        }
    }
    Ok(())
}

async fn history(storage: &Storage) -> Result<(), Box<dyn std::error::Error>> {
    let profile = storage.profiles.load_profile().await?;
    println!(
        "XP {}  coins {}  streak {}",
        profile.xp(),
        profile.currency(),
        profile.streak()
    );
    for report in profile.history() {
        println!(
            "{}  set {:>3}  {}/{} ({}%)",
            report.completed_at().format("%Y-%m-%d %H:%M"),
            report.set_id(),
            report.raw_score(),
            report.total_questions(),
            report.grade_percent()
        );
    }
    Ok(())
}

fn print_week(week: &WeekCalendar) {
    let line: Vec<String> = week
        .days
        .iter()
        .map(|d| format!("{}{}", d.weekday, if d.logged_in { "*" } else { " " }))
        .collect();
    println!("Week {}-W{:02}: {}", week.week.year, week.week.week, line.join(" "));
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
