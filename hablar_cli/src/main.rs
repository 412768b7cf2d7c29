use clap::{Parser, Subcommand};
use hablar_core::service::DataPaths;
use hablar_core::*;
use std::collections::HashSet;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Accented characters learners need while typing answers
const SPANISH_CHARACTERS: [char; 9] = ['á', 'é', 'í', 'ó', 'ú', 'ñ', 'ü', '¿', '¡'];

#[derive(Parser)]
#[command(name = "hablar")]
#[command(about = "Spanish lessons in the terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List lessons with their lock state and progress (default)
    Lessons,

    /// Show a lesson's vocabulary and grammar notes
    Study {
        /// Lesson id
        lesson_id: String,
    },

    /// Play through a lesson's exercises
    Play {
        /// Lesson id
        lesson_id: String,

        /// Scripted answers separated by '|' instead of reading stdin
        #[arg(long)]
        answers: Option<String>,

        /// Dry run - grade answers without saving progress
        #[arg(long)]
        dry_run: bool,
    },

    /// Show level, score, streak and achievements
    Stats,

    /// Compare an answer against the expected text the way lessons do
    Check {
        /// Expected answer
        expected: String,

        /// Learner answer
        answer: String,
    },

    /// Roll up the progress log to CSV
    Rollup {
        /// Clean up processed WAL files after rollup
        #[arg(long)]
        cleanup: bool,
    },

    /// Write the active course to a JSON file
    ExportCatalog {
        /// Destination file
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    hablar_core::logging::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);

    match cli.command {
        Some(Commands::Lessons) | None => cmd_lessons(&open_service(&config, &data_dir)?),
        Some(Commands::Study { lesson_id }) => {
            cmd_study(&open_service(&config, &data_dir)?, &lesson_id)
        }
        Some(Commands::Play {
            lesson_id,
            answers,
            dry_run,
        }) => cmd_play(
            &mut open_service(&config, &data_dir)?,
            &lesson_id,
            answers,
            dry_run,
            &config,
        ),
        Some(Commands::Stats) => cmd_stats(&open_service(&config, &data_dir)?),
        Some(Commands::Check { expected, answer }) => {
            cmd_check(&expected, &answer);
            Ok(())
        }
        Some(Commands::Rollup { cleanup }) => cmd_rollup(&data_dir, cleanup),
        Some(Commands::ExportCatalog { path }) => {
            cmd_export_catalog(&open_service(&config, &data_dir)?, &path)
        }
    }
}

fn open_service(config: &Config, data_dir: &Path) -> Result<LocalLessonService> {
    let catalog = config.load_catalog()?;
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::CatalogValidation("Invalid catalog".into()));
    }

    Ok(LocalLessonService::new(catalog, data_dir))
}

fn cmd_lessons(service: &LocalLessonService) -> Result<()> {
    let snapshot = Snapshot::load(service);
    print_header(&snapshot.stats);

    let progress = snapshot.progress_map();
    let gate = ProgressGate::new(&snapshot.lessons, &progress);

    let mut current_level = None;
    for lesson in &snapshot.lessons {
        if current_level != Some(lesson.level) {
            current_level = Some(lesson.level);
            println!();
            println!("  Level {}", lesson.level);
        }

        let status = if !gate.can_enter(&lesson.id, lesson.level) {
            "🔒"
        } else if gate.is_lesson_complete(lesson) {
            "✓"
        } else {
            " "
        };

        println!(
            "  {} {} {:<16} {:<20} {:>3}/{:<3} ({:.0}%)",
            status,
            lesson.icon,
            lesson.id,
            lesson.title,
            gate.completed_exercises(&lesson.id),
            lesson.total_exercises,
            gate.completion_percent(lesson)
        );
    }

    println!();
    Ok(())
}

fn cmd_study(service: &LocalLessonService, lesson_id: &str) -> Result<()> {
    let snapshot = Snapshot::load(service);
    let lesson = snapshot.ensure_enterable(lesson_id)?;

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {} {}", lesson.icon, lesson.title);
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  {}", lesson.description);
    println!();

    if lesson.vocabulary.is_empty() {
        println!("  No vocabulary for this lesson.");
    } else {
        println!("  Vocabulary:");
        for item in &lesson.vocabulary {
            println!("  → {:<16} {}", item.spanish, item.translation);
            if let Some(ref example) = item.example {
                println!("      {}", example);
            }
        }
    }

    if let Some(ref notes) = lesson.grammar_notes {
        println!();
        println!("  ℹ Grammar: {}", notes);
    }

    println!();
    Ok(())
}

fn cmd_play(
    service: &mut LocalLessonService,
    lesson_id: &str,
    answers: Option<String>,
    dry_run: bool,
    config: &Config,
) -> Result<()> {
    let snapshot = Snapshot::load(&*service);
    let lesson = snapshot.ensure_enterable(lesson_id)?.clone();

    let exercises = service.exercises(&lesson.id)?;
    if exercises.is_empty() {
        println!("Lesson {} has no exercises yet.", lesson.id);
        return Ok(());
    }

    let unlocked_before: HashSet<String> = snapshot
        .achievements()
        .into_iter()
        .filter(|a| a.unlocked)
        .map(|a| a.id)
        .collect();

    println!("\n{} {} - {}", lesson.icon, lesson.title, lesson.description);
    if exercises.iter().any(|e| e.kind != ExerciseType::MultipleChoice) {
        let keys: Vec<String> = SPANISH_CHARACTERS.iter().map(char::to_string).collect();
        println!("  Special characters: {}", keys.join(" "));
    }

    let mut source = AnswerSource::new(answers);
    let mut run = LessonRun::new(lesson.id.clone(), exercises);

    while let Some(exercise) = run.current().cloned() {
        display_exercise(&exercise, run.position(), config.practice.show_hints);

        let answer = source.next_answer()?.ok_or_else(|| {
            let (position, total) = run.position();
            Error::Session(format!(
                "ran out of answers at exercise {} of {}",
                position, total
            ))
        })?;

        match run.submit(&answer) {
            Ok(result) if result.correct => {
                println!("  ✓ ¡Correcto! +{}", POINTS_PER_CORRECT);
            }
            Ok(result) => {
                println!("  ✗ The correct answer is: {}", result.correct_answer);
            }
            Err(Error::EmptyAnswer) => {
                println!("  Please enter an answer.");
            }
            Err(e) => return Err(e),
        }
    }

    let progress = run.finish(chrono::Utc::now())?;
    let correct = run.results().iter().filter(|r| r.correct).count();

    println!("\n─────────────────────────────────────────");
    println!("Lesson complete!");
    println!(
        "  Score: {} ({}/{} correct)",
        progress.score, correct, progress.total_exercises
    );

    if dry_run {
        println!("\n[Dry run - progress not saved]");
        return Ok(());
    }

    service.save_progress(&progress)?;
    println!("\n✓ Progress saved!");

    let unlocked_now = Snapshot::load(&*service).achievements();
    for achievement in unlocked_now
        .iter()
        .filter(|a| a.unlocked && !unlocked_before.contains(&a.id))
    {
        println!(
            "  {} Achievement unlocked: {}",
            achievement.icon, achievement.title
        );
    }

    Ok(())
}

fn cmd_stats(service: &LocalLessonService) -> Result<()> {
    let snapshot = Snapshot::load(service);
    let stats = &snapshot.stats;
    let lesson_count = snapshot.lessons.len() as u32;

    print_header(stats);
    println!(
        "  Lessons completed: {}/{}",
        stats.total_lessons_completed, lesson_count
    );
    println!();
    println!("  Achievements:");

    for achievement in snapshot.achievements() {
        let mark = if achievement.unlocked { "✓" } else { " " };
        let progress = match (achievement.progress, achievement.target) {
            (Some(progress), Some(target)) if !achievement.unlocked => format!(
                " ({}/{}, {}%)",
                progress.min(target),
                target,
                achievement.percent().unwrap_or(0)
            ),
            _ => String::new(),
        };
        println!(
            "  [{}] {} {:<20} {}{}",
            mark, achievement.icon, achievement.title, achievement.description, progress
        );
    }

    println!();
    Ok(())
}

fn cmd_check(expected: &str, answer: &str) {
    println!("  Expected: {}", normalize(expected));
    println!("  Answer:   {}", normalize(answer));

    if compare(expected, answer) {
        println!("✓ Match");
    } else {
        println!("✗ No match");
    }
}

fn cmd_rollup(data_dir: &Path, cleanup: bool) -> Result<()> {
    let paths = DataPaths::new(data_dir);

    if !paths.wal.exists() {
        println!("No WAL file found - nothing to roll up.");
        return Ok(());
    }

    let count = hablar_core::csv_rollup::wal_to_csv_and_archive(&paths.wal, &paths.csv)?;

    println!("✓ Rolled up {} progress records to CSV", count);
    println!("  CSV: {}", paths.csv.display());

    if cleanup {
        let cleaned = hablar_core::csv_rollup::cleanup_processed_wals(&paths.wal_dir)?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed WAL files", cleaned);
        }
    }

    Ok(())
}

fn cmd_export_catalog(service: &LocalLessonService, path: &Path) -> Result<()> {
    let catalog = service.catalog();
    catalog.save_to(path)?;

    println!(
        "✓ Exported {} lessons and {} exercises",
        catalog.lessons.len(),
        catalog.exercises.len()
    );
    println!("  File: {}", path.display());
    Ok(())
}

fn print_header(stats: &UserStats) {
    println!("\n╭─────────────────────────────────────────╮");
    println!(
        "│  Level {}  ·  {} pts  ·  🔥 {} day streak",
        stats.level, stats.total_score, stats.current_streak
    );
    println!("╰─────────────────────────────────────────╯");
    println!(
        "  Next level: {}/{}",
        stats.level_progress(),
        hablar_core::stats::POINTS_PER_LEVEL
    );
}

fn display_exercise(exercise: &Exercise, position: (usize, usize), show_hints: bool) {
    let (current, total) = position;

    println!();
    println!("Question {}/{} · {}", current, total, exercise.kind.label());
    println!("  {}", exercise.question);
    if let Some(ref spanish) = exercise.question_spanish {
        println!("  {}", spanish);
    }

    if let Some(ref options) = exercise.options {
        for option in options {
            println!("  → {}", option);
        }
    }

    if show_hints {
        if let Some(ref hint) = exercise.hint {
            println!("  ℹ Hint: {}", hint);
        }
    }
}

/// Where answers come from: a scripted list or stdin
enum AnswerSource {
    Scripted(std::vec::IntoIter<String>),
    Stdin,
}

impl AnswerSource {
    fn new(answers: Option<String>) -> Self {
        match answers {
            Some(list) => Self::Scripted(
                list.split('|')
                    .map(str::to_string)
                    .collect::<Vec<_>>()
                    .into_iter(),
            ),
            None => Self::Stdin,
        }
    }

    /// Next answer, or None when the source is exhausted
    fn next_answer(&mut self) -> Result<Option<String>> {
        match self {
            Self::Scripted(answers) => {
                let answer = answers.next();
                if let Some(ref answer) = answer {
                    println!("> {}", answer);
                }
                Ok(answer)
            }
            Self::Stdin => {
                print!("> ");
                io::stdout().flush()?;

                let mut input = String::new();
                if io::stdin().lock().read_line(&mut input)? == 0 {
                    return Ok(None);
                }
                Ok(Some(input.trim_end_matches(['\r', '\n']).to_string()))
            }
        }
    }
}
