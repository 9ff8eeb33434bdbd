use std::fmt;
use std::io::{self, BufRead, Write};

use services::{
    CelebrationBanner, Clock, CompletionReport, GroupView, HookResult, SessionHooks,
    StudyScheduler,
};
use study_core::cursor::Direction;
use study_core::markers::{MarkerKind, ProgressMarker};
use study_core::model::{Item, ItemId, StudySettings};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidGroupSize { raw: String },
    InvalidSteps { raw: String },
    InvalidItem { raw: String },
    NoItems,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidGroupSize { raw } => write!(f, "invalid --group-size value: {raw}"),
            ArgsError::InvalidSteps { raw } => write!(f, "invalid --steps value: {raw}"),
            ArgsError::InvalidItem { raw } => write!(f, "invalid item: {raw:?}"),
            ArgsError::NoItems => write!(f, "at least one item is required"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

/// Item whose id and display text are the trimmed argument.
fn parse_item(raw: String) -> Result<Item<String>, ArgsError> {
    let id: ItemId = raw.parse().map_err(|_| ArgsError::InvalidItem { raw })?;
    let text = id.to_string();
    Ok(Item::new(id, text))
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--group-size <n>] [--steps <n>] <item>...");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --group-size 2");
    eprintln!("  --steps 4");
    eprintln!();
    eprintln!("Commands while studying:");
    eprintln!("  n  next step     p  previous step");
    eprintln!("  j <step>         jump to step");
    eprintln!("  s  status (json) q  quit");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  STUDY_GROUP_SIZE, STUDY_STEPS_PER_GROUP, RUST_LOG");
}

struct Args {
    group_size: String,
    steps: String,
    items: Vec<Item<String>>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut group_size = std::env::var("STUDY_GROUP_SIZE").unwrap_or_else(|_| "2".into());
        let mut steps = std::env::var("STUDY_STEPS_PER_GROUP").unwrap_or_else(|_| "4".into());
        let mut items = Vec::new();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--group-size" => group_size = require_value(args, "--group-size")?,
                "--steps" => steps = require_value(args, "--steps")?,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ if arg.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => items.push(parse_item(arg)?),
            }
        }

        if items.is_empty() {
            return Err(ArgsError::NoItems);
        }
        Ok(Self {
            group_size,
            steps,
            items,
        })
    }

    fn settings(&self) -> Result<StudySettings, ArgsError> {
        let group_size: usize = self.group_size.parse().map_err(|_| ArgsError::InvalidGroupSize {
            raw: self.group_size.clone(),
        })?;
        let steps: usize = self.steps.parse().map_err(|_| ArgsError::InvalidSteps {
            raw: self.steps.clone(),
        })?;

        StudySettings::new(group_size)
            .map_err(|_| ArgsError::InvalidGroupSize {
                raw: self.group_size.clone(),
            })?
            .with_steps_per_group(steps)
            .map_err(|_| ArgsError::InvalidSteps {
                raw: self.steps.clone(),
            })
    }
}

/// Prints collaborator events and keeps the celebration banner.
struct TerminalHooks {
    clock: Clock,
    banner: CelebrationBanner,
}

impl SessionHooks<String> for TerminalHooks {
    fn on_group_boundary_crossed(
        &mut self,
        _previous: GroupView<'_, String>,
        new: GroupView<'_, String>,
        direction: Direction,
    ) -> HookResult {
        let arrow = match direction {
            Direction::Forward => "->",
            Direction::Backward => "<-",
        };
        println!(
            "{arrow} stage {} group {} ({} items)",
            new.stage_index + 1,
            new.group_index + 1,
            new.items.len()
        );
        Ok(())
    }

    fn on_markers_crossed(&mut self, crossed: &[ProgressMarker]) -> HookResult {
        self.banner.show_latest(crossed, self.clock.now());
        Ok(())
    }

    fn on_session_complete(&mut self, report: &CompletionReport) -> HookResult {
        let elapsed = report.completed_at - report.started_at;
        println!(
            "all {} items studied in {}s",
            report.item_ids.len(),
            elapsed.num_seconds()
        );
        Ok(())
    }
}

fn celebration_text(kind: MarkerKind) -> &'static str {
    match kind {
        MarkerKind::Checkpoint => "group done!",
        MarkerKind::Transition => "stage done!",
        MarkerKind::Terminal => "finished!",
    }
}

fn print_current(scheduler: &StudyScheduler<String, TerminalHooks>) {
    let Some(progress) = scheduler.progress() else {
        return;
    };
    if let Some(kind) = scheduler
        .hooks()
        .banner
        .visible_kind(scheduler.hooks().clock.now())
    {
        println!("  * {}", celebration_text(kind));
    }
    if let Some(group) = scheduler.current_group() {
        let texts: Vec<&str> = group.items.iter().map(|item| item.payload.as_str()).collect();
        println!(
            "[{:>3}%] step {}/{} phase {}: {}",
            progress.percentage,
            progress.completed_steps,
            progress.total_steps,
            progress.position.phase_index + 1,
            texts.join(" ")
        );
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    let settings = args.settings()?;
    debug!(
        items = args.items.len(),
        group_size = settings.group_size(),
        steps_per_group = settings.steps_per_group(),
        "parsed arguments"
    );

    let clock = Clock::default();
    let hooks = TerminalHooks {
        clock,
        banner: CelebrationBanner::new(),
    };
    let mut scheduler = StudyScheduler::new(hooks).with_clock(clock);
    scheduler.start_with(args.items, settings)?;
    print_current(&scheduler);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let line = line?;
        let mut words = line.split_whitespace();
        match (words.next(), words.next()) {
            (Some("n"), _) | (None, _) => {
                scheduler.next();
            }
            (Some("p"), _) => {
                scheduler.previous();
            }
            (Some("j"), Some(step)) => match step.parse::<usize>() {
                Ok(step) => {
                    scheduler.jump_to(step);
                }
                Err(_) => eprintln!("invalid step: {step}"),
            },
            (Some("s"), _) => {
                if let Some(progress) = scheduler.progress() {
                    println!("{}", serde_json::to_string_pretty(&progress)?);
                }
            }
            (Some("q"), _) => break,
            (Some(other), _) => eprintln!("unknown command: {other}"),
        }
        print_current(&scheduler);
        stdout.flush()?;
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
