use clap::{Parser, Subcommand};
use lift_core::progression::format_weight;
use lift_core::*;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lift")]
#[command(about = "Triple-progression strength training tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override roster file location
    #[arg(long, global = true)]
    roster: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Log today's sets and show the next plan (default)
    Log {
        /// User name (prompted if omitted)
        #[arg(long)]
        user: Option<String>,

        /// Exercise name (prompted if omitted)
        #[arg(long)]
        exercise: Option<String>,

        /// Reps per set, space separated, e.g. "8 8 7" (prompted if omitted)
        #[arg(long)]
        reps: Option<String>,
    },

    /// Show the plan for the next session without logging
    Plan {
        #[arg(long)]
        user: String,

        #[arg(long)]
        exercise: String,
    },

    /// Add a user to the roster
    AddUser { name: String },

    /// Add an exercise for a user
    AddExercise {
        #[arg(long)]
        user: String,

        name: String,

        /// Base sets (defaults from config)
        #[arg(long)]
        sets: Option<u32>,

        /// Base reps per set (defaults from config)
        #[arg(long)]
        reps: Option<u32>,

        /// Weight added on each success
        #[arg(long)]
        increment: Option<f64>,

        /// Starting weight; prompted on first log if omitted
        #[arg(long)]
        weight: Option<f64>,
    },

    /// List users, or one user's exercises
    List {
        #[arg(long)]
        user: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        lift_core::logging::init_with_level("debug");
    } else {
        lift_core::logging::init();
    }

    let config = Config::load()?;
    let roster_path = cli
        .roster
        .unwrap_or_else(|| config.data.roster_path.clone());
    let store = JsonRosterStore::new(roster_path);

    match cli.command {
        Some(Commands::Log {
            user,
            exercise,
            reps,
        }) => cmd_log(store, user, exercise, reps, &config),
        Some(Commands::Plan { user, exercise }) => cmd_plan(&store, &user, &exercise),
        Some(Commands::AddUser { name }) => cmd_add_user(&store, &name),
        Some(Commands::AddExercise {
            user,
            name,
            sets,
            reps,
            increment,
            weight,
        }) => cmd_add_exercise(&store, &user, &name, sets, reps, increment, weight, &config),
        Some(Commands::List { user }) => cmd_list(&store, user.as_deref()),
        None => cmd_log(store, None, None, None, &config),
    }
}

fn cmd_log(
    mut store: JsonRosterStore,
    user: Option<String>,
    exercise: Option<String>,
    reps: Option<String>,
    config: &Config,
) -> Result<()> {
    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock());

    let user = match user {
        Some(user) => {
            store.load()?.exercise_names(&user)?;
            user
        }
        None => choose_user(&mut prompter, &store)?,
    };

    let exercise = match exercise {
        Some(exercise) => {
            store.load()?.record(&user, &exercise)?;
            exercise
        }
        None => choose_exercise(&mut prompter, &store, &user, config)?,
    };

    if !store.load_record(&user, &exercise)?.is_onboarded() {
        onboard(&mut prompter, &mut store, &user, &exercise)?;
    }

    let record = store.load_record(&user, &exercise)?;
    let expected = record
        .expected_sets()
        .ok_or_else(|| Error::UnknownState(record.current_state.to_string()))?;

    println!("\n{}", describe_plan(&record));

    let input = match reps {
        Some(reps) => parse_session(&reps, expected)?,
        None => prompt_session(&mut prompter, expected)?,
    };

    let outcome = record_session(&mut store, &user, &exercise, &input)?;
    tracing::info!(
        "Logged {:?} for {}/{}: {:?}",
        input.reps(),
        user,
        exercise,
        outcome.transition
    );

    println!("\n--- Session analysis ---");
    println!("{}", describe_transition(&outcome.transition));
    if outcome.transition.is_weight_increase() {
        println!(
            "↑ New working weight: {}",
            format_weight(outcome.record.current_weight)
        );
    }
    println!("\n=========== Next session ===========");
    println!("{}", describe_plan(&outcome.record));
    println!("====================================");

    Ok(())
}

fn cmd_plan(store: &JsonRosterStore, user: &str, exercise: &str) -> Result<()> {
    let record = store.load_record(user, exercise)?;
    println!("{}", describe_plan(&record));
    Ok(())
}

fn cmd_add_user(store: &JsonRosterStore, name: &str) -> Result<()> {
    store.update(|roster| roster.add_user(name))?;
    println!("✓ Added user {}", name.trim());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_add_exercise(
    store: &JsonRosterStore,
    user: &str,
    name: &str,
    sets: Option<u32>,
    reps: Option<u32>,
    increment: Option<f64>,
    weight: Option<f64>,
    config: &Config,
) -> Result<()> {
    let mut record = config.defaults.new_record();
    if let Some(sets) = sets {
        record.base_sets = sets;
    }
    if let Some(reps) = reps {
        record.base_reps = reps;
    }
    if let Some(increment) = increment {
        record.weight_increment = increment;
    }
    record.current_weight = weight;

    store.update(|roster| roster.add_exercise(user, name, record.clone()))?;

    println!(
        "✓ Added {} for {}: {} x {}, +{}kg steps",
        name.trim(),
        user,
        record.base_sets,
        record.base_reps,
        record.weight_increment
    );
    println!("{}", describe_plan(&record));
    Ok(())
}

fn cmd_list(store: &JsonRosterStore, user: Option<&str>) -> Result<()> {
    let roster = store.load()?;

    match user {
        None => {
            if roster.users.is_empty() {
                println!("No users yet. Add one with `lift add-user <name>`.");
            }
            for (name, exercises) in &roster.users {
                println!("{} ({} exercises)", name, exercises.len());
            }
        }
        Some(user) => {
            for name in roster.exercise_names(user)? {
                let record = roster.record(user, name)?;
                println!(
                    "{}: state {}, {}, {} x {}",
                    name,
                    record.current_state,
                    format_weight(record.current_weight),
                    record.base_sets,
                    record.base_reps
                );
            }
        }
    }

    Ok(())
}

fn choose_user<R: BufRead>(prompter: &mut Prompter<R>, store: &JsonRosterStore) -> Result<String> {
    let roster = store.load()?;
    let users = roster.user_names();

    println!("\nSelect your profile:");
    for (i, user) in users.iter().enumerate() {
        println!("[{}] {}", i + 1, user);
    }
    println!("[0] + Add a new user");

    let choice = prompter.ask_choice("\nEnter a number (0 to add a new user): ", users.len())?;
    if choice > 0 {
        return Ok(users[choice - 1].to_string());
    }

    let name = prompter.ask("New user name:\n> ")?;
    store.update(|roster| roster.add_user(&name))?;
    println!("\n✓ Created user {}", name);
    Ok(name)
}

fn choose_exercise<R: BufRead>(
    prompter: &mut Prompter<R>,
    store: &JsonRosterStore,
    user: &str,
    config: &Config,
) -> Result<String> {
    let roster = store.load()?;
    let exercises = roster.exercise_names(user)?;

    println!("\nHello, {}! Select today's exercise:", user);
    for (i, exercise) in exercises.iter().enumerate() {
        println!("[{}] {}", i + 1, exercise);
    }
    println!("[0] + Add a new exercise");

    let choice =
        prompter.ask_choice("\nEnter a number (0 to add a new exercise): ", exercises.len())?;
    if choice > 0 {
        return Ok(exercises[choice - 1].to_string());
    }

    let name = prompter.ask("New exercise name:\n> ")?;
    let defaults = &config.defaults;
    let base_sets = prompter.ask_positive_or(
        &format!("Base sets (default {}):\n> ", defaults.base_sets),
        defaults.base_sets,
    )?;
    let base_reps = prompter.ask_positive_or(
        &format!("Base reps per set (default {}):\n> ", defaults.base_reps),
        defaults.base_reps,
    )?;
    let increment = prompter.ask_increment(defaults.weight_increment)?;

    let record = ExerciseRecord::new(base_sets, base_reps, increment);
    store.update(|roster| roster.add_exercise(user, &name, record))?;
    println!("\n✓ Added exercise {}", name);
    Ok(name)
}

/// First use of an exercise: collect the starting weight and confirm the baseline
fn onboard<R: BufRead>(
    prompter: &mut Prompter<R>,
    store: &mut JsonRosterStore,
    user: &str,
    exercise: &str,
) -> Result<()> {
    println!("\nNo weight recorded yet for {}.", exercise);

    let weight = loop {
        let answer = prompter.ask("Starting weight (kg):\n> ")?;
        match answer.parse::<f64>() {
            Ok(w) if w.is_finite() && w >= 0.0 => break w,
            Ok(_) => println!("Weight cannot be negative, try again."),
            Err(_) => println!("Please enter a number, e.g. 60 or 62.5."),
        }
    };

    let current = store.load_record(user, exercise)?;
    let increment = prompter.ask_increment(current.weight_increment)?;

    println!(
        "\nThe baseline is {} sets x {} reps. Change it? (y/n)",
        current.base_sets, current.base_reps
    );
    let answer = prompter.ask("> ")?.to_lowercase();
    let base = if answer == "y" || answer == "yes" {
        loop {
            let sets = prompter.ask("Base sets:\n> ")?.parse::<u32>();
            let reps = prompter.ask("Base reps per set:\n> ")?.parse::<u32>();
            match (sets, reps) {
                (Ok(s), Ok(r))
                    if (1..=MAX_BASE_SETS).contains(&s) && (1..=MAX_REPS_PER_SET).contains(&r) =>
                {
                    println!("✓ Baseline set to {} sets x {} reps.", s, r);
                    break Some((s, r));
                }
                (Ok(_), Ok(_)) => println!(
                    "Sets must be 1-{} and reps 1-{}.",
                    MAX_BASE_SETS, MAX_REPS_PER_SET
                ),
                _ => println!("Please enter whole numbers."),
            }
        }
    } else {
        None
    };

    store.update_record(user, exercise, |record| {
        record.current_weight = Some(weight);
        record.weight_increment = increment;
        if let Some((sets, reps)) = base {
            record.base_sets = sets;
            record.base_reps = reps;
        }
        record.validate()
    })?;

    println!("\n✓ Starting weight set to {}kg.", weight);
    Ok(())
}

fn parse_session(raw: &str, expected: u32) -> Result<SessionInput> {
    let input: SessionInput = raw.parse()?;
    if input.set_count() != expected as usize {
        return Err(Error::InvalidInput(format!(
            "the plan calls for {} sets but {} were entered",
            expected,
            input.set_count()
        )));
    }
    Ok(input)
}

fn prompt_session<R: BufRead>(prompter: &mut Prompter<R>, expected: u32) -> Result<SessionInput> {
    loop {
        println!("\nEnter the reps you completed in each set.");
        println!("Example: 3 sets of 8, 8 and 7 reps → 8 8 7");
        let raw = prompter.ask("> ")?;
        match parse_session(&raw, expected) {
            Ok(input) => return Ok(input),
            Err(e) => println!("\n⚠ {}. Please try again.", e),
        }
    }
}

fn describe_transition(transition: &Transition) -> String {
    match transition {
        Transition::BaselineCleared { increment } => format!(
            "Great work! State A cleared. Next session adds {}kg.",
            increment
        ),
        Transition::BaselineMissed { total_reps } => format!(
            "Base target missed ({} total reps). Entering state B: build total volume next time.",
            total_reps
        ),
        Transition::VolumeCleared {
            total_reps,
            target,
            increment,
        } => format!(
            "Volume target reached ({}/{} reps). Back to state A with +{}kg.",
            total_reps, target, increment
        ),
        Transition::VolumeContinues {
            total_reps,
            previous_total_reps,
            ..
        } => format!(
            "Total reps today {}, last time {}. Staying in state B.",
            total_reps, previous_total_reps
        ),
        Transition::VolumeStalled { total_reps } => format!(
            "No volume progress twice in a row ({} reps). Moving to state C: add one extra set next time.",
            total_reps
        ),
        Transition::ExtraSetCleared { increment } => format!(
            "Extra set cleared! Back to state A with +{}kg.",
            increment
        ),
        Transition::Deloaded { from, to } => format!(
            "State C missed. Deload triggered: next session is {} recovery sets at {}kg (was {}kg).",
            RECOVERY_SETS, to, from
        ),
        Transition::RecoveryComplete => {
            "Deload complete. Starting again from state A.".to_string()
        }
    }
}

/// Line-based prompts over any buffered reader
struct Prompter<R> {
    input: R,
}

impl<R: BufRead> Prompter<R> {
    fn new(input: R) -> Self {
        Self { input }
    }

    fn ask(&mut self, prompt: &str) -> Result<String> {
        print!("{}", prompt);
        io::stdout().flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(Error::InvalidInput("input closed".into()));
        }
        Ok(line.trim().to_string())
    }

    /// Menu choice in `0..=max`
    fn ask_choice(&mut self, prompt: &str, max: usize) -> Result<usize> {
        let answer = self.ask(prompt)?;
        match answer.parse::<usize>() {
            Ok(n) if n <= max => Ok(n),
            _ => Err(Error::InvalidInput(format!("{:?} is not a menu option", answer))),
        }
    }

    /// Positive integer, falling back to `default` on blank or invalid input
    fn ask_positive_or(&mut self, prompt: &str, default: u32) -> Result<u32> {
        let answer = self.ask(prompt)?;
        Ok(match answer.parse::<u32>() {
            Ok(n) if n > 0 => n,
            _ => default,
        })
    }

    fn ask_increment(&mut self, default: f64) -> Result<f64> {
        let answer = self.ask(&format!(
            "Smallest weight step for this exercise, e.g. 2.5 for a barbell (default {}):\n> ",
            default
        ))?;
        Ok(match answer.parse::<f64>() {
            Ok(step) if step.is_finite() && step > 0.0 => step,
            _ => default,
        })
    }
}
