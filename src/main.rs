mod grow;
mod terminal;

use arbor::config::GrowConfig;
use arbor::grammar::{self, RuleSet};
use arbor::logging::init_logging;
use arbor::params;
use arbor::profile::parse_language;
use arbor::settings::Settings;
use arbor::TreeStage;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "arbor")]
#[command(author = "Arbor")]
#[command(version = "0.1.0")]
#[command(about = "Grow an L-system tree from an activity score", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grow a tree in the terminal
    Grow {
        /// Activity score (negative or non-numeric scores grow a seed)
        #[arg(short = 'S', long, default_value = "250", allow_negative_numbers = true)]
        score: f64,

        /// Random seed for reproducibility
        #[arg(short, long)]
        seed: Option<u64>,

        /// Show the growth animation
        #[arg(short, long)]
        live: bool,

        /// Print tree to stdout (no interactive display)
        #[arg(short, long)]
        print: bool,

        /// Frame interval in seconds
        #[arg(short, long)]
        time: Option<f32>,

        /// Name shown in the caption
        #[arg(short, long)]
        name: Option<String>,

        /// Language weight for the caption, e.g. Rust=1200 (repeatable)
        #[arg(long = "lang", value_parser = parse_language)]
        languages: Vec<(String, f64)>,

        /// Force a rule set by index (wraps around)
        #[arg(short, long)]
        rules: Option<usize>,

        /// Write logs to this directory
        #[arg(long)]
        log_dir: Option<PathBuf>,
    },

    /// Print the parameters a score maps to, as JSON
    Params {
        #[arg(short = 'S', long, allow_negative_numbers = true)]
        score: f64,
    },

    /// Expand the grammar and report the sequence
    Expand {
        /// Score used to pick the rule set and iteration count
        #[arg(short = 'S', long, default_value = "250", allow_negative_numbers = true)]
        score: f64,

        /// Override the iteration count
        #[arg(short, long)]
        iterations: Option<u32>,

        /// Force a rule set by index (wraps around)
        #[arg(short, long, conflicts_with = "grammar")]
        rules: Option<usize>,

        /// Custom rules, e.g. "X=F[+X][-X]FX, F=FF"
        #[arg(short, long)]
        grammar: Option<String>,

        /// Print the sequence itself, not just its length
        #[arg(long)]
        show: bool,
    },
}

fn main() -> Result<(), arbor::Error> {
    let cli = Cli::parse();
    let (settings, settings_error) = Settings::load();

    match cli.command {
        Commands::Grow {
            score,
            seed,
            live,
            print,
            time,
            name,
            languages,
            rules,
            log_dir,
        } => {
            let config = GrowConfig {
                score,
                seed,
                live,
                print,
                time_step: time,
                rules,
                display_name: name,
                languages,
                log_dir: log_dir.or_else(|| settings.logging.dir.clone()),
            };

            // The alternate screen owns stdout and stderr; only log to a file there.
            let _guard = match (&config.log_dir, config.print) {
                (Some(dir), _) => {
                    let guard = init_logging(Some(dir))?;
                    report_settings_error(settings_error.as_ref());
                    guard
                }
                (None, true) => {
                    let guard = init_logging(None)?;
                    report_settings_error(settings_error.as_ref());
                    guard
                }
                (None, false) => {
                    // Printed before the alternate screen, so it is still there after exit.
                    if let Some(err) = &settings_error {
                        eprintln!("arbor: ignoring settings file: {}", err);
                    }
                    None
                }
            };

            grow::run(config, settings)?;
        }
        Commands::Params { score } => {
            let _guard = init_logging(None)?;
            report_settings_error(settings_error.as_ref());
            let parameters = params::map(score);
            let rules = settings.rule_set_for(score, None).to_string();
            let report = serde_json::json!({
                "score": params::sanitize(score),
                "stage": TreeStage::from_score(score),
                "label": TreeStage::from_score(score).to_string(),
                "rules": rules,
                "parameters": parameters,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Expand {
            score,
            iterations,
            rules,
            grammar: custom,
            show,
        } => {
            let _guard = init_logging(None)?;
            report_settings_error(settings_error.as_ref());
            let parameters = params::map(score);
            let rule_set = match custom {
                Some(text) => RuleSet::parse(&text)?,
                None => settings.rule_set_for(score, rules),
            };
            let iterations = iterations.unwrap_or(parameters.iteration_count);
            let sequence = grammar::expand(grammar::AXIOM, &rule_set, iterations);

            println!("rules: {}", rule_set);
            println!("iterations: {}", iterations);
            println!("length: {}", sequence.len());
            if show {
                println!("{}", sequence);
            }
        }
    }

    Ok(())
}

fn report_settings_error(err: Option<&arbor::Error>) {
    if let Some(err) = err {
        tracing::warn!(%err, "ignoring settings file");
    }
}
