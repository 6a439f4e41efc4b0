//! `game-builder` CLI.
//!
//! Turns a game idea into `index.html`, `style.css` and `game.js` by running
//! the clarify, plan, implement and validate phases against a generative
//! model.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::warn;

use builder::build::{BuildEvent, BuildOptions, run_build};
use builder::console;
use builder::exit_codes;
use builder::io::answers::{Interrupted, PresetAnswers, Terminal};
use builder::io::config::{BuilderConfig, CONFIG_FILE_NAME, load_config, write_config};
use builder::io::llm::{GeminiClient, LlmSettings};
use builder::io::prompt::{PromptBuilder, PromptLimits};
use builder::logging;

#[derive(Parser)]
#[command(
    name = "game-builder",
    version,
    about = "Build a browser game from an idea with a generative model"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline and write the game files.
    Build(BuildArgs),
    /// Write a default config file.
    Init {
        /// Overwrite an existing config file.
        #[arg(short, long)]
        force: bool,
        #[arg(long, default_value = CONFIG_FILE_NAME)]
        config: PathBuf,
    },
}

#[derive(Args)]
struct BuildArgs {
    /// Game idea. Read from stdin when omitted.
    #[arg(short, long)]
    prompt: Option<String>,

    /// Answer to a clarification question, in question order. When given,
    /// no questions are asked interactively.
    #[arg(short, long = "answer")]
    answers: Vec<String>,

    /// Directory for the generated files (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Model identifier (overrides config).
    #[arg(long)]
    model: Option<String>,

    /// Implement/validate round budget (overrides config).
    #[arg(long)]
    max_iterations: Option<u32>,

    #[arg(long, default_value = CONFIG_FILE_NAME)]
    config: PathBuf,
}

fn main() {
    logging::init();
    let cli = Cli::parse();
    let code = match run(cli) {
        Ok(code) => code,
        Err(err) if err.is::<Interrupted>() => {
            println!("\n\nBuild interrupted by user. Goodbye!");
            exit_codes::OK
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            eprintln!("hint: check that your API key environment variable is set and valid");
            exit_codes::FAULT
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Build(args) => cmd_build(args),
        Command::Init { force, config } => cmd_init(&config, force),
    }
}

fn cmd_init(path: &Path, force: bool) -> Result<i32> {
    if path.exists() && !force {
        println!(
            "{} already exists; use --force to overwrite",
            path.display()
        );
        return Ok(exit_codes::OK);
    }
    write_config(path, &BuilderConfig::default())?;
    println!("Wrote {}", path.display());
    Ok(exit_codes::OK)
}

fn cmd_build(args: BuildArgs) -> Result<i32> {
    let mut cfg = load_config(&args.config)?;
    if let Some(model) = args.model {
        cfg.llm.model = model;
    }
    if let Some(output_dir) = args.output_dir {
        cfg.build.output_dir = output_dir;
    }
    if let Some(max_iterations) = args.max_iterations {
        cfg.build.max_iterations = max_iterations;
    }
    cfg.validate().context("invalid build options")?;
    let api_key = std::env::var(&cfg.llm.api_key_env).ok();

    let (prompt, answers) = (args.prompt, args.answers);
    run_interruptible(move || build_game(&cfg, api_key, prompt, answers))
}

/// Run `job` on a blocking thread, returning [`Interrupted`] on Ctrl-C.
///
/// The job is not cancelled; the caller is expected to exit the process.
fn run_interruptible<F>(job: F) -> Result<i32>
where
    F: FnOnce() -> Result<i32> + Send + 'static,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("start signal runtime")?;
    let result = runtime.block_on(async {
        let job = tokio::task::spawn_blocking(job);
        tokio::select! {
            joined = job => match joined {
                Ok(result) => result,
                Err(err) => Err(anyhow::Error::new(err).context("build task failed")),
            },
            signal = tokio::signal::ctrl_c() => match signal {
                Ok(()) => Err(Interrupted.into()),
                Err(err) => Err(anyhow::Error::new(err).context("listen for ctrl-c")),
            },
        }
    });
    runtime.shutdown_background();
    result
}

fn build_game(
    cfg: &BuilderConfig,
    api_key: Option<String>,
    prompt: Option<String>,
    answers: Vec<String>,
) -> Result<i32> {
    let mut stdout = io::stdout();
    let mut terminal = Terminal::new(io::stdin().lock(), io::stdout());

    console::render_welcome(&mut stdout)?;
    let user_prompt = match prompt {
        Some(prompt) => prompt,
        None => terminal.prompt_line("Describe your game idea: ")?,
    };
    if user_prompt.trim().is_empty() {
        println!("No input provided. Exiting.");
        return Ok(exit_codes::OK);
    }

    let generator = GeminiClient::new(LlmSettings::resolve(cfg, api_key)?)?;
    let prompts = PromptBuilder::new(PromptLimits {
        validation_plan_chars: cfg.build.validation_plan_chars,
        instructions_plan_chars: cfg.build.instructions_plan_chars,
    });
    let options = BuildOptions {
        user_prompt,
        max_iterations: cfg.build.max_iterations,
        output_dir: cfg.build.output_dir.clone(),
    };

    let on_event = |event: &BuildEvent<'_>| {
        if let Err(err) = console::render_event(&mut stdout, event) {
            warn!(%err, "failed to write progress");
        }
    };
    let outcome = if answers.is_empty() {
        run_build(&generator, &mut terminal, &prompts, &options, on_event)?
    } else {
        let mut preset = PresetAnswers::new(answers);
        run_build(&generator, &mut preset, &prompts, &options, on_event)?
    };

    console::render_summary(&mut stdout, &outcome)?;
    stdout.flush().context("flush stdout")?;
    Ok(exit_codes::OK)
}
