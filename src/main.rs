use actix::prelude::*;
use anyhow::Context as _;
use clap::Parser;
use colored::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};

mod actors;
mod config;
mod dto;
mod engine;
mod errors;
mod logger;
mod script;
mod templates;

use actors::conversation::{BackToMenu, ConversationActor, GetStatus, GetTranscript, Open, Restart, SubmitInput};
use actors::transcript::{Flush, Render, RenderMode, TranscriptRenderer, format_json, format_terminal};
use config::CONFIG;
use dto::pipe::{PipeRequest, TranscriptDump};
use engine::Timing;
use engine::runner::DialogEngine;
use engine::session::Session;
use script::Locale;
use script::parser::{ScriptRegistry, shape};

#[derive(Parser)]
#[command(name = "campusbot")]
#[command(about = "A scripted student services assistant for the terminal.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    /// Script language
    #[clap(long, global = true, value_enum)]
    locale: Option<Locale>,
    /// Directory with `<locale>.json` files overriding the bundled scripts
    #[clap(long, global = true)]
    scripts_dir: Option<PathBuf>,
    #[clap(long, global = true)]
    log_level: Option<String>,
    /// Deliver every reply immediately
    #[clap(long, global = true, action)]
    no_delay: bool,
    #[clap(long, global = true, action)]
    no_color: bool,
}

#[derive(clap::Subcommand, Clone)]
enum Commands {
    /// Chat in the terminal
    Chat,
    /// Line-delimited JSON requests on stdin, one JSON message per stdout line
    Pipe,
    /// Feed a file of inputs, one per line, and print the transcript
    Replay {
        file: PathBuf,
        #[clap(long, action)]
        json: bool,
    },
    /// Validate every script variant and print its structure
    Check,
}

#[actix_rt::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.clone().unwrap_or(Commands::Chat);

    let default_level = match command {
        Commands::Check => "info",
        _ => "warn",
    };
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| CONFIG.log_level.clone())
        .unwrap_or_else(|| default_level.to_string());
    logger::init_logger(&log_level);

    if cli.no_color || CONFIG.color == Some(false) {
        colored::control::set_override(false);
    }

    let scripts_dir = cli.scripts_dir.clone().or_else(|| CONFIG.scripts_dir.clone());
    let registry = ScriptRegistry::load(scripts_dir.as_deref()).context("Failed to load conversation scripts")?;

    match command {
        Commands::Check => run_check(&registry),
        Commands::Chat => {
            let locale = resolve_locale(&cli)?;
            let engine = build_engine(&registry, locale, CONFIG.timing())?;
            run_chat(engine, locale, registry.origin(locale).unwrap_or("bundled"), !cli.no_delay).await
        }
        Commands::Pipe => {
            let engine = build_engine(&registry, resolve_locale(&cli)?, CONFIG.timing())?;
            run_pipe(engine, !cli.no_delay).await
        }
        Commands::Replay { file, json } => {
            let engine = build_engine(&registry, resolve_locale(&cli)?, Timing::immediate())?;
            run_replay(engine, &file, json)
        }
    }
}

fn resolve_locale(cli: &Cli) -> anyhow::Result<Locale> {
    if let Some(locale) = cli.locale {
        return Ok(locale);
    }
    match &CONFIG.locale {
        Some(code) => code
            .parse::<Locale>()
            .with_context(|| format!("Invalid locale '{}' in config.yaml", code)),
        None => Ok(Locale::default()),
    }
}

fn build_engine(registry: &ScriptRegistry, locale: Locale, timing: Timing) -> anyhow::Result<DialogEngine> {
    let script = registry.get(locale)?;
    log::debug!("Using {} script with {:?}", locale, timing);
    Ok(DialogEngine::new(script, timing))
}

async fn run_chat(engine: DialogEngine, locale: Locale, origin: &str, paced: bool) -> anyhow::Result<()> {
    logger::print_banner("Student Services Assistant", locale.code(), origin);

    let renderer = TranscriptRenderer::new(RenderMode::Terminal).start();
    let conversation = conversation_actor(engine, renderer.recipient(), paced).start();
    conversation.send(Open).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", ">".green().bold());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            "/quit" => break,
            "/menu" => {
                conversation.send(BackToMenu).await?;
            }
            _ => {
                conversation.send(SubmitInput(line)).await?;
            }
        }
    }

    let status = conversation.send(GetStatus).await?;
    log::info!(
        "Chat closed in {} ({})",
        status.state,
        if status.is_finished() { "finished" } else { "left early" }
    );
    println!();
    Ok(())
}

/// Replies keep their scheduled timestamps either way; `paced` only decides
/// whether delivery waits for them.
fn conversation_actor(engine: DialogEngine, output: Recipient<Render>, paced: bool) -> ConversationActor {
    let actor = ConversationActor::new(Session::new(engine), output);
    if paced { actor } else { actor.without_delays() }
}

async fn run_pipe(engine: DialogEngine, paced: bool) -> anyhow::Result<()> {
    let renderer = TranscriptRenderer::new(RenderMode::JsonLines).start();
    let conversation = conversation_actor(engine, renderer.clone().recipient(), paced).start();
    conversation.send(Open).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        match PipeRequest::parse(&line) {
            Ok(PipeRequest::Input { text }) => {
                conversation.send(SubmitInput(text)).await?;
            }
            Ok(PipeRequest::Restart) => {
                conversation.send(Restart).await?;
            }
            Ok(PipeRequest::Menu) => {
                conversation.send(BackToMenu).await?;
            }
            Ok(PipeRequest::Transcript) => {
                let transcript = conversation.send(GetTranscript).await?;
                renderer.send(Flush).await?;
                println!("{}", serde_json::to_string(&TranscriptDump { transcript: &transcript })?);
            }
            Err(e) => {
                log::debug!("Rejected pipe request {:?}: {}", line, e.error);
                println!("{}", serde_json::to_string(&e)?);
            }
        }
    }
    Ok(())
}

fn run_replay(engine: DialogEngine, file: &Path, json: bool) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;

    let mut session = Session::new(engine);
    session.open();
    for line in content.lines() {
        session.submit(line);
    }
    log::info!(
        "Replayed {} inputs from {}, ended in {}",
        content.lines().count(),
        file.display(),
        session.state()
    );
    log::debug!("Collected details: {}", serde_json::to_string(session.record())?);

    for message in session.transcript() {
        if json {
            println!("{}", format_json(message)?);
        } else {
            println!("{}", format_terminal(message));
        }
    }
    Ok(())
}

fn run_check(registry: &ScriptRegistry) -> anyhow::Result<()> {
    let mut shapes = Vec::new();

    for locale in registry.locales() {
        let script = registry.get(locale)?;
        let summary = shape(&script);
        let origin = registry.origin(locale).unwrap_or("unknown");

        let per_topic: Vec<String> = summary
            .topics
            .iter()
            .map(|t| format!("{}={}/{}", t.key.as_str(), t.problems.max(t.options), t.described))
            .collect();
        println!(
            "{} {} ({}) menu={} urgent_topics={} contacts={} survey={} {}",
            "ok".green().bold(),
            locale,
            origin,
            summary.menu_options,
            summary.urgent_topics,
            summary.contacts,
            if summary.survey_enabled { "on" } else { "off" },
            per_topic.join(" ")
        );
        shapes.push((locale, summary));
    }

    if let Some((first, expected)) = shapes.first() {
        for (locale, shape) in &shapes[1..] {
            if shape != expected {
                anyhow::bail!("The {} script is not structurally interchangeable with the {} script", locale, first);
            }
        }
    }

    log::info!("{} script variants checked", shapes.len());
    Ok(())
}
