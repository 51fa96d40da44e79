//! habit - command-line habit tracker on top of habitkit.
//!
//! Every command except `register` signs in first, unless a saved
//! `--token` is given. If the account still
//! has a temporary password, pass `--new-password` to finish the
//! challenge in the same run.

use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use habitkit::prelude::*;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "habit")]
#[command(about = "Track personal habits against a habitkit API")]
struct Args {
    /// Base URL of the API, including any stage prefix
    #[arg(long, env = "HABITKIT_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "HABITKIT_TIMEOUT_SECS", default_value = "30")]
    timeout_secs: u64,

    /// Account email, also used as the username
    #[arg(long, env = "HABITKIT_EMAIL")]
    email: Option<String>,

    #[arg(long, env = "HABITKIT_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Bearer token from an earlier sign-in; skips the login round trip
    #[arg(long, env = "HABITKIT_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Permanent password to set if sign-in asks for one
    #[arg(long, env = "HABITKIT_NEW_PASSWORD", hide_env_values = true)]
    new_password: Option<String>,

    /// Log level for habitkit crates (RUST_LOG overrides)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account; a temporary password is sent by email
    Register,
    #[command(flatten)]
    Habits(HabitCommand),
}

/// Commands that need a signed-in session.
#[derive(Subcommand, Debug)]
enum HabitCommand {
    /// List habits
    List,
    /// Add a habit
    Add {
        name: String,
        #[arg(long, short, default_value = "daily")]
        frequency: Frequency,
        #[arg(long, short)]
        description: Option<String>,
        /// First day to track (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<String>,
    },
    /// Change a habit's name, description or frequency
    Update {
        id: HabitId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, short)]
        description: Option<String>,
        #[arg(long, short)]
        frequency: Option<Frequency>,
    },
    /// Mark a habit done for today
    Complete { id: HabitId },
    /// Show a habit's completion history
    History { id: HabitId },
    /// Delete a habit
    Delete { id: HabitId },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "habitkit={level},habit_cli={level}",
                    level = args.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ClientConfig::builder()
        .base_url(&args.api_url)
        .timeout(Duration::from_secs(args.timeout_secs))
        .build()
        .context("invalid client configuration")?;
    let client = AuthenticatedRequestClient::new(config)?;
    debug!(api_url = %args.api_url, "client ready");

    let email = args.email.as_deref().context("--email is required");

    match args.command {
        Command::Register => {
            let body = client.register(email?).await.into_result()?;
            print_payload(&body)
        }
        Command::Habits(command) => {
            if let Some(token) = args.token.as_deref() {
                client.restore_session(token).context("unusable --token")?;
            } else {
                let password = args.password.as_deref().context("--password is required")?;
                sign_in(&client, email?, password, args.new_password.as_deref()).await?;
            }
            run(&client, command).await
        }
    }
}

async fn sign_in(
    client: &AuthenticatedRequestClient,
    email: &str,
    password: &str,
    new_password: Option<&str>,
) -> anyhow::Result<()> {
    match client.login(email, password).await {
        ResponseOutcome::ChallengeRequired { .. } => {
            let Some(new_password) = new_password else {
                bail!("a new password is required; rerun with --new-password");
            };
            client
                .complete_challenge(new_password)
                .await
                .into_result()
                .context("could not set new password")?;
            info!(email, "password changed");
        }
        outcome => {
            outcome.into_result().context("sign-in failed")?;
        }
    }
    Ok(())
}

async fn run(client: &AuthenticatedRequestClient, command: HabitCommand) -> anyhow::Result<()> {
    let habits = client.habits();

    match command {
        HabitCommand::List => {
            let list = habits.list().await?;
            if list.is_empty() {
                println!("no habits yet");
            }
            for habit in list {
                let mark = if habit.completed { "x" } else { " " };
                println!("[{mark}] {}  {} ({})", habit.id, habit.name, habit.frequency);
                if let Some(description) = habit.description {
                    println!("      {description}");
                }
            }
        }
        HabitCommand::Add {
            name,
            frequency,
            description,
            start_date,
        } => {
            let mut new = NewHabit::new(name, frequency)?;
            if let Some(description) = description {
                new = new.description(description);
            }
            if let Some(date) = start_date {
                new = new.start_date(date);
            }
            print_payload(&habits.create(&new).await?)?;
        }
        HabitCommand::Update {
            id,
            name,
            description,
            frequency,
        } => {
            let update = HabitUpdate {
                name,
                description,
                frequency,
                ..HabitUpdate::default()
            };
            print_payload(&habits.update(&id, &update).await?)?;
        }
        HabitCommand::Complete { id } => print_payload(&habits.complete(&id).await?)?,
        HabitCommand::History { id } => print_payload(&habits.history(&id).await?)?,
        HabitCommand::Delete { id } => print_payload(&habits.delete(&id).await?)?,
    }
    Ok(())
}

fn print_payload(payload: &Payload) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(payload)?);
    Ok(())
}
