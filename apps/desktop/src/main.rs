use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{
    config::{load_settings, load_settings_from, prepare_database_url},
    navigation::NavigationTree,
    resolve_theme, AccountFlows, ControllerOptions, HttpIdentityService, IdentityService,
    MissingIdentityService, SessionController,
};
use serde::Serialize;
use shared::domain::{Credentials, Registration};
use storage::Storage;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "session-shell", about = "Drive the device session from a terminal")]
struct Args {
    /// Settings file; defaults to ./client.toml.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    database_url: Option<String>,
    #[arg(long)]
    identity_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Status,
    SignIn {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    SignUp {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        number: String,
    },
    SignOut,
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    ToggleTheme,
    Theme,
    Routes,
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => load_settings_from(path),
        None => load_settings(),
    };
    if let Some(url) = args.database_url {
        settings.database_url = url;
    }
    if let Some(url) = args.identity_url {
        settings.identity_url = Some(url);
    }

    let storage = Storage::new(&prepare_database_url(&settings.database_url)).await?;
    storage.health_check().await?;
    let controller = SessionController::new_with_options(
        Arc::new(storage),
        ControllerOptions {
            persist_theme: settings.persist_theme,
        },
    );
    let restored = controller.spawn_restore(settings.restore_delay()).await?;
    for failure in restored.persistence.failures() {
        warn!(field = ?failure.field, message = %failure.message, "stored session field unreadable");
    }

    let identity: Arc<dyn IdentityService> = match &settings.identity_url {
        Some(url) => Arc::new(HttpIdentityService::new(
            url,
            settings.identity_api_key.clone(),
        )?),
        None => Arc::new(MissingIdentityService),
    };
    let flows = AccountFlows::new(identity, Arc::clone(&controller));

    match args.command {
        Command::Status => print_json(&controller.snapshot())?,
        Command::SignIn { email, password } => {
            let transition = flows.sign_in(&Credentials { email, password }).await?;
            print_json(&transition)?;
        }
        Command::SignUp {
            email,
            password,
            name,
            number,
        } => {
            let transition = flows
                .register(&Registration {
                    email,
                    password,
                    name,
                    number,
                })
                .await?;
            print_json(&transition)?;
            println!("Account created; sign in to start a session.");
        }
        Command::SignOut => print_json(&controller.sign_out().await)?,
        Command::ForgotPassword { email } => {
            flows.request_password_reset(&email).await?;
            println!("Password reset email requested for {email}.");
        }
        Command::ToggleTheme => {
            let transition = controller.toggle_theme().await;
            print_json(&transition)?;
            if !settings.persist_theme {
                println!("Theme preference is not persisted; set persist_theme to keep it.");
            }
        }
        Command::Theme => print_json(&resolve_theme(controller.snapshot().dark_theme))?,
        Command::Routes => print_json(&NavigationTree::for_session(&controller.snapshot()))?,
    }

    Ok(())
}
