use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::config::prepare_database_url;
use storage::{KeyValueStore, Storage};

#[derive(Parser, Debug)]
#[command(name = "store-tool", about = "Inspect the persisted session keys")]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/session.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ping the database.
    Check,
    List,
    Get { key: String },
    Set { key: String, value: String },
    Remove { key: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(&prepare_database_url(&cli.database_url)).await?;

    match cli.command {
        Command::Check => {
            storage.health_check().await?;
            println!("ok {}", cli.database_url);
        }
        Command::List => {
            for entry in storage.entries().await? {
                println!(
                    "{}\t{}\t{}",
                    entry.key,
                    entry.value,
                    entry.updated_at.to_rfc3339()
                );
            }
        }
        Command::Get { key } => match storage.get(&key).await? {
            Some(value) => println!("{value}"),
            None => println!("{key} is not set"),
        },
        Command::Set { key, value } => {
            storage.set(&key, &value).await?;
            println!("set {key}");
        }
        Command::Remove { key } => {
            storage.remove(&key).await?;
            println!("removed {key}");
        }
    }

    Ok(())
}
