use std::{
    fs,
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{Context, Result};
use chrono::Local;
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use dispatch_board::{
    config::{self, ClientConfig},
    dashboard::{Confirmation, Dashboard},
    errors::ServiceError,
    sync::{FileCache, HttpRemoteSchedules, LoadSource, SyncGateway},
    views::render_table,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client_config = config::load_client_config().context("failed to load client config")?;
    config::init_tracing(&client_config.log_level, false);

    let mut dashboard = connect(&client_config).await?;

    match cli.command {
        Commands::Add { text } => handle_add(&mut dashboard, &text.join(" "), cli.json).await?,
        Commands::List => handle_list(&dashboard, cli.json)?,
        Commands::Status { index, code } => {
            handle_status(&mut dashboard, index, code, cli.json).await?
        }
        Commands::Delete { index, yes } => {
            handle_delete(&mut dashboard, index, yes, cli.json).await?
        }
        Commands::Export { output } => handle_export(&dashboard, output, cli.json)?,
        Commands::Import { path } => handle_import(&mut dashboard, path, cli.json).await?,
        Commands::Stats => handle_stats(&dashboard, cli.json)?,
    }

    Ok(())
}

#[derive(Parser)]
#[command(
    name = "dispatch-cli",
    about = "Register dispatch texts and track their work status",
    version
)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a pasted dispatch text
    Add {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Show all schedules, newest first
    List,
    /// Change the work status of a schedule (1-5)
    Status { index: usize, code: u8 },
    /// Delete a schedule
    Delete {
        index: usize,
        #[arg(long, action = ArgAction::SetTrue, help = "Skip the confirmation prompt")]
        yes: bool,
    },
    /// Write the collection to a dated JSON file
    Export {
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Replace the collection with an exported JSON file
    Import { path: PathBuf },
    /// Show per-status counts and shares
    Stats,
}

async fn connect(client_config: &ClientConfig) -> Result<Dashboard> {
    let remote = HttpRemoteSchedules::new(
        &client_config.api_base_url,
        client_config.request_timeout(),
    )
    .context("failed to build HTTP client")?;
    let remote = Arc::new(remote);
    let cache = Arc::new(FileCache::new(client_config.cache_path.clone()));
    let gateway = SyncGateway::new(remote.clone(), cache.clone());

    let mut dashboard = Dashboard::new(gateway);
    let source = dashboard
        .initialize()
        .await
        .context("failed to load schedules")?;
    if source == LoadSource::LocalCache {
        eprintln!(
            "warning: {} unreachable, using local cache {}",
            remote.endpoint(),
            cache.path().display()
        );
    }
    Ok(dashboard)
}

async fn handle_add(dashboard: &mut Dashboard, text: &str, json: bool) -> Result<()> {
    let index = match dashboard.add_from_text(text, Local::now().date_naive()).await {
        Ok(index) => index,
        Err(ServiceError::Parse(err)) => {
            debug!(error = %err, "dispatch text rejected");
            anyhow::bail!("스케줄 형식이 올바르지 않습니다.");
        }
        Err(err) => return Err(err).context("failed to save schedule"),
    };
    report_remote_outcome(dashboard);

    let record = &dashboard.records()[index];
    if json {
        print_json(record)?;
    } else {
        println!(
            "Added #{}: {} {} {}",
            index, record.phone_number, record.customer_code, record.address
        );
    }
    Ok(())
}

fn handle_list(dashboard: &Dashboard, json: bool) -> Result<()> {
    let rows = dashboard.rows();
    if json {
        print_json(&rows)?;
    } else {
        print!("{}", render_table(&rows));
        if rows.is_empty() {
            println!();
        }
    }
    Ok(())
}

async fn handle_status(dashboard: &mut Dashboard, index: usize, code: u8, json: bool) -> Result<()> {
    dashboard
        .set_status(index, code)
        .await
        .with_context(|| format!("failed to update schedule #{}", index))?;
    report_remote_outcome(dashboard);

    let record = &dashboard.records()[index];
    if json {
        print_json(record)?;
    } else {
        println!("Schedule #{} is now {}", index, record.status);
    }
    Ok(())
}

async fn handle_delete(dashboard: &mut Dashboard, index: usize, yes: bool, json: bool) -> Result<()> {
    let confirmation = if yes {
        Confirmation::Confirmed
    } else {
        prompt_confirmation(index)?
    };

    let removed = dashboard
        .remove(index, confirmation)
        .await
        .with_context(|| format!("failed to delete schedule #{}", index))?;

    match removed {
        Some(record) => {
            report_remote_outcome(dashboard);
            if json {
                print_json(&record)?;
            } else {
                println!("Deleted #{} ({})", index, record.customer_code);
            }
        }
        None if json => print_json(&json!({ "deleted": false }))?,
        None => println!("Cancelled"),
    }
    Ok(())
}

fn handle_export(dashboard: &Dashboard, output: Option<PathBuf>, json: bool) -> Result<()> {
    let (file_name, body) = dashboard.export_json(Local::now().date_naive())?;
    let path = output.unwrap_or_else(|| PathBuf::from(file_name));
    fs::write(&path, body).with_context(|| format!("failed to write {}", path.display()))?;

    if json {
        print_json(&json!({
            "path": path.display().to_string(),
            "count": dashboard.records().len(),
        }))?;
    } else {
        println!(
            "Exported {} schedules to {}",
            dashboard.records().len(),
            path.display()
        );
    }
    Ok(())
}

async fn handle_import(dashboard: &mut Dashboard, path: PathBuf, json: bool) -> Result<()> {
    let text =
        fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
    let count = match dashboard.import_json(&text).await {
        Ok(count) => count,
        Err(ServiceError::Import(err)) => {
            debug!(error = %err, "import rejected");
            anyhow::bail!("올바른 파일 형식이 아닙니다.");
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to import {}", path.display()))
        }
    };
    report_remote_outcome(dashboard);

    if json {
        print_json(&json!({ "imported": count }))?;
    } else {
        println!("데이터를 성공적으로 가져왔습니다. ({} schedules)", count);
    }
    Ok(())
}

fn handle_stats(dashboard: &Dashboard, json: bool) -> Result<()> {
    if json {
        print_json(&json!({
            "stats": dashboard.stats_view().stats(),
            "chart": dashboard.stats_view().chart(),
        }))?;
    } else {
        print!("{}", dashboard.stats_text());
        if dashboard.records().is_empty() {
            println!();
        }
    }
    Ok(())
}

fn prompt_confirmation(index: usize) -> Result<Confirmation> {
    print!("정말 삭제하시겠습니까? (#{}) [y/N] ", index);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(Confirmation::from(answer.trim().eq_ignore_ascii_case("y")))
}

fn report_remote_outcome(dashboard: &Dashboard) {
    if let Some(outcome) = dashboard.last_persist() {
        if !outcome.remote_saved {
            eprintln!("warning: saved locally only; remote store did not accept the update");
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
