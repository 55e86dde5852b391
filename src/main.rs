use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use log::{error, info};
use serde::Serialize;

use doistkit::backend::todoist::TodoistClient;
use doistkit::backend::Backend;
use doistkit::backup::BackupService;
use doistkit::cli::{Cli, Command};
use doistkit::config::Config;
use doistkit::ics::IcsImporter;
use doistkit::quick::QuickCapture;
use doistkit::template::{loader, TemplateMaterializer};
use doistkit::{logger, secrets};

fn main() -> ExitCode {
    let cli = Cli::parse();
    if logger::init(cli.debug).is_err() {
        eprintln!("failed to initialize logging");
        return ExitCode::FAILURE;
    }
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:?}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let token = secrets::obtain_token(&config)?;
    let client = TodoistClient::new(token, &config.api);

    match cli.command {
        Command::Backup { file } => {
            let path = BackupService::new(&client).backup(&file)?;
            info!("backup written to {}", path.display());
        }
        Command::Restore { file } => BackupService::new(&client).restore(&file)?,
        Command::Template {
            template,
            placeholders,
        } => {
            let document = loader::load(&template)?;
            TemplateMaterializer::new(&client)?.apply(&document, placeholders.as_ref())?;
        }
        Command::Ics {
            calendar,
            label,
            project,
            section,
        } => {
            let imported = IcsImporter::new(&client)?.import(
                &calendar,
                project.as_deref(),
                section.as_deref(),
                label.as_deref(),
            )?;
            info!("imported {imported} events");
        }
        Command::Quick {
            project,
            section,
            label,
        } => {
            println!("Paste tasks and press ctrl+d when done:");
            let created = QuickCapture::new(&client)?.import(
                std::io::stdin().lock(),
                project.as_deref(),
                section.as_deref(),
                label.as_deref(),
            )?;
            info!("created {created} tasks");
        }
        Command::Projects => print_json(&client.projects()?)?,
        Command::Sections => print_json(&client.sections()?)?,
        Command::Labels => print_json(&client.labels()?)?,
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
