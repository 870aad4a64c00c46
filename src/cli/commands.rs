//! Command dispatch: one function per action

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use tracing::{debug, instrument, warn};

use crate::application::services::{render_record, ListOptions, UploadOptions};
use crate::application::{ApplicationError, RecordStore};
use crate::cli::args::Cli;
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{expand_path, global_config_path, write_template, Settings};
use crate::domain::{is_known_field, Template};
use crate::infrastructure::di::{ServiceContainer, StoreLocation};

/// Parse-independent entry point: run the action selected by `cli`.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    if let Some(shell) = cli.action.completion {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    if cli.action.init_config {
        let path = init_config(cli.config.as_deref())?;
        output::action("Created", &path.display());
        return Ok(());
    }

    let settings = Settings::load(cli.config.as_deref())?;
    if cli.action.show_config {
        output::info(&settings.to_toml()?);
        return Ok(());
    }

    let location = store_location(cli, &settings);
    debug!("store: {:?}", location);
    let container = ServiceContainer::new(settings, location)?;
    run_with_store(cli, &container)
}

/// Write the sample config to `target`, or to the global config path.
pub fn init_config(target: Option<&Path>) -> CliResult<PathBuf> {
    let path = match target {
        Some(path) => expand_path(path),
        None => global_config_path().ok_or_else(|| ApplicationError::Config {
            message: "cannot determine config directory".to_string(),
        })?,
    };
    write_template(&path)?;
    Ok(path)
}

/// Resolve `--db` / `--no-db` against the configured store.
pub fn store_location(cli: &Cli, settings: &Settings) -> StoreLocation {
    if cli.store.no_db {
        return StoreLocation::Disabled;
    }
    let path = cli
        .store
        .db
        .as_deref()
        .map(expand_path)
        .unwrap_or_else(|| settings.db.clone());
    StoreLocation::File(path)
}

/// Load the store, run the action, save the store.
///
/// The store is saved even when the action failed.
pub fn run_with_store(cli: &Cli, container: &ServiceContainer) -> CliResult<()> {
    let mut store = container.open_store();

    let result = if !cli.action.upload.is_empty() {
        upload(cli, container, &mut store)
    } else if !cli.action.delete.is_empty() {
        delete(&cli.action.delete, container)
    } else if cli.action.list {
        list(cli, container, &store)
    } else {
        Ok(())
    };

    if let Err(save_err) = store.save() {
        if let Err(e) = &result {
            output::error_chain(e);
        }
        return Err(save_err.into());
    }
    result
}

fn upload_options(cli: &Cli, settings: &Settings) -> UploadOptions {
    let args = &cli.upload_opts;
    UploadOptions {
        base_url: args
            .base_url
            .clone()
            .unwrap_or_else(|| settings.base_url.clone()),
        email: args.email.clone().or_else(|| settings.email.clone()),
        password: args.password.clone(),
        comment: args.comment.clone(),
        expires: args.expires.unwrap_or(settings.expires),
        hide: args.hide(settings.hide),
    }
}

fn template(cli: &Cli, settings: &Settings) -> Template {
    let template = Template::new(
        cli.list_opts
            .format
            .clone()
            .unwrap_or_else(|| settings.format.clone()),
    );
    for name in template.placeholders() {
        if !is_known_field(name) {
            warn!("unknown field {:?} in template, printed as written", name);
        }
    }
    template
}

#[instrument(skip_all, fields(files = cli.action.upload.len()))]
fn upload(cli: &Cli, container: &ServiceContainer, store: &mut RecordStore) -> CliResult<()> {
    let settings = &container.settings;
    let options = upload_options(cli, settings);
    let display = settings.display_options(cli.list_opts.date_format.as_deref(), cli.list_opts.utc)?;
    let template = template(cli, settings);
    let service = container.upload_service();

    let files: &[PathBuf] = &cli.action.upload;
    let mut failed = 0;
    for file in files {
        match service.upload(file, &options) {
            Ok(outcome) => {
                for warning in &outcome.warnings {
                    output::warning(warning);
                }
                let now = container.clock.now();
                output::info(&render_record(&template, &outcome.record, &display, now));
                store.push(outcome.record);
            }
            Err(e) => {
                output::error_chain(&e);
                failed += 1;
            }
        }
    }
    batch_result(failed, files.len())
}

#[instrument(skip_all, fields(urls = urls.len()))]
fn delete(urls: &[String], container: &ServiceContainer) -> CliResult<()> {
    let service = container.delete_service();

    let mut failed = 0;
    for url in urls {
        match service.delete(url) {
            Ok(()) => output::action("Deleted", url),
            Err(e) => {
                output::error_chain(&e);
                failed += 1;
            }
        }
    }
    batch_result(failed, urls.len())
}

#[instrument(skip_all, fields(records = store.len()))]
fn list(cli: &Cli, container: &ServiceContainer, store: &RecordStore) -> CliResult<()> {
    let settings = &container.settings;
    let options = ListOptions {
        show_expired: cli.list_opts.show_expired,
        number: cli
            .list_opts
            .number
            .map(|n| usize::try_from(n).unwrap_or(usize::MAX)),
        display: settings.display_options(cli.list_opts.date_format.as_deref(), cli.list_opts.utc)?,
        template: template(cli, settings),
    };

    for line in container.list_service().list(store.records(), &options) {
        output::info(&line);
    }
    Ok(())
}

fn batch_result(failed: usize, total: usize) -> CliResult<()> {
    if failed > 0 {
        return Err(CliError::Partial { failed, total });
    }
    Ok(())
}
