//! `wsurvey` - CLI for wifisurvey
//!
//! This binary runs survey sessions and inspects the configuration they use.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::fs::File;
use std::io::{self, BufReader, IsTerminal};

use anyhow::Context;
use clap::Parser;
use tracing::info;

use wifisurvey::cli::{Cli, Command, ConfigCommand, FieldsCommand, SessionArgs};
use wifisurvey::config::OutputFormat;
use wifisurvey::session::write_field_list;
use wifisurvey::{init_logging, Config, Error, Session};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Session(args) => run_session(config, &args),
        Command::Fields(cmd) => handle_fields(&config, &cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn run_session(mut config: Config, args: &SessionArgs) -> anyhow::Result<()> {
    if let Some(format) = args.format {
        config.output.format = format.into();
    }
    if let Some(policy) = args.policy {
        config.form.required_policy = policy.into();
    }
    if args.no_render {
        config.output.render_on_change = false;
    }

    let stdout = io::stdout().lock();
    let summary = if let Some(path) = &args.script {
        let file = File::open(path).map_err(|source| Error::ScriptRead {
            path: path.clone(),
            source,
        })?;
        Session::new(&config, stdout).run(BufReader::new(file))?
    } else {
        let stdin = io::stdin();
        let interactive = stdin.is_terminal();
        let mut session = Session::new(&config, stdout).with_prompt(interactive);
        if interactive {
            eprintln!("Type 'help' for commands, 'quit' to finish.");
        }
        session.run(stdin.lock())?
    };

    info!(
        rooms = summary.rooms,
        rejected = summary.rejected,
        errors = summary.errors,
        "Survey finished"
    );
    Ok(())
}

fn handle_fields(config: &Config, cmd: &FieldsCommand) -> anyhow::Result<()> {
    let policy = cmd
        .policy
        .map_or(config.form.required_policy, Into::into);
    let format = if cmd.json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };
    write_field_list(&mut io::stdout().lock(), policy, format)?;
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Form]");
                println!("  Required policy:    {}", config.form.required_policy);
                println!();
                println!("[Table]");
                println!("  Placeholder:        {}", config.table.placeholder);
                println!("  Empty message:      {}", config.table.empty_message);
                println!();
                println!("[Chart]");
                println!(
                    "  Signal axis (dBm):  [{}, {}]",
                    config.chart.signal_min_dbm, config.chart.signal_max_dbm
                );
                println!("  Bar width:          {}", config.chart.bar_width);
                println!();
                println!("[Output]");
                println!("  Format:             {:?}", config.output.format);
                println!("  Render on change:   {}", config.output.render_on_change);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
