// src/cli.rs
//! Command-line front-end. Stands in for the chat bot: same pipeline, same
//! user-facing texts, replies printed to stdout. Diagnostics go to stderr.

use std::{fs, path::PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::{Report, Result, WrapErr};
use tracing::info;

use crate::config::consts::{DEFAULT_CONFIG_FILE, DEFAULT_ROLE, LOG_FILE, STORE_DIR};
use crate::config::options::{AppConfig, Messages};
use crate::core::WebDriver;
use crate::data::{Assessment, Decision, ReviewTicket, ReviewVerdict};
use crate::error::Error;
use crate::progress::Progress;
use crate::store::CsvUserStore;
use crate::{log, runner, verify};

#[derive(Parser, Debug)]
#[command(name = "cerberus", version, about = "Raid log gatekeeper")]
pub struct Cli {
    /// Config file (JSON). Missing file means built-in defaults.
    #[arg(long, global = true, env = "CERBERUS_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Directory holding users.csv (and debug.log with --log-file)
    #[arg(long, global = true, default_value = STORE_DIR)]
    pub store: PathBuf,

    /// -v info, -vv debug, -vvv trace
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Mirror logs to <store>/debug.log
    #[arg(long, global = true)]
    pub log_file: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a report and run it through the policy
    Check {
        /// Report link, e.g. https://www.fflogs.com/reports/<code>/#fight=last
        url: String,
        #[arg(long)]
        user: u64,
        #[arg(long, default_value = DEFAULT_ROLE)]
        role: String,
    },

    /// Score a saved report page (no browser, no user store)
    Score {
        file: PathBuf,
        /// Character name to look for
        #[arg(long)]
        name: String,
    },

    /// Without a url: show the pending token. With a url: confirm the profile.
    Verify {
        #[arg(long)]
        user: u64,
        url: Option<String>,
    },

    /// Issue a fresh verification token
    Token {
        #[arg(long)]
        user: u64,
    },

    /// Settle a manual review from the ticket JSON printed by `check`
    Review {
        ticket: PathBuf,
        #[arg(long, value_enum)]
        verdict: ReviewVerdict,
        /// Staff member taking the decision
        #[arg(long)]
        reviewer: String,
    },
}

/// Status lines printed as they happen.
struct Console;

impl Progress for Console {
    fn log(&mut self, msg: &str) {
        println!("{msg}");
    }
}

pub fn run(cli: Cli) -> Result<()> {
    let log_path = cli.log_file.then(|| cli.store.join(LOG_FILE));
    log::init(cli.verbose, log_path.as_deref()).wrap_err("logging setup")?;

    let cfg = AppConfig::load(&cli.config)
        .wrap_err_with(|| format!("loading {}", cli.config.display()))?;
    let store = CsvUserStore::open(&cli.store);

    match cli.command {
        Command::Check { url, user, role } => {
            let renderer = WebDriver::new(&cfg.fetch)
                .map_err(|e| reply_err(e.into(), &cfg.messages))?;
            let assessment = runner::check_report(
                &cfg,
                &renderer,
                &store,
                user,
                &role,
                &url,
                Some(&mut Console),
            )
            .map_err(|e| reply_err(e, &cfg.messages))?;
            print_assessment(&assessment, &role, &cfg)?;
            if assessment.result.decision == Decision::Accept {
                store.grant_role(user, &role)?;
            }
            if let Some(line) = &assessment.audit {
                audit(&store, line)?;
            }
        }

        Command::Score { file, name } => {
            let markup = fs::read_to_string(&file)
                .wrap_err_with(|| format!("reading {}", file.display()))?;
            let (record, result) = runner::check_markup(&cfg, &markup, &name)
                .map_err(|e| reply_err(e, &cfg.messages))?;
            println!("{}", serde_json::to_string_pretty(&record)?);
            println!("{}", result.message);
            println!("score {:.2} → {}", result.score, result.decision);
        }

        Command::Verify { user, url: None } => {
            let record = store.get_or_create(user)?;
            if record.validated {
                println!("{}{}", cfg.messages.user_already_validated, record.name);
            } else if record.pending_token.is_empty() {
                issue(&store, user, &cfg.messages)?;
            } else {
                println!("{}{}", cfg.messages.validation_token, record.pending_token);
            }
        }

        Command::Verify { user, url: Some(url) } => {
            let update = runner::confirm_identity(&store, user, &url, Some(&mut Console))
                .map_err(|e| reply_err(e, &cfg.messages))?;
            store.apply_identity(user, &update)?;
            println!("{}{}", cfg.messages.validation_success, update.nickname);
        }

        Command::Token { user } => {
            let record = store.get_or_create(user)?;
            if record.validated {
                println!("{}{}", cfg.messages.user_already_validated, record.name);
            } else {
                issue(&store, user, &cfg.messages)?;
            }
        }

        Command::Review { ticket: path, verdict, reviewer } => {
            let text = fs::read_to_string(&path)
                .wrap_err_with(|| format!("reading {}", path.display()))?;
            let ticket: ReviewTicket = serde_json::from_str(&text)
                .wrap_err_with(|| format!("parsing {}", path.display()))?;
            let outcome = runner::resolve_review(&cfg, &ticket, verdict, &reviewer)
                .map_err(|e| reply_err(e, &cfg.messages))?;

            println!("to user {}: {}", outcome.user_id, outcome.user_message);
            if let Some(role) = &outcome.grant_role {
                store.grant_role(outcome.user_id, role)?;
                if let Some(id) = cfg.roles.get(role) {
                    println!("grant role {role} ({id})");
                }
            }
            audit(&store, &outcome.audit)?;
        }
    }
    Ok(())
}

fn audit(store: &CsvUserStore, line: &str) -> Result<()> {
    info!("audit: {}", line);
    store.append_audit(line)?;
    Ok(())
}

fn issue(store: &CsvUserStore, user: u64, messages: &Messages) -> Result<()> {
    let token = verify::issue_token(user);
    store.set_token(user, &token)?;
    println!("{}{}", messages.validation_token, token);
    Ok(())
}

fn print_assessment(a: &Assessment, role: &str, cfg: &AppConfig) -> Result<()> {
    println!("{}", a.result.message);
    println!(
        "{} · {} in {}s · score {:.2} → {}",
        a.record.boss_name, a.record.outcome, a.record.duration_seconds, a.result.score, a.result.decision
    );
    if a.result.decision == Decision::Accept {
        if let Some(id) = cfg.roles.get(role) {
            println!("grant role {role} ({id})");
        }
    }
    if let Some(ticket) = &a.review {
        println!("{}", serde_json::to_string_pretty(ticket)?);
    }
    Ok(())
}

/// Print the user-facing sentence, keep the detailed error for stderr.
fn reply_err(e: Error, messages: &Messages) -> Report {
    println!("{}", e.user_message(messages));
    Report::new(e)
}
