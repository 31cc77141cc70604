//! Command-line interface for board administration.
//!
//! Provides commands for managing categories, forums, short codes and user
//! profiles in the on-disk board.

pub mod args;
pub mod commands;
pub mod utils;

use crate::config::BoardConfig;
use crate::Result;
use std::env;
use std::io;
use std::process;

pub use args::Command;

/// Main entry point for the CLI application
pub fn run() -> Result<()> {
    let argv: Vec<String> = env::args().skip(1).collect();
    let command = match args::parse_args(&argv) {
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("Error parsing arguments: {}", e);
            eprintln!("Run 'bbforum help' for usage.");
            process::exit(1);
        }
    };

    if command == Command::Help {
        args::print_usage();
        return Ok(());
    }

    let config = BoardConfig::from_env()?;
    let service = utils::open_service(&config)?;
    let stdout = io::stdout();
    let out = &mut stdout.lock();

    match command {
        Command::Help => Ok(()),
        Command::CategoryAdd {
            name,
            description,
            sort_order,
        } => commands::category_add(&service, out, &name, description, sort_order),
        Command::CategoryList { json } => commands::category_list(&service, out, json),
        Command::CategoryDelete { id } => commands::category_delete(&service, out, &id),
        Command::ForumAdd {
            category_id,
            name,
            description,
            sort_order,
        } => commands::forum_add(&service, out, &category_id, &name, description, sort_order),
        Command::ForumShow {
            identifier,
            cursor,
            json,
        } => commands::forum_show(&service, out, &identifier, cursor.as_deref(), json),
        Command::ForumRename { identifier, name } => {
            commands::forum_rename(&service, out, &identifier, &name)
        }
        Command::ForumLock { identifier, locked } => {
            commands::forum_lock(&service, out, &identifier, locked)
        }
        Command::ForumDelete { identifier } => commands::forum_delete(&service, out, &identifier),
        Command::ShortCode { name, category_id } => {
            commands::short_code(&service, out, &name, category_id.as_ref())
        }
        Command::UserAdd { username, admin } => {
            commands::user_add(&service, out, &username, admin)
        }
    }
}
