//! Command-line argument parsing for the board CLI.

use crate::board::CategoryId;
use crate::error::{BoardError, Result};

/// Options that take a value.
const VALUE_OPTIONS: &[&str] = &["--description", "--sort", "--cursor"];

/// Options that are plain switches.
const SWITCH_OPTIONS: &[&str] = &["--json", "--admin"];

/// Command-line interface commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    CategoryAdd {
        name: String,
        description: Option<String>,
        sort_order: i32,
    },
    CategoryList {
        json: bool,
    },
    CategoryDelete {
        id: CategoryId,
    },
    ForumAdd {
        category_id: CategoryId,
        name: String,
        description: Option<String>,
        sort_order: i32,
    },
    ForumShow {
        identifier: String,
        cursor: Option<String>,
        json: bool,
    },
    ForumRename {
        identifier: String,
        name: String,
    },
    ForumLock {
        identifier: String,
        locked: bool,
    },
    ForumDelete {
        identifier: String,
    },
    ShortCode {
        name: String,
        category_id: Option<CategoryId>,
    },
    UserAdd {
        username: String,
        admin: bool,
    },
}

/// Positional arguments and options after the command words.
#[derive(Debug, Default)]
struct Parsed {
    positional: Vec<String>,
    values: Vec<(String, String)>,
    switches: Vec<String>,
}

impl Parsed {
    fn parse(args: &[String]) -> Result<Self> {
        let mut parsed = Parsed::default();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            if VALUE_OPTIONS.contains(&arg.as_str()) {
                let value = iter
                    .next()
                    .ok_or_else(|| BoardError::validation(format!("{} requires a value", arg)))?;
                parsed.values.push((arg.clone(), value.clone()));
            } else if SWITCH_OPTIONS.contains(&arg.as_str()) {
                parsed.switches.push(arg.clone());
            } else if arg.starts_with("--") {
                return Err(BoardError::validation(format!("Unknown option '{}'", arg)));
            } else {
                parsed.positional.push(arg.clone());
            }
        }
        Ok(parsed)
    }

    fn value(&self, name: &str) -> Option<String> {
        self.values
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    fn switch(&self, name: &str) -> bool {
        self.switches.iter().any(|s| s == name)
    }

    fn sort_order(&self) -> Result<i32> {
        match self.value("--sort") {
            Some(raw) => raw
                .parse()
                .map_err(|_| BoardError::validation(format!("Invalid sort order '{}'", raw))),
            None => Ok(0),
        }
    }

    /// Returns exactly `count` positionals or a usage error.
    fn positionals(&self, count: usize, usage: &str) -> Result<&[String]> {
        if self.positional.len() != count {
            return Err(BoardError::validation(format!("Usage: bbforum {}", usage)));
        }
        Ok(&self.positional)
    }
}

/// Parse command line arguments (without the program name) into a Command
pub fn parse_args(args: &[String]) -> Result<Command> {
    let words: Vec<&str> = args.iter().take(2).map(String::as_str).collect();

    match words.as_slice() {
        [] | ["help"] | ["--help"] | ["-h"] => Ok(Command::Help),

        ["category", "add", ..] => {
            let p = Parsed::parse(&args[2..])?;
            let pos = p.positionals(1, "category add <name> [--description D] [--sort N]")?;
            Ok(Command::CategoryAdd {
                name: pos[0].clone(),
                description: p.value("--description"),
                sort_order: p.sort_order()?,
            })
        }
        ["category", "list", ..] => {
            let p = Parsed::parse(&args[2..])?;
            p.positionals(0, "category list [--json]")?;
            Ok(Command::CategoryList {
                json: p.switch("--json"),
            })
        }
        ["category", "delete", ..] => {
            let p = Parsed::parse(&args[2..])?;
            let pos = p.positionals(1, "category delete <category-id>")?;
            Ok(Command::CategoryDelete {
                id: CategoryId::parse(&pos[0])?,
            })
        }

        ["forum", "add", ..] => {
            let p = Parsed::parse(&args[2..])?;
            let pos = p.positionals(
                2,
                "forum add <category-id> <name> [--description D] [--sort N]",
            )?;
            Ok(Command::ForumAdd {
                category_id: CategoryId::parse(&pos[0])?,
                name: pos[1].clone(),
                description: p.value("--description"),
                sort_order: p.sort_order()?,
            })
        }
        ["forum", "show", ..] => {
            let p = Parsed::parse(&args[2..])?;
            let pos = p.positionals(1, "forum show <identifier> [--cursor C] [--json]")?;
            Ok(Command::ForumShow {
                identifier: pos[0].clone(),
                cursor: p.value("--cursor"),
                json: p.switch("--json"),
            })
        }
        ["forum", "rename", ..] => {
            let p = Parsed::parse(&args[2..])?;
            let pos = p.positionals(2, "forum rename <identifier> <name>")?;
            Ok(Command::ForumRename {
                identifier: pos[0].clone(),
                name: pos[1].clone(),
            })
        }
        ["forum", action @ ("lock" | "unlock"), ..] => {
            let locked = *action == "lock";
            let p = Parsed::parse(&args[2..])?;
            let pos = p.positionals(1, "forum lock|unlock <identifier>")?;
            Ok(Command::ForumLock {
                identifier: pos[0].clone(),
                locked,
            })
        }
        ["forum", "delete", ..] => {
            let p = Parsed::parse(&args[2..])?;
            let pos = p.positionals(1, "forum delete <identifier>")?;
            Ok(Command::ForumDelete {
                identifier: pos[0].clone(),
            })
        }

        ["shortcode", ..] => {
            let p = Parsed::parse(&args[1..])?;
            let category_id = match p.positional.as_slice() {
                [_] => None,
                [_, category] => Some(CategoryId::parse(category)?),
                _ => {
                    return Err(BoardError::validation(
                        "Usage: bbforum shortcode <name> [<category-id>]",
                    ))
                }
            };
            Ok(Command::ShortCode {
                name: p.positional[0].clone(),
                category_id,
            })
        }

        ["user", "add", ..] => {
            let p = Parsed::parse(&args[2..])?;
            let pos = p.positionals(1, "user add <username> [--admin]")?;
            Ok(Command::UserAdd {
                username: pos[0].clone(),
                admin: p.switch("--admin"),
            })
        }

        _ => Err(BoardError::validation(format!(
            "Unknown command '{}'",
            args.join(" ")
        ))),
    }
}

/// Print usage information
pub fn print_usage() {
    println!("bbforum - discussion board administration");
    println!();
    println!("Usage: bbforum <command> [args...]");
    println!();
    println!("Commands:");
    println!("  category add <name> [--description D] [--sort N]   Create a category");
    println!("  category list [--json]                             List categories and forums");
    println!("  category delete <category-id>                      Delete an empty category");
    println!("  forum add <category-id> <name> [--description D] [--sort N]");
    println!("                                                     Create a forum");
    println!("  forum show <identifier> [--cursor C] [--json]      Show a forum and its threads");
    println!("  forum rename <identifier> <name>                   Rename a forum");
    println!("  forum lock|unlock <identifier>                     Lock or unlock a forum");
    println!("  forum delete <identifier>                          Delete a forum without threads");
    println!("  shortcode <name> [<category-id>]                   Preview a forum short code");
    println!("  user add <username> [--admin]                      Create a user profile");
    println!();
    println!("A forum <identifier> is its short code or its id.");
    println!();
    println!("Environment:");
    println!("  BBFORUM_DATA_DIR, BBFORUM_STORAGE_PROFILE, BBFORUM_PAGE_SIZE,");
    println!("  BBFORUM_SHORT_CODE_ATTEMPTS, RUST_LOG");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_help() {
        assert_eq!(parse_args(&[]).unwrap(), Command::Help);
        assert_eq!(parse_args(&args("--help")).unwrap(), Command::Help);
    }

    #[test]
    fn test_category_add_with_options() {
        let cmd = parse_args(&args("category add Gaming --sort 3 --description Games")).unwrap();
        assert_eq!(
            cmd,
            Command::CategoryAdd {
                name: "Gaming".into(),
                description: Some("Games".into()),
                sort_order: 3,
            }
        );
    }

    #[test]
    fn test_forum_lock_unlock() {
        assert_eq!(
            parse_args(&args("forum unlock general")).unwrap(),
            Command::ForumLock {
                identifier: "general".into(),
                locked: false,
            }
        );
        assert_eq!(
            parse_args(&args("forum lock general")).unwrap(),
            Command::ForumLock {
                identifier: "general".into(),
                locked: true,
            }
        );
    }

    #[test]
    fn test_shortcode_preview_args() {
        let id = CategoryId::new();
        let cmd = parse_args(&args(&format!("shortcode General {}", id))).unwrap();
        assert_eq!(
            cmd,
            Command::ShortCode {
                name: "General".into(),
                category_id: Some(id),
            }
        );
        assert!(parse_args(&args("shortcode")).is_err());
    }

    #[test]
    fn test_errors() {
        assert!(parse_args(&args("forum add not-an-id Chat")).is_err());
        assert!(parse_args(&args("category add Gaming --sort")).is_err());
        assert!(parse_args(&args("category add Gaming --sort x")).is_err());
        assert!(parse_args(&args("category add Gaming --verbose")).is_err());
        assert!(parse_args(&args("frobnicate")).is_err());
    }
}
