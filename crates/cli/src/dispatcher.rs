//! Command parsing and execution against a [`Session`].

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use partstock_core::StockError;
use partstock_infra::PersistenceError;
use partstock_infra::netlist_import;
use partstock_infra::persistence::file_store;
use partstock_inventory::{BoundOp, Query, Session};

use crate::render;

/// Command words with their arguments and help text, in help order.
pub const COMMANDS: &[(&str, &str, &str)] = &[
    ("q", "", "Quit"),
    ("?", "", "Print this"),
    ("lds", "FILE", "Load stock database from FILE (append)"),
    ("ss", "FILE", "Save stock database to FILE"),
    ("ps", "[NAME]", "Print stock database (category NAME or full DB)"),
    ("cs", "", "Clear stock database"),
    ("ldp", "FILE", "Load project database from FILE (append)"),
    ("pp", "[NAME]", "Print project database (category NAME or full DB)"),
    ("cp", "", "Clear project database"),
    ("add-c", "NAME FORMAT", "Add category NAME with format FORMAT"),
    ("pf", "NAME", "Print format of category NAME"),
    ("add", "NAME RECORD", "Add component to category NAME"),
    ("sub", "NAME RECORD", "Subtract component matching RECORD from category NAME"),
    ("sub-p", "", "Subtract project BOM database from stock database"),
    ("f", "NAME KEY=VAL...", "Filter components matching QUERY"),
    ("fb", "NAME FIELD>=VALUE", "Filter components with FIELD >= or <= VALUE"),
    ("pd", "", "Print difference between stock and project databases"),
    ("v", "NAME FIELD", "Print all variants of FIELD in category NAME"),
    ("imp", "LIST BASE", "Import component LIST against stock into BASE.csv and BASE_full.csv"),
];

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unknown command `{0}` (type ? for help)")]
    UnknownCommand(String),

    #[error("usage: {0}")]
    Usage(String),

    #[error(transparent)]
    Stock(#[from] StockError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// A parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Quit,
    Help,
    LoadStock(PathBuf),
    SaveStock(PathBuf),
    PrintStock(Option<String>),
    ClearStock,
    LoadProject(PathBuf),
    PrintProject(Option<String>),
    ClearProject,
    AddCategory { name: String, format: String },
    PrintFormat(String),
    Add { category: String, record: String },
    Subtract { category: String, record: String },
    SubtractProject,
    Filter { category: String, query: Query },
    FilterBound {
        category: String,
        field: String,
        bound: String,
        op: BoundOp,
    },
    PrintDifference,
    Variants { category: String, field: String },
    Import { list: PathBuf, base: PathBuf },
}

/// What the caller should do after a command ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Print the text (may be empty) and read the next command.
    Continue(String),
    Quit,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let word = words.next().unwrap_or_default();
        let args: Vec<&str> = words.collect();

        let command = match word {
            "q" => Command::Quit,
            "?" => Command::Help,
            "lds" => Command::LoadStock(path_arg(word, &args)?),
            "ss" => Command::SaveStock(path_arg(word, &args)?),
            "ps" => Command::PrintStock(args.first().map(|s| s.to_string())),
            "cs" => Command::ClearStock,
            "ldp" => Command::LoadProject(path_arg(word, &args)?),
            "pp" => Command::PrintProject(args.first().map(|s| s.to_string())),
            "cp" => Command::ClearProject,
            "add-c" => {
                let [name, format] = exact_args(word, &args)?;
                Command::AddCategory { name, format }
            }
            "pf" => {
                let [name] = exact_args(word, &args)?;
                Command::PrintFormat(name)
            }
            "add" => {
                let [category, record] = exact_args(word, &args)?;
                Command::Add { category, record }
            }
            "sub" => {
                let [category, record] = exact_args(word, &args)?;
                Command::Subtract { category, record }
            }
            "sub-p" => Command::SubtractProject,
            "f" => {
                let (category, pairs) = args.split_first().ok_or_else(|| usage(word))?;
                Command::Filter {
                    category: category.to_string(),
                    query: parse_query(pairs)?,
                }
            }
            "fb" => {
                let [category, condition] = exact_args(word, &args)?;
                let (field, op, bound) = parse_condition(&condition)?;
                Command::FilterBound {
                    category,
                    field,
                    bound,
                    op,
                }
            }
            "pd" => Command::PrintDifference,
            "v" => {
                let [category, field] = exact_args(word, &args)?;
                Command::Variants { category, field }
            }
            "imp" => {
                let [list, base] = exact_args(word, &args)?;
                Command::Import {
                    list: PathBuf::from(list),
                    base: PathBuf::from(base),
                }
            }
            other => return Err(CommandError::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }
}

fn usage(word: &str) -> CommandError {
    let args = COMMANDS
        .iter()
        .find(|(w, _, _)| *w == word)
        .map(|(_, args, _)| *args)
        .unwrap_or_default();
    CommandError::Usage(format!("{word} {args}"))
}

fn exact_args<const N: usize>(word: &str, args: &[&str]) -> Result<[String; N], CommandError> {
    if args.len() != N {
        return Err(usage(word));
    }
    Ok(std::array::from_fn(|i| args[i].to_string()))
}

fn path_arg(word: &str, args: &[&str]) -> Result<PathBuf, CommandError> {
    let [path] = exact_args(word, args)?;
    Ok(PathBuf::from(path))
}

fn parse_query(pairs: &[&str]) -> Result<Query, CommandError> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| CommandError::Usage("query must look like KEY0=VAL0 KEY1=VAL1 ...".to_string()))
        })
        .collect()
}

/// `Value>=5k` → (`Value`, `>=`, `5k`).
fn parse_condition(condition: &str) -> Result<(String, BoundOp, String), CommandError> {
    let is_op = |c: char| matches!(c, '<' | '>' | '=' | '!');
    let start = condition
        .find(is_op)
        .ok_or_else(|| CommandError::Usage("condition must look like FIELD>=VALUE or FIELD<=VALUE".to_string()))?;
    let rest = &condition[start..];
    let end = rest.find(|c: char| !is_op(c)).unwrap_or(rest.len());

    let op = rest[..end].parse::<BoundOp>()?;
    Ok((condition[..start].to_string(), op, rest[end..].to_string()))
}

/// Parse and run one command line.
pub fn run_line(session: &mut Session, line: &str) -> Result<Outcome, CommandError> {
    let command = line.parse::<Command>()?;
    execute(session, command)
}

/// Run a parsed command.
pub fn execute(session: &mut Session, command: Command) -> Result<Outcome, CommandError> {
    let text = match command {
        Command::Quit => return Ok(Outcome::Quit),
        Command::Help => help(),
        Command::LoadStock(path) => {
            file_store::load(&path, &mut session.stock)?;
            "Stock database loaded.".to_string()
        }
        Command::SaveStock(path) => {
            file_store::save(&path, &session.stock)?;
            "Stock database saved.".to_string()
        }
        Command::PrintStock(Some(name)) => {
            format!("Stock DB category:\n{}", render::category(session.stock.category(&name)?))
        }
        Command::PrintStock(None) => format!("In stock:\n\n{}", render::registry(&session.stock)),
        Command::ClearStock => {
            session.stock.clear();
            "Stock database cleared.".to_string()
        }
        Command::LoadProject(path) => {
            file_store::load(&path, &mut session.project)?;
            "Project database loaded.".to_string()
        }
        Command::PrintProject(Some(name)) => {
            format!("Project DB category:\n{}", render::category(session.project.category(&name)?))
        }
        Command::PrintProject(None) => format!("Project BOM:\n\n{}", render::registry(&session.project)),
        Command::ClearProject => {
            session.project.clear();
            "Project database cleared.".to_string()
        }
        Command::AddCategory { name, format } => {
            session.stock.add_category(&name, &format)?;
            format!("Category {} added.", name.trim())
        }
        Command::PrintFormat(name) => session.stock.category_schema(&name)?.format().to_string(),
        Command::Add { category, record } => {
            session.stock.add_component(&category, &record)?;
            String::new()
        }
        Command::Subtract { category, record } => {
            session.stock.subtract_component(&category, &record)?;
            String::new()
        }
        Command::SubtractProject => {
            session.consume_project()?;
            "Project BOM database subtracted from stock database.".to_string()
        }
        Command::Filter { category, query } => {
            render::category(&session.stock.filter_components(&category, &query)?)
        }
        Command::FilterBound {
            category,
            field,
            bound,
            op,
        } => render::category(
            &session
                .stock
                .filter_components_from_bound(&category, &field, &bound, op)?,
        ),
        Command::PrintDifference => {
            let shortfall = session.shortfall()?;
            if shortfall.is_empty() {
                "All components are in stock.".to_string()
            } else {
                format!("Not in stock:\n{}", render::registry(&shortfall))
            }
        }
        Command::Variants { category, field } => {
            let stock = session.stock.variants_of_field(&category, &field)?;
            let project = match session.project.variants_of_field(&category, &field) {
                Ok(variants) => variants,
                Err(StockError::UnknownCategory(_)) => BTreeSet::new(),
                Err(err) => return Err(err.into()),
            };
            format!(
                "All variants of {category}/{field} in stock database:\n{}\n\
                 All variants of {category}/{field} in project database:\n{}",
                join(&stock),
                join(&project)
            )
        }
        Command::Import { list, base } => {
            let components = netlist_import::read_components(&list)?;
            let project = netlist_import::import(&components, &session.stock)?;
            let (bom, full) = project.save(&base)?;
            format!(
                "{} components imported.\nProject BOM saved to {}.\nFull list saved to {}.",
                components.len(),
                bom.display(),
                full.display()
            )
        }
    };
    Ok(Outcome::Continue(text))
}

fn join(values: &BTreeSet<String>) -> String {
    values.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

fn help() -> String {
    let mut text = String::from("Available commands:");
    for (word, args, about) in COMMANDS {
        let invocation = format!("{word} {args}");
        text.push_str(&format!("\n\t{:<24}{about}", invocation.trim_end()));
    }
    text
}
