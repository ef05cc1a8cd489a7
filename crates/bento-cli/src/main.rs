//! Bento CLI: terminal front end for the bento board

use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use crossbeam_channel::unbounded;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bento::config::app;
use bento::{
    export, Accent, Board, BoardError, Category, Dashboard, FontSize, JsonFileStore, ThemeChange,
    ThemeId,
};
use bento_app::interaction::{self, AssumeYes, Confirm, PromptAnswer, PromptRequest, Prompter};
use bento_app::{AppCommand, AppController, AppError};

type CliResult<T> = std::result::Result<T, Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "bento", about = "Multi-dashboard personal board", version)]
struct Cli {
    /// Store file (default: <config dir>/bento/storage.json)
    #[arg(long, global = true, value_name = "PATH")]
    store: Option<PathBuf>,

    /// Answer yes to every confirmation
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show the active dashboard, its lists and today's todos
    Status,
    /// Manage dashboards
    Dashboard {
        #[command(subcommand)]
        action: DashboardAction,
    },
    /// Add or delete items of the active dashboard
    Item {
        #[command(subcommand)]
        action: ItemAction,
    },
    /// Reorder favorites
    Fav {
        #[command(subcommand)]
        action: FavAction,
    },
    /// Show or change theme settings
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },
    /// Per-day todo lists
    Todo {
        #[command(subcommand)]
        action: TodoAction,
    },
    /// Write a backup of everything to a JSON file
    Export {
        /// Output file, `-` for stdout (default: bento-dashboard-backup-<date>.json)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum DashboardAction {
    List,
    /// Create a dashboard and make it active (prompts when no name is given)
    Add { name: Option<String> },
    /// Rename a dashboard by id or name
    Rename {
        dashboard: String,
        name: Option<String>,
    },
    Delete { dashboard: String },
    Switch { dashboard: String },
}

#[derive(Subcommand)]
enum ItemAction {
    /// Add an item (prompts when no name is given)
    Add {
        category: Category,
        name: Option<String>,
        url: Option<String>,
    },
    /// Delete the item at a 1-based position
    Delete { category: Category, index: usize },
}

#[derive(Subcommand)]
enum FavAction {
    /// Move a favorite from one 1-based position to another
    Move { from: usize, to: usize },
}

#[derive(Subcommand)]
enum ThemeAction {
    Show,
    Set { theme: ThemeId },
    Blur { px: u32 },
    Font { size: FontSize },
    Accent { color: Accent },
    /// Set the background image url; omit to clear it
    Background { url: Option<String> },
    Reset,
}

#[derive(Subcommand)]
enum TodoAction {
    List {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Add a todo (prompts when no text is given)
    Add {
        text: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    Toggle {
        index: usize,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    Delete {
        index: usize,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

fn main() -> CliResult<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=warn", app::NAME).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let store = open_store(cli.store)?;
    tracing::debug!(path = %store.path().display(), "Opened store");
    let board = Board::open(store)?;

    let mut prompter = StdinPrompter;
    let mut confirm: Box<dyn Confirm> = if cli.yes {
        Box::new(AssumeYes)
    } else {
        Box::new(StdinConfirm)
    };

    match cli.command.unwrap_or(Command::Status) {
        Command::Status => print_status(&board)?,

        Command::Dashboard { action } => match action {
            DashboardAction::List => print_dashboards(&board),
            DashboardAction::Add { name } => {
                let cmd = match name {
                    Some(name) => Some(AppCommand::AddDashboard(name)),
                    None => {
                        interaction::add_dashboard_flow(&mut prompter, board.dashboards().len())
                    }
                };
                let board = dispatch_opt(board, cmd)?;
                print_dashboards(&board);
            }
            DashboardAction::Rename { dashboard, name } => {
                let target = find_dashboard(&board, &dashboard)?.clone();
                let cmd = match name {
                    Some(name) => Some(AppCommand::RenameDashboard {
                        id: target.id,
                        name,
                    }),
                    None => interaction::rename_dashboard_flow(&mut prompter, &target),
                };
                let board = dispatch_opt(board, cmd)?;
                print_dashboards(&board);
            }
            DashboardAction::Delete { dashboard } => {
                let target = find_dashboard(&board, &dashboard)?.clone();
                if !board.repository().can_delete() {
                    return Err(BoardError::LastDashboard.into());
                }
                let cmd = interaction::delete_dashboard_flow(confirm.as_mut(), &target, true);
                let board = dispatch_opt(board, cmd)?;
                print_dashboards(&board);
            }
            DashboardAction::Switch { dashboard } => {
                let id = find_dashboard(&board, &dashboard)?.id.clone();
                let board = dispatch(board, AppCommand::SwitchDashboard(id))?;
                print_status(&board)?;
            }
        },

        Command::Item { action } => match action {
            ItemAction::Add {
                category,
                name,
                url,
            } => {
                let cmd = match name {
                    Some(name) => Some(AppCommand::AddItem {
                        category,
                        name,
                        url: url.unwrap_or_default(),
                    }),
                    None => interaction::add_item_flow(&mut prompter, category),
                };
                let board = dispatch_opt(board, cmd)?;
                print_list(&board, category);
            }
            ItemAction::Delete { category, index } => {
                let index = zero_based(index)?;
                if index >= board.workspace().list(category).len() {
                    return Err(format!("No {category} item at position {}", index + 1).into());
                }
                let cmd = interaction::delete_item_flow(confirm.as_mut(), category, index);
                let board = dispatch_opt(board, cmd)?;
                print_list(&board, category);
            }
        },

        Command::Fav { action } => match action {
            FavAction::Move { from, to } => {
                let cmd = AppCommand::MoveItem {
                    category: Category::Favorites,
                    from: zero_based(from)?,
                    to: zero_based(to)?,
                };
                let board = dispatch(board, cmd)?;
                print_list(&board, Category::Favorites);
            }
        },

        Command::Theme { action } => {
            let cmd = match action {
                ThemeAction::Show => None,
                ThemeAction::Set { theme } => Some(AppCommand::SetTheme(ThemeChange::Theme(theme))),
                ThemeAction::Blur { px } => {
                    Some(AppCommand::SetTheme(ThemeChange::BlurIntensity(px)))
                }
                ThemeAction::Font { size } => {
                    Some(AppCommand::SetTheme(ThemeChange::FontSize(size)))
                }
                ThemeAction::Accent { color } => {
                    Some(AppCommand::SetTheme(ThemeChange::AccentColor(color)))
                }
                ThemeAction::Background { url } => Some(AppCommand::SetTheme(
                    ThemeChange::Background(url.unwrap_or_default()),
                )),
                ThemeAction::Reset => interaction::reset_theme_flow(confirm.as_mut()),
            };
            let board = dispatch_opt(board, cmd)?;
            print_theme(&board);
        }

        Command::Todo { action } => {
            let today = board.today();
            let (cmd, day) = match action {
                TodoAction::List { date } => (None, date.unwrap_or(today)),
                TodoAction::Add { text, date } => {
                    let day = date.unwrap_or(today);
                    let cmd = match text {
                        Some(text) => Some(AppCommand::AddTodo { day, text }),
                        None => interaction::add_todo_flow(&mut prompter, day),
                    };
                    (cmd, day)
                }
                TodoAction::Toggle { index, date } => {
                    let day = date.unwrap_or(today);
                    let index = zero_based(index)?;
                    (Some(AppCommand::ToggleTodo { day, index }), day)
                }
                TodoAction::Delete { index, date } => {
                    let day = date.unwrap_or(today);
                    let index = zero_based(index)?;
                    (Some(AppCommand::DeleteTodo { day, index }), day)
                }
            };
            let board = dispatch_opt(board, cmd)?;
            print_todos(&board, day)?;
        }

        Command::Export { output } => {
            let json = board.export()?.to_json_pretty()?;
            match output {
                Some(path) if path.as_os_str() == "-" => println!("{json}"),
                output => {
                    let path =
                        output.unwrap_or_else(|| PathBuf::from(export::file_name(board.today())));
                    std::fs::write(&path, json)?;
                    eprintln!("Exported to {}", path.display());
                }
            }
        }
    }

    Ok(())
}

fn open_store(path: Option<PathBuf>) -> CliResult<JsonFileStore> {
    let store = match path {
        Some(path) if path.is_dir() => {
            return Err(AppError::Config(format!("{} is a directory", path.display())).into())
        }
        Some(path) => JsonFileStore::open(path)?,
        None => JsonFileStore::open_default()?,
    };
    Ok(store)
}

/// Run one command through the controller and hand the board back
///
/// The controller runs on its own thread like any front end would drive it;
/// a switch still in its transition is applied when the loop shuts down.
fn dispatch(
    board: Board<JsonFileStore>,
    cmd: AppCommand,
) -> bento_app::Result<Board<JsonFileStore>> {
    let (cmd_tx, cmd_rx) = unbounded();
    let (snapshot_tx, snapshot_rx) = unbounded();
    let mut controller = AppController::new(board, cmd_rx, cmd_tx.clone(), snapshot_tx);

    let worker = std::thread::Builder::new()
        .name("controller".into())
        .spawn(move || {
            controller.run();
            controller.into_board()
        })
        .map_err(|e| AppError::Thread(e.to_string()))?;

    cmd_tx.send(cmd)?;
    cmd_tx.send(AppCommand::Shutdown)?;
    let board = worker
        .join()
        .map_err(|_| AppError::Thread("controller panicked".into()))?;

    if let Some(error) = snapshot_rx.try_iter().filter_map(|s| s.last_error).last() {
        return Err(AppError::Command(error));
    }
    Ok(board)
}

fn dispatch_opt(
    board: Board<JsonFileStore>,
    cmd: Option<AppCommand>,
) -> bento_app::Result<Board<JsonFileStore>> {
    match cmd {
        Some(cmd) => dispatch(board, cmd),
        None => Ok(board),
    }
}

/// Match by id first, then by name (case-insensitive)
fn find_dashboard<'a>(board: &'a Board<JsonFileStore>, key: &str) -> CliResult<&'a Dashboard> {
    board
        .repository()
        .get(key)
        .or_else(|| {
            board
                .dashboards()
                .iter()
                .find(|d| d.name.eq_ignore_ascii_case(key))
        })
        .ok_or_else(|| format!("No dashboard '{key}'").into())
}

fn zero_based(position: usize) -> CliResult<usize> {
    position
        .checked_sub(1)
        .ok_or_else(|| "Positions start at 1".into())
}

// =============================================================================
// Output
// =============================================================================

fn print_dashboards(board: &Board<JsonFileStore>) {
    let current = board.repository().current_id();
    for dashboard in board.dashboards() {
        let marker = if dashboard.id == current { '*' } else { ' ' };
        println!(
            "{marker} {} {}  ({}, {} items)",
            dashboard.icon,
            dashboard.name,
            dashboard.id,
            dashboard.data.item_count()
        );
    }
}

fn print_list(board: &Board<JsonFileStore>, category: Category) {
    let items = board.workspace().list(category);
    println!("{} ({})", title_case(category.as_str()), items.len());
    for (i, item) in items.iter().enumerate() {
        println!("  {}. {}  <{}>", i + 1, item.name, item.url);
    }
}

fn print_theme(board: &Board<JsonFileStore>) {
    let theme = board.theme();
    println!("Theme:      {}", theme.theme);
    println!("Accent:     {}", theme.accent_color);
    println!("Font size:  {}", theme.font_size);
    println!("Blur:       {}px", theme.blur_intensity);
    if !theme.background.is_empty() {
        println!("Background: {}", theme.background);
    }
}

fn print_todos(board: &Board<JsonFileStore>, day: NaiveDate) -> CliResult<()> {
    let todos = board.todos(day)?;
    println!("Todos {day} ({})", todos.len());
    for (i, todo) in todos.iter().enumerate() {
        let mark = if todo.completed { 'x' } else { ' ' };
        println!("  {}. [{mark}] {}", i + 1, todo.text);
    }
    Ok(())
}

fn print_status(board: &Board<JsonFileStore>) -> CliResult<()> {
    let dashboard = board.current_dashboard();
    println!(
        "{} {}  ({} of {})",
        dashboard.icon,
        dashboard.name,
        board
            .dashboards()
            .iter()
            .position(|d| d.id == dashboard.id)
            .map_or(1, |i| i + 1),
        board.dashboards().len()
    );
    println!();
    for category in Category::ALL {
        print_list(board, category);
    }
    println!();
    print_todos(board, board.today())
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// =============================================================================
// Terminal prompts
// =============================================================================

struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn prompt(&mut self, request: &PromptRequest) -> Option<PromptAnswer> {
        eprintln!("{}", request.title);
        let first = ask(request.first, request.initial.as_deref())?;
        let second = match request.second {
            Some(label) => ask(label, None)?,
            None => String::new(),
        };
        Some(PromptAnswer::new(first, second))
    }
}

struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, message: &str) -> bool {
        ask(&format!("{message} [y/N]"), None)
            .is_some_and(|answer| matches!(answer.as_str(), "y" | "Y" | "yes" | "Yes"))
    }
}

/// Read one line from stdin; `None` on EOF or read failure
fn ask(label: &str, initial: Option<&str>) -> Option<String> {
    match initial {
        Some(value) => eprint!("{label} [{value}]: "),
        None => eprint!("{label}: "),
    }
    let _ = io::stderr().flush();

    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => {
            let answer = line.trim_end_matches(['\r', '\n']).to_string();
            match initial {
                Some(value) if answer.is_empty() => Some(value.to_string()),
                _ => Some(answer),
            }
        }
    }
}
