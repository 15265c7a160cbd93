//! Command-line front end for the catalog.
//!
//! # Responsibility
//! - Map subcommands onto `Catalog` operations.
//! - Print each response body as JSON and turn its status into an exit code.

use catalog_core::{
    init_logging, AuthorDraft, AuthorPatch, BookDraft, BookPatch, Catalog, CatalogConfig,
    GenreDraft, GenrePatch, ListParams, RecordId, Response, Status,
};
use clap::{Args, Parser, Subcommand};
use log::{error, warn};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "catalog", about = "Author, genre and book catalog", version)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file (overrides configuration).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Log level (overrides configuration).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files (overrides configuration).
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Author operations.
    Authors {
        #[command(subcommand)]
        action: AuthorAction,
    },
    /// Genre operations.
    Genres {
        #[command(subcommand)]
        action: GenreAction,
    },
    /// Book operations.
    Books {
        #[command(subcommand)]
        action: BookAction,
    },
}

#[derive(Args)]
struct ListArgs {
    #[arg(long)]
    page: Option<u32>,
    #[arg(long)]
    limit: Option<u32>,
    /// `name` or `-name`.
    #[arg(long, allow_hyphen_values = true)]
    sort: Option<String>,
    /// Case-insensitive name substring.
    #[arg(long)]
    name: Option<String>,
}

impl From<ListArgs> for ListParams {
    fn from(args: ListArgs) -> Self {
        Self {
            page: args.page,
            limit: args.limit,
            sort: args.sort,
            name: args.name,
        }
    }
}

#[derive(Subcommand)]
enum AuthorAction {
    List(ListArgs),
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        year: i64,
    },
    Update {
        id: RecordId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        year: Option<i64>,
    },
    Delete {
        id: RecordId,
    },
}

#[derive(Subcommand)]
enum GenreAction {
    List(ListArgs),
    Create {
        #[arg(long)]
        name: String,
    },
    Update {
        id: RecordId,
        #[arg(long)]
        name: Option<String>,
    },
    Delete {
        id: RecordId,
    },
}

#[derive(Subcommand)]
enum BookAction {
    List(ListArgs),
    Get {
        id: RecordId,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        img: String,
        /// Author id; repeat for several.
        #[arg(long = "author", action = clap::ArgAction::Append)]
        authors: Vec<RecordId>,
        /// Genre id; repeat for several.
        #[arg(long = "genre", action = clap::ArgAction::Append)]
        genres: Vec<RecordId>,
    },
    /// Update a book; the given author/genre ids replace the stored sets.
    Update {
        id: RecordId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        img: Option<String>,
        #[arg(long = "author", action = clap::ArgAction::Append)]
        authors: Vec<RecordId>,
        #[arg(long = "genre", action = clap::ArgAction::Append)]
        genres: Vec<RecordId>,
    },
    Delete {
        id: RecordId,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match CatalogConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("catalog: {err}");
            return ExitCode::from(1);
        }
    };
    if let Some(db) = cli.db {
        config.database_path = db;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(dir) = cli.log_dir {
        config.log_dir = Some(dir);
    }

    if let Err(err) = init_logging(&config.log_level, config.log_dir.as_deref()) {
        eprintln!("catalog: logging disabled: {err}");
    }

    let catalog = match Catalog::open(&config) {
        Ok(catalog) => catalog,
        Err(err) => {
            error!("event=cli_start module=cli status=error error_code=db_open_failed error={err}");
            eprintln!("catalog: failed to open database: {err}");
            return ExitCode::from(1);
        }
    };

    let response = dispatch(&catalog, cli.command);
    if let Err(err) = catalog.close() {
        warn!("event=db_close module=cli status=error error={err}");
    }
    print_response(&response)
}

fn dispatch(catalog: &Catalog, command: Command) -> Response {
    match command {
        Command::Authors { action } => match action {
            AuthorAction::List(args) => catalog.list_authors(&args.into()),
            AuthorAction::Create { name, year } => {
                catalog.create_author(&AuthorDraft { name, year })
            }
            AuthorAction::Update { id, name, year } => {
                catalog.update_author(id, &AuthorPatch { name, year })
            }
            AuthorAction::Delete { id } => catalog.delete_author(id),
        },
        Command::Genres { action } => match action {
            GenreAction::List(args) => catalog.list_genres(&args.into()),
            GenreAction::Create { name } => catalog.create_genre(&GenreDraft { name }),
            GenreAction::Update { id, name } => catalog.update_genre(id, &GenrePatch { name }),
            GenreAction::Delete { id } => catalog.delete_genre(id),
        },
        Command::Books { action } => match action {
            BookAction::List(args) => catalog.list_books(&args.into()),
            BookAction::Get { id } => catalog.get_book(id),
            BookAction::Create {
                name,
                img,
                authors,
                genres,
            } => catalog.create_book(&BookDraft {
                name,
                img,
                author_ids: authors,
                genre_ids: genres,
            }),
            BookAction::Update {
                id,
                name,
                img,
                authors,
                genres,
            } => catalog.update_book(
                id,
                &BookPatch {
                    name,
                    img,
                    author_ids: authors,
                    genre_ids: genres,
                },
            ),
            BookAction::Delete { id } => catalog.delete_book(id),
        },
    }
}

fn print_response(response: &Response) -> ExitCode {
    match serde_json::to_string_pretty(&response.body) {
        Ok(text) if response.status.is_success() => println!("{text}"),
        Ok(text) => eprintln!("{text}"),
        Err(err) => eprintln!("catalog: failed to encode response: {err}"),
    }
    ExitCode::from(exit_code(response.status))
}

fn exit_code(status: Status) -> u8 {
    match status {
        Status::Ok => 0,
        Status::NotFound => 2,
        Status::BadRequest => 3,
        Status::InternalError => 1,
    }
}
