use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{DEFAULT_OWNER, Engine, users};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

type CliResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Parser, Debug)]
#[command(name = "finplan_admin")]
#[command(about = "Admin utilities for finplan (users and shared categories)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./finplan.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Category(Category),
    SubCategory(SubCategory),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Create a user, asking for the password on the terminal.
    Create {
        #[arg(long)]
        username: String,
    },
}

/// Owner of a created category: a user, or everybody with `--default`.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct Owner {
    #[arg(long)]
    owner: Option<String>,
    /// Share the row with every user.
    #[arg(long)]
    default: bool,
}

impl Owner {
    fn user_id(&self) -> &str {
        match &self.owner {
            Some(owner) if !self.default => owner,
            _ => DEFAULT_OWNER,
        }
    }
}

#[derive(Args, Debug)]
struct Category {
    #[command(subcommand)]
    command: CategoryCommand,
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    Create {
        #[arg(long)]
        description: String,
        #[command(flatten)]
        owner: Owner,
    },
    /// List what a user can see, shared categories included.
    List {
        #[arg(long, default_value = DEFAULT_OWNER)]
        user: String,
    },
}

#[derive(Args, Debug)]
struct SubCategory {
    #[command(subcommand)]
    command: SubCategoryCommand,
}

#[derive(Subcommand, Debug)]
enum SubCategoryCommand {
    Create {
        #[arg(long)]
        category_id: Uuid,
        #[arg(long)]
        description: String,
        #[command(flatten)]
        owner: Owner,
    },
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> CliResult<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn notice(out: &mut impl Write, message: &str) -> CliResult<()> {
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(message),
        Print("\r\n")
    )?;
    Ok(())
}

/// Read a line without echoing it, printing `*` for every character.
fn read_hidden(prompt: &str) -> CliResult<String> {
    let _raw = RawModeGuard::enter()?;
    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;

    let mut line = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);

        match code {
            KeyCode::Enter => break,
            KeyCode::Char('c') if ctrl => {
                execute!(out, Print("\r\n"))?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !ctrl => {
                line.push(ch);
                execute!(out, Print("*"))?;
            }
            KeyCode::Backspace => {
                if line.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                }
            }
            _ => {}
        }
        out.flush()?;
    }

    execute!(out, Print("\r\n"))?;
    Ok(line)
}

fn ask_new_password() -> CliResult<String> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let password = read_hidden("Password: ")?;
        if password.is_empty() {
            notice(&mut out, "Password must not be empty.")?;
            continue;
        }
        if read_hidden("Confirm password: ")? == password {
            return Ok(password);
        }
        notice(&mut out, "Passwords do not match. Try again.")?;
    }

    Err("too many attempts".into())
}

async fn connect_db(database_url: &str) -> CliResult<DatabaseConnection> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db.clone()).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create { username },
        }) => {
            if users::Entity::find_by_id(username.clone())
                .one(&db)
                .await?
                .is_some()
            {
                eprintln!("user already exists: {username}");
                std::process::exit(1);
            }

            let password = ask_new_password()?;
            users::Entity::insert(users::ActiveModel {
                username: Set(username.clone()),
                password: Set(password),
            })
            .exec(&db)
            .await?;

            println!("created user: {username}");
        }
        Command::Category(Category {
            command: CategoryCommand::Create { description, owner },
        }) => {
            let category = engine.add_category(&description, owner.user_id()).await?;
            println!(
                "created category: {} ({}) for {}",
                category.description, category.id, category.user_id
            );
        }
        Command::Category(Category {
            command: CategoryCommand::List { user },
        }) => {
            for category in engine.categories(&user).await? {
                println!("{}  {}  [{}]", category.id, category.description, category.user_id);
                for sub in category.sub_categories {
                    println!("    {}  {}", sub.id, sub.description);
                }
            }
        }
        Command::SubCategory(SubCategory {
            command:
                SubCategoryCommand::Create {
                    category_id,
                    description,
                    owner,
                },
        }) => {
            let sub = engine
                .add_sub_category(&description, category_id, owner.user_id())
                .await?;
            println!(
                "created sub-category: {} ({}) under {}",
                sub.description, sub.id, sub.category_id
            );
        }
    }

    Ok(())
}
