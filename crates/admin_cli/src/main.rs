use std::{error::Error, io::Write};

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Engine, UserRole};
use migration::MigratorTrait;
use sea_orm::Database;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "allowance_admin")]
#[command(about = "Admin utilities for the allowance tracker (bootstrap families, logins, batch runs)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./allowance.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Family(Family),
    User(User),
    /// Attach a child login to a child record.
    LinkChild(LinkChildArgs),
    Allowance(Allowance),
    Challenges(Challenges),
}

#[derive(Args, Debug)]
struct Family {
    #[command(subcommand)]
    command: FamilyCommand,
}

#[derive(Subcommand, Debug)]
enum FamilyCommand {
    Create(FamilyCreateArgs),
}

#[derive(Args, Debug)]
struct FamilyCreateArgs {
    #[arg(long)]
    name: String,
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Role {
    Parent,
    Child,
}

impl From<Role> for UserRole {
    fn from(value: Role) -> Self {
        match value {
            Role::Parent => UserRole::Parent,
            Role::Child => UserRole::Child,
        }
    }
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    #[arg(long, value_enum, default_value_t = Role::Parent)]
    role: Role,
    #[arg(long)]
    family_id: Option<Uuid>,
}

#[derive(Args, Debug)]
struct LinkChildArgs {
    #[arg(long)]
    child_id: Uuid,
    /// Login of the child.
    #[arg(long)]
    username: String,
    /// Parent performing the link.
    #[arg(long)]
    parent: String,
}

#[derive(Args, Debug)]
struct Allowance {
    #[command(subcommand)]
    command: AllowanceCommand,
}

#[derive(Subcommand, Debug)]
enum AllowanceCommand {
    /// Pay every allowance that is due.
    Run(AllowanceRunArgs),
}

#[derive(Args, Debug)]
struct AllowanceRunArgs {
    /// RFC 3339 instant to evaluate due dates against. Defaults to now.
    #[arg(long)]
    as_of: Option<DateTime<Utc>>,
}

#[derive(Args, Debug)]
struct Challenges {
    #[command(subcommand)]
    command: ChallengesCommand,
}

#[derive(Subcommand, Debug)]
enum ChallengesCommand {
    /// Expire active challenges whose end date has passed.
    Expire,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn print_line(message: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(message),
        Print("\r\n")
    )?;
    Ok(())
}

/// Reads a password without echoing it.
fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut password = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                break;
            }
            KeyCode::Backspace => {
                if password.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                password.push(ch);
                execute!(out, Print("*"))?;
            }
            _ => {}
        }
        out.flush()?;
    }

    Ok(password)
}

fn prompt_new_password() -> Result<String, Box<dyn Error + Send + Sync>> {
    for _ in 0..3 {
        let password = prompt_password("Password: ")?;
        if password.is_empty() {
            print_line("Password must not be empty.")?;
            continue;
        }

        if password == prompt_password("Confirm password: ")? {
            return Ok(password);
        }
        print_line("Passwords do not match. Try again.")?;
    }

    Err("too many attempts".into())
}

async fn connect_engine(database_url: &str) -> Result<Engine, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(Engine::builder().database(db).build().await?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let engine = connect_engine(&cli.database_url).await?;

    match cli.command {
        Command::Family(Family {
            command: FamilyCommand::Create(args),
        }) => {
            let family_id = engine.create_family(&args.name).await?;
            println!("created family: {} ({family_id})", args.name);
        }
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_new_password()?;
            let user = engine
                .create_user(&args.username, &password, args.role.into(), args.family_id)
                .await?;
            println!("created user: {} ({:?})", user.username, user.role);
        }
        Command::LinkChild(args) => {
            engine
                .link_child_user(args.child_id, &args.username, &args.parent)
                .await?;
            println!("linked {} to child {}", args.username, args.child_id);
        }
        Command::Allowance(Allowance {
            command: AllowanceCommand::Run(args),
        }) => {
            let as_of = args.as_of.unwrap_or_else(Utc::now);
            let payments = engine.process_due_allowances(as_of).await?;
            for payment in &payments {
                println!(
                    "paid child {}: balance {}, savings {}",
                    payment.child_id, payment.balance_after, payment.savings_balance_after
                );
            }
            println!("{} allowances paid", payments.len());
        }
        Command::Challenges(Challenges {
            command: ChallengesCommand::Expire,
        }) => {
            let expired = engine.expire_challenges(Utc::now()).await?;
            println!("{} challenges expired", expired.len());
        }
    }

    Ok(())
}
