use anyhow::Context;
use clap::{Parser, Subcommand};
use feedback_board::{
    db, helpers,
    models::{Board, NewBoard, SiteSettings},
};
use sqlx::SqlitePool;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/feedback.db";

#[derive(Parser)]
#[command(name = "feedback-cli")]
#[command(about = "CLI tool for managing the feedback board", long_about = None)]
struct Cli {
    /// Database URL (defaults to DATABASE_URL)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Insert default settings, role and boards where missing
    Seed,

    /// Board management commands
    Board {
        #[command(subcommand)]
        command: BoardCommands,
    },

    /// Site settings commands
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
}

#[derive(Subcommand)]
enum BoardCommands {
    /// Create a new board
    Create {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// URL segment (derived from the name if omitted)
        #[arg(short, long)]
        url: Option<String>,

        /// Hex colour without the leading '#'
        #[arg(short, long, default_value = "484d7c")]
        color: String,
    },

    /// List all boards
    List,
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Show the current settings
    Show,

    /// Configure new post notifications
    Notifications {
        /// Admin address that receives notifications
        #[arg(short, long)]
        email: Option<String>,

        /// Turn notifications on
        #[arg(long, conflicts_with = "disable")]
        enable: bool,

        /// Turn notifications off
        #[arg(long)]
        disable: bool,
    },

    /// Set the site title used in emails
    Title {
        title: String,
    },
}

async fn load_settings(pool: &SqlitePool) -> anyhow::Result<SiteSettings> {
    match SiteSettings::load(pool).await? {
        Some(settings) => Ok(settings),
        None => {
            eprintln!("❌ No settings row found. Run `feedback-cli seed` first");
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();

    let database_url = cli
        .database_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

    // Connect to database
    let pool = db::create_pool(&database_url)
        .await
        .with_context(|| format!("Failed to open database {}", database_url))?;

    // Run migrations
    db::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    match cli.command {
        Commands::Seed => {
            let report = db::seed_defaults(&pool).await?;
            if report.settings_created {
                println!("✅ Default settings created");
            }
            if report.everyone_role_created {
                println!("✅ Role @everyone created");
            }
            for board in &report.boards_created {
                println!("✅ Board created: {} ({})", board.name, board.board_id);
            }
            if !report.settings_created
                && !report.everyone_role_created
                && report.boards_created.is_empty()
            {
                println!("Nothing to seed; defaults already present");
            }
        }

        Commands::Board { command } => match command {
            BoardCommands::Create { name, url, color } => {
                let url = url.unwrap_or_else(|| helpers::slugify(&name));
                if url.is_empty() {
                    eprintln!("❌ Board URL cannot be empty");
                    std::process::exit(1);
                }

                match Board::create(&pool, &NewBoard::new(&name, &url, &color)).await {
                    Ok(board) => {
                        println!("✅ Board created successfully!");
                        println!("  ID: {}", board.board_id);
                        println!("  Name: {}", board.name);
                        println!("  URL: {}", board.url);
                    }
                    Err(err) => {
                        eprintln!("❌ Failed to create board: {}", err);
                        std::process::exit(1);
                    }
                }
            }

            BoardCommands::List => {
                let boards = Board::list(&pool).await?;
                if boards.is_empty() {
                    println!("No boards found");
                } else {
                    println!("{:<38} {:<24} {:<24} Color", "ID", "Name", "URL");
                    println!("{}", "-".repeat(96));
                    for board in boards {
                        println!(
                            "{:<38} {:<24} {:<24} #{}",
                            board.board_id, board.name, board.url, board.color
                        );
                    }
                }
            }
        },

        Commands::Settings { command } => match command {
            SettingsCommands::Show => {
                let settings = load_settings(&pool).await?;
                println!("Title: {}", settings.title);
                println!(
                    "Description: {}",
                    settings.description.as_deref().unwrap_or("-")
                );
                println!("Accent color: #{}", settings.accent_color);
                println!("Allow signup: {}", settings.allow_signup);
                println!(
                    "Admin notification email: {}",
                    settings.admin_notification_email.as_deref().unwrap_or("-")
                );
                println!("Notify on new post: {}", settings.notify_on_new_post);
            }

            SettingsCommands::Notifications {
                email,
                enable,
                disable,
            } => {
                let current = load_settings(&pool).await?;

                let email = email
                    .map(|email| email.trim().to_string())
                    .or(current.admin_notification_email);
                if let Some(address) = &email {
                    if !helpers::is_valid_email(address) {
                        eprintln!("❌ Invalid email address: {}", address);
                        std::process::exit(1);
                    }
                }

                let enabled = if enable {
                    true
                } else if disable {
                    false
                } else {
                    current.notify_on_new_post
                };
                if enabled && email.is_none() {
                    eprintln!("❌ Set an admin email with --email before enabling notifications");
                    std::process::exit(1);
                }

                SiteSettings::update_notifications(&pool, email.as_deref(), enabled).await?;
                println!("✅ Notifications updated");
                println!("  Email: {}", email.as_deref().unwrap_or("-"));
                println!("  Enabled: {}", enabled);
            }

            SettingsCommands::Title { title } => {
                let title = title.trim();
                if title.is_empty() {
                    eprintln!("❌ Title cannot be empty");
                    std::process::exit(1);
                }
                load_settings(&pool).await?;
                SiteSettings::update_title(&pool, title).await?;
                println!("✅ Title set to {}", title);
            }
        },
    }

    Ok(())
}
