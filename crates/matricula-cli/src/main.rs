use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;

use matricula_cli::seeder::{self, StaffSeed};
use matricula_config::{DatabaseConfig, SchoolConfig};
use matricula_core::BcryptHasher;
use matricula_db::{PgStore, Store, init_db_pool, run_migrations};
use matricula_models::auth::Role;

#[derive(Parser)]
#[command(name = "matricula-cli")]
#[command(about = "Matricula CLI - Administrative tools for Matricula", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Create an administrator account
    CreateAdmin {
        #[command(flatten)]
        account: AccountArgs,
    },
    /// Create a teacher account
    CreateTeacher {
        #[command(flatten)]
        account: AccountArgs,
    },
    /// Insert fake admission applications for the current year
    SeedApplications {
        /// Number of applications to create
        #[arg(short = 'n', long, default_value = "25")]
        count: usize,
    },
    /// List students that have no linked parent account
    Orphans,
}

#[derive(clap::Args)]
struct AccountArgs {
    /// First name
    #[arg(short = 'f', long)]
    first_name: Option<String>,

    /// Last name
    #[arg(short = 'l', long)]
    last_name: Option<String>,

    /// Email address
    #[arg(short = 'e', long)]
    email: Option<String>,

    /// Password (will be prompted securely if not provided)
    #[arg(short = 'p', long)]
    password: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let cli = Cli::parse();

    let config = DatabaseConfig::from_env().context("DATABASE_URL must be set")?;
    let pool = init_db_pool(&config)
        .await
        .context("Failed to connect to database")?;

    if let Commands::Migrate = cli.command {
        run_migrations(&pool).await.context("Migration failed")?;
        println!("✅ Migrations applied");
        return Ok(());
    }

    let store = PgStore::new(pool);

    let result = match cli.command {
        Commands::Migrate => Ok(()),
        Commands::CreateAdmin { account } => handle_create_staff(&store, account, Role::Admin).await,
        Commands::CreateTeacher { account } => {
            handle_create_staff(&store, account, Role::Teacher).await
        }
        Commands::SeedApplications { count } => handle_seed_applications(&store, count).await,
        Commands::Orphans => handle_orphans(&store).await,
    };

    if let Err(e) = result {
        eprintln!("\n❌ {:#}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn handle_create_staff(
    store: &dyn Store,
    args: AccountArgs,
    role: Role,
) -> anyhow::Result<()> {
    let first_name = match args.first_name {
        Some(v) => v,
        None => Input::new().with_prompt("First name").interact_text()?,
    };
    let last_name = match args.last_name {
        Some(v) => v,
        None => Input::new().with_prompt("Last name").interact_text()?,
    };
    let email = match args.email {
        Some(v) => v,
        None => Input::new().with_prompt("Email address").interact_text()?,
    };
    let password = match args.password {
        Some(v) => v,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()?,
    };

    let account = seeder::create_staff(
        store,
        &BcryptHasher::from_env(),
        StaffSeed {
            first_name,
            last_name,
            email,
            password,
            role,
        },
    )
    .await
    .with_context(|| format!("Error creating {}", role))?;

    println!("\n✅ {} account created successfully!", role);
    println!("   Email: {}", account.email);
    println!("   Name: {} {}", account.first_name, account.last_name);
    Ok(())
}

async fn handle_seed_applications(store: &dyn Store, count: usize) -> anyhow::Result<()> {
    let school = SchoolConfig::from_env();
    println!("🌱 Generating {} applications...", count);
    let applications = seeder::generate_applications(count, &school.default_country);
    let stored = seeder::seed_applications(store, &applications, Utc::now())
        .await
        .context("Error seeding applications")?;

    if let (Some(first), Some(last)) = (stored.first(), stored.last()) {
        println!(
            "✅ Created {} applications ({} .. {})",
            stored.len(),
            first.application_number,
            last.application_number
        );
    }
    Ok(())
}

async fn handle_orphans(store: &dyn Store) -> anyhow::Result<()> {
    let orphans = store
        .list_orphan_students()
        .await
        .context("Failed to list students")?;

    if orphans.is_empty() {
        println!("✅ Every student is linked to a parent");
        return Ok(());
    }

    println!("⚠️  {} student(s) without a linked parent:", orphans.len());
    for student in orphans {
        println!(
            "   {:<10} {:<14} {:<28} parent email: {}",
            student.roll_number,
            student.admission_number,
            student.full_name(),
            student.parent_info.parent_email
        );
    }
    Ok(())
}
