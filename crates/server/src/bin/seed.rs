use clap::Parser;
use database::{db::create_connection, services::seed::SeedService};
use migration::{Migrator, MigratorTrait};
use server::auth::JwtKeys;

/// Creates the development laboratory and users and prints a token for each
#[derive(Parser, Debug)]
#[command(name = "seed", version, about)]
struct Args {
    /// Database to seed
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Secret the printed tokens are signed with
    #[arg(long, env = "JWT_SECRET", default_value = "dev-secret-key")]
    jwt_secret: String,

    /// Skip running pending migrations first
    #[arg(long)]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();
    let args = Args::parse();

    let db = create_connection(&args.database_url)
        .await
        .expect("Failed to connect to database");
    if !args.skip_migrations {
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");
    }

    let report = SeedService::init_users(&db).await.expect("Failed to seed users");
    let keys = JwtKeys::new(&args.jwt_secret);

    println!("laboratory {} ready", report.lab_id);
    for user in report.users {
        let token = keys
            .generate_token(&user.id, user.user_type, user.lab_id)
            .expect("Failed to sign token");
        let state = if user.created { "created" } else { "exists" };
        println!("{} {} ({state})\n  {token}", user.user_type, user.id);
    }
}
