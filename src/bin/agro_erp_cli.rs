use std::sync::Arc;

use agro_erp::{
    auth::{AuthConfig, AuthService, LoginCredentials, RegisterRequest, TokenPair},
    config::{self, AppConfig},
    db::{self, DbPool},
    events::{Event, EventSender},
};
use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Parser)]
#[command(name = "agro-erp", about = "Agro ERP administration CLI", version)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON when available"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Create a tenant together with its first administrator
    CreateTenant(CreateTenantArgs),
    /// Check credentials and print a token pair
    Login(LoginArgs),
}

#[derive(Args)]
struct CreateTenantArgs {
    #[arg(long)]
    name: String,
    #[arg(long, help = "CPF/CNPJ of the tenant")]
    document: Option<String>,
    #[arg(long = "admin-name")]
    admin_name: String,
    #[arg(long = "admin-email")]
    admin_email: String,
    #[arg(long = "admin-password")]
    admin_password: String,
}

#[derive(Args)]
struct LoginArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let context = CliContext::initialize().await?;

    match cli.command {
        Commands::Migrate => {
            db::run_migrations(&context.db)
                .await
                .context("failed to run migrations")?;
            println!("migrations applied");
        }
        Commands::CreateTenant(args) => handle_create_tenant(&context, args, cli.json).await?,
        Commands::Login(args) => handle_login(&context, args, cli.json).await?,
    }

    Ok(())
}

async fn handle_create_tenant(context: &CliContext, args: CreateTenantArgs, json: bool) -> Result<()> {
    let registered = context
        .auth_service
        .register(RegisterRequest {
            tenant_name: args.name,
            tenant_document: args.document,
            name: args.admin_name,
            email: args.admin_email,
            password: args.admin_password,
        })
        .await
        .context("failed to create tenant")?;

    if json {
        print_json(&registered)?;
    } else {
        println!(
            "Created tenant {} ({}) with administrator {}",
            registered.tenant.name, registered.tenant.id, registered.user_id
        );
    }
    Ok(())
}

async fn handle_login(context: &CliContext, args: LoginArgs, json: bool) -> Result<()> {
    let tokens = context
        .auth_service
        .login(LoginCredentials {
            email: args.email,
            password: args.password,
        })
        .await
        .context("failed to authenticate")?;

    if json {
        print_json(&tokens)?;
    } else {
        render_tokens(&tokens);
    }
    Ok(())
}

struct CliContext {
    _config: AppConfig,
    db: Arc<DbPool>,
    auth_service: Arc<AuthService>,
}

impl CliContext {
    async fn initialize() -> Result<Self> {
        let config = config::load_config().context("failed to load application config")?;
        config::init_tracing(config.log_level(), config.log_json);

        let db_pool = db::establish_connection_from_app_config(&config)
            .await
            .context("failed to connect to database")?;
        let db = Arc::new(db_pool);

        let (event_tx, mut event_rx) = mpsc::channel::<Event>(32);
        let event_sender = Arc::new(EventSender::new(event_tx));

        tokio::spawn(async move {
            while let Some(event) = event_rx.recv().await {
                debug!(target: "agro_erp_cli", event = ?event, "received async event");
            }
        });

        let auth_service = Arc::new(AuthService::new(
            AuthConfig::from_app_config(&config),
            db.clone(),
            event_sender,
        ));

        Ok(Self {
            _config: config,
            db,
            auth_service,
        })
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render_tokens(tokens: &TokenPair) {
    println!("token type: {}", tokens.token_type);
    println!("access token (expires in {}s):", tokens.expires_in);
    println!("{}", tokens.access_token);
    println!("refresh token (expires in {}s):", tokens.refresh_expires_in);
    println!("{}", tokens.refresh_token);
}
