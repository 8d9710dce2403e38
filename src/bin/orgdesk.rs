// orgdesk/src/bin/orgdesk.rs

use actix_web::{web, App, HttpServer};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::sync::Arc;

use orgdesk::{
    ability_for_role,
    controllers::dashboard_controller::not_found,
    configure_orgdesk_services, get_orgdesk_backend, get_orgdesk_config,
    get_orgdesk_session_middleware, setup_orgdesk_logging, visible_menu, Ability, ApiClient,
    LoginForm, MenuItem, PermissionChecker, SessionContext, ROLE_TABLE,
};

#[derive(Parser)]
#[command(name = "orgdesk")]
#[command(about = "OrgDesk CLI tool for inspecting roles and running the dashboard")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in roles
    Roles {
        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },
    /// Show the resolved ability rules of a role
    Grants {
        /// Role name, e.g. "Event Manager"
        role: String,
    },
    /// Check whether a role may perform an action on a subject
    Check {
        role: String,
        action: String,
        subject: String,
    },
    /// Show the navigation menu a role would see
    Menu {
        role: String,
    },
    /// Sign in against the backend and print the resolved session
    Login {
        #[arg(short, long)]
        email: String,
        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Run the dashboard web server
    Serve {
        /// Address to bind
        #[arg(short, long, env = "ORGDESK_BIND", default_value = "127.0.0.1:8080")]
        bind: String,
    },
}

#[actix_web::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Roles { format } => list_roles(&format)?,
        Commands::Grants { role } => show_grants(&role)?,
        Commands::Check { role, action, subject } => check(&role, &action, &subject)?,
        Commands::Menu { role } => show_menu(&role)?,
        Commands::Login { email, password } => login(email, password).await?,
        Commands::Serve { bind } => serve(&bind).await?,
    }

    Ok(())
}

fn known_role_ability(role: &str) -> Result<Ability> {
    if !ROLE_TABLE.contains(role) {
        let known: Vec<&str> = ROLE_TABLE.role_names().collect();
        bail!("Unknown role '{}'. Known roles: {}", role, known.join(", "));
    }
    Ok(ability_for_role(&ROLE_TABLE, Some(role)))
}

fn list_roles(format: &str) -> Result<()> {
    match format {
        "json" => {
            let roles: Vec<_> = ROLE_TABLE
                .role_names()
                .map(|name| {
                    serde_json::json!({
                        "name": name,
                        "grants": ROLE_TABLE.grants_for(name).unwrap_or_default(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&roles)?);
        }
        _ => {
            println!("{:<20} {:<8}", "Role", "Grants");
            println!("{}", "-".repeat(30));
            for name in ROLE_TABLE.role_names() {
                let count = ROLE_TABLE.grants_for(name).map_or(0, |grants| grants.len());
                println!("{:<20} {:<8}", name, count);
            }
        }
    }
    Ok(())
}

fn show_grants(role: &str) -> Result<()> {
    let ability = known_role_ability(role)?;
    println!("Rules for {}:", role);
    for rule in ability.rules() {
        println!("  {}", rule);
    }
    Ok(())
}

fn check(role: &str, action: &str, subject: &str) -> Result<()> {
    let ability = known_role_ability(role)?;
    if ability.can(action, subject) {
        println!("✓ {} can {} {}", role, action, subject);
    } else {
        println!("✗ {} cannot {} {}", role, action, subject);
    }
    Ok(())
}

fn print_menu(items: &[MenuItem], depth: usize) {
    for item in items {
        println!("{}{:<16} {}", "  ".repeat(depth + 1), item.title, item.path);
        if let Some(children) = &item.children {
            print_menu(children, depth + 1);
        }
    }
}

fn show_menu(role: &str) -> Result<()> {
    let ability = known_role_ability(role)?;
    println!("Menu for {}:", role);
    print_menu(&visible_menu(&ability), 0);
    Ok(())
}

async fn login(email: String, password: Option<String>) -> Result<()> {
    let config = get_orgdesk_config()?;
    setup_orgdesk_logging(&config);

    let password = match password {
        Some(p) => p,
        None => {
            print!("Enter password: ");
            io::stdout().flush()?;
            rpassword::read_password()?
        }
    };

    let client = ApiClient::new(&config).context("Failed to build HTTP client")?;
    let context = SessionContext::new(Arc::new(ROLE_TABLE.clone()));
    let session = context
        .sign_in(&client, &LoginForm { email, password })
        .await
        .context("Sign-in failed")?;

    println!("✓ Signed in as {}", session.user().display_name());
    println!("  ID: {}", session.user().id);
    println!("  Role: {}", session.role_name().unwrap_or("(none)"));
    println!("  Rules:");
    for rule in session.ability().rules() {
        println!("    {}", rule);
    }
    println!("  Menu:");
    print_menu(&visible_menu(session.ability()), 1);

    context.logout();
    Ok(())
}

async fn serve(bind: &str) -> Result<()> {
    let config = get_orgdesk_config()?;
    setup_orgdesk_logging(&config);
    let backend = get_orgdesk_backend(&config)?;

    log::info!("🚀 Starting OrgDesk on http://{}/orgdesk", bind);

    HttpServer::new(move || {
        App::new()
            .wrap(get_orgdesk_session_middleware(&config))
            .configure(configure_orgdesk_services(config.clone(), backend.clone()))
            .default_service(web::to(not_found))
    })
    .bind(bind)
    .with_context(|| format!("Failed to bind {}", bind))?
    .run()
    .await
    .context("Server error")
}
