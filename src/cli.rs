// CLI module - command-line argument parsing and headless commands
//
// Without a subcommand medium starts the TUI. Subcommands run one page
// (or one auth action) against the backend and print plain text:
// - show / list / me: load a record or list page and print it
// - login / signup / logout: manage the stored token
// - routes, config: inspect the route table and configuration

use crate::config::{Config, VERSION};
use crate::content::{self, Page, HOME_MENU};
use crate::dispatch::{Credentials, NewUser};
use crate::page::{ListPage, PageState, RecordPage, RecordView};
use crate::router::{History, Params, Resolved};
use crate::Services;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::Password;

/// medium - terminal browser for Medium Tech content
#[derive(Parser)]
#[command(name = "medium")]
#[command(version = VERSION)]
#[command(about = "Browse users, artists and images from a Medium Tech backend", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show one record route, e.g. `medium show artist cid=x1`
    Show {
        /// Route name (see `medium routes`)
        route: String,

        /// Path parameters as key=value
        #[arg(value_parser = parse_key_val)]
        params: Vec<(String, String)>,
    },

    /// Show one page of a list route, e.g. `medium list users --size 5`
    List {
        route: String,

        #[arg(long)]
        size: Option<usize>,

        #[arg(long)]
        offset: Option<usize>,
    },

    /// Show the logged-in user
    Me,

    /// Log in and store the access token
    Login {
        #[arg(short, long)]
        username: String,

        /// Prompted for when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Create an account
    Signup {
        #[arg(long)]
        email: String,

        #[arg(long)]
        first_name: String,

        #[arg(long, default_value = "")]
        middle_name: String,

        #[arg(long)]
        last_name: String,

        #[arg(long, default_value = "")]
        phone_number: String,

        /// Prompted for (twice) when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Forget the stored access token
    Logout,

    /// List the route table
    Routes,

    /// Inspect configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", s)),
    }
}

/// Run a headless command
pub async fn run(command: Commands, services: &Services) -> Result<()> {
    match command {
        Commands::Show { route, params } => {
            let resolved = resolve(services, &route, params.into_iter().collect(), Params::new())?;
            open(services, resolved).await
        }
        Commands::List {
            route,
            size,
            offset,
        } => {
            let mut query = Params::new();
            if let Some(size) = size {
                query.insert("size".to_string(), size.to_string());
            }
            if let Some(offset) = offset {
                query.insert("offset".to_string(), offset.to_string());
            }
            let resolved = resolve(services, &route, Params::new(), query)?;
            open(services, resolved).await
        }
        Commands::Me => {
            let resolved = resolve(services, "me", Params::new(), Params::new())?;
            open(services, resolved).await
        }
        Commands::Login { username, password } => {
            let password = login_password(password)?;
            let url = services
                .router
                .backend_url("login", &Params::new(), &Params::new())?;
            services
                .dispatcher
                .login(&url, &Credentials { username, password })
                .await
                .context("Login failed")?;
            println!("Logged in. Token stored at {}", services.config.token_path.display());
            Ok(())
        }
        Commands::Signup {
            email,
            first_name,
            middle_name,
            last_name,
            phone_number,
            password,
        } => {
            let (password1, password2) = signup_passwords(password)?;
            let new_user = NewUser {
                email,
                first_name,
                middle_name,
                last_name,
                phone_number,
                password1,
                password2,
            };
            if let Err(reason) = new_user.validate() {
                bail!("Signup failed: {}", reason);
            }

            let url = services
                .router
                .backend_url("users", &Params::new(), &Params::new())?;
            let user = services
                .dispatcher
                .signup(&url, &new_user)
                .await
                .context("Signup failed")?;
            println!("Account created. Log in with `medium login -u {}`", new_user.email);
            print!("{}", crate::render::render(&user, &Default::default()).to_text());
            Ok(())
        }
        Commands::Logout => {
            // Headless: the post-logout navigation has nowhere to go
            let mut history = History::new(services.config.start_route.clone());
            services
                .dispatcher
                .session()
                .logout(&services.router, &mut history)?;
            println!("Logged out.");
            Ok(())
        }
        Commands::Routes => {
            for route in services.router.routes() {
                println!(
                    "{:<16} {:<24} {}",
                    route.name,
                    route.path,
                    route.backend.unwrap_or("-")
                );
            }
            Ok(())
        }
        Commands::Config { show, path } => {
            if path {
                handle_config_path()
            } else if show {
                handle_config_show(&services.config);
                Ok(())
            } else {
                println!("Usage: medium config [--show|--path]");
                println!();
                println!("Options:");
                println!("  --show    Display effective configuration");
                println!("  --path    Show config file path");
                Ok(())
            }
        }
    }
}

fn resolve(services: &Services, name: &str, params: Params, query: Params) -> Result<Resolved> {
    let route = services.router.route(name)?;
    Ok(Resolved {
        route,
        params,
        query,
    })
}

async fn open(services: &Services, resolved: Resolved) -> Result<()> {
    println!("{}", resolved.route.title);
    println!();

    match content::activate(resolved, None, services.config.page_size) {
        Page::Record(mut page) => {
            page.load(&services.router, &services.dispatcher).await;
            print_record(&page)
        }
        Page::List(mut page) => {
            page.load(&services.router, &services.dispatcher).await;
            print_list(services, &page)
        }
        Page::Home => {
            for (label, route) in HOME_MENU {
                println!("  {:<16} medium list {}", label, route);
            }
            Ok(())
        }
        Page::Login => {
            println!("Use `medium login -u <username>` or `medium signup`.");
            Ok(())
        }
        Page::NotFound(name) => bail!("Nothing to show for route '{}'", name),
    }
}

fn print_record(page: &RecordPage) -> Result<()> {
    match page.view() {
        RecordView::Table(table) => {
            print!("{}", table.to_text());
            Ok(())
        }
        RecordView::Status(status) => match page.state() {
            PageState::Error(message) => bail!("{}", message),
            _ => bail!("{}", status),
        },
    }
}

fn print_list(services: &Services, page: &ListPage) -> Result<()> {
    if let PageState::Error(message) = page.state() {
        bail!("{}", message);
    }

    println!(
        "page size: {} | prev: {} | next: {}",
        page.page_size(),
        if page.can_prev() { "yes" } else { "no" },
        if page.can_next() { "yes" } else { "no" },
    );
    println!("{}", page.status_line());
    println!();

    for item in page.list_items() {
        let url = content::target_url(&services.router, &item.target)?;
        println!("  {:<32} {}", item.label, url);
    }
    Ok(())
}

/// Password from `--password`, or read from the terminal with echo off
fn login_password(flag: Option<String>) -> Result<String> {
    match flag {
        Some(password) => Ok(password),
        None => Password::new()
            .with_prompt("password")
            .interact()
            .context("Failed to read password"),
    }
}

/// Password and confirmation for signup; the flag stands for both
fn signup_passwords(flag: Option<String>) -> Result<(String, String)> {
    match flag {
        Some(password) => Ok((password.clone(), password)),
        None => {
            let password = Password::new()
                .with_prompt("password")
                .with_confirmation("confirm password", "passwords do not match")
                .interact()
                .context("Failed to read password")?;
            Ok((password.clone(), password))
        }
    }
}

fn handle_config_path() -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;
    println!("{}", path.display());
    Ok(())
}

fn handle_config_show(config: &Config) {
    println!("# Effective configuration (env > file > defaults)");
    println!();
    let toml = config.to_toml();
    let settings: Vec<&str> = toml.lines().filter(|l| !l.starts_with('#')).collect();
    println!("{}", settings.join("\n").trim());

    println!();
    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
}
