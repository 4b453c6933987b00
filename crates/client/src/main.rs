use std::io::BufRead;
use std::sync::Arc;

use anyhow::{bail, Context};
use eden_console::config::ClientConfig;
use eden_console::error::ErrorKind;
use eden_console::notify::Notifier;
use eden_console::protocol::{PageQuery, WorkloadQuery};
use eden_console::{password_digest, Console};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable read when `--password` is not given
const PASSWORD_ENV: &str = "EDEN_PASSWORD";

/// Prints notifications as tagged stderr lines
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, kind: ErrorKind, message: &str) {
        eprintln!("  \x1b[1;31m[{kind}]\x1b[0m {message}");
    }
}

fn print_help() {
    println!("eden-console - Eden ops console client");
    println!();
    println!("USAGE:");
    println!("    eden-console <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    login USER           Sign in and store the token");
    println!("    logout               Sign out and forget the token");
    println!("    whoami               Show the signed-in user");
    println!("    namespaces CONFIG    List namespaces of a cluster");
    println!("    workloads CONFIG     List workloads of a cluster");
    println!("    smoke                Sign in, then exercise the workload and namespace endpoints");
    println!();
    println!("LOGIN OPTIONS:");
    println!("    -p, --password PASS  Password (else ${PASSWORD_ENV}, else read from stdin)");
    println!("    --prehashed          PASS is already the SHA-256 digest");
    println!();
    println!("LIST OPTIONS:");
    println!("    -n, --namespace NS   Only this namespace");
    println!("    --page N             Page number (default 1)");
    println!("    --page-size N        Page size (default 10)");
    println!();
    println!("SMOKE OPTIONS:");
    println!("    -u, --user USER      Account to sign in with (default admin)");
    println!("    -c, --config ID      Cluster config id (default 1)");
    println!();
    println!("GLOBAL OPTIONS:");
    println!("    -h, --help           Print help information");
    println!("    -v, --version        Print version");
    println!();
    println!("CONFIG:");
    println!("    ~/.config/eden-console/config.toml");
    println!("    EDEN_API_URL overrides api.base_url");
}

/// Options shared by the commands
#[derive(Default)]
struct Options {
    positional: Vec<String>,
    password: Option<String>,
    prehashed: bool,
    namespace: Option<String>,
    page: Option<u32>,
    page_size: Option<u32>,
    user: Option<String>,
    config_id: Option<u64>,
}

fn parse_options(args: &[String]) -> anyhow::Result<Options> {
    let mut opts = Options::default();
    let mut i = 0;
    while i < args.len() {
        let value = args.get(i + 1);
        match (args[i].as_str(), value) {
            ("--password" | "-p", Some(v)) => {
                opts.password = Some(v.clone());
                i += 2;
            }
            ("--prehashed", _) => {
                opts.prehashed = true;
                i += 1;
            }
            ("--namespace" | "-n", Some(v)) => {
                opts.namespace = Some(v.clone());
                i += 2;
            }
            ("--page", Some(v)) => {
                opts.page = Some(v.parse().context("--page expects a number")?);
                i += 2;
            }
            ("--page-size", Some(v)) => {
                opts.page_size = Some(v.parse().context("--page-size expects a number")?);
                i += 2;
            }
            ("--user" | "-u", Some(v)) => {
                opts.user = Some(v.clone());
                i += 2;
            }
            ("--config" | "-c", Some(v)) => {
                opts.config_id = Some(v.parse().context("--config expects a numeric id")?);
                i += 2;
            }
            (arg, _) if !arg.starts_with('-') => {
                opts.positional.push(arg.to_string());
                i += 1;
            }
            (arg, _) => bail!("unknown or incomplete option: {arg}"),
        }
    }
    Ok(opts)
}

impl Options {
    fn page(&self) -> PageQuery {
        let default = PageQuery::default();
        PageQuery::new(
            self.page.unwrap_or(default.page),
            self.page_size.unwrap_or(default.page_size),
        )
    }

    /// Digest to send, taken from the flag, the environment or stdin
    fn password_digest(&self) -> anyhow::Result<String> {
        let plain = match self.password.clone() {
            Some(p) => p,
            None => match std::env::var(PASSWORD_ENV) {
                Ok(p) if !p.is_empty() => p,
                _ => {
                    eprint!("  Password: ");
                    let mut line = String::new();
                    std::io::stdin()
                        .lock()
                        .read_line(&mut line)
                        .context("Failed to read password")?;
                    line.trim_end_matches(['\r', '\n']).to_string()
                }
            },
        };
        Ok(if self.prehashed {
            plain
        } else {
            password_digest(&plain)
        })
    }

    fn config_id(&self) -> anyhow::Result<u64> {
        match (self.config_id, self.positional.get(1)) {
            (Some(id), _) => Ok(id),
            (None, Some(raw)) => raw.parse().context("cluster config id must be a number"),
            (None, None) => bail!("missing cluster config id"),
        }
    }
}

async fn login(console: &Console, username: &str, opts: &Options) -> anyhow::Result<()> {
    let digest = opts.password_digest()?;
    let user = console.session().login(username, &digest).await?;
    eprintln!(
        "  \x1b[1;32m[login]\x1b[0m  Signed in as \x1b[1;96m{}\x1b[0m",
        user.display_name()
    );
    Ok(())
}

async fn whoami(console: &Console) -> anyhow::Result<()> {
    if !console.session().is_authenticated().await {
        bail!("not signed in; run `eden-console login USER`");
    }
    let user = console.session().current_user().await?;
    println!("id:       {}", user.id);
    println!("username: {}", user.username);
    println!("name:     {}", user.display_name());
    if !user.email.is_empty() {
        println!("email:    {}", user.email);
    }
    println!("roles:    {}", user.role_codes().join(", "));
    Ok(())
}

async fn namespaces(console: &Console, config_id: u64) -> anyhow::Result<()> {
    let names = console.namespaces().list(config_id).await?;
    if names.is_empty() {
        eprintln!("  \x1b[2mNo namespaces synced for cluster {config_id}\x1b[0m");
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}

async fn workloads(console: &Console, config_id: u64, opts: &Options) -> anyhow::Result<()> {
    let query = WorkloadQuery {
        page: opts.page(),
        config_id: Some(config_id),
        namespace: opts.namespace.clone(),
        ..WorkloadQuery::default()
    };
    let page = console.workloads().list(&query).await?;

    println!(
        "{:<40} {:<20} {:<12} {:<8} STATUS",
        "NAME", "NAMESPACE", "KIND", "PODS"
    );
    for w in &page.list {
        println!(
            "{:<40} {:<20} {:<12} {:<8} {}",
            w.name, w.namespace, w.kind, w.pod_status, w.status
        );
    }
    eprintln!(
        "  \x1b[2m{} of {} workloads (page {})\x1b[0m",
        page.len(),
        page.total,
        query.page.page
    );
    Ok(())
}

async fn smoke(console: &Console, opts: &Options) -> anyhow::Result<()> {
    let username = opts.user.clone().unwrap_or_else(|| "admin".to_string());
    let config_id = opts.config_id.unwrap_or(1);

    eprintln!("  \x1b[1;36m[smoke]\x1b[0m  Target {}", console.config().api.base_url);

    login(console, &username, opts).await?;

    let query = WorkloadQuery {
        page: PageQuery::new(1, 3),
        config_id: Some(config_id),
        ..WorkloadQuery::default()
    };
    let page = console.workloads().list(&query).await?;
    eprintln!(
        "  \x1b[1;32m[check]\x1b[0m  Workloads: {} returned, {} total",
        page.len(),
        page.total
    );
    for w in &page.list {
        eprintln!(
            "           {}/{} {} pods={} cpu={} mem={}",
            w.namespace, w.name, w.kind, w.pod_status, w.cpu_request_limits, w.memory_request_limits
        );
    }

    let names = console.namespaces().list(config_id).await?;
    eprintln!(
        "  \x1b[1;32m[check]\x1b[0m  Namespaces: {}",
        if names.is_empty() {
            "(none)".to_string()
        } else {
            names.join(", ")
        }
    );

    eprintln!("  \x1b[1;32m[smoke]\x1b[0m  All checks passed");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging (tracing)
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        print_help();
        return Ok(());
    };

    match command {
        "--version" | "-v" => {
            println!("eden-console {VERSION}");
            return Ok(());
        }
        "--help" | "-h" | "help" => {
            print_help();
            return Ok(());
        }
        _ => {}
    }

    let opts = parse_options(&args)?;

    ClientConfig::create_default_if_missing();
    let console = Console::from_config(ClientConfig::load(), Arc::new(ConsoleNotifier))?;

    match command {
        "login" => {
            let Some(username) = opts.positional.get(1) else {
                bail!("usage: eden-console login USER [--password PASS] [--prehashed]");
            };
            login(&console, username, &opts).await
        }
        "logout" => {
            console.session().logout().await;
            eprintln!("  \x1b[1;32m[logout]\x1b[0m Signed out");
            Ok(())
        }
        "whoami" => whoami(&console).await,
        "namespaces" => namespaces(&console, opts.config_id()?).await,
        "workloads" => workloads(&console, opts.config_id()?, &opts).await,
        "smoke" => smoke(&console, &opts).await,
        other => bail!("unknown command: {other} (see --help)"),
    }
}
