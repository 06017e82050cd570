#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![deny(warnings)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::{bail, Context, Result};
use log::warn;
use sessionguard::routing::LogNavigator;
use sessionguard::settings::StorageBackend;
use sessionguard::{
    GuardOutcome, Navigator, SessionGuardSettings, SessionManager, SharedSessionManager,
};

const USAGE: &str = "usage: sessionguard <command> [args]

commands:
  status                        show the restored session
  login <email> <secret>        sign in with email and secret
  signup <email> <secret>       register and sign in
  logout                        sign out
  verify <email>                check that an email is registered
  guard <path> [--require-auth] evaluate a guarded route";

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from Settings.toml and environment variables
    // This also loads .env file and initializes the logger
    let settings = SessionGuardSettings::load().context("Failed to load settings")?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        println!("{USAGE}");
        return Ok(());
    };

    if settings.storage.backend == StorageBackend::Memory {
        warn!("Memory storage selected; the session will not outlive this process");
    }

    let session = SharedSessionManager::new(
        SessionManager::from_settings(&settings).context("Failed to build session manager")?,
    );
    let mut navigator = LogNavigator;

    // The CLI has no current page before a command runs; restore against root
    session.restore("/").await;

    match (command.as_str(), rest) {
        ("status", []) => print_status(&session).await?,
        ("login", [email, secret]) => match session.login(email, secret).await {
            Ok(redirect) => {
                navigator.navigate(&redirect);
                println!("✓ Signed in as {email}");
            }
            Err(e) => bail!(e.user_message()),
        },
        ("signup", [email, secret]) => match session.sign_up(email, secret).await {
            Ok(redirect) => {
                navigator.navigate(&redirect);
                println!("✓ Registered and signed in as {email}");
            }
            Err(e) => bail!(e.user_message()),
        },
        ("logout", []) => {
            navigator.navigate(&session.logout().await);
            println!("✓ Signed out");
        }
        ("verify", [email]) => match session.verify_email(email).await {
            Ok(user) => println!("✓ {} is registered (id {})", user.email, user.id),
            Err(e) => bail!(e.user_message()),
        },
        ("guard", [path]) => print_decision(path, &session.decide(path).await),
        ("guard", [path, flag]) if flag == "--require-auth" => {
            print_decision(path, &session.guard(path, true).await);
        }
        _ => bail!("unrecognised arguments\n\n{USAGE}"),
    }

    Ok(())
}

async fn print_status(session: &SharedSessionManager) -> Result<()> {
    let valid = session.check_auth().await;
    let snapshot = session.snapshot().await;

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    if !valid {
        println!("✗ No valid session");
    }
    Ok(())
}

fn print_decision(path: &str, outcome: &GuardOutcome) {
    match outcome {
        GuardOutcome::Render => println!("✓ {path} renders"),
        GuardOutcome::Waiting => println!("… {path} waits for session restore"),
        GuardOutcome::Redirect(redirect) => println!("→ {path} redirects to {}", redirect.target),
    }
}
