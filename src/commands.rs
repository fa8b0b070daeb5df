use anyhow::Context;
use std::io::{self, BufRead, Write};

use crate::cli::{Action, Cli};
use crate::config::{PortalConfig, DEFAULT_PRODUCT_TYPE};
use crate::error::AppResult;
use crate::output;
use crate::service::credential::{Credential, CredentialSource, StoredCredentialSource};
use crate::service::LoginReport;
use crate::state::AppState;

/// Suggested login URL when no config exists yet.
pub const DEFAULT_LOGIN_URL: &str = "http://192.168.100.1:8090/login.xml";

pub async fn dispatch(cli: &Cli, state: &AppState) -> AppResult<()> {
    let network = cli.network.as_deref();

    match cli.action() {
        Action::Setup => {
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let mut stdout = io::stdout();
            setup(state, network, &mut input, &mut stdout).await
        }
        Action::Test => test_connectivity(state, network).await,
        Action::ClearLogs => {
            let deleted = state.services.attempt.clear_all().await?;
            println!("Cleared {deleted} login attempt(s).");
            Ok(())
        }
        Action::PruneLogs(days) => {
            let deleted = state.services.attempt.prune_older_than(days).await?;
            println!("Removed {deleted} login attempt(s) older than {days} day(s).");
            Ok(())
        }
        Action::ViewLogs(limit) => view_logs(state, limit).await,
        Action::Login => login(state, network).await.map(|_| ()),
        Action::LoginAndShow(limit) => {
            login(state, network).await?;
            view_logs(state, limit).await
        }
    }
}

fn credential_source(state: &AppState, network: Option<&str>) -> AppResult<Box<dyn CredentialSource>> {
    match network {
        Some(name) => Ok(Box::new(StoredCredentialSource::new(
            state.services.credential.clone(),
            name,
        ))),
        None => Ok(Box::new(state.config.load_portal()?)),
    }
}

async fn login(state: &AppState, network: Option<&str>) -> AppResult<LoginReport> {
    let source = credential_source(state, network)?;
    let report = state.services.login_and_record(source.as_ref()).await?;

    println!("{}", output::outcome_line(&report.outcome));
    Ok(report)
}

async fn view_logs(state: &AppState, limit: u32) -> AppResult<()> {
    let records = state.services.attempt.list_recent(limit).await?;
    println!("{}", output::attempts_table(&records));
    Ok(())
}

async fn test_connectivity(state: &AppState, network: Option<&str>) -> AppResult<()> {
    let source = credential_source(state, network)?;
    let url = source.credentials().await?.login_url;

    let connectivity = state.services.portal.test_connectivity(&url).await;
    println!("{}", output::connectivity_line(&url, &connectivity));
    Ok(())
}

/// Writes the config file from answers read on `input`, and stores the same
/// credentials under `network` when one is given.
pub async fn setup<R, W>(state: &AppState, network: Option<&str>, input: &mut R, output: &mut W) -> AppResult<()>
where
    R: BufRead,
    W: Write,
{
    let existing = match state.config.load_portal() {
        Ok(config) => Some(config),
        Err(e) => {
            debug!("No usable existing config: {e}");
            None
        }
    };

    let config = prompt_portal_config(input, output, existing.as_ref())?;
    config.save(&state.config.config_path)?;
    writeln!(output, "Configuration saved to {}", state.config.config_path.display())
        .context("Failed to write setup output")?;

    if let Some(name) = network {
        let credential = Credential::new(name, &config.username, &config.password, &config.wifi_url)
            .with_product_type(&config.product_type);
        state.services.credential.upsert(&credential).await?;
        writeln!(output, "Credentials stored for network {name}").context("Failed to write setup output")?;
    }

    Ok(())
}

fn prompt_portal_config<R, W>(input: &mut R, output: &mut W, existing: Option<&PortalConfig>) -> anyhow::Result<PortalConfig>
where
    R: BufRead,
    W: Write,
{
    writeln!(output, "Captive portal setup")?;

    let wifi_url = prompt(
        input,
        output,
        "Login URL",
        Some(existing.map_or(DEFAULT_LOGIN_URL, |c| c.wifi_url.as_str())),
    )?;
    let username = prompt(input, output, "Username", existing.map(|c| c.username.as_str()))?;

    let password_label = if existing.is_some() {
        "Password (empty keeps the current one)"
    } else {
        "Password"
    };
    let mut password = prompt(input, output, password_label, None)?;
    if password.is_empty() {
        password = existing.map(|c| c.password.clone()).unwrap_or_default();
    }

    let product_type = prompt(
        input,
        output,
        "Product type",
        Some(existing.map_or(DEFAULT_PRODUCT_TYPE, |c| c.product_type.as_str())),
    )?;

    Ok(PortalConfig {
        wifi_url,
        username,
        password,
        product_type,
    })
}

fn prompt<R, W>(input: &mut R, output: &mut W, label: &str, default: Option<&str>) -> anyhow::Result<String>
where
    R: BufRead,
    W: Write,
{
    match default.filter(|d| !d.is_empty()) {
        Some(default) => write!(output, "{label} [{default}]: ")?,
        None => write!(output, "{label}: ")?,
    }
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line).context("Failed to read setup input")?;

    let value = line.trim();
    if value.is_empty() {
        Ok(default.unwrap_or_default().to_string())
    } else {
        Ok(value.to_string())
    }
}
