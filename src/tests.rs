use axum::{extract::State, http::StatusCode, routing::post, Form, Router};
use clap::Parser;
use std::collections::HashMap;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tempfile::{tempdir, TempDir};

use crate::cli::Cli;
use crate::config::{AppConfig, ConfigError, PortalConfig};
use crate::error::AppError;
use crate::logging::LoggingConfig;
use crate::service::attempt::{AttemptService, MASKED_PASSWORD};
use crate::service::credential::{Credential, CredentialError, StoredCredentialSource};
use crate::service::portal::PortalService;
use crate::service::{ServiceError, ServiceRegistry};
use crate::storage::DatabaseClient;
use crate::{report, run};

const SUCCESS_BODY: &str = "<?xml version='1.0' ?><requestresponse><status><![CDATA[LOGIN]]></status>\
<message><![CDATA[You are logged in]]></message><logoutmessage><![CDATA[You have successfully logged off]]></logoutmessage></requestresponse>";

const ALREADY_BODY: &str = "<requestresponse><status><![CDATA[LIVE-ALREADY-AUTHENTICATED]]></status>\
<message><![CDATA[You have already signed in]]></message></requestresponse>";

const INVALID_BODY: &str =
    "<requestresponse><status><![CDATA[LOGIN]]></status><message><![CDATA[invalid credentials]]></message></requestresponse>";

type Forms = Arc<Mutex<Vec<HashMap<String, String>>>>;

/// Serves `body` with `status` for every POST to /login.xml and records the
/// submitted forms.
async fn spawn_portal(status: StatusCode, body: &'static str) -> (String, Forms) {
    let forms: Forms = Arc::default();

    let app = Router::new()
        .route(
            "/login.xml",
            post(
                move |State(forms): State<Forms>, Form(form): Form<HashMap<String, String>>| async move {
                    forms.lock().unwrap().push(form);
                    (status, body)
                },
            ),
        )
        .with_state(forms.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/login.xml"), forms)
}

async fn registry() -> (TempDir, ServiceRegistry) {
    let dir = tempdir().unwrap();
    let db = DatabaseClient::open(dir.path().join("wifi_log.db")).await.unwrap();
    let registry = ServiceRegistry::new(db, PortalService::new().unwrap());
    (dir, registry)
}

fn portal_config(url: &str) -> PortalConfig {
    PortalConfig {
        wifi_url: url.to_string(),
        username: "alice".to_string(),
        password: "hunter2".to_string(),
        product_type: "0".to_string(),
    }
}

#[tokio::test]
async fn test_successful_login_is_recorded_once() {
    let (url, forms) = spawn_portal(StatusCode::OK, SUCCESS_BODY).await;
    let (_dir, services) = registry().await;

    let report = services.login_and_record(&portal_config(&url)).await.unwrap();

    assert!(report.outcome.success);
    assert_eq!(report.outcome.message, "You are logged in");
    assert_eq!(report.record.response_status, "200");
    assert_eq!(report.record.response_message, "You are logged in");
    assert_eq!(report.record.password, MASKED_PASSWORD);
    assert_eq!(report.record.session_token, report.outcome.session_token);

    let recent = services.attempt.list_recent(10).await.unwrap();
    assert_eq!(recent, vec![report.record.clone()]);

    let forms = forms.lock().unwrap();
    assert_eq!(forms.len(), 1);
    let form = &forms[0];
    assert_eq!(form["mode"], "191");
    assert_eq!(form["username"], "alice");
    assert_eq!(form["password"], "hunter2");
    assert_eq!(form["producttype"], "0");
    assert_eq!(form["a"], report.outcome.session_token);
}

#[tokio::test]
async fn test_already_authenticated_counts_as_success() {
    let (url, _forms) = spawn_portal(StatusCode::OK, ALREADY_BODY).await;
    let (_dir, services) = registry().await;

    let report = services.login_and_record(&portal_config(&url)).await.unwrap();

    assert!(report.outcome.success);
    assert_eq!(report.outcome.portal_status.as_deref(), Some("LIVE-ALREADY-AUTHENTICATED"));
    assert_eq!(report.record.response_message, "You have already signed in");
}

#[tokio::test]
async fn test_rejected_login_keeps_http_status() {
    let (url, _forms) = spawn_portal(StatusCode::INTERNAL_SERVER_ERROR, INVALID_BODY).await;
    let (_dir, services) = registry().await;

    let report = services.login_and_record(&portal_config(&url)).await.unwrap();

    assert!(!report.outcome.success);
    assert_eq!(report.record.response_status, "500");
    assert_eq!(report.record.response_message, "invalid credentials");
}

#[tokio::test]
async fn test_unparseable_reply_records_unknown_response() {
    let (url, _forms) = spawn_portal(StatusCode::OK, "<html>captive</html>").await;
    let (_dir, services) = registry().await;

    let report = services.login_and_record(&portal_config(&url)).await.unwrap();

    assert!(!report.outcome.success);
    assert_eq!(report.record.response_message, "Unknown response");
}

#[tokio::test]
async fn test_refused_connection_is_recorded_as_failed() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let url = format!("http://{addr}/login.xml");
    let (_dir, services) = registry().await;

    let report = services.login_and_record(&portal_config(&url)).await.unwrap();

    let direct = reqwest::Client::new()
        .post(&url)
        .form(&[("mode", "191")])
        .send()
        .await
        .unwrap_err()
        .to_string();

    assert!(!report.outcome.success);
    assert_eq!(report.record.response_status, "FAILED");
    assert_eq!(report.record.response_message, direct);
    assert_eq!(report.outcome.message, report.record.response_message);
    assert_eq!(services.attempt.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_stored_network_credentials() {
    let (url, forms) = spawn_portal(StatusCode::OK, SUCCESS_BODY).await;
    let (_dir, services) = registry().await;

    services
        .credential
        .upsert(&Credential::new("office", "bob", "s3cret", &url).with_product_type("2"))
        .await
        .unwrap();

    let source = StoredCredentialSource::new(services.credential.clone(), "office");
    let report = services.login_and_record(&source).await.unwrap();

    assert_eq!(report.record.username, "bob");
    assert_eq!(report.record.network_name.as_deref(), Some("office"));
    assert_eq!(forms.lock().unwrap()[0]["producttype"], "2");
}

#[tokio::test]
async fn test_unknown_network_records_nothing() {
    let (_dir, services) = registry().await;

    let source = StoredCredentialSource::new(services.credential.clone(), "nowhere");
    let err = services.login_and_record(&source).await.unwrap_err();

    assert!(matches!(err, ServiceError::Credential(CredentialError::NotFound(_))));
    assert_eq!(services.attempt.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_history_accumulates_newest_first() {
    let (url, _forms) = spawn_portal(StatusCode::OK, SUCCESS_BODY).await;
    let (_dir, services) = registry().await;
    let config = portal_config(&url);

    let first = services.login_and_record(&config).await.unwrap().record;
    let second = services.login_and_record(&config).await.unwrap().record;

    let recent = services.attempt.list_recent(5).await.unwrap();
    assert_eq!(recent.iter().map(|r| r.id).collect::<Vec<_>>(), vec![second.id, first.id]);
}

fn cli_for(dir: &TempDir, args: &[&str]) -> (Cli, AppConfig) {
    let config_path = dir.path().join("config.json");
    let db_path = dir.path().join("wifi_log.db");
    let mut argv = vec![
        "portal-autologin".to_string(),
        "--config".to_string(),
        config_path.display().to_string(),
        "--db".to_string(),
        db_path.display().to_string(),
        "--log-level".to_string(),
        "WARNING".to_string(),
        "--no-log-file".to_string(),
        "--no-console-logging".to_string(),
    ];
    argv.extend(args.iter().map(|a| a.to_string()));

    let cli = Cli::try_parse_from(argv).unwrap();
    let config = cli.app_config(LoggingConfig::default());
    (cli, config)
}

fn exit_code_text(code: ExitCode) -> String {
    format!("{code:?}")
}

#[tokio::test]
async fn test_missing_config_exits_with_failure() {
    let dir = tempdir().unwrap();
    let (cli, config) = cli_for(&dir, &["--login"]);

    let result = run(&cli, config).await;
    assert!(matches!(result, Err(AppError::Config(ConfigError::NotFound(_)))));
    assert_eq!(exit_code_text(report(result, false)), exit_code_text(ExitCode::FAILURE));
}

#[tokio::test]
async fn test_failed_login_exits_with_success() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let dir = tempdir().unwrap();
    portal_config(&format!("http://{addr}/login.xml"))
        .save(&dir.path().join("config.json"))
        .unwrap();
    let (cli, config) = cli_for(&dir, &["--login"]);
    let db_path = config.db_path.clone();

    let result = run(&cli, config).await;
    assert!(result.is_ok());
    assert_eq!(exit_code_text(report(result, false)), exit_code_text(ExitCode::SUCCESS));

    let attempts = AttemptService::new(DatabaseClient::open(&db_path).await.unwrap());
    let recent = attempts.list_recent(1).await.unwrap();
    assert_eq!(recent[0].response_status, "FAILED");
}

#[tokio::test]
async fn test_huge_prune_window_exits_with_success() {
    let dir = tempdir().unwrap();
    let (cli, config) = cli_for(&dir, &["--prune-logs", "4294967295"]);

    let result = run(&cli, config).await;
    assert_eq!(exit_code_text(report(result, false)), exit_code_text(ExitCode::SUCCESS));
}
