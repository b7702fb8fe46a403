//! `outfit-advisor` command-line front end.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use outfit_advisor_api::{ApiClient, HttpTransport, ReqwestTransport};
use outfit_advisor_app::{
    AdvisorApp, AppConfig, AppError, Command, HELP_TEXT, SystemClock, app_version, init_tracing,
    parse_command, redact_sensitive, render_view,
};
use outfit_advisor_auth::{
    AuthClient, ClientStore, FileClientStore, HttpAuthTransport, MemoryClientStore,
};
use outfit_advisor_core::ImageUpload;
use outfit_advisor_ui::NoticeKind;

#[derive(Debug, Parser)]
#[command(name = "outfit-advisor", version = app_version(), about = "Get style feedback on outfit photos")]
struct Cli {
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Backend base URL.
    #[arg(long)]
    base_url: Option<String>,
    /// Client storage file; omitted keeps identity in memory.
    #[arg(long)]
    storage: Option<PathBuf>,
    /// Log filter directive, e.g. `debug` or `outfit_advisor_api=trace`.
    #[arg(long)]
    log: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("outfit-advisor: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(storage) = cli.storage {
        config.storage_path = Some(storage);
    }
    if let Some(filter) = cli.log {
        config.log_filter = filter;
    }

    init_tracing(&config.log_filter)?;
    tracing::info!(version = app_version(), base_url = %config.base_url, "starting");

    let http: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new(config.request_timeout())?);
    let api = ApiClient::new(&config.base_url, Arc::clone(&http))?;
    let auth_client = AuthClient::new(&config.base_url, Arc::new(HttpAuthTransport::new(http)))?;
    let store: Box<dyn ClientStore> = match &config.storage_path {
        Some(path) => Box::new(FileClientStore::open(path)?),
        None => Box::new(MemoryClientStore::new()),
    };

    let mut app = AdvisorApp::new(
        app_version(),
        api,
        auth_client,
        store,
        Arc::new(SystemClock),
    );
    repl(&mut app)
}

fn repl(app: &mut AdvisorApp) -> Result<(), AppError> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    print!("{}", render_view(app.view()));

    loop {
        print!("> ");
        let _ = stdout.flush();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(());
        }

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };
        if command == Command::Quit {
            return Ok(());
        }

        if let Err(err) = apply(app, command) {
            tracing::debug!(error = %redact_sensitive(&err.to_string()), "command failed");
            println!("error: {err}");
        }
        for notice in app.take_notices() {
            let label = match notice.kind {
                NoticeKind::Alert => "alert",
                NoticeKind::Success => "ok",
                NoticeKind::Info => "info",
            };
            println!("[{label}] {}", notice.text);
        }
        print!("{}", render_view(app.view()));
    }
}

fn apply(app: &mut AdvisorApp, command: Command) -> Result<(), AppError> {
    match command {
        Command::Start => app.start(),
        Command::Select(path) => app.select_image(ImageUpload::from_path(path)?),
        Command::Occasion(occasion) => app.select_occasion(&occasion),
        Command::Next => app.submit_upload()?,
        Command::Back(target) => {
            app.navigate(&target)?;
        }
        Command::Tab(tab) => {
            app.select_tab(&tab)?;
        }
        Command::Tone(tone) => {
            app.select_tone(&tone)?;
        }
        Command::Say(message) => app.submit_chat(&message)?,
        Command::Login(email) => app.submit_login(&email)?,
        Command::Logout => app.logout()?,
        Command::Profile => app.open_profile(),
        Command::Dismiss => app.dismiss_login_prompt(),
        Command::Reset => app.reset_and_start_over(),
        Command::Show => app.tick(),
        Command::Help => println!("{HELP_TEXT}"),
        Command::Quit => {}
    }
    Ok(())
}
