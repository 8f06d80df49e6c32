//! 资产管理客户端命令行入口

mod cli;

use anyhow::Context;
use asset_portal::{
    api::PortalClient,
    config::AppConfig,
    error::ClientError,
    form::{Notice, Notifier, RequestForm, SubmitOutcome},
    models::{Credentials, RegistrationProfile, RequestKind},
    session::{SessionManager, SessionProvider, SessionState},
    storage::{FileTokenStore, TokenStore},
    telemetry,
};
use clap::Parser;
use secrecy::Secret;
use std::sync::Arc;

use cli::{Cli, Commands, RegisterArgs, RequestArgs, RequestCommand};

/// 把通知输出到终端
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice {
            Notice::RequestSubmitted { .. } => println!("{}", notice),
            Notice::SubmissionFailed { .. } => eprintln!("{}", notice),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 按优先级加载：.env.$PORTAL_ENV 或 .env.local > .env.development > .env
    if let Ok(env) = std::env::var("PORTAL_ENV") {
        dotenv::from_filename(format!(".env.{}", env)).ok();
    } else {
        dotenv::from_filename(".env.local").ok();
        dotenv::from_filename(".env.development").ok();
        dotenv::dotenv().ok();
    }

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    telemetry::init_telemetry(&config);

    let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::open(config.storage.token_path()));
    let api = Arc::new(PortalClient::new(&config.api, store.clone())?);
    let session = Arc::new(SessionManager::new(api, store));
    let provider = SessionProvider::new(session.clone());

    tracing::debug!(base_url = %config.api.base_url, "Client ready");

    match cli.command {
        Commands::Login { username, password } => {
            let password = password.context("Password is required (--password or PORTAL_PASSWORD)")?;
            session.initialize().await;
            match session.login(&Credentials::new(username, password)).await {
                Ok(user) => println!("Logged in as {}", user.display_name()),
                Err(e) => fail(&e),
            }
        }
        Commands::Logout => {
            session.logout();
            println!("Logged out");
        }
        Commands::Whoami => match session.initialize().await {
            SessionState::Authenticated(user) => {
                println!("{} ({})", user.display_name(), user.username);
                if user.is_superuser {
                    println!("role: superuser");
                } else if user.is_staff {
                    println!("role: staff");
                }
            }
            _ => println!("Not logged in"),
        },
        Commands::Register(args) => {
            let profile = registration_profile(args);
            match session.register(&profile).await {
                Ok(created) => {
                    println!("Account created, you can now log in");
                    println!("{}", serde_json::to_string_pretty(&created)?);
                }
                Err(e) => fail(&e),
            }
        }
        Commands::Request { kind } => {
            if !session.initialize().await.is_authenticated() {
                eprintln!("Not logged in");
                std::process::exit(1);
            }
            submit_request(&provider, kind).await?;
        }
    }

    Ok(())
}

async fn submit_request(provider: &SessionProvider, command: RequestCommand) -> anyhow::Result<()> {
    let (kind, device_type, software_name, common) = match command {
        RequestCommand::Device {
            device_type,
            common,
        } => (RequestKind::Device, device_type, None, common),
        RequestCommand::License {
            software_name,
            common,
        } => (RequestKind::License, None, software_name, common),
    };

    let form = RequestForm::open(provider, kind, Arc::new(ConsoleNotifier))?.on_complete(|created| {
        if let Some(id) = created.get("id") {
            println!("Request id: {}", id);
        }
    });

    let RequestArgs {
        purpose,
        justification,
        start_date,
        end_date,
    } = common;

    form.update(|draft| {
        draft.device_type = device_type;
        draft.software_name = software_name;
        draft.purpose = purpose;
        draft.business_justification = justification;
        draft.start_date = start_date;
        draft.end_date = end_date;
    });

    match form.submit().await {
        SubmitOutcome::Submitted(_) => Ok(()),
        SubmitOutcome::Invalid(errors) | SubmitOutcome::Rejected(errors) => {
            for (field, message) in errors.iter() {
                eprintln!("{}: {}", field, message);
            }
            std::process::exit(1);
        }
        SubmitOutcome::Failed(_) | SubmitOutcome::Busy | SubmitOutcome::Discarded => {
            std::process::exit(1);
        }
    }
}

fn registration_profile(args: RegisterArgs) -> RegistrationProfile {
    RegistrationProfile {
        username: args.username,
        email: args.email,
        password: Secret::new(args.password),
        password_confirmation: Secret::new(args.confirm_password),
        first_name: args.first_name,
        last_name: args.last_name,
        department: args.department,
        position: args.position,
        location: args.location,
        employee_id: args.employee_id,
    }
}

/// 打印用户可读的错误并退出
fn fail(e: &ClientError) -> ! {
    eprintln!("{}", e.user_message());
    if let Some(errors) = e.field_errors() {
        for (field, message) in errors.iter() {
            eprintln!("  {}: {}", field, message);
        }
    }
    std::process::exit(1);
}
