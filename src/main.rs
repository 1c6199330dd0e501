use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use resultgate::application::dashboard::Dashboard;
use resultgate::application::momo::MomoCheckout;
use resultgate::application::single::{self, SingleCheckout};
use resultgate::config::{AppConfig, load_config};
use resultgate::domain::auth::AdminSession;
use resultgate::domain::catalog::AccessCredentials;
use resultgate::domain::network::{self, Network, NetworkInfo};
use resultgate::domain::ports::{AdminApi, PricingProvider};
use resultgate::domain::session::PaymentSuccess;
use resultgate::error::GateError;
use resultgate::guard::SubmitGuard;
use resultgate::infrastructure::http_admin::HttpAdminClient;
use resultgate::infrastructure::mock::{MockBackend, MockMomoGateway};
use resultgate::interfaces::csv::pin_reader::PinReader;
use serde::Serialize;
use serde_json::Value;
use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect the mobile-money network of a phone number
    Detect { phone: String },
    /// List single-check prices
    Pricing,
    /// List bulk discount tiers
    BulkPricing,
    /// Pay for an exam checker with mobile money
    Pay {
        #[arg(long)]
        exam: String,
        #[arg(long)]
        phone: String,
        /// Buy a checker for this index number after the payment is approved
        #[arg(long)]
        index: Option<String>,
    },
    /// Check results with a PIN/Serial pair
    Results {
        #[arg(long)]
        index: String,
        #[arg(long)]
        pin: String,
        #[arg(long)]
        serial: String,
    },
    /// Show order history and dashboard stats
    Orders,
    /// Validate a PIN inventory CSV without uploading it
    ValidatePins { input: PathBuf },
    /// Admin API operations
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
}

#[derive(Subcommand)]
enum AdminCommand {
    Login {
        #[arg(long)]
        password: String,
    },
    Stats {
        #[arg(long)]
        token: String,
    },
    Pins {
        #[arg(long)]
        token: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Import {
        #[arg(long)]
        token: String,
        input: PathBuf,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Detection {
    number: String,
    formatted: String,
    network: Option<Network>,
    info: Option<NetworkInfo>,
}

#[derive(Serialize)]
struct PayOutcome {
    payment: PaymentSuccess,
    currency: String,
    credentials: Option<AccessCredentials>,
}

#[derive(Serialize)]
struct LoginOutcome<'a> {
    token: &'a str,
}

#[derive(Serialize)]
struct ImportOutcome {
    rows: usize,
    message: String,
}

fn to_json<T: Serialize>(value: &T) -> resultgate::error::Result<Value> {
    Ok(serde_json::to_value(value)?)
}

async fn pay(
    config: &AppConfig,
    exam_id: &str,
    phone: &str,
    index: Option<&str>,
) -> resultgate::error::Result<PayOutcome> {
    let backend = Arc::new(MockBackend::new(config.mock));
    let mut checkout = SingleCheckout::new(
        backend.clone(),
        backend.clone(),
        backend,
        SubmitGuard::new(config.guards.submit_interval()),
    );
    checkout.load_pricing().await?;
    let exam = checkout.select_exam(exam_id)?.clone();

    let gateway = Arc::new(MockMomoGateway::new(config.mock.momo_initiate_ms));
    let mut momo = MomoCheckout::new(
        exam.price,
        exam.name.clone(),
        gateway,
        config.momo.prompt_delay(),
    );
    let close = momo.close_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            close.close();
        }
    });

    momo.open()?;
    momo.input(phone)?;
    momo.proceed()?;
    momo.confirm().await?;
    let payment = momo.approve()?;

    let credentials = match index {
        Some(index) => {
            let mut form = single::checkout_form();
            form.change(single::INDEX_NUMBER, index);
            form.change(single::PHONE, phone);
            checkout.checkout(&mut form).await?
        }
        None => None,
    };
    Ok(PayOutcome {
        payment,
        currency: config.momo.currency.clone(),
        credentials,
    })
}

async fn admin(config: &AppConfig, command: AdminCommand) -> resultgate::error::Result<Value> {
    let client = HttpAdminClient::new(&config.admin)?;
    match command {
        AdminCommand::Login { password } => {
            let session = client.login(&password).await?;
            to_json(&LoginOutcome {
                token: session.token(),
            })
        }
        AdminCommand::Stats { token } => client.stats(&AdminSession::new(token)).await,
        AdminCommand::Pins { token, page } => {
            to_json(&client.pins(&AdminSession::new(token), page).await?)
        }
        AdminCommand::Import { token, input } => {
            let report = PinReader::new(File::open(&input)?).report();
            if let Some(first) = report.rejected.first() {
                return Err(GateError::ValidationError(format!(
                    "{} invalid rows, first at line {}: {}",
                    report.rejected.len(),
                    first.line,
                    first.message
                )));
            }
            let file_name = input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "pins.csv".to_string());
            let summary = client
                .import_pins(&AdminSession::new(token), &file_name, fs::read(&input)?)
                .await?;
            to_json(&ImportOutcome {
                rows: report.valid.len(),
                message: summary.message,
            })
        }
    }
}

async fn run(config: AppConfig, command: Command) -> resultgate::error::Result<Value> {
    let backend = MockBackend::new(config.mock);
    match command {
        Command::Detect { phone } => {
            let detected = network::detect_network(&phone);
            to_json(&Detection {
                number: network::digits(&phone),
                formatted: network::format_phone_number(&phone),
                network: detected,
                info: detected.map(Network::info),
            })
        }
        Command::Pricing => to_json(&backend.exam_pricing().await?),
        Command::BulkPricing => to_json(&backend.bulk_pricing().await?),
        Command::Pay { exam, phone, index } => {
            to_json(&pay(&config, &exam, &phone, index.as_deref()).await?)
        }
        Command::Results { index, pin, serial } => {
            to_json(&single::lookup_results(&backend, &index, &pin, &serial).await?)
        }
        Command::Orders => to_json(&Dashboard::new(Arc::new(backend)).overview().await?),
        Command::ValidatePins { input } => to_json(&PinReader::new(File::open(input)?).report()),
        Command::Admin { command } => admin(&config, command).await,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("resultgate=info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = match &cli.config {
        Some(path) => load_config(path).into_diagnostic()?,
        None => AppConfig::default(),
    };

    let output = run(config, cli.command)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "command failed"))
        .into_diagnostic()?;
    let rendered = serde_json::to_string_pretty(&output).into_diagnostic()?;
    println!("{rendered}");
    Ok(())
}
