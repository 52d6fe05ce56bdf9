use clap::Parser;
use miette::{IntoDiagnostic, Result, miette};
use payform::application::form::PaymentForm;
use payform::application::loader::SdkLoader;
use payform::config::{Environment, FormOptions, SdkCredentials};
use payform::domain::payment::{PaymentConfig, parse_metadata_entry};
use payform::domain::sdk_error::SdkError;
use payform::domain::state::FormState;
use payform::infrastructure::simulated::SimulatedPayments;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Runs one checkout through the payment form against the simulated provider.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Amount to charge, in minor currency units (e.g. cents)
    #[arg(long)]
    amount: i64,

    /// Currency code
    #[arg(long, default_value = "USD")]
    currency: String,

    /// Metadata entry as key=value. May be repeated.
    #[arg(long = "metadata", value_parser = parse_metadata_entry)]
    metadata: Vec<(String, String)>,

    #[arg(long, env = "SQUARE_APPLICATION_ID", default_value = "")]
    application_id: String,

    #[arg(long, env = "SQUARE_LOCATION_ID", default_value = "")]
    location_id: String,

    #[arg(long, env = "SQUARE_ENVIRONMENT", default_value = "sandbox")]
    environment: Environment,

    /// Token the simulated card yields. An empty value yields no token.
    #[arg(long)]
    card_token: Option<String>,

    /// Make the simulated tokenize call fail with this message
    #[arg(long)]
    decline: Option<String>,

    /// Simulate a missing mount surface
    #[arg(long)]
    attach_missing: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = PaymentConfig::new(cli.amount, &cli.currency).into_diagnostic()?;
    for (key, value) in cli.metadata {
        config = config.with_metadata(key, value);
    }

    let mut sdk = SimulatedPayments::new();
    if cli.attach_missing {
        sdk = sdk.without_surfaces();
    }
    if let Some(message) = cli.decline {
        sdk = sdk.fail_tokenize(SdkError::new(message));
    } else if let Some(token) = cli.card_token {
        sdk = if token.is_empty() {
            sdk.tokenize_empty()
        } else {
            sdk.tokenize_token(&token)
        };
    }

    let credentials = SdkCredentials::new(cli.application_id, cli.location_id)
        .with_environment(cli.environment);
    let loader = SdkLoader::global(|| SdkLoader::new(Box::new(sdk), credentials));

    let (tx, mut rx) = mpsc::unbounded_channel();
    let form = PaymentForm::new(config, loader, FormOptions::default(), move |result| {
        // The receiver outlives the form.
        let _ = tx.send(result);
    });

    if let FormState::ErroredUnrecoverable { message } = form.initialize().await {
        form.unmount().await;
        return Err(miette!("{message}"));
    }

    form.submit().await;
    let result = rx
        .recv()
        .await
        .ok_or_else(|| miette!("payment form produced no result"))?;
    form.unmount().await;

    println!("{}", serde_json::to_string(&result).into_diagnostic()?);

    Ok(())
}

