use miette::Result;
use registrar::{
    config::{self, Config},
    content::ContentClient,
    discord::run_bot,
    store::ClassStore,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    // Load environment variables
    config::load_dotenv();

    // Load configuration
    let config = Config::load()?;
    config.validate()?;
    info!("Loaded configuration");

    // Connect the class record store
    let store = ClassStore::connect(&config.redis.url).await?;
    info!("Record store connected");

    let content = ContentClient::new();

    // Run Discord bot
    run_bot(config, store, content).await?;

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "registrar=debug,serenity=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();
}
