use clap::Parser;
use rtryon::{
    logger::{self, LogLevel, LoggerConfig},
    upload, Config, EncodedImage, ResultView, TryOnClient, TryOnSession,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "rtryon", version, about = "Try on clothes virtually before you buy")]
struct Cli {
    /// Photo of the person.
    #[arg(long)]
    person: PathBuf,

    /// Photo of the garment.
    #[arg(long)]
    clothing: PathBuf,

    /// Where to write the generated PNG. Defaults to `tryon_<timestamp>.png`.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Model id, overrides `TRYON_MODEL`.
    #[arg(long)]
    model: Option<String>,

    /// Log level, overrides `LOG_LEVEL`.
    #[arg(long)]
    log_level: Option<LogLevel>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let mut config = Config::from_env()?;
    if let Some(model) = cli.model {
        config.gemini = config.gemini.with_model(model);
    }
    if let Some(level) = cli.log_level {
        config = config.with_log_level(level);
    }
    if cli.json_logs {
        config = config.with_json_logs(true);
    }

    let logger_config = LoggerConfig::default()
        .with_level(config.log_level)
        .with_colors(!config.json_logs)
        .with_json_output(config.json_logs);
    logger::init_with_config(logger_config)?;

    if dotenv_loaded {
        log::debug!("✅ .env file loaded");
    }
    logger::log_config_info(&config);

    let client = TryOnClient::new(&config.gemini)?;
    let (person, clothing) = upload::load_pair(&cli.person, &cli.clothing).await?;

    let mut session = TryOnSession::new();
    session.set_person_image(Some(person));
    session.set_clothing_image(Some(clothing));

    log::info!("🔄 Processing... This might take a moment.");
    session.generate(&client).await?;

    match session.view() {
        ResultView::Image { data_url, text } => {
            let out = cli.out.unwrap_or_else(|| {
                PathBuf::from(format!("tryon_{}.png", chrono::Utc::now().timestamp()))
            });
            let image = EncodedImage::from_data_url(data_url)?;
            upload::save_image(&image, &out).await?;

            println!("{}", out.display());
            if let Some(text) = text {
                println!("{}", text);
            }
            Ok(())
        }
        ResultView::Error(message) => Err(message.into()),
        ResultView::Loading | ResultView::Idle => {
            Err("Select your images and run the virtual try-on again.".into())
        }
    }
}
