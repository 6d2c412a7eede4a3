//! The `iris analyze` command: one image, one request, one reply.

use clap::{Args, ValueEnum};
use iris_core::output::{self, OutputFormat as CoreOutputFormat};
use iris_core::{AnalyzeOptions, Analyzer, Config, ConfigError, GeminiProvider, MediaType};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Supported output formats.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// The model's reply as plain text
    Text,
    /// The full analysis record as JSON
    Json,
}

impl From<OutputFormat> for CoreOutputFormat {
    fn from(value: OutputFormat) -> Self {
        match value {
            OutputFormat::Text => CoreOutputFormat::Text,
            OutputFormat::Json => CoreOutputFormat::Json,
        }
    }
}

/// Arguments for the `analyze` command.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Image file to analyse
    #[arg(default_value = "2.png")]
    pub image: PathBuf,

    /// Prompt sent with the image (overrides config)
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Model name (overrides config)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Declared media type, e.g. image/png (sniffed from the file when omitted)
    #[arg(long, value_parser = parse_media_type)]
    pub media_type: Option<MediaType>,

    /// Output format (overrides config)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Maximum tokens to generate
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Sampling temperature (0.0 - 2.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// API base URL (overrides config)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

fn parse_media_type(s: &str) -> Result<MediaType, String> {
    MediaType::parse(s).ok_or_else(|| {
        format!("unsupported media type '{s}' (expected image/jpeg, image/png, image/webp, image/heic or image/heif)")
    })
}

/// Apply CLI overrides on top of the loaded config and re-validate.
fn apply_overrides(config: &mut Config, args: &AnalyzeArgs) -> anyhow::Result<()> {
    if let Some(ref prompt) = args.prompt {
        config.request.prompt = prompt.clone();
    }
    if args.max_tokens.is_some() {
        config.request.max_tokens = args.max_tokens;
    }
    if args.temperature.is_some() {
        config.request.temperature = args.temperature;
    }
    if let Some(ref endpoint) = args.endpoint {
        config.llm.gemini.endpoint = endpoint.clone();
    }
    if let Some(ref model) = args.model {
        config.llm.gemini.model = model.clone();
    }
    if let Some(format) = args.format {
        config.output.format = match format {
            OutputFormat::Text => "text".to_string(),
            OutputFormat::Json => "json".to_string(),
        };
    }
    if args.pretty {
        config.output.pretty = true;
    }
    config.validate()?;
    Ok(())
}

/// Execute the analyze command.
pub async fn execute(
    args: AnalyzeArgs,
    loaded: Result<Config, ConfigError>,
) -> anyhow::Result<()> {
    let mut config = loaded?;
    apply_overrides(&mut config, &args)?;

    let timeout = Duration::from_millis(config.limits.request_timeout_ms);
    let provider =
        GeminiProvider::from_config(&config.llm.gemini, None, args.api_key.as_deref(), timeout)?;
    tracing::debug!("Using model {}", provider.model());

    let mut options = AnalyzeOptions::from_config(&config);
    options.media_type = args.media_type;
    let analyzer = Analyzer::new(Box::new(provider), options);

    let spinner = create_spinner(&args.image);
    let result = analyzer.analyze(&args.image).await;
    spinner.finish_and_clear();
    let analysis = result?;

    let format = CoreOutputFormat::parse(&config.output.format).unwrap_or_default();
    let stdout = std::io::stdout();
    output::write(&mut stdout.lock(), &analysis, format, config.output.pretty)?;

    Ok(())
}

/// Spinner on stderr while the request is in flight. Hidden when stderr
/// is not a terminal.
fn create_spinner(image: &Path) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("Analyzing {}", image.display()));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
