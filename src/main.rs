// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use indicatif::{ProgressBar, ProgressStyle};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, debug, error, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pagewai::app_config::{self, Config, DEFAULT_CONFIG_FILE, TranslationConfig};
use pagewai::job::{ChannelSink, JobController, JobEvent, JobOutcome};
use pagewai::page::Document;
use pagewai::providers::mock::MockTranslator;
use pagewai::providers::{EndpointKind, Translator};
use pagewai::translation::TranslationClient;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate the text of an HTML page
    Translate(TranslateArgs),

    /// Translate a short piece of text and print it
    Selection(SelectionArgs),

    /// Check that the configured endpoint is reachable
    Check(EndpointArgs),

    /// Generate shell completions for pagewai
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Settings shared by every command that talks to an endpoint
#[derive(Args, Debug, Clone)]
struct EndpointArgs {
    /// Base URL of the LLM endpoint
    #[arg(short = 'u', long, env = "PAGEWAI_LLM_URL")]
    llm_url: Option<String>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Target language name or ISO code (e.g., 'Spanish', 'es', 'fra')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Args, Debug)]
struct TranslateArgs {
    /// HTML file to translate
    #[arg(value_name = "INPUT_FILE")]
    input_file: PathBuf,

    /// Output file (defaults to <name>.<language>.html next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of text elements per request
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Use a scripted translator instead of calling the endpoint
    #[arg(long)]
    dry_run: bool,

    /// Restore the original text if the job fails or is stopped
    #[arg(long)]
    revert_on_failure: bool,

    #[command(flatten)]
    endpoint: EndpointArgs,
}

#[derive(Args, Debug)]
struct SelectionArgs {
    /// Text to translate
    #[arg(value_name = "TEXT")]
    text: String,

    #[command(flatten)]
    endpoint: EndpointArgs,
}

/// PageWAI - Page translation With AI
///
/// Translates the visible text of HTML pages with a local or remote LLM.
#[derive(Parser, Debug)]
#[command(name = "pagewai")]
#[command(version)]
#[command(about = "LLM-powered web page translation tool")]
#[command(long_about = "PageWAI translates the text of HTML pages in place using an LLM endpoint.

EXAMPLES:
    pagewai translate page.html                      # Translate using default config
    pagewai translate -t fr page.html                # Translate to French
    pagewai translate --dry-run page.html            # Exercise the pipeline without an endpoint
    pagewai selection -t German \"Good morning\"       # Translate a short text
    pagewai check -u http://localhost:1234           # Test an OpenAI-compatible server
    pagewai completions bash > pagewai.bash          # Generate bash completions

CONFIGURATION:
    Configuration is stored in pagewai.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

ENDPOINTS:
    URLs on localhost:11434 or mentioning 'ollama' use the Ollama generate API.
    Any other URL is treated as an OpenAI-compatible chat-completion server.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        // log::set_max_level is the effective filter once the config is loaded
        metadata.level() <= self.level.max(log::max_level())
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "pagewai", &mut std::io::stdout());
            Ok(())
        }
        Commands::Translate(args) => run_translate(args).await,
        Commands::Selection(args) => run_selection(args).await,
        Commands::Check(args) => run_check(args).await,
    }
}

/// Load the config file, apply command line overrides and validate
fn load_config(options: &EndpointArgs) -> Result<Config> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&options.config_path)?;

    if let Some(llm_url) = &options.llm_url {
        config.llm_url = llm_url.clone();
    }
    if let Some(model) = &options.model {
        config.model = model.clone();
    }
    if let Some(target_language) = &options.target_language {
        config.target_language = target_language.clone();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;

    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    Ok(config)
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    let mut config = load_config(&options.endpoint)?;
    if let Some(batch_size) = options.batch_size {
        if batch_size == 0 {
            return Err(anyhow!("Batch size must be at least 1"));
        }
        config.batch_size = batch_size;
    }
    let translation_config = config.translation_config()?;

    if !options.input_file.is_file() {
        return Err(anyhow!("Input file does not exist: {:?}", options.input_file));
    }
    let output_file = match &options.output {
        Some(path) => path.clone(),
        None => default_output_path(&options.input_file, &translation_config.target_language_name)?,
    };
    if output_file.exists() && !options.force_overwrite {
        return Err(anyhow!(
            "Output file already exists: {:?}. Use -f to force overwrite.",
            output_file
        ));
    }

    let html = std::fs::read_to_string(&options.input_file)
        .context(format!("Failed to read input file: {:?}", options.input_file))?;
    let document = Document::parse_html(&html);

    let translator: Arc<dyn Translator> = if options.dry_run {
        info!("Dry run: using the scripted translator");
        Arc::new(MockTranslator::working())
    } else {
        Arc::new(TranslationClient::new(config.client.settings()))
    };

    info!(
        "PageWAI: {} - {} -> {}",
        EndpointKind::detect(&translation_config.endpoint_url).display_name(),
        translation_config.model_name,
        translation_config.target_language_name
    );

    let (sink, mut events) = ChannelSink::channel();
    let controller = Arc::new(
        JobController::with_sink(translator, document, Arc::new(sink)).with_batch_size(config.batch_size),
    );

    let job = {
        let controller = Arc::clone(&controller);
        let translation_config = translation_config.clone();
        tokio::spawn(async move { controller.start(&translation_config).await })
    };

    let interrupt = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, stopping after the current batch");
                controller.abort();
            }
        })
    };

    let progress_bar = ProgressBar::new(100);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress_bar.set_style(style.progress_chars("#>-"));

    while let Some(message) = events.recv().await {
        debug!("Job {} event {}: {:?}", message.job_id, message.sequence, message.event);
        match &message.event {
            JobEvent::Progress { percent, message: text } => {
                progress_bar.set_position(u64::from(*percent));
                progress_bar.set_message(text.clone());
            }
            JobEvent::Complete { percent } => {
                progress_bar.set_position(u64::from(*percent));
                progress_bar.finish_with_message("Translation complete");
            }
            JobEvent::Error { message: text } => {
                progress_bar.abandon_with_message(text.clone());
            }
        }
        if message.event.is_terminal() {
            break;
        }
    }

    let outcome = job.await.context("Translation job panicked")?;
    interrupt.abort();

    match &outcome {
        JobOutcome::Completed => {}
        JobOutcome::Ignored => return Err(anyhow!("A translation job is already running")),
        JobOutcome::Failed(message) if controller.with_page(|page| page.undo.is_empty()) => {
            return Err(anyhow!("Translation failed: {}", message));
        }
        JobOutcome::Failed(_) | JobOutcome::Aborted => {
            if options.revert_on_failure {
                controller.revert();
            }
        }
    }

    let translated_nodes = controller.with_page(|page| page.undo.entry_count());
    std::fs::write(&output_file, controller.document_html())
        .context(format!("Failed to write output file: {:?}", output_file))?;

    match outcome {
        JobOutcome::Completed => {
            info!("Success: {:?} ({} text nodes translated)", output_file, translated_nodes);
            Ok(())
        }
        JobOutcome::Aborted => {
            warn!("Translation stopped; partial result written to {:?}", output_file);
            Ok(())
        }
        JobOutcome::Failed(message) => {
            error!("Translation failed: {}", message);
            Err(anyhow!("Translation failed: {}", message))
        }
        JobOutcome::Ignored => Ok(()),
    }
}

/// `<stem>.<language>.html` next to `input`
fn default_output_path(input: &Path, language: &str) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .ok_or_else(|| anyhow!("Input path has no file name: {:?}", input))?
        .to_string_lossy();
    let language_tag: String = language
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect();
    let file_name = format!("{}.{}.html", stem, language_tag);
    Ok(input.parent().unwrap_or(Path::new(".")).join(file_name))
}

async fn run_selection(options: SelectionArgs) -> Result<()> {
    let config = load_config(&options.endpoint)?;
    let translation_config: TranslationConfig = config.translation_config()?;
    let client = TranslationClient::new(config.client.settings());

    let translated = client
        .translate_selection(&options.text, &translation_config)
        .await
        .map_err(|e| anyhow!("{}", e))?;
    println!("{}", translated);
    Ok(())
}

async fn run_check(options: EndpointArgs) -> Result<()> {
    let config = load_config(&options)?;
    let translation_config = config.translation_config()?;
    let client = TranslationClient::new(config.client.settings());
    let kind = EndpointKind::detect(&translation_config.endpoint_url);

    match client.test_connection(&translation_config).await {
        Ok(()) => {
            info!(
                "Connected to {} endpoint at {}",
                kind.display_name(),
                translation_config.endpoint_url
            );
            Ok(())
        }
        Err(e) => {
            error!("Connection check failed: {}", e);
            Err(anyhow!("Connection check failed: {}", e))
        }
    }
}
