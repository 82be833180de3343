use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};

use post_review::config::ServerConfig;
use post_review::feedback::{FeedbackEvaluator, FeedbackGenerator, GeneratorConfig};
use post_review::llm::{LlmConfig, create_provider};
use post_review::mail::{MailConfig, MailDispatcher, SmtpDispatcher};
use post_review::webhook::{ReviewHandler, WebhookState, webhook_routes};

#[derive(Parser)]
#[command(name = "post-review", version, about = "Editorial feedback emails for posts tagged #review")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the webhook server (default).
    Serve,
    /// Evaluate a feedback email read from FILE ("-" for stdin).
    Evaluate {
        file: PathBuf,
    },
    /// Generate feedback for an article, then evaluate it. Sends nothing.
    Preview {
        #[arg(long)]
        author: String,
        #[arg(long)]
        title: String,
        /// Plain-text article ("-" for stdin).
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve().await,
        Command::Evaluate { file } => evaluate(&file).await,
        Command::Preview {
            author,
            title,
            file,
        } => preview(&author, &title, &file).await,
    }
}

async fn serve() -> Result<(), Box<dyn std::error::Error>> {
    let server_config = ServerConfig::from_env()?;
    let llm_config = LlmConfig::from_env()?;
    let mail_config = MailConfig::from_env()?;

    eprintln!("📝 post-review v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", llm_config.model);
    eprintln!(
        "   SMTP: {}:{} as {}",
        mail_config.smtp_host, mail_config.smtp_port, mail_config.from_address
    );
    eprintln!(
        "   Webhook: http://{}/post_tagged\n",
        server_config.socket_addr()
    );

    let llm = create_provider(&llm_config)?;
    let generator = Arc::new(FeedbackGenerator::new(llm, generator_config(&llm_config)));
    let dispatcher: Arc<dyn MailDispatcher> = Arc::new(SmtpDispatcher::new(mail_config));
    let state = WebhookState {
        handler: Arc::new(ReviewHandler::new(generator, dispatcher)),
    };

    let listener = tokio::net::TcpListener::bind(server_config.socket_addr()).await?;
    tracing::info!(addr = %server_config.socket_addr(), "Webhook server started");
    axum::serve(listener, webhook_routes(state)).await?;
    Ok(())
}

async fn evaluate(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let llm_config = LlmConfig::from_env()?;
    let email = read_input(file)?;

    let evaluator = FeedbackEvaluator::new(create_provider(&llm_config)?, llm_config.temperature);
    let report = evaluator.evaluate(&email).await?;
    println!("{report}");
    Ok(())
}

async fn preview(author: &str, title: &str, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let llm_config = LlmConfig::from_env()?;
    let article = read_input(file)?;
    let llm = create_provider(&llm_config)?;

    let generator = FeedbackGenerator::new(llm.clone(), generator_config(&llm_config));
    let feedback = generator.generate(author, &article, title).await?;
    println!("Subject: {}\n\n{}", feedback.subject, feedback.body);
    println!("{}", "#".repeat(27));

    let evaluator = FeedbackEvaluator::new(llm, llm_config.temperature);
    let report = evaluator.evaluate(&feedback.body).await?;
    println!("{report}");
    Ok(())
}

fn generator_config(llm_config: &LlmConfig) -> GeneratorConfig {
    GeneratorConfig {
        temperature: llm_config.temperature,
        max_tokens: llm_config.max_tokens,
    }
}

fn read_input(path: &Path) -> std::io::Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
    }
}
