use anyhow::Result;
use clap::{CommandFactory, Parser};
use color_eyre::config::HookBuilder;
use tracing_subscriber::EnvFilter;

mod handlers;
mod wizard;

/// sitepilot - deploy static websites to AWS S3
#[derive(Parser, Debug)]
#[command(name = "sitepilot")]
#[command(author = "Kev <kev@m7academy.com>")]
#[command(version)]
#[command(about = "Deploy static websites to S3, with optional Route 53 and CloudFront setup", long_about = None)]
struct Cli {
    /// AWS profile (overrides the configuration file)
    #[arg(long, global = true, env = "AWS_PROFILE")]
    profile: Option<String>,

    /// AWS region (overrides the configuration file)
    #[arg(long, global = true)]
    region: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Initial configuration (interactive wizard)
    Init,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// List all buckets
    ListBuckets,

    /// List the objects of a bucket
    ListBucketObjects {
        /// Bucket name
        bucket: String,
    },

    /// Create a bucket and configure it for website hosting
    SetupBucket {
        /// Bucket name
        bucket: String,
    },

    /// Sync the contents of a directory to a bucket
    Sync {
        /// Local directory to upload
        pathname: String,
        /// Target bucket
        bucket: String,
        /// Show what would be uploaded without uploading
        #[arg(long)]
        dry_run: bool,
    },

    /// Point a domain at the website bucket of the same name
    SetupDomain {
        /// Domain name, also the bucket name
        domain: String,
    },

    /// Find an issued ACM certificate for a domain
    FindCert {
        /// Domain name
        domain: String,
    },

    /// Serve a website bucket through CloudFront on a custom domain
    SetupCdn {
        /// Domain name
        domain: String,
        /// Website bucket
        bucket: String,
    },

    /// Shell completion
    Completion {
        /// Shell type (bash, zsh, fish, elvish, powershell)
        shell: String,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Show the current configuration
    Show,
    /// Validate the configuration file
    Validate,
    /// Print the configuration file path
    Path,
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        "debug".to_string()
    } else {
        sitepilot_core::load_config_or_default()
            .map(|c| c.logging.level)
            .unwrap_or_else(|_| "info".to_string())
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level)),
        )
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup error handling
    if let Err(e) = HookBuilder::default().install() {
        eprintln!("Warning: Failed to install error handler: {}", e);
    }

    // Parse CLI arguments
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let session = handlers::SessionArgs {
        profile: cli.profile,
        region: cli.region,
    };

    // Execute command
    match cli.command {
        Commands::Init => handlers::handle_init().await,
        Commands::Config { action } => {
            let action_str = match action {
                ConfigAction::Show => "show",
                ConfigAction::Validate => "validate",
                ConfigAction::Path => "path",
            };
            handlers::handle_config(action_str).await
        }
        Commands::ListBuckets => handlers::handle_list_buckets(&session).await,
        Commands::ListBucketObjects { bucket } => {
            handlers::handle_list_bucket_objects(&session, &bucket).await
        }
        Commands::SetupBucket { bucket } => handlers::handle_setup_bucket(&session, &bucket).await,
        Commands::Sync {
            pathname,
            bucket,
            dry_run,
        } => handlers::handle_sync(&session, &pathname, &bucket, dry_run).await,
        Commands::SetupDomain { domain } => handlers::handle_setup_domain(&session, &domain).await,
        Commands::FindCert { domain } => handlers::handle_find_cert(&session, &domain).await,
        Commands::SetupCdn { domain, bucket } => {
            handlers::handle_setup_cdn(&session, &domain, &bucket).await
        }
        Commands::Completion { shell } => {
            handlers::handle_completion(&shell, &mut Cli::command()).await
        }
    }
}
