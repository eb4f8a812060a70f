//! Command handlers for sitepilot CLI

use crate::wizard::run_init_wizard;
use anyhow::{Context, Result};
use clap::Command;
use clap_complete::{generate, Shell as ClapShell};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use sitepilot_core::{
    get_config_path, get_endpoint, load_config, load_config_or_default, load_sdk_config,
    region_name, validate_config, website_url, BucketCreation, BucketManager, CertificateManager,
    ConfigFile, DeployWait, DistributionManager, DomainManager, S3Client, SdkConfig, SyncAction,
    SyncEngine, SyncOptions,
};
use std::path::Path;
use std::time::Duration;
use tabled::{Table, Tabled};
use tracing::debug;

/// Profile/region given on the command line
#[derive(Debug, Clone, Default)]
pub struct SessionArgs {
    pub profile: Option<String>,
    pub region: Option<String>,
}

/// Loaded configuration plus the AWS session built from it
struct AppContext {
    config: ConfigFile,
    sdk_config: SdkConfig,
}

impl AppContext {
    async fn load(args: &SessionArgs) -> Result<Self> {
        let config = load_config_or_default()?;
        validate_config(&config)?;

        let options = config.session_options(args.profile.clone(), args.region.clone());
        debug!(profile = ?options.profile, region = ?options.region, "Loading AWS session");
        let sdk_config = load_sdk_config(&options).await;

        Ok(Self { config, sdk_config })
    }

    fn region(&self) -> Result<String> {
        region_name(&self.sdk_config).ok_or_else(|| {
            anyhow::anyhow!(
                "No AWS region configured.\n\
                 Pass --region, set 'region' under [aws] in your configuration, or set AWS_REGION."
            )
        })
    }

    fn bucket_manager(&self) -> BucketManager<S3Client> {
        BucketManager::new(S3Client::new(&self.sdk_config))
    }
}

/// Handle init command
pub async fn handle_init() -> Result<()> {
    run_init_wizard().await
}

/// Handle config commands
pub async fn handle_config(action: &str) -> Result<()> {
    match action {
        "show" => {
            let config = load_config_or_default()?;

            println!("Current configuration:");
            println!();
            println!("AWS:");
            println!("  Profile: {}", config.aws.profile.as_deref().unwrap_or("(default chain)"));
            println!("  Region: {}", config.aws.region.as_deref().unwrap_or("(default chain)"));
            println!();
            println!("Transfer:");
            println!("  Chunk size: {} MiB", config.transfer.chunk_size_mb);
            println!();
            println!("Website:");
            println!("  Index document: {}", config.website.index_document);
            println!("  Error document: {}", config.website.error_document);
            println!();
            println!("Logging:");
            println!("  Level: {}", config.logging.level);

            Ok(())
        }
        "validate" => {
            println!("Validating configuration...");

            let config = load_config()?;
            validate_config(&config)?;
            println!("  ✅ Valid configuration");

            Ok(())
        }
        "path" => {
            println!("{}", get_config_path()?.display());
            Ok(())
        }
        _ => {
            println!("Unknown action: {}", action);
            println!("Available actions: show, validate, path");
            Ok(())
        }
    }
}

/// Handle list-buckets command
pub async fn handle_list_buckets(args: &SessionArgs) -> Result<()> {
    let ctx = AppContext::load(args).await?;
    let buckets = ctx.bucket_manager().all_buckets().await?;

    if buckets.is_empty() {
        println!("  No buckets found");
        return Ok(());
    }

    #[derive(Tabled)]
    struct BucketRow {
        name: String,
        created: String,
    }

    let rows: Vec<BucketRow> = buckets
        .iter()
        .map(|b| BucketRow {
            name: b.name.clone(),
            created: b.creation_date.as_deref().map(format_date).unwrap_or_default(),
        })
        .collect();

    println!("{}", Table::new(rows));
    Ok(())
}

/// Handle list-bucket-objects command
pub async fn handle_list_bucket_objects(args: &SessionArgs, bucket: &str) -> Result<()> {
    let ctx = AppContext::load(args).await?;
    let objects = ctx.bucket_manager().all_objects(bucket).await?;

    if objects.is_empty() {
        println!("  Empty bucket");
        return Ok(());
    }

    #[derive(Tabled)]
    struct ObjectRow {
        key: String,
        size: String,
        modified: String,
        etag: String,
    }

    let rows: Vec<ObjectRow> = objects
        .iter()
        .map(|o| ObjectRow {
            key: o.key.clone(),
            size: format_bytes(o.size),
            modified: o.last_modified.as_deref().map(format_date).unwrap_or_default(),
            etag: o.etag.trim_matches('"').to_string(),
        })
        .collect();

    println!("{}", Table::new(rows));
    println!();
    println!("{} objects", objects.len());
    Ok(())
}

/// Handle setup-bucket command
pub async fn handle_setup_bucket(args: &SessionArgs, bucket: &str) -> Result<()> {
    let ctx = AppContext::load(args).await?;
    let region = ctx.region()?;
    let manager = ctx.bucket_manager();

    println!("Setting up bucket '{}' in {}...", bucket, region);

    match manager.init_bucket(bucket, &region).await? {
        BucketCreation::Created => println!("  ✅ Bucket created"),
        BucketCreation::AlreadyOwned => println!("  ✅ Bucket already exists (owned by you)"),
    }

    manager.set_policy(bucket).await?;
    println!("  ✅ Public read policy applied");

    let documents = ctx.config.website_documents();
    manager.configure_website(bucket, &documents).await?;
    println!(
        "  ✅ Website hosting enabled (index: {}, error: {})",
        documents.index_document, documents.error_document
    );

    match website_url(bucket, &region) {
        Ok(url) => println!("  URL: {}", url),
        Err(_) => println!("  ⚠️  No known website endpoint for region {}", region),
    }

    Ok(())
}

/// Handle sync command
pub async fn handle_sync(
    args: &SessionArgs,
    pathname: &str,
    bucket: &str,
    dry_run: bool,
) -> Result<()> {
    let path = Path::new(pathname);
    if !path.exists() {
        return Err(anyhow::anyhow!("Path not found: {}", pathname));
    }

    let ctx = AppContext::load(args).await?;
    let options = SyncOptions {
        transfer: ctx.config.multipart()?,
        dry_run,
    };
    let manager = ctx.bucket_manager();

    println!(
        "Syncing {} -> s3://{}{}",
        pathname,
        bucket,
        if dry_run { " (dry run)" } else { "" }
    );

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message("Loading remote manifest...");

    let engine = SyncEngine::new(manager.client(), options);
    let result = engine
        .sync_with(path, bucket, |event| {
            let line = match event.action {
                SyncAction::Uploaded => format!("  ⬆️  {} ({})", event.key, format_bytes(event.size as i64)),
                SyncAction::WouldUpload => format!(
                    "  📝 {} ({}) {}",
                    event.key,
                    format_bytes(event.size as i64),
                    style("would upload").yellow()
                ),
                SyncAction::Skipped => style(format!("  ⏭️  {} unchanged", event.key)).dim().to_string(),
            };
            pb.println(line);
            pb.set_message(event.key.to_string());
        })
        .await;
    pb.finish_and_clear();

    let report = result.with_context(|| format!("Sync of {} to {} aborted", pathname, bucket))?;

    println!();
    if report.dry_run {
        println!(
            "  ✅ Dry run: {} to upload ({}), {} unchanged",
            report.uploaded.len(),
            format_bytes(report.bytes_uploaded as i64),
            report.skipped.len()
        );
    } else {
        println!(
            "  ✅ Sync complete: {} uploaded ({}), {} unchanged",
            report.uploaded.len(),
            format_bytes(report.bytes_uploaded as i64),
            report.skipped.len()
        );
    }

    Ok(())
}

/// Handle setup-domain command
pub async fn handle_setup_domain(args: &SessionArgs, domain: &str) -> Result<()> {
    let ctx = AppContext::load(args).await?;
    let manager = ctx.bucket_manager();

    println!("Pointing {} at bucket '{}'...", domain, domain);

    let region = manager.get_region(domain).await?;
    let endpoint = get_endpoint(&region)?;
    println!("  Bucket region: {} ({})", region, endpoint.name);

    let domains = DomainManager::new(&ctx.sdk_config);
    let zone = domains.find_or_create_hosted_zone(domain).await?;
    println!("  Hosted zone: {} ({})", zone.name, zone.id);

    domains.create_s3_domain_record(&zone, domain, endpoint).await?;
    println!("  ✅ Alias record upserted");
    println!("  URL: http://{}", domain);

    Ok(())
}

/// Handle find-cert command
pub async fn handle_find_cert(args: &SessionArgs, domain: &str) -> Result<()> {
    let ctx = AppContext::load(args).await?;
    let certificates = CertificateManager::new(&ctx.sdk_config);

    println!("Searching issued certificates for {}...", domain);

    match certificates.find_matching_cert(domain).await? {
        Some(cert) => {
            println!("  ✅ Found certificate");
            println!("  ARN: {}", cert.arn);
            println!("  Names: {}", cert.subject_alternative_names.join(", "));
        }
        None => println!("  {}", style("No matching certificate found").yellow()),
    }

    Ok(())
}

/// Handle setup-cdn command
pub async fn handle_setup_cdn(args: &SessionArgs, domain: &str, bucket: &str) -> Result<()> {
    let ctx = AppContext::load(args).await?;

    println!("Setting up CloudFront for {} (bucket '{}')...", domain, bucket);

    let distributions = DistributionManager::new(&ctx.sdk_config);
    let distribution = match distributions.find_matching_dist(domain).await? {
        Some(dist) => {
            println!("  ✅ Existing distribution {} ({})", dist.id, dist.domain_name);
            dist
        }
        None => {
            let cert = CertificateManager::new(&ctx.sdk_config)
                .find_matching_cert(domain)
                .await?
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "No issued certificate covers {}.\n\
                         Request one in ACM (us-east-1) and run this command again.",
                        domain
                    )
                })?;
            println!("  Certificate: {}", cert.arn);

            let region = ctx.bucket_manager().get_region(bucket).await?;
            let origin_host = format!("{}.{}", bucket, get_endpoint(&region)?.host);

            let dist = distributions.create_dist(domain, &origin_host, &cert).await?;
            println!("  ✅ Distribution created: {} ({})", dist.id, dist.domain_name);
            dist
        }
    };

    if !distribution.is_deployed() {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
        pb.enable_steady_tick(Duration::from_millis(120));
        pb.set_message("Waiting for distribution to deploy (this can take a while)...");
        let waited = distributions.await_deploy(&distribution, DeployWait::default()).await;
        pb.finish_and_clear();
        waited?;
        println!("  ✅ Distribution deployed");
    }

    let domains = DomainManager::new(&ctx.sdk_config);
    let zone = domains.find_or_create_hosted_zone(domain).await?;
    domains
        .create_cf_domain_record(&zone, domain, &distribution.domain_name)
        .await?;
    println!("  ✅ Alias record upserted in {}", zone.name);
    println!("  URL: https://{}", domain);

    Ok(())
}

/// Format ISO date string to readable format
fn format_date(iso_date: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(iso_date) {
        Ok(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => iso_date.to_string(),
    }
}

/// Format bytes to human-readable size
fn format_bytes(bytes: i64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}

/// Handle shell completion generation
pub async fn handle_completion(shell: &str, cmd: &mut Command) -> Result<()> {
    use std::io;

    let clap_shell = match shell {
        "bash" => ClapShell::Bash,
        "zsh" => ClapShell::Zsh,
        "fish" => ClapShell::Fish,
        "elvish" => ClapShell::Elvish,
        "powershell" | "pwsh" => ClapShell::PowerShell,
        _ => {
            return Err(anyhow::anyhow!(
                "Unsupported shell: {}\nSupported shells: bash, zsh, fish, elvish, powershell",
                shell
            ));
        }
    };

    generate(clap_shell, cmd, "sitepilot", &mut io::stdout());

    Ok(())
}
