//! Interactive setup wizard for sitepilot configuration

use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use sitepilot_core::{
    config_exists, endpoints::ENDPOINTS, save_config, validate_config, AwsConfig, ConfigFile,
    LoggingConfig, TransferConfig, WebsiteConfig,
};

/// Run the interactive setup wizard
pub async fn run_init_wizard() -> Result<()> {
    println!("🚀 Welcome to sitepilot setup!\n");

    println!("This wizard will guide you through the configuration process.");
    println!("Credentials are not stored here: sitepilot uses your AWS profiles");
    println!("(~/.aws/config) or the standard AWS environment variables.\n");

    if config_exists() {
        let overwrite = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("A configuration already exists. Overwrite it?")
            .default(false)
            .interact()?;
        if !overwrite {
            println!("❌ Configuration unchanged");
            return Ok(());
        }
    }

    // Step 1: AWS profile
    let profile = prompt_profile()?;

    // Step 2: Region
    let region = prompt_region()?;

    // Step 3: Website documents
    let (index_document, error_document) = prompt_documents()?;

    // Step 4: Chunk size
    let chunk_size_mb = prompt_chunk_size()?;

    // Summary
    println!("\n📋 Configuration summary:");
    println!("  Profile: {}", profile.as_deref().unwrap_or("(default chain)"));
    println!("  Region: {}", region);
    println!("  Index document: {}", index_document);
    println!("  Error document: {}", error_document);
    println!("  Chunk size: {} MiB", chunk_size_mb);

    // Confirmation
    let confirm = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Save this configuration?")
        .default(false)
        .interact()?;

    if !confirm {
        println!("❌ Configuration cancelled");
        return Ok(());
    }

    let config = ConfigFile {
        aws: AwsConfig {
            profile,
            region: Some(region),
        },
        transfer: TransferConfig { chunk_size_mb },
        website: WebsiteConfig {
            index_document,
            error_document,
        },
        logging: LoggingConfig::default(),
    };
    validate_config(&config)?;

    let pb = ProgressBar::new(1);
    pb.set_style(
        ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.set_message("Saving configuration...");

    let path = save_config(&config)?;

    pb.inc(1);
    pb.finish_with_message("✅ Configuration saved!");

    println!("\n🎉 Setup complete!");
    println!("\nConfiguration saved to: {}", path.display());
    println!("\nYou can now use sitepilot:");
    println!("  $ sitepilot setup-bucket www.example.com");
    println!("  $ sitepilot sync ./public www.example.com");
    println!("  $ sitepilot config show");

    Ok(())
}

/// Prompt for an AWS profile name (empty means the default chain)
fn prompt_profile() -> Result<Option<String>> {
    let profile: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("AWS profile (leave empty for the default credential chain)")
        .allow_empty(true)
        .interact_text()
        .map_err(|e| anyhow::anyhow!("Failed to get profile: {}", e))?;

    let profile = profile.trim();
    Ok((!profile.is_empty()).then(|| profile.to_string()))
}

/// Prompt for the region, limited to regions with website hosting
fn prompt_region() -> Result<String> {
    let items: Vec<String> = ENDPOINTS
        .iter()
        .map(|e| format!("{} ({})", e.region, e.name))
        .collect();
    let default = ENDPOINTS
        .iter()
        .position(|e| e.region == "us-east-1")
        .unwrap_or(0);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Region")
        .items(&items)
        .default(default)
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to select region: {}", e))?;

    Ok(ENDPOINTS[selection].region.to_string())
}

/// Prompt for index and error documents
fn prompt_documents() -> Result<(String, String)> {
    let index: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Index document")
        .default("index.html".to_string())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.is_empty() {
                Err("Index document cannot be empty")
            } else if input.contains('/') {
                Err("Index document must be a file name, not a path")
            } else {
                Ok(())
            }
        })
        .interact_text()
        .map_err(|e| anyhow::anyhow!("Failed to get index document: {}", e))?;

    let error: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Error document")
        .default("error.html".to_string())
        .interact_text()
        .map_err(|e| anyhow::anyhow!("Failed to get error document: {}", e))?;

    Ok((index, error))
}

/// Prompt for the multipart chunk size
fn prompt_chunk_size() -> Result<u64> {
    Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Multipart chunk size in MiB (must match previous uploads)")
        .default(8u64)
        .validate_with(|input: &u64| -> Result<(), &str> {
            if *input < 5 {
                Err("S3 requires at least 5 MiB per part")
            } else if *input > 5120 {
                Err("S3 allows at most 5120 MiB per part")
            } else {
                Ok(())
            }
        })
        .interact_text()
        .map_err(|e| anyhow::anyhow!("Failed to get chunk size: {}", e))
}
