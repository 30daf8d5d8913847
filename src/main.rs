use aispec::Config;
use aispec::summarize::resolve_credential;
use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    aispec::init_logging(&config.aispec.log_level);

    // Parse command-line arguments
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("verify");

    match command {
        "config" => print_config(&config),
        "verify" => verify(&config).await?,
        other => {
            anyhow::bail!("unknown command '{}' (expected 'verify' or 'config')", other);
        }
    }

    Ok(())
}

/// Print the effective settings after file and default merging
fn print_config(config: &Config) {
    println!("[inference]");
    println!("  api_url      = {}", config.inference.api_url);
    println!("  model        = {}", config.inference.model);
    println!("  stream       = {}", config.inference.stream);
    println!("  max_retries  = {}", config.inference.max_retries);
    println!("  timeout_secs = {}", config.inference.timeout_secs);
    let auth = match (&config.inference.credential_command, &config.inference.api_key_env) {
        (Some(cmd), _) => format!("command {:?}", cmd.first().map(String::as_str).unwrap_or("")),
        (None, Some(var)) => format!("env {}", var),
        (None, None) => "none".to_string(),
    };
    println!("  auth         = {}", auth);
    println!("[walk]");
    println!("  extensions   = {}", config.walk.extensions.join(", "));
    println!("  ignore_files = {}", config.walk.ignore_files.join(", "));
    println!("[output]");
    println!("  summary_file = {}", config.output.summary_file.display());
    println!("[upload]");
    println!("  max_chunk_bytes = {}", config.upload.max_chunk_bytes);
    println!("  max_retries     = {}", config.upload.max_retries);
}

/// Check that configuration is usable: validation already ran in `Config::load`,
/// this additionally resolves the credential so a broken command surfaces early.
async fn verify(config: &Config) -> Result<()> {
    log::info!("Configuration is valid");
    match resolve_credential(&config.inference).await? {
        Some(credential) => log::info!("Credential resolved ({:?})", credential),
        None => log::info!("No credential configured; requests are unauthenticated"),
    }
    print_config(config);
    Ok(())
}
