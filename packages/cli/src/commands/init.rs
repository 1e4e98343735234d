use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::Path;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Diary service host
    #[arg(long)]
    pub host: Option<String>,

    /// Diary service port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing diary client...".bright_blue().bold());

    let defaults = Config::default();
    let config = Config {
        host: args.host.unwrap_or(defaults.host.clone()),
        port: args.port.unwrap_or(defaults.port),
        ..defaults
    };

    // Write config file
    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("Next steps:");
    println!("  1. Put your access token in {}", config.token_path);
    println!("  2. Run: diary write --title \"Today\" --category Daily --content today.txt");
    println!("  3. Run: diary view <id>");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = tempfile::tempdir().unwrap();
        init(
            InitArgs {
                host: Some("http://192.168.0.10".to_string()),
                port: None,
                force: false,
            },
            dir.path(),
        )
        .unwrap();

        let written = fs::read_to_string(dir.path().join(DEFAULT_CONFIG_NAME)).unwrap();
        let config: Config = serde_json::from_str(&written).unwrap();
        assert_eq!(config.host, "http://192.168.0.10");
        assert_eq!(config.port, 8080);
        assert_eq!(config.history.max_stack, 100);
    }

    #[test]
    fn test_init_keeps_existing_config_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_NAME);
        fs::write(&path, "{}").unwrap();

        let args = |force| InitArgs {
            host: None,
            port: Some(9999),
            force,
        };

        init(args(false), dir.path()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");

        init(args(true), dir.path()).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("9999"));
    }
}
