use anyhow::Context;
use typedconf::Config;
use typedconf_demo::{AppConfig, GlobalConfig};

fn describe(config: &dyn AppConfig) {
    println!("listening on {}", config.address());
    println!("database {} ({:?})", config.url(), config.mode());
    println!("features: {}", config.enabled().join(", "));
}

fn main() -> anyhow::Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "app.json".to_string());
    let tree = Config::load(&path).with_context(|| format!("failed to load {path}"))?;
    let config = GlobalConfig::new(&tree).context("invalid configuration")?;
    describe(&config);
    Ok(())
}
