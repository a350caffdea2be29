use std::fs;
use std::path::Path;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use easel_model::{save_app, App, Condition, Element, KindRegistry, Properties, Screen};
use serde_json::json;

use crate::config::{Config, DEFAULT_CONFIG_NAME};

#[derive(Debug, Args)]
pub struct InitArgs {
    /// App file to create
    #[arg(short, long, default_value = "app.json")]
    pub app_file: String,

    /// Force overwrite existing files
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);
    let app_path = cwd.join(&args.app_file);

    let existing: Vec<&Path> = [config_path.as_path(), app_path.as_path()]
        .into_iter()
        .filter(|path| path.exists())
        .collect();
    if !existing.is_empty() && !args.force {
        for path in existing {
            println!("{} {} already exists", "⚠️".yellow(), path.display().to_string().bright_white());
        }
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Easel project...".bright_blue().bold());

    let registry = KindRegistry::with_builtins();
    save_app(&app_path, &sample_app(&registry)?)?;
    println!("  {} Created {}", "✓".green(), args.app_file);

    let config = Config {
        app_file: args.app_file.clone(),
        ..Config::default()
    };
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Edit {}", args.app_file);
    println!("  2. Run: easel check");
    println!("  3. Run: easel render --screen Checkout");

    Ok(())
}

/// A checkout screen with a calculated total and a two-slide banner
pub fn sample_app(registry: &KindRegistry) -> Result<App> {
    let mut price = registry.create("input", "price".into())?;
    price.set_property("value", "12.50");
    let mut qty = registry.create("input", "qty".into())?;
    qty.set_property("value", "3");

    let mut total = registry.create("text", "total".into())?;
    total.set_property("text", "Total: {{CALC:mul:price,qty:2}}");
    let mut member = Properties::new();
    member.insert(
        "text".into(),
        "Member total: {{CALC:mul:price,qty:2}}".into(),
    );
    let total = total.with_conditions(vec![
        Condition::new(json!({ "customer": "guest" })),
        Condition::new(json!({ "customer": "member" })).with_properties(member),
    ]);

    let mut form = registry.create("container", "order".into())?;
    form.children = Some(vec![price, qty, total]);

    let mut first = registry.create("text", "banner-1".into())?;
    first.set_property("text", "Free shipping over 50");
    let mut second = registry.create("text", "banner-2".into())?;
    second.set_property("text", "New arrivals");
    let mut banner = registry.create("slides", "banner".into())?;
    banner.children = Some(vec![
        Element::container("slide-1", "container").with_child(first),
        Element::container("slide-2", "container").with_child(second),
    ]);

    let mut screen = Screen::new("checkout", "Checkout");
    screen.elements = vec![banner, form];

    let mut app = App::new("shop", "Shop");
    app.screens.push(screen);
    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_config_and_app() {
        let dir = tempfile::tempdir().unwrap();
        let args = InitArgs {
            app_file: "app.json".into(),
            force: false,
        };

        init(args, dir.path()).unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.app_file, "app.json");
        let app = easel_model::load_app(&dir.path().join("app.json")).unwrap();
        assert_eq!(app.screens[0].name, "Checkout");
    }

    #[test]
    fn test_init_keeps_existing_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let app_path = dir.path().join("app.json");
        fs::write(&app_path, "{}").unwrap();

        let args = InitArgs {
            app_file: "app.json".into(),
            force: false,
        };
        init(args, dir.path()).unwrap();

        assert_eq!(fs::read_to_string(&app_path).unwrap(), "{}");
        assert!(!dir.path().join(DEFAULT_CONFIG_NAME).exists());
    }

    #[test]
    fn test_init_force_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let app_path = dir.path().join("app.json");
        fs::write(&app_path, "{}").unwrap();

        let args = InitArgs {
            app_file: "app.json".into(),
            force: true,
        };
        init(args, dir.path()).unwrap();

        assert!(easel_model::load_app(&app_path).is_ok());
    }
}
