use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::Args;
use easel_evaluator::{CalcConfig, CalcEngine, EditorPreview, LocalValueSource, RenderNode, RenderPass};
use easel_model::{load_app, App, KindRegistry, Screen};
use tracing::info;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// App JSON file (defaults to the configured app file)
    pub file: Option<PathBuf>,

    /// Screen name or id (defaults to the first screen)
    #[arg(short, long)]
    pub screen: Option<String>,
}

pub fn render(args: RenderArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let path = config.app_path(cwd, args.file.as_deref());
    let app = load_app(&path)?;
    let screen = pick_screen(&app, args.screen.as_deref())?;

    info!(screen = %screen.name, file = %path.display(), "Rendering");

    let runtime = tokio::runtime::Runtime::new()?;
    let nodes = runtime.block_on(render_screen(screen, &config));

    println!("{}", serde_json::to_string_pretty(&nodes)?);
    Ok(())
}

/// Editor-preview render of `screen` with the configured active children
pub async fn render_screen(screen: &Screen, config: &Config) -> Vec<RenderNode> {
    let registry = KindRegistry::with_builtins();
    let engine = CalcEngine::with_config(
        LocalValueSource::new(&registry),
        CalcConfig::from(&config.calc),
    );
    RenderPass::new(&registry, &engine)
        .render(screen, &EditorPreview, &config.active_children)
        .await
}

fn pick_screen<'a>(app: &'a App, wanted: Option<&str>) -> Result<&'a Screen> {
    match wanted {
        Some(wanted) => app
            .screen_by_name(wanted)
            .or_else(|| app.screen(wanted))
            .ok_or_else(|| anyhow!("No screen named '{}' in app '{}'", wanted, app.name)),
        None => app
            .screens
            .first()
            .ok_or_else(|| anyhow!("App '{}' has no screens", app.name)),
    }
}
