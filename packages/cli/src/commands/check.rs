use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use easel_evaluator::calc::{tokenize, Calculation, TextPart};
use easel_model::{traverse, App, Element, ElementId, KindRegistry, Screen};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// App JSON file (defaults to the configured app file)
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub severity: Severity,
    pub screen: String,
    pub element: ElementId,
    pub message: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}: {}", self.screen, self.element, self.message)
    }
}

pub fn check(args: CheckArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let path = config.app_path(cwd, args.file.as_deref());

    println!("🔍 {} {}", "Checking".green().bold(), path.display());
    println!();

    // Parsed without the loader's id validation so duplicates are reported
    // alongside everything else
    let source = fs::read_to_string(&path)?;
    let app: App = serde_json::from_str(&source)?;

    let registry = KindRegistry::with_builtins();
    let issues = check_app(&app, &registry);

    for issue in &issues {
        match issue.severity {
            Severity::Error => println!("  {} {}", "error:".red().bold(), issue),
            Severity::Warning => println!("  {} {}", "warning:".yellow().bold(), issue),
        }
    }

    let errors = issues
        .iter()
        .filter(|issue| issue.severity == Severity::Error)
        .count();
    let warnings = issues.len() - errors;
    let elements: usize = app
        .screens
        .iter()
        .map(|screen| traverse::flatten(&screen.elements).len())
        .sum();

    println!();
    println!("   Screens:  {}", app.screens.len());
    println!("   Elements: {}", elements);
    if warnings > 0 {
        println!("   {} {}", "Warnings:".yellow(), warnings);
    }

    if errors > 0 {
        println!("   {} {}", "Errors:".red(), errors);
        return Err(anyhow!("{} found {} error(s)", path.display(), errors));
    }

    println!("{} No errors", "✓".green());
    Ok(())
}

/// Every structural problem in `app`, in screen order then pre-order
pub fn check_app(app: &App, registry: &KindRegistry) -> Vec<Issue> {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();

    for screen in &app.screens {
        for element in traverse::flatten(&screen.elements) {
            if !seen.insert(element.id.clone()) {
                issues.push(issue(Severity::Error, screen, element, "duplicate element id".into()));
            }
            check_element(screen, element, registry, &mut issues);
        }
    }
    issues
}

fn check_element(screen: &Screen, element: &Element, registry: &KindRegistry, issues: &mut Vec<Issue>) {
    let Some(kind) = registry.get(&element.kind) else {
        issues.push(issue(
            Severity::Error,
            screen,
            element,
            format!("unknown element kind '{}'", element.kind),
        ));
        return;
    };

    if element.is_conditional() && element.conditions().is_empty() {
        issues.push(issue(
            Severity::Error,
            screen,
            element,
            "conditional element has no conditions".into(),
        ));
    }
    if !element.is_conditional() && element.conditions.is_some() {
        issues.push(issue(
            Severity::Warning,
            screen,
            element,
            "static element carries conditions".into(),
        ));
    }

    match (kind.default_children().is_some(), element.children.is_some()) {
        (true, false) => issues.push(issue(
            Severity::Warning,
            screen,
            element,
            format!("container kind '{}' has no children list", element.kind),
        )),
        (false, true) => issues.push(issue(
            Severity::Error,
            screen,
            element,
            format!("leaf kind '{}' has children", element.kind),
        )),
        _ => {}
    }

    if let Some(text) = kind
        .content_key()
        .and_then(|key| element.property(key))
        .and_then(|value| value.as_str())
    {
        check_tokens(screen, element, text, issues);
    }
}

fn check_tokens(screen: &Screen, element: &Element, text: &str, issues: &mut Vec<Issue>) {
    for part in tokenize(text) {
        let TextPart::Token(payload) = part else {
            continue;
        };
        match Calculation::parse(payload) {
            Ok(calculation) => {
                for id in &calculation.ids {
                    if !traverse::contains_id(&screen.elements, id.as_str()) {
                        issues.push(issue(
                            Severity::Warning,
                            screen,
                            element,
                            format!("calculation refers to missing element '{}'", id),
                        ));
                    }
                }
            }
            Err(err) => issues.push(issue(Severity::Warning, screen, element, err.to_string())),
        }
    }
}

fn issue(severity: Severity, screen: &Screen, element: &Element, message: String) -> Issue {
    Issue {
        severity,
        screen: screen.name.clone(),
        element: element.id.clone(),
        message,
    }
}
