use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use kuchiki::parse_html;
use kuchiki::traits::*;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use trellis::{
    CustomElements, IdGenerator, Listener, NodeEvents, RuntimeConfig, SelectorQueries,
    TemplateCache, View, ViewEvent, ViewType,
};

const PAGE: &str = "<!DOCTYPE html><html><body><main id='app'></main></body></html>";

const DEFAULT_LIST_TEMPLATE: &str = "<ul class='todos'>\
    <todo-item name='first' label=\"'Write the tree'\" done='true'></todo-item>\
    <todo-item label=\"'Ship it'\" priority='2'></todo-item>\
    </ul>";

fn main() {
    let template_path = std::env::args().nth(1).map(PathBuf::from);

    let subscriber_result = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .try_init();
    if subscriber_result.is_err() {
        // tracing was already initialised; continue silently
    }

    let config_path = std::env::var("TRELLIS_CONFIG").ok().map(PathBuf::from);
    let config = RuntimeConfig::load(config_path).unwrap_or_else(|err| {
        eprintln!("Failed to load view configuration: {err}. Using defaults.");
        RuntimeConfig::default()
    });

    let list_template = match template_path {
        Some(path) => fs::read_to_string(&path).unwrap_or_else(|err| {
            eprintln!("Failed to read template {}: {err}", path.display());
            std::process::exit(1);
        }),
        None => DEFAULT_LIST_TEMPLATE.to_string(),
    };

    if let Err(err) = run(&config, &list_template) {
        error!(target = "trellis", error = %err, "demo failed");
        std::process::exit(1);
    }
}

fn run(config: &RuntimeConfig, list_template: &str) -> Result<()> {
    let document = parse_html().one(PAGE);
    let app = document
        .select_first("#app")
        .map_err(|_| anyhow!("page has no #app element"))?
        .as_node()
        .clone();

    let ids = IdGenerator::new();
    let templates = TemplateCache::new();

    let items = ViewType::builder("item", &ids)
        .config(config)
        .templates(&templates)
        .template("<li class='item'></li>")
        .use_extension(NodeEvents)?
        .use_extension(SelectorQueries)?
        .build();
    let lists = ViewType::builder("list", &ids)
        .config(config)
        .templates(&templates)
        .template(list_template)
        .use_extension(NodeEvents)?
        .use_extension(SelectorQueries)?
        .use_extension(CustomElements::new().element("todoItem", items))?
        .build();
    let shell = ViewType::builder("shell", &ids)
        .config(config)
        .use_extension(NodeEvents)?
        .build();

    let root = shell.adopt(app)?;
    root.on(
        "select",
        Listener::new(|view, event| {
            info!(
                target = "trellis",
                current = %view.id(),
                origin = ?event.target().map(View::id),
                "select reached the shell"
            );
            event.prevent_default();
            Ok(())
        }),
    )?;

    let list = lists.create()?;
    root.append(&list).at_root()?;

    let first = list
        .children()
        .into_iter()
        .next()
        .context("list template has no todo-item placeholders")?;
    let mut select = ViewEvent::new("select").bubbling().cancelable();
    let prevented = first.dispatch_event(&mut select)?;
    info!(target = "trellis", prevented, "dispatched select");

    list.broadcast(&mut ViewEvent::new("refresh"))?;

    print_outline(&root, 0);

    root.dispose()?;
    println!("{}", document.to_string());
    Ok(())
}

fn print_outline(view: &View, depth: usize) {
    println!(
        "{:indent$}{} {} in_document={} slots={:?}",
        "",
        view.id(),
        view.kind().name(),
        view.is_in_document(),
        view.slot_names(),
        indent = depth * 2
    );
    for child in view.children() {
        print_outline(&child, depth + 1);
    }
}
