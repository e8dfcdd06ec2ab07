use docseer::cli::{Cli, Commands, ConfigAction};
use docseer::config::Config;
use docseer::error::{DocseerError, Result};
use docseer::indexer::ingest_images;
use docseer::rag::{ask, load_rag_resources};
use docseer::shell::{ChatShell, SourcePreview};
use docseer::store::VectorStore;
use std::path::{Path, PathBuf};

fn main() {
    let cli = Cli::parse_args();

    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Chat => cmd_chat(cli.config),
        Commands::Ask { question, json } => cmd_ask(cli.config, &question, json),
        Commands::IngestImages => cmd_ingest_images(cli.config),
        Commands::Status => cmd_status(cli.config),
        Commands::Config { action } => cmd_config(cli.config, action),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "docseer=debug" } else { "docseer=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| DocseerError::Io {
            source: e,
            context: "Failed to create tokio runtime".to_string(),
        })
}

fn cmd_chat(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    let resources = load_rag_resources(&config)?;

    println!("docseer - multimodal documentation assistant");
    println!("I can read the text AND see the documentation images.");

    let mut shell = ChatShell::new(&resources);
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    runtime()?.block_on(shell.run(stdin.lock(), &mut stdout))
}

fn cmd_ask(config_path: Option<PathBuf>, question: &str, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let resources = load_rag_resources(&config)?;

    let answer = runtime()?.block_on(ask(question, &resources))?;

    if json {
        let output = serde_json::json!({
            "answer": answer.text,
            "image": answer.image,
            "sources": SourcePreview::from_answer(&answer),
        });
        let rendered = serde_json::to_string_pretty(&output).map_err(|e| DocseerError::Json {
            source: e,
            context: "Failed to serialize answer".to_string(),
        })?;
        println!("{}", rendered);
        return Ok(());
    }

    println!("{}", answer.text);

    if let Some(image) = &answer.image {
        println!("\n[Relevant documentation image: {}]", image.display());
    }

    if !answer.docs.is_empty() {
        println!("\n--- Source context ---");
        for source in SourcePreview::from_answer(&answer) {
            println!("Source: {}\n{}", source.source, source.snippet);
        }
    }

    Ok(())
}

fn cmd_ingest_images(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;

    println!("Starting image ingestion...");
    let report = ingest_images(&config)?;

    if report.discovered == 0 {
        println!(
            "⚠ No images found! Check storage.docs_root ({})",
            config.storage.docs_root.display()
        );
    } else {
        println!(
            "✓ Stored {} images in '{}' ({} ms)",
            report.stored, report.collection, report.duration_ms
        );
    }

    Ok(())
}

fn cmd_status(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    let store = VectorStore::open(&config.storage.db_path)?;

    println!("docseer Status");
    println!("==============");
    println!("\nStore: {}", config.storage.db_path.display());
    println!("Docs:  {}", config.storage.docs_root.display());

    let collections = store.list_collections()?;
    println!("\nCollections: {} total", collections.len());

    for info in &collections {
        let dimension = info
            .dimension
            .map(|d| format!("{}D", d))
            .unwrap_or_else(|| "empty".to_string());
        println!("  {} - {} records ({})", info.name, info.count, dimension);
    }

    let has_images = collections
        .iter()
        .any(|c| c.name == config.storage.image_collection);
    if !has_images {
        println!("\n⚠ Image collection not found. Run 'docseer ingest-images'.");
    }

    Ok(())
}

fn cmd_config(config_path: Option<PathBuf>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(config_path)?;
            let rendered = toml::to_string_pretty(&config)?;
            println!("{}", rendered);
        }
        ConfigAction::Validate { file } => {
            let path = match file.or(config_path) {
                Some(path) => path,
                None => Config::default_path()?,
            };
            let config = Config::load(&path)?;
            println!("✓ Configuration is valid");
            println!("  Schema version: {}", config.meta.schema_version);
        }
        ConfigAction::Init { force } => {
            let path = match config_path {
                Some(path) => path,
                None => Config::default_path()?,
            };

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            create_parent_dir(&path)?;
            Config::default().save(&path)?;

            println!("✓ Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

fn load_config(config_path: Option<PathBuf>) -> Result<Config> {
    let path = match config_path {
        Some(path) => return Config::load(&path),
        None => Config::default_path()?,
    };

    Config::load_or_default(&path)
}

fn create_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| DocseerError::Io {
            source: e,
            context: format!("Failed to create config directory: {:?}", parent),
        })?;
    }
    Ok(())
}
