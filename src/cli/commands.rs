//! Command dispatch

use std::collections::HashSet;
use std::io;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::ingest::{BulkIngestor, MANIFEST_FILE};
use crate::application::services::library::LibraryService;
use crate::application::services::store::TreeStore;
use crate::cli::args::{Cli, Commands, ConfigCommands, LibraryCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::{DecisionTree, NavigationEngine, Node, START_NODE_ID};
use crate::infrastructure::{InfraError, ServiceContainer};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Validate { file }) => _validate(file),
        Some(Commands::Info { file, outline }) => _info(file, *outline),
        Some(Commands::Run { file }) => _run(file),
        Some(Commands::Ingest { root, output }) => _ingest(root, output.as_deref()),
        Some(Commands::Library { command }) => match command {
            LibraryCommands::Build { content_dir } => _library_build(content_dir.as_deref()),
            LibraryCommands::List { content_dir } => _library_list(content_dir.as_deref()),
            LibraryCommands::Search { query, content_dir } => {
                _library_search(query, content_dir.as_deref())
            }
        },
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => _config_show(),
            ConfigCommands::Init => _config_init(),
            ConfigCommands::Path => _config_path(),
        },
        Some(Commands::Completion { shell }) => {
            generate(*shell, &mut Cli::command(), "guidwire", &mut io::stdout());
            Ok(())
        }
        None => Ok(()),
    }
}

fn container() -> CliResult<ServiceContainer> {
    let settings = Settings::load()?;
    Ok(ServiceContainer::new(settings))
}

fn resolve_content_dir(container: &ServiceContainer, flag: Option<&Path>) -> PathBuf {
    flag.map(Path::to_path_buf)
        .unwrap_or_else(|| container.settings.content_dir.clone())
}

#[instrument]
fn _validate(file: &Path) -> CliResult<()> {
    let container = container()?;
    let tree = TreeStore::new(container.fs.clone()).load(file)?;
    output::success(&format!(
        "valid: '{}' ({} nodes)",
        tree.title,
        tree.len()
    ));
    Ok(())
}

#[instrument]
fn _info(file: &Path, outline: bool) -> CliResult<()> {
    let container = container()?;
    let tree = TreeStore::new(container.fs.clone()).load(file)?;

    let mut questions = 0;
    let mut steps = 0;
    let mut resolutions = 0;
    for (_, node) in tree.iter() {
        match node {
            Node::Question { .. } => questions += 1,
            Node::Step { .. } => steps += 1,
            Node::Resolution { .. } => resolutions += 1,
        }
    }

    output::header(&tree.title);
    if !tree.description.is_empty() {
        output::info(&tree.description);
    }
    output::detail(&format!(
        "{} nodes ({} questions, {} steps, {} resolutions)",
        tree.len(),
        questions,
        steps,
        resolutions
    ));

    if outline {
        println!();
        println!("{}", outline_from_start(&tree));
    }
    Ok(())
}

/// Render the branch structure from `start`; revisited nodes become
/// reference leaves so shared branches and loops stay readable.
fn outline_from_start(tree: &DecisionTree) -> termtree::Tree<String> {
    let mut visited = HashSet::new();
    outline_branch(tree, START_NODE_ID, None, &mut visited)
}

fn outline_branch(
    tree: &DecisionTree,
    id: &str,
    edge_label: Option<&str>,
    visited: &mut HashSet<String>,
) -> termtree::Tree<String> {
    let Some(node) = tree.get(id) else {
        return termtree::Tree::new(format!("{id}: ?"));
    };

    let label = match edge_label {
        Some(edge) => format!("[{edge}] {id}: {}", node.text()),
        None => format!("{id}: {}", node.text()),
    };

    if !visited.insert(id.to_string()) {
        return termtree::Tree::new(format!("{label} (see above)"));
    }

    let mut branch = termtree::Tree::new(label);
    match node {
        Node::Question { options, .. } => {
            for option in options {
                branch.push(outline_branch(tree, &option.next, Some(&option.label), visited));
            }
        }
        Node::Step { next, .. } => {
            branch.push(outline_branch(tree, next, None, visited));
        }
        Node::Resolution { .. } => {}
    }
    branch
}

#[instrument]
fn _run(file: &Path) -> CliResult<()> {
    let container = container()?;
    let tree = TreeStore::new(container.fs.clone()).load(file)?;
    let mut engine = NavigationEngine::new(&tree);

    output::header(&tree.title);
    if !tree.description.is_empty() {
        output::info(&tree.description);
    }

    let stdin = io::stdin();
    loop {
        println!();
        output::detail(&format!(
            "Step {} of ~{}",
            engine.current_step_number(),
            engine.approximate_total_steps()
        ));

        match engine.current_node() {
            Node::Question { text, options } => {
                output::header(text);
                for (idx, option) in options.iter().enumerate() {
                    output::detail(&format!("{}) {}", idx + 1, option.label));
                }
                output::prompt(&"Choose an option (number), b=back, r=restart, q=quit:");
                let Some(input) = read_line(&stdin)? else { break };
                match input.as_str() {
                    "q" => break,
                    "b" => {
                        if !engine.go_back() {
                            output::warning(&"already at the start");
                        }
                    }
                    "r" => engine.reset(),
                    other => {
                        // Accept the option number or the literal label.
                        let label = match other.parse::<usize>() {
                            Ok(n) if n >= 1 && n <= options.len() => options[n - 1].label.clone(),
                            _ => other.to_string(),
                        };
                        if let Err(e) = engine.navigate(&label) {
                            output::warning(&e);
                        }
                    }
                }
            }
            Node::Step { text, .. } => {
                output::info(text);
                output::prompt(&"Press Enter to continue, b=back, r=restart, q=quit:");
                let Some(input) = read_line(&stdin)? else { break };
                match input.as_str() {
                    "q" => break,
                    "b" => {
                        if !engine.go_back() {
                            output::warning(&"already at the start");
                        }
                    }
                    "r" => engine.reset(),
                    _ => {
                        if let Err(e) = engine.advance() {
                            output::warning(&e);
                        }
                    }
                }
            }
            Node::Resolution { text } => {
                output::success(text);
                if !engine.history().is_empty() {
                    println!();
                    output::info(&"Path taken:");
                    for (idx, visited) in engine.history().iter().enumerate() {
                        output::detail(&format!("{}. {}", idx + 1, visited));
                    }
                }
                output::prompt(&"b=back, r=restart, q=quit:");
                let Some(input) = read_line(&stdin)? else { break };
                match input.as_str() {
                    "b" => {
                        engine.go_back();
                    }
                    "r" => engine.reset(),
                    _ => break,
                }
            }
        }
    }
    Ok(())
}

/// Read a trimmed line from stdin; None on EOF.
fn read_line(stdin: &io::Stdin) -> CliResult<Option<String>> {
    let mut line = String::new();
    let read = stdin
        .lock()
        .read_line(&mut line)
        .map_err(|e| InfraError::io("read stdin", e))?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

#[instrument]
fn _ingest(root: &Path, output_dir: Option<&Path>) -> CliResult<()> {
    let container = container()?;
    let content_dir = resolve_content_dir(&container, output_dir);
    debug!("ingest {} -> {}", root.display(), content_dir.display());

    let ingestor = BulkIngestor::new(container.fs.clone(), container.extractor.clone());
    let manifest = ingestor.ingest(root, &content_dir, |message, current, total| {
        output::detail(&format!("[{current}/{total}] {message}"));
    })?;

    output::success(&format!(
        "{} documents indexed in {}",
        manifest.len(),
        content_dir.display()
    ));
    Ok(())
}

#[instrument]
fn _library_build(content_dir: Option<&Path>) -> CliResult<()> {
    let container = container()?;
    let analyzer = container.analyzer()?;
    let content_dir = resolve_content_dir(&container, content_dir);

    let ingestor = BulkIngestor::new(container.fs.clone(), container.extractor.clone());
    let manifest_path = content_dir.join(MANIFEST_FILE);
    let manifest = ingestor.load_manifest(&manifest_path);
    if manifest.is_empty() {
        return Err(CliError::Usage(format!(
            "no manifest at {}; run 'guidwire ingest' first",
            manifest_path.display()
        )));
    }

    let service = LibraryService::new(container.fs.clone(), content_dir);
    let library_path = service.build(&manifest, &analyzer, |message, current, total| {
        output::detail(&format!("[{current}/{total}] {message}"));
    })?;
    service.write_branding(&container.settings.company_name)?;

    output::success(&format!("library catalog written to {}", library_path.display()));
    Ok(())
}

#[instrument]
fn _library_list(content_dir: Option<&Path>) -> CliResult<()> {
    let container = container()?;
    let content_dir = resolve_content_dir(&container, content_dir);
    let catalog = LibraryService::new(container.fs.clone(), content_dir).open()?;

    output::header(&format!(
        "{} - Troubleshooting Library",
        container.settings.company_name
    ));
    if catalog.entries.is_empty() {
        output::info(&"Library is empty.");
        return Ok(());
    }

    for category in catalog.categories() {
        output::header(&category);
        for entry in catalog.entries_for(&category) {
            output::detail(&format!("{} - {}", entry.title, entry.description));
        }
    }
    Ok(())
}

#[instrument]
fn _library_search(query: &str, content_dir: Option<&Path>) -> CliResult<()> {
    let container = container()?;
    let content_dir = resolve_content_dir(&container, content_dir);
    let catalog = LibraryService::new(container.fs.clone(), content_dir).open()?;

    let hits = catalog.search(query);
    if hits.is_empty() {
        output::info(&"No matches.");
        return Ok(());
    }
    for entry in hits {
        output::info(&format!("[{}] {} - {}", entry.category, entry.title, entry.description));
    }
    Ok(())
}

fn _config_show() -> CliResult<()> {
    let settings = Settings::load()?;
    output::info(&settings.to_toml()?);
    Ok(())
}

fn _config_init() -> CliResult<()> {
    let Some(path) = global_config_path() else {
        return Err(CliError::Usage("cannot determine config directory".to_string()));
    };
    if path.exists() {
        output::warning(&format!("config already exists: {}", path.display()));
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| InfraError::io("create config directory", e))?;
    }
    std::fs::write(&path, Settings::template())
        .map_err(|e| InfraError::io("write config template", e))?;
    output::success(&format!("created {}", path.display()));
    Ok(())
}

fn _config_path() -> CliResult<()> {
    match global_config_path() {
        Some(path) => {
            let marker = if path.exists() { "(exists)" } else { "(not created)" };
            output::info(&format!("{} {}", path.display(), marker));
        }
        None => output::info(&"no config directory available"),
    }
    Ok(())
}
