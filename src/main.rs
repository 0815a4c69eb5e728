//! Console storefront driving the search core from stdin.

use anyhow::Result;
use nexus_search::{
    autocomplete::SuggestionController,
    backend::HttpBackend,
    config,
    metrics::Metrics,
    session::{FetchOutcome, SearchSession, SessionSnapshot},
    CategorySet,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they do not interleave with the storefront output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting nexus-search v{}", nexus_search::VERSION);

    let settings = config::load()?;
    let backend = Arc::new(HttpBackend::from_settings(&settings)?);
    info!("Using search backend at {}", backend.search_url());

    let metrics = Arc::new(Metrics::new());
    let (mut input, mut submissions) = SuggestionController::new(
        backend.clone(),
        settings.autocomplete.clone(),
        metrics.clone(),
    );
    let mut session = SearchSession::new(backend, settings.session.clone(), metrics.clone())?;

    let mut panel = input.panel();
    let mut snapshots = session.subscribe();

    print_usage();
    render_snapshot(&session.snapshot());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !handle_command(line.trim(), &mut input, &mut session) {
                    break;
                }
            }
            Some(query) = submissions.recv() => {
                session.submit_query(&query);
            }
            Ok(()) = panel.changed() => {
                let state = input.state();
                if state.visible {
                    println!("suggestions for '{}':", state.suggestions_for);
                    for (i, suggestion) in state.suggestions.iter().enumerate() {
                        println!("  [{}] {}", i + 1, suggestion);
                    }
                }
            }
            Ok(()) = snapshots.changed() => {
                let snapshot = snapshots.borrow_and_update().clone();
                render_snapshot(&snapshot);
            }
        }
    }

    info!("Session metrics: {:?}", metrics.snapshot());
    Ok(())
}

/// Apply one command line. Returns false to quit.
fn handle_command(line: &str, input: &mut SuggestionController, session: &mut SearchSession) -> bool {
    let (command, arg) = line.split_once(' ').unwrap_or((line, ""));

    match command {
        "" => {}
        "type" => input.on_text_changed(arg),
        "enter" => input.on_submit(),
        "focus" => input.on_focus(),
        "blur" => input.on_blur(),
        "pick" => {
            let state = input.state();
            let picked = arg
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| state.suggestions.get(i));
            match picked {
                Some(value) => input.on_suggestion_chosen(value),
                None => println!("no suggestion '{}'", arg),
            }
        }
        "cat" => {
            let categories: CategorySet = arg.split(',').collect();
            session.set_categories(&categories);
        }
        "toggle" => session.toggle_category(arg),
        "back" => {
            if !session.back() {
                println!("already at the first page");
            }
        }
        "forward" => {
            if !session.forward() {
                println!("already at the last page");
            }
        }
        "show" => {
            println!("location: {}", session.location());
            println!("draft: '{}'", input.state().draft_text);
            render_snapshot(&session.snapshot());
        }
        "help" => print_usage(),
        "quit" | "exit" => return false,
        other => println!("unknown command '{}', try 'help'", other),
    }
    true
}

fn render_snapshot(snapshot: &SessionSnapshot) {
    let state = &snapshot.state;
    let categories: Vec<&str> = state.categories.iter().collect();
    let header = format!(
        "#{} q='{}' categories=[{}]",
        snapshot.revision,
        state.query,
        categories.join(", ")
    );

    match &snapshot.outcome {
        FetchOutcome::Idle => {}
        FetchOutcome::Loading => println!("{} loading...", header),
        FetchOutcome::Failure(message) => println!("{} error: {}", header, message),
        FetchOutcome::Success(products) if products.is_empty() => println!(
            "{} No products found. Please try a different search or filter.",
            header
        ),
        FetchOutcome::Success(products) => {
            println!("{} {} products", header, products.len());
            for product in products {
                let was = product
                    .original_price_label()
                    .map(|p| format!(" (was {})", p))
                    .unwrap_or_default();
                println!(
                    "  {} | {} | {}{} | {}",
                    product.display_name(),
                    product.display_category(),
                    product.price_label(),
                    was,
                    product.rating_label()
                );
            }
        }
    }
}

/// Print usage information
fn print_usage() {
    println!(
        r#"
Nexus Search v{}

COMMANDS:
    type <text>        Edit the search input (suggestions follow)
    pick <n>           Choose suggestion n and search for it
    enter              Submit the input as typed
    focus | blur       Focus or leave the search input
    cat <a, b, ...>    Replace the category filter
    toggle <category>  Flip one category
    back | forward     Walk the search history
    show               Print the current search
    quit               Exit

ENVIRONMENT VARIABLES:
    NEXUS_SETTINGS_PATH    Path to settings.yml
    NEXUS_BACKEND_URL      Search backend base URL
    NEXUS_DEBOUNCE_MS      Suggestion quiet period
    NEXUS_REQUEST_TIMEOUT  Request timeout in seconds
    RUST_LOG               Log filter (default: info)
"#,
        nexus_search::VERSION
    );
}
