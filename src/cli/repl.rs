// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use console::{Style, style};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Context, Editor, Helper};
use std::borrow::Cow;
use std::sync::{Arc, Mutex};
use tracing::warn;

use crate::application::Application;
use crate::config::Config;
use crate::kubernetes::{AccountPool, KUBERNETES_PROVIDER};
use crate::progress::{ProgressUpdate, create_spinner};
use crate::search::{AccountDirectory, KindSearchService, SearchState};
use crate::selector::record::parse_manifest_name;
use crate::selector::{OnChange, Selector, SelectorController, SelectorMode};

use super::args::Args;

// Editing commands with their help lines
const COMMANDS: &[(&str, &str)] = &[
    ("show", "Show the current selector"),
    ("mode", "Switch mode: mode static | mode dynamic"),
    ("account", "Select the account: account <name>"),
    ("namespace", "Select the namespace: namespace <ns>"),
    ("kind", "Select the resource kind: kind <Kind>"),
    ("name", "Pick a resource name (static mode): name <name>"),
    ("cluster", "Pick a cluster (dynamic mode): cluster <name>"),
    ("criteria", "Set resolution criteria (dynamic mode): criteria <value>"),
    ("candidates", "List candidate names for the current triple"),
    ("accounts", "List known accounts"),
    ("help", "Show this help"),
    ("clear", "Clear the screen"),
    ("quit", "Exit the session"),
];

// Common resolution criteria offered for completion (free-form values are accepted)
const CRITERIA: &[&str] = &["oldest", "newest", "largest", "smallest", "second_newest"];

/// Completion values shared between the command loop and the line editor
#[derive(Default)]
struct CompletionData {
    accounts: Vec<String>,
    namespaces: Vec<String>,
    kinds: Vec<String>,
    candidates: Vec<String>,
    clusters: Vec<String>,
}

struct PickHelper {
    data: Arc<Mutex<CompletionData>>,
}

impl Helper for PickHelper {}

impl Hinter for PickHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<Self::Hint> {
        None
    }
}

impl Validator for PickHelper {
    fn validate(&self, _ctx: &mut ValidationContext<'_>) -> rustyline::Result<ValidationResult> {
        Ok(ValidationResult::Valid(None))
    }
}

impl Completer for PickHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line_to_cursor = &line[..pos];

        let word_start = line_to_cursor
            .rfind(|c: char| c.is_whitespace())
            .map(|i| i + 1)
            .unwrap_or(0);
        let prefix = &line_to_cursor[word_start..];

        let data = self.data.lock().unwrap();
        let pool: Vec<&str> = if word_start == 0 {
            COMMANDS.iter().map(|(cmd, _)| *cmd).collect()
        } else {
            match line_to_cursor.split_whitespace().next().unwrap_or("") {
                "mode" => vec!["static", "dynamic"],
                "account" => data.accounts.iter().map(String::as_str).collect(),
                "namespace" | "ns" => data.namespaces.iter().map(String::as_str).collect(),
                "kind" => data.kinds.iter().map(String::as_str).collect(),
                "name" => data.candidates.iter().map(String::as_str).collect(),
                "cluster" => data.clusters.iter().map(String::as_str).collect(),
                "criteria" => CRITERIA.to_vec(),
                _ => Vec::new(),
            }
        };

        let matches: Vec<Pair> = pool
            .iter()
            .filter(|value| value.starts_with(prefix) && !value.is_empty())
            .map(|value| Pair {
                display: value.to_string(),
                replacement: value.to_string(),
            })
            .collect();

        Ok((word_start, matches))
    }
}

impl Highlighter for PickHelper {
    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        _default: bool,
    ) -> Cow<'b, str> {
        Cow::Owned(format!("\x1b[1;32m{}\x1b[0m", prompt))
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        false
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "{} {} - Pick Kubernetes manifest deploy targets",
        style("k8pick").cyan().bold(),
        style(format!("v{}", version)).dim()
    );
    println!(
        "{}",
        style("Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>").dim()
    );
    println!(
        "{}",
        style("Type 'help' for commands, Ctrl+D to exit").dim()
    );
    println!();
}

fn print_help() {
    let help_style = Style::new().cyan();
    let cmd_style = Style::new().yellow();

    println!("{}", help_style.apply_to("Commands:"));
    for (cmd, desc) in COMMANDS {
        println!("  {:<12} - {}", cmd_style.apply_to(*cmd), desc);
    }
    println!();
    println!("{}", help_style.apply_to("Notes:"));
    println!("  - account and namespace accept ${{...}} expressions, resolved at runtime");
    println!("  - switching mode migrates the kind between the two representations");
    println!();
}

fn selector_table(controller: &SelectorController, search: &SearchState) -> Table {
    let selector = controller.selector();
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("field").fg(Color::Yellow),
        Cell::new("value").fg(Color::Yellow),
    ]);

    let or_none = |value: &str| {
        if value.is_empty() {
            "(none)".to_string()
        } else {
            value.to_string()
        }
    };

    table.add_row(vec!["mode".to_string(), selector.mode.as_str().to_string()]);
    table.add_row(vec!["account".to_string(), or_none(&selector.account)]);
    table.add_row(vec![
        "namespace".to_string(),
        or_none(selector.location.as_deref().unwrap_or_default()),
    ]);
    table.add_row(vec![
        "kind".to_string(),
        or_none(controller.current_kind().as_deref().unwrap_or_default()),
    ]);

    match selector.mode {
        SelectorMode::Static => {
            let name = parse_manifest_name(&selector.manifest_name).name;
            table.add_row(vec!["name".to_string(), or_none(&name)]);
            table.add_row(vec![
                "manifest name".to_string(),
                selector.manifest_name.clone(),
            ]);
        }
        SelectorMode::Dynamic => {
            table.add_row(vec!["cluster".to_string(), or_none(&selector.cluster)]);
            table.add_row(vec!["criteria".to_string(), or_none(&selector.criteria)]);
        }
    }

    let candidates = if search.loading {
        "(loading...)".to_string()
    } else {
        format!("{} known", search.candidates.len())
    };
    table.add_row(vec!["candidates".to_string(), candidates]);

    table
}

fn print_candidates(search: &SearchState) {
    if let Some(error) = &search.last_error {
        println!(
            "{} {}",
            style("Last search failed:").red().bold(),
            style(error).red()
        );
    }
    if search.candidates.is_empty() {
        println!("{}", style("(no candidates)").dim());
        return;
    }
    for name in &search.candidates {
        if name.is_empty() {
            continue;
        }
        let marker = if search.selected.as_deref() == Some(name.as_str()) {
            style("*").green().bold().to_string()
        } else {
            " ".to_string()
        };
        println!(" {} {}", marker, name);
    }
}

fn print_search_summary(search: &SearchState) {
    match &search.last_error {
        Some(error) => println!(
            "{} {}",
            style("Search failed:").red().bold(),
            style(error).red()
        ),
        None => println!(
            "{}",
            style(format!(
                "{} candidate{}",
                search.candidates.len(),
                if search.candidates.len() == 1 { "" } else { "s" }
            ))
            .dim()
        ),
    }
}

/// Refresh the line editor's completion pools from the controller state.
async fn update_completions(data: &Arc<Mutex<CompletionData>>, controller: &SelectorController) {
    let search = controller.search_state().await;
    let mut data = data.lock().unwrap();
    data.accounts = controller.account_names();
    data.namespaces = controller.namespaces().to_vec();
    data.kinds = controller.kinds().to_vec();
    data.clusters = controller.clusters().to_vec();
    data.candidates = search
        .candidates
        .iter()
        .filter(|c| !c.is_empty())
        .cloned()
        .collect();
}

/// Wait for the in-flight candidate search behind a spinner, then print a
/// one-line summary.
async fn settle_search(controller: &mut SelectorController) -> SearchState {
    let spinner = create_spinner("Searching candidates...");
    controller.await_search().await;
    spinner.finish_and_clear();
    let search = controller.search_state().await;
    print_search_summary(&search);
    search
}

pub async fn run_repl(args: &Args, pool: Arc<AccountPool>) -> Result<()> {
    let config = Config::load().unwrap_or_default();

    let selector = Selector {
        account: args
            .account
            .clone()
            .or_else(|| config.last_account.clone())
            .unwrap_or_default(),
        location: args.namespace.clone().or_else(|| config.last_namespace.clone()),
        manifest_name: args.kind.clone().unwrap_or_default(),
        ..Default::default()
    };

    let application = match &args.app {
        Some(path) => Some(Application::from_file(std::path::Path::new(path))?),
        None => None,
    };
    let allowed_logical_kinds =
        (!args.logical_kinds.is_empty()).then(|| args.logical_kinds.clone());

    // The owner callback keeps the latest record here; it is persisted to
    // config when the session ends.
    let persisted: Arc<Mutex<Selector>> = Arc::new(Mutex::new(selector.clone()));
    let on_change: OnChange = {
        let persisted = Arc::clone(&persisted);
        Box::new(move |s: &Selector| {
            *persisted.lock().unwrap() = s.clone();
        })
    };

    // Drive the startup spinner from discovery progress events.
    let spinner = create_spinner("Discovering accounts...");
    let mut progress_rx = pool.progress().subscribe();
    let spinner_task = tokio::spawn({
        let spinner = spinner.clone();
        async move {
            while let Ok(update) = progress_rx.recv().await {
                match update {
                    ProgressUpdate::Connecting { account } => {
                        spinner.set_message(format!("Connecting to {}...", account));
                    }
                    ProgressUpdate::Discovering { account } => {
                        spinner.set_message(format!("Discovering {}...", account));
                    }
                    _ => {}
                }
            }
        }
    });

    let progress = Arc::clone(pool.progress());
    let directory: Arc<dyn AccountDirectory> = pool.clone();
    let service: Arc<dyn KindSearchService> = pool.clone();
    let mut controller = SelectorController::new(
        selector,
        KUBERNETES_PROVIDER,
        directory,
        service,
        progress,
        application,
        allowed_logical_kinds,
        on_change,
    )
    .await?;
    spinner.finish_and_clear();
    spinner_task.abort();

    // With a single known account and none preselected, select it outright.
    if controller.selector().account.is_empty() {
        let names = controller.account_names();
        if let [only] = names.as_slice() {
            let only = only.clone();
            controller.set_account(&only).await;
        }
    }

    let completion_data: Arc<Mutex<CompletionData>> = Arc::new(Mutex::new(CompletionData::default()));
    update_completions(&completion_data, &controller).await;

    let helper = PickHelper {
        data: Arc::clone(&completion_data),
    };
    let rl_config = rustyline::Config::builder()
        .auto_add_history(true)
        .max_history_size(1000)?
        .build();
    let mut rl: Editor<PickHelper, DefaultHistory> = Editor::with_config(rl_config)?;
    rl.set_helper(Some(helper));

    let history_path = dirs::home_dir()
        .map(|p| p.join(".k8pick_history"))
        .unwrap_or_else(|| ".k8pick_history".into());
    let _ = rl.load_history(&history_path);

    print_welcome();

    loop {
        let prompt = format!("{}> ", style("k8pick").green().bold());

        match rl.readline(&prompt) {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }

                let (command, arg) = match input.split_once(char::is_whitespace) {
                    Some((command, rest)) => (command, rest.trim()),
                    None => (input, ""),
                };

                match command.to_lowercase().as_str() {
                    "quit" | "exit" | "\\q" => {
                        println!("{}", style("Goodbye!").dim());
                        break;
                    }
                    "help" | "\\?" => {
                        print_help();
                        continue;
                    }
                    "clear" | "\\c" => {
                        print!("\x1B[2J\x1B[1;1H");
                        continue;
                    }
                    "show" => {
                        let search = controller.search_state().await;
                        println!("{}", selector_table(&controller, &search));
                    }
                    "mode" => match arg {
                        "static" => {
                            controller.set_mode(SelectorMode::Static).await;
                            println!("{}", style("Mode: static").dim());
                        }
                        "dynamic" => {
                            controller.set_mode(SelectorMode::Dynamic).await;
                            println!("{}", style("Mode: dynamic").dim());
                        }
                        _ => println!(
                            "{} usage: mode static | mode dynamic",
                            style("Error:").red().bold()
                        ),
                    },
                    "account" => {
                        if arg.is_empty() {
                            println!("{} usage: account <name>", style("Error:").red().bold());
                        } else {
                            controller.set_account(arg).await;
                            settle_search(&mut controller).await;
                        }
                    }
                    "namespace" | "ns" => {
                        if arg.is_empty() {
                            println!("{} usage: namespace <ns>", style("Error:").red().bold());
                        } else {
                            controller.set_namespace(arg).await;
                            settle_search(&mut controller).await;
                        }
                    }
                    "kind" => {
                        if arg.is_empty() {
                            println!("{} usage: kind <Kind>", style("Error:").red().bold());
                        } else {
                            controller.set_kind(arg).await;
                            settle_search(&mut controller).await;
                        }
                    }
                    "name" => {
                        if controller.selector().mode != SelectorMode::Static {
                            println!(
                                "{} names are picked in static mode (see: mode static)",
                                style("Error:").red().bold()
                            );
                        } else {
                            controller.set_name(arg).await;
                        }
                    }
                    "cluster" => {
                        if controller.selector().mode != SelectorMode::Dynamic {
                            println!(
                                "{} clusters are picked in dynamic mode (see: mode dynamic)",
                                style("Error:").red().bold()
                            );
                        } else {
                            controller.set_cluster(arg);
                        }
                    }
                    "criteria" => {
                        if controller.selector().mode != SelectorMode::Dynamic {
                            println!(
                                "{} criteria apply in dynamic mode (see: mode dynamic)",
                                style("Error:").red().bold()
                            );
                        } else {
                            controller.set_criteria(arg);
                        }
                    }
                    "candidates" => {
                        let search = settle_search(&mut controller).await;
                        print_candidates(&search);
                    }
                    "accounts" => {
                        for name in controller.account_names() {
                            let marker = if name == controller.selector().account {
                                style("*").green().bold().to_string()
                            } else {
                                " ".to_string()
                            };
                            println!(" {} {}", marker, name);
                        }
                    }
                    _ => {
                        println!(
                            "{} unknown command '{}' (try 'help')",
                            style("Error:").red().bold(),
                            command
                        );
                    }
                }

                update_completions(&completion_data, &controller).await;
                println!();
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", style("^C").dim());
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("{}", style("Goodbye!").dim());
                break;
            }
            Err(err) => {
                println!("{} {:?}", style("Error:").red().bold(), err);
                break;
            }
        }
    }

    // End the editing session: no further search completion may land.
    controller.close();

    let final_selector = persisted.lock().unwrap().clone();
    let updated = Config {
        last_account: (!final_selector.account.is_empty()).then(|| final_selector.account.clone()),
        last_namespace: final_selector.location.clone(),
    };
    if let Err(e) = updated.save() {
        warn!(error = %e, "Failed to save config");
    }

    let _ = rl.save_history(&history_path);

    Ok(())
}
