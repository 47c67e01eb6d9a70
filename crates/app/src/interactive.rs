use crate::print_results;
use resume_match_core::{HttpRankingService, MatchConsole, DEFAULT_EXPORT_FILE_NAME};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

const HELP: &str = "\
Paste the job description, then use:
  :analyze              rank resumes against the description
  :top N                show the top N matches (1-20), no new request
  :analysis on|off      include detailed analysis in the next request
  :export [path]        write the results as text
  :fetch <file> <dest>  download a matched resume
  :show                 print the current results
  :clear                start a new description
  :help                 this message
  :quit                 leave
Start a description line with '::' to keep a leading ':' as text.";

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Text(String),
    Analyze,
    Top(usize),
    Analysis(bool),
    Export(Option<PathBuf>),
    Fetch { file_name: String, output: PathBuf },
    Show,
    Clear,
    Help,
    Quit,
    Invalid(String),
}

pub fn parse_line(line: &str) -> Input {
    let trimmed = line.trim();
    if trimmed.starts_with("::") {
        return Input::Text(line.replacen("::", ":", 1));
    }
    let Some(command) = trimmed.strip_prefix(':') else {
        return Input::Text(line.to_string());
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    match (name, args.as_slice()) {
        ("analyze" | "a", []) => Input::Analyze,
        ("top", [count]) => match count.parse::<usize>() {
            Ok(count) => Input::Top(count),
            Err(_) => Input::Invalid(format!("not a number: {count}")),
        },
        ("analysis", ["on"]) => Input::Analysis(true),
        ("analysis", ["off"]) => Input::Analysis(false),
        ("export", []) => Input::Export(None),
        ("export", [path]) => Input::Export(Some(PathBuf::from(path))),
        ("fetch", [file_name, output]) => Input::Fetch {
            file_name: file_name.to_string(),
            output: PathBuf::from(output),
        },
        ("show", []) => Input::Show,
        ("clear", []) => Input::Clear,
        ("help" | "h", []) => Input::Help,
        ("quit" | "q" | "exit", []) => Input::Quit,
        _ => Input::Invalid(format!("unknown command: {trimmed}")),
    }
}

pub async fn run(console: &mut MatchConsole<HttpRankingService>) -> anyhow::Result<()> {
    println!("{} console. Type :help for commands.", console.config().product_name);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut description = String::new();

    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            Input::Text(text) => {
                if !description.is_empty() {
                    description.push('\n');
                }
                description.push_str(&text);
                console.set_description(description.clone());
            }
            Input::Analyze => {
                if !console.can_submit() {
                    println!("a request is already running");
                    continue;
                }
                println!("Analyzing resumes... please wait");
                let query = console.query().clone();
                let outcome = console.submit(query).await.map(|_| ());
                match outcome {
                    Ok(()) => print_results(console),
                    Err(error) => println!("error: {}", error.display_message()),
                }
            }
            Input::Top(count) => {
                console.set_visible_count(count);
                debug!(top_n = console.query().top_n, "visible count changed");
                if console.result_set().is_some() {
                    print_results(console);
                } else {
                    println!("top N set to {}", console.query().top_n);
                }
            }
            Input::Analysis(enabled) => {
                console.set_include_analysis(enabled);
                println!(
                    "detailed analysis {}",
                    if enabled { "enabled" } else { "disabled" }
                );
            }
            Input::Export(path) => {
                if !console.can_export() {
                    println!("no results available");
                    continue;
                }
                let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_FILE_NAME));
                match console.export_to(&path).await {
                    Ok(()) => println!("results written to {}", path.display()),
                    Err(error) => println!("error: {error}"),
                }
            }
            Input::Fetch { file_name, output } => {
                match console.service().fetch_resume(&file_name).await {
                    Ok(bytes) => match tokio::fs::write(&output, &bytes).await {
                        Ok(()) => println!("{} bytes written to {}", bytes.len(), output.display()),
                        Err(error) => println!("error: {error}"),
                    },
                    Err(error) => println!("error: {}", error.display_message()),
                }
            }
            Input::Show => {
                if let Some(message) = console.error_message() {
                    println!("error: {message}");
                }
                print_results(console);
            }
            Input::Clear => {
                description.clear();
                console.set_description(String::new());
                println!("description cleared");
            }
            Input::Help => println!("{HELP}"),
            Input::Quit => break,
            Input::Invalid(message) => println!("{message} (:help lists commands)"),
        }
    }

    Ok(())
}
