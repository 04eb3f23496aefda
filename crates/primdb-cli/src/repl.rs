//! Interactive REPL (Read-Eval-Print-Loop) for primdb.
//!
//! Provides an interactive shell with command history, line editing, and
//! completion of command keywords and table names.

use std::borrow::Cow;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Config, EditMode, Editor, Helper};
use tracing::{debug, error};

use primdb_sql::storage::Persistence;
use primdb_sql::{Command, Parser, Session, StatementResult};

use crate::config::CliConfig;
use crate::formatter::{self, OutputFormat};

/// The REPL prompt shown when waiting for input.
const PROMPT: &str = "primdb> ";

/// Command keywords offered for completion.
const KEYWORDS: &[&str] = &[
    "insert",
    "into",
    "values",
    "select",
    "from",
    "where",
    "update",
    "set",
    "delete",
    "info",
    "list_tables",
    "create_table",
    "drop_table",
    "help",
    "exit",
    "true",
    "false",
];

/// REPL helper for rustyline.
struct ReplHelper {
    /// Table names, refreshed after every command.
    tables: Vec<String>,
}

impl ReplHelper {
    fn new() -> Self {
        Self { tables: Vec::new() }
    }
}

impl Completer for ReplHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        // Find the word being typed
        let start = line[..pos]
            .rfind(|c: char| c.is_whitespace() || c == '(' || c == ',')
            .map(|i| i + 1)
            .unwrap_or(0);

        let word = &line[start..pos];
        let word_lower = word.to_lowercase();

        let keywords = KEYWORDS
            .iter()
            .filter(|kw| kw.starts_with(&word_lower))
            .map(|kw| kw.to_string());
        let tables = self
            .tables
            .iter()
            .filter(|name| name.starts_with(word))
            .cloned();

        let matches: Vec<Pair> = keywords
            .chain(tables)
            .map(|candidate| Pair {
                display: candidate.clone(),
                replacement: candidate,
            })
            .collect();

        Ok((start, matches))
    }
}

impl Hinter for ReplHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &rustyline::Context<'_>) -> Option<Self::Hint> {
        None
    }
}

impl Highlighter for ReplHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Borrowed(line)
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        false
    }
}

impl Validator for ReplHelper {}

impl Helper for ReplHelper {}

/// What the caller should do after a line was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line.
    Continue,
    /// End the session.
    Exit,
}

/// Runs commands against a session and prints their results.
///
/// Used directly for `-c` and `-f`, and wrapped by [`Repl`] for
/// interactive use.
pub struct Runner<P: Persistence> {
    /// The database session.
    session: Session<P>,
    /// Output format.
    format: OutputFormat,
    /// Timing mode enabled.
    timing: bool,
    /// Ask before destructive commands.
    confirm: bool,
}

impl<P: Persistence> Runner<P> {
    /// Creates a runner. Confirmation is off until
    /// [`with_confirmation`](Self::with_confirmation) turns it on.
    pub fn new(session: Session<P>, format: OutputFormat, timing: bool) -> Self {
        Self {
            session,
            format,
            timing,
            confirm: false,
        }
    }

    /// Enables or disables confirmation of `delete` and `drop_table`.
    pub fn with_confirmation(mut self, confirm: bool) -> Self {
        self.confirm = confirm;
        self
    }

    /// Returns the session.
    pub fn session(&self) -> &Session<P> {
        &self.session
    }

    /// Parses, confirms, executes, and prints one line.
    ///
    /// Command errors are printed and do not stop the runner.
    pub fn execute_and_print(&mut self, line: &str) -> Flow {
        let command = match Parser::parse(line) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("Error: {e}");
                return Flow::Continue;
            }
        };

        if self.confirm && command.is_destructive() && !confirm_action(&command, line) {
            println!("Operation cancelled.");
            return Flow::Continue;
        }

        let start = Instant::now();
        match self.session.execute_command(command) {
            Ok(result) => {
                let elapsed = start.elapsed();
                self.print_result(&result, elapsed);
                if result.is_exit() {
                    Flow::Exit
                } else {
                    Flow::Continue
                }
            }
            Err(e) => {
                eprintln!("Error: {e}");
                Flow::Continue
            }
        }
    }

    /// Prints a command result.
    fn print_result(&self, result: &StatementResult, elapsed: Duration) {
        if !result.is_exit() {
            println!("{}", formatter::format_statement(result, self.format));
        }

        if self.timing {
            println!("Time: {:.3}ms", elapsed.as_secs_f64() * 1000.0);
        }
    }
}

/// Asks `Are you sure you want to perform "<action>"? [y/n]:` on stdin.
fn confirm_action(command: &Command, line: &str) -> bool {
    debug!(command = command.name(), "asking for confirmation");
    print!("Are you sure you want to perform \"{}\"? [y/n]: ", line.trim());
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => is_yes(&answer),
        Err(_) => false,
    }
}

fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

/// Interactive REPL for primdb.
pub struct Repl<P: Persistence> {
    /// Command runner.
    runner: Runner<P>,
    /// The rustyline editor.
    editor: Editor<ReplHelper, DefaultHistory>,
    /// History file path.
    history_file: Option<PathBuf>,
}

impl<P: Persistence> Repl<P> {
    /// Creates a new REPL instance.
    pub fn new(session: Session<P>, config: &CliConfig, format: OutputFormat) -> Result<Self> {
        let rl_config = Config::builder()
            .history_ignore_space(true)
            .completion_type(CompletionType::List)
            .edit_mode(EditMode::Emacs)
            .max_history_size(config.history_size)?
            .build();

        let mut editor = Editor::with_config(rl_config)?;
        editor.set_helper(Some(ReplHelper::new()));

        let history_file = config.history_path();
        if let Some(ref path) = history_file {
            if path.exists() {
                if let Err(e) = editor.load_history(path) {
                    debug!("Failed to load history: {}", e);
                }
            }
        }

        let runner = Runner::new(session, format, config.timing)
            .with_confirmation(config.confirm_destructive);

        Ok(Self {
            runner,
            editor,
            history_file,
        })
    }

    /// Prints the welcome banner.
    pub fn print_banner(&self) {
        println!("primdb v{}", env!("CARGO_PKG_VERSION"));
        println!("Type help for the list of commands, exit to quit.\n");
    }

    /// Runs the main REPL loop.
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.refresh_tables();

            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();

                    if line.is_empty() {
                        continue;
                    }

                    if let Err(e) = self.editor.add_history_entry(line) {
                        debug!("Failed to add history entry: {}", e);
                    }

                    if self.runner.execute_and_print(line) == Flow::Exit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    // Cancel current input but don't exit
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(e) => {
                    error!("Readline error: {}", e);
                    break;
                }
            }
        }

        self.save_history();
        debug!(
            statements = self.runner.session().statement_count(),
            cache = %self.runner.session().cache_stats(),
            "session finished"
        );

        println!("Goodbye!");
        Ok(())
    }

    fn refresh_tables(&mut self) {
        let tables = self.runner.session().catalog().list_tables();
        if let Some(helper) = self.editor.helper_mut() {
            helper.tables = tables;
        }
    }

    /// Saves command history.
    fn save_history(&mut self) {
        if let Some(ref path) = self.history_file {
            if let Some(parent) = path.parent() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    debug!("Failed to create history dir: {}", e);
                    return;
                }
            }
            if let Err(e) = self.editor.save_history(path) {
                debug!("Failed to save history: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use primdb_sql::storage::MemoryStore;

    fn runner() -> Runner<MemoryStore> {
        Runner::new(Session::in_memory(), OutputFormat::Raw, false)
    }

    #[test]
    fn test_runner_keeps_going_after_errors() {
        let mut runner = runner();
        assert_eq!(runner.execute_and_print("bogus"), Flow::Continue);
        assert_eq!(runner.execute_and_print("select from nope"), Flow::Continue);
        assert_eq!(runner.execute_and_print("create_table t n:int"), Flow::Continue);
        assert!(runner.session().catalog().contains("t"));
        assert_eq!(runner.execute_and_print("exit"), Flow::Exit);
    }

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" Y "));
        assert!(!is_yes("yes"));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
    }

    #[test]
    fn test_completion_candidates() {
        let mut helper = ReplHelper::new();
        helper.tables = vec!["users".to_string(), "orders".to_string()];
        let history = DefaultHistory::new();
        let ctx = rustyline::Context::new(&history);

        let (start, pairs) = helper.complete("sel", 3, &ctx).unwrap();
        assert_eq!(start, 0);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].replacement, "select");

        let (start, pairs) = helper.complete("select from us", 14, &ctx).unwrap();
        assert_eq!(start, 12);
        let names: Vec<&str> = pairs.iter().map(|p| p.replacement.as_str()).collect();
        assert_eq!(names, vec!["users"]);
    }
}
