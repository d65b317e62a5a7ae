//! Interactive survey session.
//!
//! A session owns the room store for its lifetime and processes one command
//! line at a time: adding and editing rooms through the form, deleting them,
//! and printing the table and charts.

use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::rc::Rc;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{Config, OutputFormat};
use crate::error::{Error, Result};
use crate::form::{FormData, RoomEditor, SubmissionHandler, ValidationError};
use crate::room::{Field, RequiredPolicy, Room, RoomId};
use crate::store::RoomStore;
use crate::view::{ChartView, Projector, TableView};

/// Command reference printed by `help`.
pub const HELP: &str = "\
Commands:
  add key=value ...            record a room (quote values with spaces)
  edit <id> [key=value ...]    change a room; 'key=' clears a value
  delete <id>                  remove a room
  table                        print the rooms table
  chart                        print the signal and speed charts
  show                         print table and charts
  json                         print the whole session as JSON
  fields                       list form fields
  help                         show this message
  quit                         end the session

Fields: room, signalLevel24, signalLevel5, speed24, speed5, interference
Ids may be shortened to any unique prefix.";

fn token_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| {
        Regex::new(
            r#"(?x)
            (?P<key>[A-Za-z][A-Za-z0-9_]*)=(?:"(?P<quoted>[^"]*)"|(?P<bare>[^\s"]*))
            | "(?P<qword>[^"]*)"
            | (?P<word>[^\s"]+)
            "#,
        )
        .expect("token pattern is valid")
    })
}

/// One lexical token of a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Pair(String, String),
}

fn tokenize(command: &'static str, line: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut last = 0;
    for caps in token_regex().captures_iter(line) {
        let Some(whole) = caps.get(0) else { continue };
        let gap = line[last..whole.start()].trim();
        if gap.contains('"') {
            return Err(Error::invalid_argument(
                command,
                format!("unterminated quote in '{}'", line[last..].trim()),
            ));
        }
        if !gap.is_empty() {
            return Err(Error::invalid_argument(
                command,
                format!("unexpected input near '{gap}'"),
            ));
        }
        last = whole.end();

        let token = if let Some(key) = caps.name("key") {
            let value = caps
                .name("quoted")
                .or_else(|| caps.name("bare"))
                .map_or("", |m| m.as_str());
            Token::Pair(key.as_str().to_string(), value.to_string())
        } else {
            let word = caps
                .name("qword")
                .or_else(|| caps.name("word"))
                .map_or("", |m| m.as_str());
            Token::Word(word.to_string())
        };
        tokens.push(token);
    }

    let rest = &line[last..];
    if !rest.trim().is_empty() {
        return Err(Error::invalid_argument(
            command,
            format!("unterminated quote in '{}'", rest.trim()),
        ));
    }
    Ok(tokens)
}

fn field_pairs(command: &'static str, tokens: &[Token]) -> Result<Vec<(Field, String)>> {
    tokens
        .iter()
        .map(|token| match token {
            Token::Pair(key, value) => Field::from_key(key)
                .map(|field| (field, value.clone()))
                .ok_or_else(|| Error::invalid_argument(command, format!("unknown field '{key}'"))),
            Token::Word(word) => Err(Error::invalid_argument(
                command,
                format!("expected key=value, got '{word}'"),
            )),
        })
        .collect()
}

fn no_arguments(command: &'static str, tokens: &[Token]) -> Result<()> {
    if tokens.is_empty() {
        Ok(())
    } else {
        Err(Error::invalid_argument(command, "takes no arguments"))
    }
}

fn single_word(command: &'static str, tokens: &[Token]) -> Result<String> {
    match tokens {
        [Token::Word(word)] => Ok(word.clone()),
        [] => Err(Error::invalid_argument(command, "missing room id")),
        _ => Err(Error::invalid_argument(command, "expected a single room id")),
    }
}

/// A parsed session command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Submit a new room.
    Add(Vec<(Field, String)>),
    /// Edit an existing room, overriding some values.
    Edit {
        /// Id or id prefix of the room.
        target: String,
        /// Values replacing the room's current ones.
        overrides: Vec<(Field, String)>,
    },
    /// Remove a room.
    Delete(String),
    /// Print the table.
    Table,
    /// Print the charts.
    Chart,
    /// Print table and charts.
    Show,
    /// Print everything as JSON.
    Json,
    /// List form fields.
    Fields,
    /// Print the command reference.
    Help,
    /// End the session.
    Quit,
}

impl SessionCommand {
    /// Parse one line. Blank lines and `#` comments yield `None`.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown commands and malformed arguments.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let command = match name {
            "add" => {
                let tokens = tokenize("add", rest)?;
                Self::Add(field_pairs("add", &tokens)?)
            }
            "edit" => {
                let tokens = tokenize("edit", rest)?;
                let Some((Token::Word(target), overrides)) = tokens.split_first() else {
                    return Err(Error::invalid_argument("edit", "missing room id"));
                };
                Self::Edit {
                    target: target.clone(),
                    overrides: field_pairs("edit", overrides)?,
                }
            }
            "delete" | "rm" => Self::Delete(single_word("delete", &tokenize("delete", rest)?)?),
            "table" => Self::no_args("table", rest, Self::Table)?,
            "chart" => Self::no_args("chart", rest, Self::Chart)?,
            "show" => Self::no_args("show", rest, Self::Show)?,
            "json" => Self::no_args("json", rest, Self::Json)?,
            "fields" => Self::no_args("fields", rest, Self::Fields)?,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(Error::UnknownCommand(other.to_string())),
        };
        Ok(Some(command))
    }

    fn no_args(name: &'static str, rest: &str, command: Self) -> Result<Self> {
        no_arguments(name, &tokenize(name, rest)?)?;
        Ok(command)
    }
}

/// Whether the session should keep reading commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next command.
    Continue,
    /// Stop.
    Quit,
}

/// Counters reported when a session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    /// Commands executed, including rejected ones.
    pub commands: usize,
    /// Submissions rejected by validation.
    pub rejected: usize,
    /// Malformed commands.
    pub errors: usize,
    /// Rooms in the store at the end.
    pub rooms: usize,
    /// Final store revision.
    pub revision: u64,
}

#[derive(Serialize)]
struct SessionDump<'a> {
    revision: u64,
    rooms: &'a [Room],
    table: &'a TableView,
    charts: &'a ChartView,
}

/// A survey session writing its output to `W`.
#[derive(Debug)]
pub struct Session<W> {
    store: RoomStore,
    editor: RoomEditor,
    projector: Rc<RefCell<Projector>>,
    policy: RequiredPolicy,
    format: OutputFormat,
    render_on_change: bool,
    prompt: bool,
    summary: SessionSummary,
    out: W,
}

impl<W: Write> Session<W> {
    /// Start an empty session configured from `config`.
    #[must_use]
    pub fn new(config: &Config, out: W) -> Self {
        let policy = config.form.required_policy;
        let projector = Rc::new(RefCell::new(Projector::from_config(config)));
        let mut store = RoomStore::new();
        store.subscribe(Box::new(Rc::clone(&projector)));

        debug!(%policy, "Starting session");
        Self {
            store,
            editor: RoomEditor::new(SubmissionHandler::new(policy)),
            projector,
            policy,
            format: config.output.format,
            render_on_change: config.output.render_on_change,
            prompt: false,
            summary: SessionSummary::default(),
            out,
        }
    }

    /// Print a prompt before each command.
    #[must_use]
    pub fn with_prompt(mut self, prompt: bool) -> Self {
        self.prompt = prompt;
        self
    }

    /// The room store.
    #[must_use]
    pub fn store(&self) -> &RoomStore {
        &self.store
    }

    /// The output sink.
    #[must_use]
    pub fn output(&self) -> &W {
        &self.out
    }

    /// Consume the session, returning the output sink.
    pub fn into_output(self) -> W {
        self.out
    }

    /// Process every line of `input` until it ends or `quit` is read.
    ///
    /// Rejected submissions and malformed commands are reported on the
    /// output and do not stop the session.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input or writing output fails.
    pub fn run<R: BufRead>(&mut self, input: R) -> Result<SessionSummary> {
        self.write_prompt()?;
        for line in input.lines() {
            let line = line?;
            if self.execute_line(&line)? == Flow::Quit {
                break;
            }
            self.write_prompt()?;
        }

        self.summary.rooms = self.store.snapshot().len();
        self.summary.revision = self.store.snapshot().revision();
        info!(
            commands = self.summary.commands,
            rooms = self.summary.rooms,
            "Session ended"
        );
        Ok(self.summary)
    }

    /// Process one line, reporting command errors on the output.
    ///
    /// # Errors
    ///
    /// Returns an error only if writing output fails.
    pub fn execute_line(&mut self, line: &str) -> Result<Flow> {
        let result = SessionCommand::parse(line).and_then(|command| match command {
            Some(command) => {
                self.summary.commands += 1;
                self.execute(command)
            }
            None => Ok(Flow::Continue),
        });

        match result {
            Ok(flow) => Ok(flow),
            Err(Error::Validation(err)) => {
                self.summary.rejected += 1;
                self.write_notice(&err)?;
                Ok(Flow::Continue)
            }
            Err(err) if err.is_command_error() => {
                self.summary.errors += 1;
                writeln!(self.out, "error: {err}")?;
                Ok(Flow::Continue)
            }
            Err(err) => Err(err),
        }
    }

    /// Execute a parsed command.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for rejected submissions, a command
    /// error for unknown room ids, or an I/O error if output fails.
    pub fn execute(&mut self, command: SessionCommand) -> Result<Flow> {
        match command {
            SessionCommand::Add(values) => {
                self.editor.open_create();
                self.submit(&values)?;
            }
            SessionCommand::Edit { target, overrides } => {
                let room = self.resolve("edit", &target)?.clone();
                self.editor.open_edit(&room);
                self.submit(&overrides)?;
            }
            SessionCommand::Delete(target) => {
                let id = self.resolve("delete", &target)?.id;
                self.store.remove(id);
                self.after_change()?;
            }
            SessionCommand::Table => self.write_table()?,
            SessionCommand::Chart => self.write_charts()?,
            SessionCommand::Show => {
                self.write_table()?;
                writeln!(self.out)?;
                self.write_charts()?;
            }
            SessionCommand::Json => self.write_dump()?,
            SessionCommand::Fields => self.write_fields()?,
            SessionCommand::Help => writeln!(self.out, "{HELP}")?,
            SessionCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Fill the open form, submit it, and commit the result.
    ///
    /// The form starts from the editor's prefill; `values` override it.
    fn submit(&mut self, values: &[(Field, String)]) -> Result<()> {
        let mut form = FormData::from_values(&self.editor.prefill());
        for (field, value) in values {
            form.set(field.key(), value.clone());
        }

        match self.editor.submit(&form) {
            Ok(submission) => {
                self.store.apply(submission);
                self.after_change()
            }
            Err(err) => {
                // A command is a whole dialog interaction; abandon it
                self.editor.close();
                Err(err.into())
            }
        }
    }

    /// Find the room whose id is `target` or starts with it.
    ///
    /// Prefixes are matched with or without hyphens.
    fn resolve(&self, command: &'static str, target: &str) -> Result<&Room> {
        let target = target.trim();
        let prefix = target.to_ascii_lowercase().replace('-', "");
        if prefix.is_empty() {
            return Err(Error::invalid_argument(command, "missing room id"));
        }

        let snapshot = self.store.snapshot();
        if let Ok(id) = target.parse::<RoomId>() {
            return snapshot
                .get(id)
                .ok_or_else(|| Error::RoomNotFound(target.to_string()));
        }

        let matches: Vec<&Room> = snapshot
            .rooms()
            .iter()
            .filter(|room| room.id.to_string().replace('-', "").starts_with(&prefix))
            .collect();

        match matches.as_slice() {
            [room] => Ok(*room),
            [] => Err(Error::RoomNotFound(target.to_string())),
            _ => Err(Error::AmbiguousRoom {
                prefix: target.to_string(),
                count: matches.len(),
            }),
        }
    }

    fn after_change(&mut self) -> Result<()> {
        if self.render_on_change {
            self.write_table()?;
        }
        Ok(())
    }

    fn write_prompt(&mut self) -> Result<()> {
        if self.prompt {
            write!(self.out, "> ")?;
            self.out.flush()?;
        }
        Ok(())
    }

    fn write_notice(&mut self, err: &ValidationError) -> Result<()> {
        let notice = err.notice();
        match self.format {
            OutputFormat::Table => writeln!(self.out, "{notice}")?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, &notice)?;
                writeln!(self.out)?;
            }
        }
        Ok(())
    }

    fn write_table(&mut self) -> Result<()> {
        let projector = self.projector.borrow();
        match self.format {
            OutputFormat::Table => write!(self.out, "{}", projector.render_table())?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, projector.table())?;
                writeln!(self.out)?;
            }
        }
        Ok(())
    }

    fn write_charts(&mut self) -> Result<()> {
        let projector = self.projector.borrow();
        match self.format {
            OutputFormat::Table => write!(self.out, "{}", projector.render_charts())?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, projector.charts())?;
                writeln!(self.out)?;
            }
        }
        Ok(())
    }

    fn write_dump(&mut self) -> Result<()> {
        let projector = self.projector.borrow();
        let snapshot = self.store.snapshot();
        let dump = SessionDump {
            revision: snapshot.revision(),
            rooms: snapshot.rooms(),
            table: projector.table(),
            charts: projector.charts(),
        };
        serde_json::to_writer_pretty(&mut self.out, &dump)?;
        writeln!(self.out)?;
        Ok(())
    }

    fn write_fields(&mut self) -> Result<()> {
        write_field_list(&mut self.out, self.policy, self.format)
    }
}

/// Print the declared fields and whether `policy` requires them.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_field_list<W: Write>(
    out: &mut W,
    policy: RequiredPolicy,
    format: OutputFormat,
) -> Result<()> {
    let infos = policy.describe();
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &infos)?;
            writeln!(out)?;
        }
        OutputFormat::Table => {
            writeln!(out, "Fields ({policy})")?;
            for info in infos {
                let required = if info.required { "required" } else { "optional" };
                writeln!(out, "  {:<14} {:<9} {}", info.key, required, info.label)?;
            }
        }
    }
    Ok(())
}
