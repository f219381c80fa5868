//! Command parsing and dispatch for the interactive todo shell.

use thiserror::Error;
use todo_core::{Field, TodoView, ViewError};
use uuid::Uuid;

use crate::transport::{Exchange, TransportError};

pub const HELP: &str = "\
commands:
  list                      show the table
  reload                    fetch the list from the server again
  new <field> <value>       fill the add form (title, description, deadline)
  add                       submit the add form
  edit <row>                edit a row in place
  set <field> <value>       change the row being edited
  save | cancel             finish editing
  done <row>                toggle completed
  delete <row>              delete a row
  help | quit

deadline format: YYYY-MM-DDTHH:MM or YYYY-MM-DDTHH:MM:SS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Reload,
    New(Field, String),
    Add,
    Edit(usize),
    Set(Field, String),
    Save,
    Cancel,
    Done(usize),
    Delete(usize),
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}`, try `help`")]
    Unknown(String),
    #[error("`{0}` needs {1}")]
    MissingArgument(&'static str, &'static str),
    #[error("{0}")]
    BadArgument(String),
}

fn row_arg(name: &'static str, arg: Option<&str>) -> Result<usize, ParseError> {
    let raw = arg.ok_or(ParseError::MissingArgument(name, "a row number"))?;
    raw.parse()
        .map_err(|_| ParseError::BadArgument(format!("`{raw}` is not a row number")))
}

fn field_arg(name: &'static str, rest: &str) -> Result<(Field, String), ParseError> {
    let (field, value) = rest
        .split_once(char::is_whitespace)
        .map(|(f, v)| (f, v.trim()))
        .unwrap_or((rest, ""));
    if field.is_empty() {
        return Err(ParseError::MissingArgument(name, "a field and a value"));
    }
    let field = field.parse().map_err(ParseError::BadArgument)?;
    Ok((field, value.to_string()))
}

pub fn parse_command(line: &str) -> Result<Command, ParseError> {
    let line = line.trim();
    let (verb, rest) = line
        .split_once(char::is_whitespace)
        .map(|(v, r)| (v, r.trim()))
        .unwrap_or((line, ""));
    let arg = Some(rest).filter(|r| !r.is_empty());

    match verb.to_ascii_lowercase().as_str() {
        "" => Err(ParseError::Empty),
        "list" | "ls" => Ok(Command::List),
        "reload" => Ok(Command::Reload),
        "new" => field_arg("new", rest).map(|(f, v)| Command::New(f, v)),
        "add" => Ok(Command::Add),
        "edit" => row_arg("edit", arg).map(Command::Edit),
        "set" => field_arg("set", rest).map(|(f, v)| Command::Set(f, v)),
        "save" => Ok(Command::Save),
        "cancel" => Ok(Command::Cancel),
        "done" => row_arg("done", arg).map(Command::Done),
        "delete" | "rm" => row_arg("delete", arg).map(Command::Delete),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(ParseError::Unknown(other.to_string())),
    }
}

#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("no row {0}")]
    NoSuchRow(usize),
    #[error(transparent)]
    View(#[from] ViewError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// What the caller should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Show(String),
    Quit,
}

/// Drives a `TodoView` with one blocking request per action.
pub struct Shell<E> {
    view: TodoView,
    exchange: E,
}

impl<E: Exchange> Shell<E> {
    pub fn new(view: TodoView, exchange: E) -> Self {
        Self { view, exchange }
    }

    pub fn view(&self) -> &TodoView {
        &self.view
    }

    /// Initial fetch of the list.
    pub fn mount(&mut self) -> Result<(), ShellError> {
        let response = self.exchange.execute(self.view.mount())?;
        self.view.apply_list(response)?;
        Ok(())
    }

    fn row(&self, row: usize) -> Result<Uuid, ShellError> {
        self.view.row_id(row).ok_or(ShellError::NoSuchRow(row))
    }

    pub fn run_line(&mut self, line: &str) -> Result<Reply, ShellError> {
        let command = parse_command(line)?;
        self.handle(command)
    }

    pub fn handle(&mut self, command: Command) -> Result<Reply, ShellError> {
        match command {
            Command::List => {}
            Command::Reload => self.mount()?,
            Command::New(field, value) => self.view.set_draft(field, value),
            Command::Add => {
                let req = self.view.submit_draft()?;
                let response = self.exchange.execute(req)?;
                self.view.apply_created(response)?;
            }
            Command::Edit(row) => {
                let id = self.row(row)?;
                self.view.toggle_edit(id);
            }
            Command::Set(field, value) => self.view.set_edit(field, value)?,
            Command::Save => {
                let req = self.view.save_edit()?;
                let response = self.exchange.execute(req)?;
                self.view.apply_updated(response)?;
            }
            Command::Cancel => self.view.cancel_edit(),
            Command::Done(row) => {
                let id = self.row(row)?;
                let req = self.view.toggle_completed(id)?;
                let response = self.exchange.execute(req)?;
                self.view.apply_updated(response)?;
            }
            Command::Delete(row) => {
                let id = self.row(row)?;
                let response = self.exchange.execute(self.view.delete(id))?;
                self.view.apply_deleted(id, response)?;
            }
            Command::Help => return Ok(Reply::Show(HELP.to_string())),
            Command::Quit => return Ok(Reply::Quit),
        }
        Ok(Reply::Show(self.view.render()))
    }
}
