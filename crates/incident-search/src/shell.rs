//! Interactive session over stdin.
//!
//! ```text
//! isearch> sample 1
//! isearch> submit
//! severity [P2]:
//! ...
//! isearch> save
//! isearch> export
//! ```
//!
//! `submit` prompts for each form field in turn; pressing enter keeps the
//! value shown in brackets (empty, or pre-filled by `sample`).

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use incident_search_core::form;
use incident_search_core::models::FormInput;

use crate::export::ReportRenderer;
use crate::render;
use crate::session::{Session, SubmitError};

const HELP: &str = "\
commands:
  submit        fill in the form and run a search
  sample <n>    pre-fill the form with sample error n
  save          save the current search to history
  export        write a report for the current search
  clear         clear the form and the current search
  history       list saved searches
  help          show this help
  quit          leave the shell
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Submit,
    Sample(usize),
    Save,
    Export,
    Clear,
    History,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl ShellCommand {
    pub fn parse(line: &str) -> Self {
        let mut parts = line.split_whitespace();
        let Some(head) = parts.next() else {
            return ShellCommand::Empty;
        };
        match head.to_ascii_lowercase().as_str() {
            "submit" | "search" => ShellCommand::Submit,
            "sample" => match parts.next().and_then(|n| n.parse().ok()) {
                Some(n) => ShellCommand::Sample(n),
                None => ShellCommand::Unknown(line.trim().to_string()),
            },
            "save" => ShellCommand::Save,
            "export" => ShellCommand::Export,
            "clear" | "reset" => ShellCommand::Clear,
            "history" => ShellCommand::History,
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" => ShellCommand::Quit,
            _ => ShellCommand::Unknown(line.trim().to_string()),
        }
    }
}

/// Form keys in prompt order, with accessors into [`FormInput`].
fn form_fields(form: &mut FormInput) -> [(&'static str, &mut String); 6] {
    [
        ("severity", &mut form.severity),
        ("errorCode", &mut form.error_code),
        ("errorDescription", &mut form.error_description),
        ("appName", &mut form.app_name),
        ("environment", &mut form.environment),
        ("applicablePool", &mut form.applicable_pool),
    ]
}

async fn read_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(|c: char| c == '\r' || c == '\n').to_string()))
}

/// Prompt for each field, keeping the current value on an empty answer.
async fn prompt_form<R, W>(form: &mut FormInput, reader: &mut R, out: &mut W) -> Result<bool>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    for (key, value) in form_fields(form) {
        write!(out, "{} [{}]: ", key, value)?;
        out.flush()?;
        match read_line(reader).await? {
            Some(answer) if !answer.trim().is_empty() => *value = answer.trim().to_string(),
            Some(_) => {}
            None => return Ok(false),
        }
    }
    Ok(true)
}

/// Run the command loop until `quit` or end of input.
///
/// With `print_results` set, each successful search is written to `out`.
/// Use it when the presenter does not show results itself.
pub async fn run_shell<R, W>(
    session: &mut Session<'_>,
    renderer: &dyn ReportRenderer,
    report_dir: &Path,
    print_results: bool,
    mut reader: R,
    out: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut pending = FormInput::default();

    loop {
        write!(out, "isearch> ")?;
        out.flush()?;
        let Some(line) = read_line(&mut reader).await? else {
            writeln!(out)?;
            break;
        };

        match ShellCommand::parse(&line) {
            ShellCommand::Empty => {}
            ShellCommand::Quit => break,
            ShellCommand::Help => write!(out, "{}", HELP)?,
            ShellCommand::Submit => {
                if !prompt_form(&mut pending, &mut reader, out).await? {
                    writeln!(out)?;
                    break;
                }
                match session.submit(&pending).await {
                    Ok(search) if print_results => write!(out, "{}", render::results(search))?,
                    Ok(_) => {}
                    Err(SubmitError::Validation(e)) => writeln!(out, "{}", e)?,
                    // Already reported to the presenter.
                    Err(SubmitError::Pipeline(_)) => {}
                }
            }
            ShellCommand::Sample(n) => match form::sample_form(n) {
                Some(sample) => {
                    writeln!(
                        out,
                        "loaded sample {}: {} {}",
                        n, sample.severity, sample.error_code
                    )?;
                    pending = sample;
                }
                None => writeln!(
                    out,
                    "no sample {} (1-{})",
                    n,
                    form::sample_forms().len()
                )?,
            },
            ShellCommand::Save => match session.save().await {
                Ok(entry) => writeln!(out, "saved {}", entry.headline())?,
                Err(e) => writeln!(out, "{:#}", e)?,
            },
            ShellCommand::Export => match session.export(renderer, report_dir) {
                Ok(path) => writeln!(out, "report written to {}", path.display())?,
                Err(e) => writeln!(out, "{:#}", e)?,
            },
            ShellCommand::Clear => {
                pending = FormInput::default();
                session.clear();
            }
            ShellCommand::History => write!(out, "{}", render::history(session.history()))?,
            ShellCommand::Unknown(cmd) => {
                writeln!(out, "unknown command: {} (try 'help')", cmd)?
            }
        }
    }

    Ok(())
}
