use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::cli::render::{render_error, render_form, render_outcome};
use crate::commands::prediction::{form_get, form_reset, form_update_field, prediction_submit};
use crate::commands::AppState;
use crate::error::AppResult;

const PROMPT: &str = "> ";

const HELP: &str = "\
Commands:
  set <field> <value>   fields: workHours, deadlines, sleepHours, productivity, workType
  show                  print the form and the last result
  submit                send the form to the prediction service
  reset                 restore the default form
  help                  show this message
  quit                  leave the session
";

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Set { field: String, value: String },
    Show,
    Submit,
    Reset,
    Help,
    Quit,
}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<SessionCommand>, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let (verb, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (trimmed, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "set" => {
            let (field, value) = rest
                .split_once(char::is_whitespace)
                .map(|(field, value)| (field, value.trim()))
                .unwrap_or((rest, ""));
            if field.is_empty() {
                return Err("usage: set <field> <value>".to_string());
            }
            SessionCommand::Set {
                field: field.to_string(),
                value: value.to_string(),
            }
        }
        "show" => SessionCommand::Show,
        "submit" => SessionCommand::Submit,
        "reset" => SessionCommand::Reset,
        "help" | "?" => SessionCommand::Help,
        "quit" | "exit" => SessionCommand::Quit,
        other => return Err(format!("unknown command: {other} (type 'help')")),
    };

    Ok(Some(command))
}

/// Line-oriented form session. Returns when the reader is exhausted or on `quit`.
pub async fn run_session<R, W>(app_state: &AppState, reader: R, mut writer: W) -> AppResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    writer
        .write_all(b"Stress level predictor. Type 'help' for commands.\n")
        .await?;
    writer
        .write_all(render_form(&form_get(app_state)).as_bytes())
        .await?;

    loop {
        writer.write_all(PROMPT.as_bytes()).await?;
        writer.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                writer.write_all(format!("{message}\n").as_bytes()).await?;
                continue;
            }
        };
        debug!(target: "app::cli", ?command, "session command");

        let output = match command {
            SessionCommand::Set { field, value } => {
                match form_update_field(app_state, &field, value) {
                    Ok(snapshot) => render_form(&snapshot),
                    Err(error) => render_error(&error),
                }
            }
            SessionCommand::Show => render_form(&form_get(app_state)),
            SessionCommand::Submit => {
                writer.write_all(b"Predicting...\n").await?;
                writer.flush().await?;
                match prediction_submit(app_state).await {
                    Ok(outcome) => render_outcome(&outcome),
                    Err(error) => render_error(&error),
                }
            }
            SessionCommand::Reset => match form_reset(app_state) {
                Ok(snapshot) => render_form(&snapshot),
                Err(error) => render_error(&error),
            },
            SessionCommand::Help => HELP.to_string(),
            SessionCommand::Quit => break,
        };

        writer.write_all(output.as_bytes()).await?;
    }

    writer.flush().await?;
    Ok(())
}
