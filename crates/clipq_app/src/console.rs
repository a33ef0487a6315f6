use std::path::PathBuf;

use clipq_core::{Msg, OffsetKind};

pub const HELP: &str = "\
Commands:
  file <path>                  choose the video to submit
  pick <default|vertical> <m>  select minute m
  drop <default|vertical> <m>  deselect minute m
  toggle <default|vertical> <m>
  submit                       send the draft to the backend
  delete <id>                  remove a job that is not processing
  download <id>                save a completed job's result
  next                         start the next pending job
  stop                         release the processing slot locally
  clear                        hide completed jobs
  help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleInput {
    Msg(Msg),
    Help,
    Quit,
    Empty,
}

/// Parse one console line into an input for the session.
pub fn parse_line(line: &str) -> Result<ConsoleInput, String> {
    let line = line.trim();
    let Some((word, rest)) = split_word(line) else {
        return Ok(ConsoleInput::Empty);
    };

    let msg = match word {
        "help" | "?" => return Ok(ConsoleInput::Help),
        "quit" | "exit" => return Ok(ConsoleInput::Quit),
        "file" => {
            if rest.is_empty() {
                return Err("usage: file <path>".to_string());
            }
            Msg::FileChosen(PathBuf::from(rest))
        }
        "pick" => {
            let (kind, minute) = parse_offset(rest)?;
            Msg::OffsetSelected { kind, minute }
        }
        "drop" => {
            let (kind, minute) = parse_offset(rest)?;
            Msg::OffsetDeselected { kind, minute }
        }
        "toggle" => {
            let (kind, minute) = parse_offset(rest)?;
            Msg::OffsetToggled { kind, minute }
        }
        "submit" => Msg::SubmitClicked,
        "delete" => Msg::DeleteClicked(job_id(word, rest)?),
        "download" => Msg::DownloadClicked(job_id(word, rest)?),
        "next" => Msg::ProcessNextClicked,
        "stop" => Msg::StopClicked,
        "clear" => Msg::ClearCompletedClicked,
        other => return Err(format!("unknown command {other:?}; try `help`")),
    };
    Ok(ConsoleInput::Msg(msg))
}

fn split_word(line: &str) -> Option<(&str, &str)> {
    if line.is_empty() {
        return None;
    }
    Some(match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    })
}

fn parse_offset(rest: &str) -> Result<(OffsetKind, u32), String> {
    let mut parts = rest.split_whitespace();
    let kind = match parts.next() {
        Some("default" | "d") => OffsetKind::Default,
        Some("vertical" | "v") => OffsetKind::Vertical,
        _ => return Err("expected `default` or `vertical`".to_string()),
    };
    let minute = parts
        .next()
        .ok_or_else(|| "missing minute".to_string())?
        .parse::<u32>()
        .map_err(|err| format!("invalid minute: {err}"))?;
    if parts.next().is_some() {
        return Err("too many arguments".to_string());
    }
    Ok((kind, minute))
}

fn job_id(word: &str, rest: &str) -> Result<String, String> {
    match rest.split_whitespace().collect::<Vec<_>>().as_slice() {
        [id] => Ok((*id).to_string()),
        _ => Err(format!("usage: {word} <id>")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn msg(line: &str) -> Msg {
        match parse_line(line) {
            Ok(ConsoleInput::Msg(msg)) => msg,
            other => panic!("Expected a message for {line:?}, got {other:?}"),
        }
    }

    #[test]
    fn offsets_accept_long_and_short_kinds() {
        assert_eq!(
            msg("pick default 3"),
            Msg::OffsetSelected {
                kind: OffsetKind::Default,
                minute: 3
            }
        );
        assert_eq!(
            msg("drop v 2"),
            Msg::OffsetDeselected {
                kind: OffsetKind::Vertical,
                minute: 2
            }
        );
        assert_eq!(
            msg("  toggle d 0  "),
            Msg::OffsetToggled {
                kind: OffsetKind::Default,
                minute: 0
            }
        );
    }

    #[test]
    fn file_keeps_spaces_in_the_path() {
        assert_eq!(
            msg("file /videos/my talk.mp4"),
            Msg::FileChosen(PathBuf::from("/videos/my talk.mp4"))
        );
    }

    #[test]
    fn job_commands_need_exactly_one_id() {
        assert_eq!(msg("delete abc"), Msg::DeleteClicked("abc".to_string()));
        assert_eq!(msg("download abc"), Msg::DownloadClicked("abc".to_string()));
        assert_eq!(
            parse_line("delete"),
            Err("usage: delete <id>".to_string())
        );
        assert!(parse_line("download a b").is_err());
    }

    #[test]
    fn plain_commands() {
        assert_eq!(msg("submit"), Msg::SubmitClicked);
        assert_eq!(msg("next"), Msg::ProcessNextClicked);
        assert_eq!(msg("stop"), Msg::StopClicked);
        assert_eq!(msg("clear"), Msg::ClearCompletedClicked);
        assert_eq!(parse_line("quit"), Ok(ConsoleInput::Quit));
        assert_eq!(parse_line("help"), Ok(ConsoleInput::Help));
        assert_eq!(parse_line("   "), Ok(ConsoleInput::Empty));
    }

    #[test]
    fn bad_input_is_reported() {
        assert!(parse_line("pick sideways 3").is_err());
        assert!(parse_line("pick default").is_err());
        assert!(parse_line("pick default -1").is_err());
        assert!(parse_line("pick default 1 2").is_err());
        assert!(parse_line("launch").is_err());
        assert!(parse_line("file").is_err());
    }
}
