use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;

use clipq_core::{update, AppState, Effect, Msg, OffsetKind};
use clipq_logging::{clipq_debug, clipq_info, clipq_warn};

use crate::config::{Cli, Mode};
use crate::console::{self, ConsoleInput};
use crate::effects::EffectRunner;
use crate::render;

/// Everything the session loop reacts to, from the console or the engine.
#[derive(Debug)]
pub enum Input {
    Msg(Msg),
    Quit,
}

/// Single-writer coordinator: owns the state and applies every message in
/// arrival order.
#[derive(Default)]
pub struct Session {
    state: AppState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&self) -> String {
        render::render(&self.state.view())
    }

    /// Apply one message, returning the effects to run and the lines to show.
    pub fn dispatch(&mut self, msg: Msg) -> (Vec<Effect>, Vec<String>) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);

        let mut output: Vec<String> = state
            .take_notifications()
            .iter()
            .map(render::render_notification)
            .collect();
        if state.consume_dirty() {
            output.push(render::render(&state.view()));
        }
        self.state = state;
        (effects, output)
    }
}

/// Messages that seed the session for the chosen mode.
pub fn startup_messages(mode: &Mode) -> Vec<Msg> {
    let mut msgs = vec![Msg::SessionStarted];
    if let Mode::Submit {
        file,
        default_minutes,
        vertical_minutes,
    } = mode
    {
        msgs.push(Msg::FileChosen(file.clone()));
        for &minute in default_minutes {
            msgs.push(Msg::OffsetSelected {
                kind: OffsetKind::Default,
                minute,
            });
        }
        for &minute in vertical_minutes {
            msgs.push(Msg::OffsetSelected {
                kind: OffsetKind::Vertical,
                minute,
            });
        }
        msgs.push(Msg::SubmitClicked);
    }
    msgs
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    clipq_info!(
        "Starting clipq against {} (push: {})",
        cli.api_url,
        if cli.no_push { "off" } else { cli.ws_url.as_str() }
    );

    let (input_tx, input_rx) = mpsc::channel::<Input>();
    let runner = EffectRunner::new(cli.engine_config(), input_tx.clone())?;
    spawn_console(input_tx)?;
    println!("{}", console::HELP);

    let mut session = Session::new();
    println!("{}", session.render());
    for msg in startup_messages(&cli.mode()) {
        step(&mut session, &runner, msg);
    }

    while let Ok(input) = input_rx.recv() {
        match input {
            Input::Msg(msg) => step(&mut session, &runner, msg),
            Input::Quit => break,
        }
    }

    clipq_info!("Session ending");
    runner.shutdown();
    Ok(())
}

fn step(session: &mut Session, runner: &EffectRunner, msg: Msg) {
    clipq_debug!("Dispatch {:?}", msg);
    let (effects, output) = session.dispatch(msg);
    for line in output {
        println!("{line}");
    }
    runner.enqueue(effects);
}

fn spawn_console(input_tx: mpsc::Sender<Input>) -> io::Result<()> {
    thread::Builder::new()
        .name("clipq-console".to_string())
        .spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        clipq_warn!("Console read failed: {}", err);
                        break;
                    }
                };
                let input = match console::parse_line(&line) {
                    Ok(ConsoleInput::Msg(msg)) => Input::Msg(msg),
                    Ok(ConsoleInput::Quit) => Input::Quit,
                    Ok(ConsoleInput::Help) => {
                        println!("{}", console::HELP);
                        continue;
                    }
                    Ok(ConsoleInput::Empty) => continue,
                    Err(err) => {
                        println!("{err}");
                        continue;
                    }
                };
                if input_tx.send(input).is_err() {
                    return;
                }
            }
            // End of input ends the session.
            let _ = input_tx.send(Input::Quit);
        })?;
    Ok(())
}
