pub mod events;
pub mod state;
pub mod ui;
pub mod worker;

use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;

use crate::auth::Session;
use crate::auth::oauth::PkceProvider;
use crate::config::Config;
use crate::graph::GraphClient;
use crate::terminal::events::{KeyAction, handle_key};
use crate::terminal::state::UiState;
use crate::terminal::worker::Worker;
use crate::workflow::{AppState, Outcome};

const TICK: Duration = Duration::from_millis(100);

/// Run the ticket form until the user quits.
pub fn run_tui(cfg: &Config, same_account: bool) -> Result<()> {
    color_eyre::install().map_err(|e| anyhow!(e))?;

    let (tx, rx) = mpsc::channel::<Outcome>();
    let prompt_tx = tx.clone();
    let provider = PkceProvider::new(&cfg.client_id, cfg.authority(), cfg.redirect_uri())?
        .with_prompt_hook(move |url| {
            let _ = prompt_tx.send(Outcome::SignInPrompt(url.to_string()));
        });
    let session = Session::new(provider, cfg.scopes(), same_account);
    let graph = GraphClient::new(cfg.graph_base_url())?;
    let worker = Worker::spawn(session, graph, cfg.ticket_clock(), tx, rx);

    let mut state = UiState::new(AppState::new(same_account));

    let terminal = ratatui::init();
    let result = run(terminal, &mut state, &worker);
    ratatui::restore();

    result
}

fn run(mut terminal: DefaultTerminal, state: &mut UiState, worker: &Worker) -> Result<()> {
    loop {
        while let Some(outcome) = worker.try_next() {
            for effect in state.app.apply(outcome) {
                worker.send(effect);
            }
            state.clamp_cursors();
        }

        terminal.draw(|f| ui::render(f, state))?;

        if !event::poll(TICK)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match handle_key(key, state) {
            KeyAction::Quit => return Ok(()),
            KeyAction::Run(effects) => {
                for effect in effects {
                    worker.send(effect);
                }
            }
        }
    }
}
