//! Interactive log table

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::debug;

use fwscope_logs::{Exporter, FetchOutcome, LogBrowser, LogSource};
use fwscope_tui::{
    AppState, Effect, Event, EventHandler, HelpOverlay, KeyBindings, KeyContext, LogTableScreen,
    Notice, NoticePopup, Tui,
};
use fwscope_types::{FilterCriteria, PageState};

use crate::commands::export_to;
use crate::config::Settings;

/// Results of background work, fed back into the event loop
enum Completion {
    Fetch(FetchOutcome),
    Export(Result<String, String>),
}

/// Spawns the async side of effects; every task reports back on one channel
struct Worker {
    source: Arc<dyn LogSource>,
    exporter: Exporter,
    export_dir: PathBuf,
    done_tx: mpsc::UnboundedSender<Completion>,
}

impl Worker {
    fn dispatch(&self, effect: Effect) {
        match effect {
            Effect::None => {}
            Effect::Fetch(ticket) => {
                let source = Arc::clone(&self.source);
                let done_tx = self.done_tx.clone();
                debug!(generation = ticket.generation(), "starting log fetch");
                tokio::spawn(async move {
                    let outcome = ticket.run(source.as_ref()).await;
                    let _ = done_tx.send(Completion::Fetch(outcome));
                });
            }
            Effect::Export(format, criteria) => {
                let source = Arc::clone(&self.source);
                let done_tx = self.done_tx.clone();
                let exporter = self.exporter;
                let dir = self.export_dir.clone();
                tokio::spawn(async move {
                    let result = export_to(source.as_ref(), &exporter, &criteria, format, &dir)
                        .await
                        .map_err(|e| e.to_string());
                    let _ = done_tx.send(Completion::Export(result));
                });
            }
        }
    }
}

pub async fn run(
    source: Arc<dyn LogSource>,
    criteria: FilterCriteria,
    settings: &Settings,
) -> Result<()> {
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completion>();
    let worker = Worker {
        source,
        exporter: Exporter::new(settings.fetch_ceiling),
        export_dir: settings.export_dir.clone(),
        done_tx,
    };

    let browser = LogBrowser::new(
        criteria,
        PageState::new(settings.page_size),
        settings.fetch_ceiling,
    );
    let mut state = AppState::new(browser);

    let mut tui = Tui::new()?;
    let mut events = EventHandler::new(Duration::from_millis(250));
    let keybindings = KeyBindings::new();

    // Initial load
    let ticket = state.browser.refresh();
    worker.dispatch(Effect::Fetch(ticket));
    render(&mut tui, &mut state)?;

    loop {
        tokio::select! {
            Some(event) = events.next() => {
                match event {
                    Event::Key(key) => {
                        let context = if state.ui_state.notice.is_some() {
                            KeyContext::Notice
                        } else {
                            KeyContext::LogTable
                        };

                        if let Some(action) = keybindings.get_action(context, &key) {
                            let effect = state.handle(action);
                            worker.dispatch(effect);
                        }
                    }
                    Event::Tick | Event::Resize(_, _) => {}
                    Event::Error(e) => {
                        state.ui_state.notice = Some(Notice::error(e));
                    }
                }
            }

            Some(done) = done_rx.recv() => {
                match done {
                    Completion::Fetch(outcome) => state.apply_fetch(outcome),
                    Completion::Export(result) => state.finish_export(result),
                }
            }
        }

        if state.should_quit {
            break;
        }

        render(&mut tui, &mut state)?;
    }

    events.shutdown();
    tui.restore()?;
    Ok(())
}

fn render(tui: &mut Tui, state: &mut AppState) -> Result<()> {
    tui.draw(|frame| {
        LogTableScreen::render(frame, state);

        if state.ui_state.help_visible {
            HelpOverlay::render(frame);
        }

        if let Some(notice) = &state.ui_state.notice {
            NoticePopup::render(frame, notice);
        }
    })?;

    Ok(())
}
