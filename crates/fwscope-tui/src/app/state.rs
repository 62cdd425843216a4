use ratatui::widgets::TableState;

use fwscope_logs::{FetchOutcome, FetchTicket, LogBrowser};
use fwscope_types::{ExportFormat, FilterCriteria, KNOWN_RISK_TYPES, LogEntry, Severity};

use super::Action;

/// Page sizes offered by the size up/down keys
pub const PAGE_SIZES: [usize; 7] = [10, 25, 50, 100, 250, 500, 1000];

/// Work the event loop must carry out after an action
#[derive(Debug)]
pub enum Effect {
    None,
    /// Run this fetch and feed the outcome back through [`AppState::apply_fetch`]
    Fetch(FetchTicket),
    /// Build and write an export for the given criteria
    Export(ExportFormat, FilterCriteria),
}

/// A message shown on top of the table until dismissed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub is_error: bool,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: true,
        }
    }
}

/// UI-specific transient state
#[derive(Default)]
pub struct UiState {
    /// Is help overlay visible?
    pub help_visible: bool,

    /// Show risks of the selected row?
    pub details_visible: bool,

    /// Selected row in the table
    pub table_state: TableState,

    /// Notice awaiting acknowledgement
    pub notice: Option<Notice>,

    /// Exports currently running
    pub exports_running: usize,
}

/// Global application state
pub struct AppState {
    /// Query pipeline behind the table
    pub browser: LogBrowser,

    /// UI state
    pub ui_state: UiState,

    /// Whether app should quit
    pub should_quit: bool,
}

impl AppState {
    pub fn new(browser: LogBrowser) -> Self {
        Self {
            browser,
            ui_state: UiState::default(),
            should_quit: false,
        }
    }

    /// Handle one action, returning the async work it needs
    pub fn handle(&mut self, action: Action) -> Effect {
        match action {
            Action::Quit => {
                self.should_quit = true;
                Effect::None
            }
            Action::ToggleHelp => {
                self.ui_state.help_visible = !self.ui_state.help_visible;
                Effect::None
            }
            Action::ToggleDetails => {
                self.ui_state.details_visible = !self.ui_state.details_visible;
                Effect::None
            }
            Action::Dismiss => {
                if self.ui_state.notice.is_some() {
                    self.ui_state.notice = None;
                } else {
                    self.ui_state.help_visible = false;
                }
                Effect::None
            }
            Action::SelectUp(n) => {
                self.select_by(-(n as isize));
                Effect::None
            }
            Action::SelectDown(n) => {
                self.select_by(n as isize);
                Effect::None
            }

            Action::NextPage => self.after_move(|b| b.next_page()),
            Action::PreviousPage => self.after_move(|b| b.previous_page()),
            Action::FirstPage => self.after_move(|b| {
                if b.can_previous() {
                    b.set_offset(0)
                } else {
                    None
                }
            }),
            Action::IncreasePageSize => {
                let limit = step_page_size(self.browser.page().limit, true);
                self.after_move(|b| Some(b.set_limit(limit)))
            }
            Action::DecreasePageSize => {
                let limit = step_page_size(self.browser.page().limit, false);
                self.after_move(|b| Some(b.set_limit(limit)))
            }

            Action::CycleRiskType => {
                let next = cycle_risk_type(self.browser.criteria().risk_type.as_deref(), true);
                let criteria = self.browser.criteria().clone().with_risk_type(next);
                self.after_move(|b| Some(b.set_criteria(criteria)))
            }
            Action::CycleRiskTypeBack => {
                let next = cycle_risk_type(self.browser.criteria().risk_type.as_deref(), false);
                let criteria = self.browser.criteria().clone().with_risk_type(next);
                self.after_move(|b| Some(b.set_criteria(criteria)))
            }
            Action::CycleSeverity => {
                let next = cycle_severity(self.browser.criteria().severity);
                let criteria = self.browser.criteria().clone().with_severity(next);
                self.after_move(|b| Some(b.set_criteria(criteria)))
            }
            Action::ClearFilters => {
                let current = self.browser.criteria();
                let criteria = FilterCriteria::new().with_date_range(current.date_from, current.date_to);
                self.after_move(|b| Some(b.set_criteria(criteria)))
            }
            Action::Reload => self.after_move(|b| Some(b.refresh())),

            Action::Export(format) => {
                self.ui_state.exports_running += 1;
                Effect::Export(format, self.browser.criteria().clone())
            }
        }
    }

    /// Apply a completed fetch from the event loop
    pub fn apply_fetch(&mut self, outcome: FetchOutcome) {
        if self.browser.apply(outcome) {
            self.reset_selection();
        }
    }

    /// Record the result of an export
    pub fn finish_export(&mut self, result: Result<String, String>) {
        self.ui_state.exports_running = self.ui_state.exports_running.saturating_sub(1);
        self.ui_state.notice = Some(match result {
            Ok(message) => Notice::info(message),
            Err(message) => Notice::error(format!("Export failed: {}", message)),
        });
    }

    /// Entry under the table cursor
    pub fn selected_entry(&self) -> Option<&LogEntry> {
        let view = self.browser.view()?;
        view.logs.get(self.ui_state.table_state.selected()?)
    }

    fn after_move<F>(&mut self, f: F) -> Effect
    where
        F: FnOnce(&mut LogBrowser) -> Option<FetchTicket>,
    {
        let ticket = f(&mut self.browser);
        self.reset_selection();
        match ticket {
            Some(ticket) => Effect::Fetch(ticket),
            None => Effect::None,
        }
    }

    fn reset_selection(&mut self) {
        let has_rows = self.browser.view().is_some_and(|v| !v.is_empty());
        self.ui_state.table_state.select(has_rows.then_some(0));
    }

    fn select_by(&mut self, delta: isize) {
        let len = self.browser.view().map_or(0, |v| v.logs.len());
        if len == 0 {
            return;
        }

        let current = self.ui_state.table_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len as isize - 1);
        self.ui_state.table_state.select(Some(next as usize));
    }
}

/// Next or previous known risk type; unknown types fall back to no filter
pub fn cycle_risk_type(current: Option<&str>, forward: bool) -> Option<String> {
    let idx = current.and_then(|c| KNOWN_RISK_TYPES.iter().position(|t| *t == c));
    let last = KNOWN_RISK_TYPES.len() - 1;

    let next = match (idx, forward) {
        (None, true) => Some(0),
        (None, false) => Some(last),
        (Some(i), true) if i < last => Some(i + 1),
        (Some(i), false) if i > 0 => Some(i - 1),
        _ => None,
    };

    next.map(|i| KNOWN_RISK_TYPES[i].to_string())
}

/// any → high → medium → low → any
pub fn cycle_severity(current: Option<Severity>) -> Option<Severity> {
    match current {
        None => Some(Severity::High),
        Some(Severity::High) => Some(Severity::Medium),
        Some(Severity::Medium) => Some(Severity::Low),
        Some(Severity::Low) => None,
    }
}

/// Move to the neighbouring entry of [`PAGE_SIZES`]
pub fn step_page_size(current: usize, up: bool) -> usize {
    if up {
        PAGE_SIZES
            .iter()
            .copied()
            .find(|s| *s > current)
            .unwrap_or(current)
    } else {
        PAGE_SIZES
            .iter()
            .rev()
            .copied()
            .find(|s| *s < current)
            .unwrap_or(current)
    }
}
