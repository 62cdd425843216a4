use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

use fwscope_types::ExportFormat;

use crate::app::Action;

/// A key combination
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub fn shift(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::SHIFT,
        }
    }

    pub fn from_event(event: &KeyEvent) -> Self {
        Self {
            code: event.code,
            modifiers: event.modifiers,
        }
    }
}

/// Context for keybindings
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyContext {
    Global,
    LogTable,
    /// A notice is waiting to be acknowledged
    Notice,
}

/// Keybinding configuration
pub struct KeyBindings {
    bindings: HashMap<KeyContext, HashMap<KeyBinding, Action>>,
}

impl KeyBindings {
    pub fn new() -> Self {
        let mut bindings = HashMap::new();

        // Global bindings
        let mut global = HashMap::new();
        global.insert(KeyBinding::new(KeyCode::Char('?')), Action::ToggleHelp);
        global.insert(KeyBinding::new(KeyCode::Esc), Action::Dismiss);
        global.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::Quit);
        global.insert(KeyBinding::new(KeyCode::Char('q')), Action::Quit);
        bindings.insert(KeyContext::Global, global);

        // Log table bindings
        let mut table = HashMap::new();
        // Row selection
        table.insert(KeyBinding::new(KeyCode::Char('j')), Action::SelectDown(1));
        table.insert(KeyBinding::new(KeyCode::Down), Action::SelectDown(1));
        table.insert(KeyBinding::new(KeyCode::Char('k')), Action::SelectUp(1));
        table.insert(KeyBinding::new(KeyCode::Up), Action::SelectUp(1));
        table.insert(KeyBinding::new(KeyCode::Enter), Action::ToggleDetails);
        // Paging
        table.insert(KeyBinding::new(KeyCode::Char('n')), Action::NextPage);
        table.insert(KeyBinding::new(KeyCode::Char('l')), Action::NextPage);
        table.insert(KeyBinding::new(KeyCode::Right), Action::NextPage);
        table.insert(KeyBinding::new(KeyCode::PageDown), Action::NextPage);
        table.insert(KeyBinding::new(KeyCode::Char('p')), Action::PreviousPage);
        table.insert(KeyBinding::new(KeyCode::Char('h')), Action::PreviousPage);
        table.insert(KeyBinding::new(KeyCode::Left), Action::PreviousPage);
        table.insert(KeyBinding::new(KeyCode::PageUp), Action::PreviousPage);
        table.insert(KeyBinding::new(KeyCode::Char('g')), Action::FirstPage);
        table.insert(KeyBinding::new(KeyCode::Home), Action::FirstPage);
        table.insert(KeyBinding::new(KeyCode::Char('+')), Action::IncreasePageSize);
        table.insert(KeyBinding::shift(KeyCode::Char('+')), Action::IncreasePageSize);
        table.insert(KeyBinding::new(KeyCode::Char('=')), Action::IncreasePageSize);
        table.insert(KeyBinding::new(KeyCode::Char('-')), Action::DecreasePageSize);
        // Filters
        table.insert(KeyBinding::new(KeyCode::Char('t')), Action::CycleRiskType);
        table.insert(KeyBinding::shift(KeyCode::Char('T')), Action::CycleRiskTypeBack);
        table.insert(KeyBinding::new(KeyCode::Char('s')), Action::CycleSeverity);
        table.insert(KeyBinding::new(KeyCode::Char('c')), Action::ClearFilters);
        table.insert(KeyBinding::new(KeyCode::Char('r')), Action::Reload);
        // Export
        table.insert(
            KeyBinding::new(KeyCode::Char('e')),
            Action::Export(ExportFormat::Csv),
        );
        table.insert(
            KeyBinding::shift(KeyCode::Char('E')),
            Action::Export(ExportFormat::Json),
        );
        bindings.insert(KeyContext::LogTable, table);

        // Notice bindings
        let mut notice = HashMap::new();
        notice.insert(KeyBinding::new(KeyCode::Enter), Action::Dismiss);
        notice.insert(KeyBinding::new(KeyCode::Esc), Action::Dismiss);
        notice.insert(KeyBinding::new(KeyCode::Char(' ')), Action::Dismiss);
        bindings.insert(KeyContext::Notice, notice);

        Self { bindings }
    }

    /// Look up action for key event in given context
    pub fn get_action(&self, context: KeyContext, key: &KeyEvent) -> Option<Action> {
        let binding = KeyBinding::from_event(key);

        // First check context-specific bindings
        if let Some(context_bindings) = self.bindings.get(&context) {
            if let Some(action) = context_bindings.get(&binding) {
                return Some(action.clone());
            }
        }

        // A notice blocks everything except quitting
        if context == KeyContext::Notice {
            return self
                .bindings
                .get(&KeyContext::Global)?
                .get(&binding)
                .filter(|a| **a == Action::Quit)
                .cloned();
        }

        // Fall back to global bindings
        self.bindings
            .get(&KeyContext::Global)?
            .get(&binding)
            .cloned()
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_table_bindings() {
        let kb = KeyBindings::new();
        assert_eq!(
            kb.get_action(KeyContext::LogTable, &key(KeyCode::Char('n'), KeyModifiers::NONE)),
            Some(Action::NextPage)
        );
        assert_eq!(
            kb.get_action(KeyContext::LogTable, &key(KeyCode::Char('E'), KeyModifiers::SHIFT)),
            Some(Action::Export(ExportFormat::Json))
        );
    }

    #[test]
    fn test_global_fallback() {
        let kb = KeyBindings::new();
        assert_eq!(
            kb.get_action(KeyContext::LogTable, &key(KeyCode::Char('q'), KeyModifiers::NONE)),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_notice_blocks_table_keys() {
        let kb = KeyBindings::new();
        assert_eq!(
            kb.get_action(KeyContext::Notice, &key(KeyCode::Char('n'), KeyModifiers::NONE)),
            None
        );
        assert_eq!(
            kb.get_action(KeyContext::Notice, &key(KeyCode::Enter, KeyModifiers::NONE)),
            Some(Action::Dismiss)
        );
        assert_eq!(
            kb.get_action(KeyContext::Notice, &key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
    }
}
