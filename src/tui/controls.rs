//! Keyboard input handling for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::runtime::App;
use crate::client::ReportFormat;

/// Footer hint listing the bindings below.
pub const HELP: &str =
    " r:Run  a:Auto  c:Clear  e:CSV  j:JSON  t:TXT  d:Theme  q:Quit";

/// Maps a key event to an application action.
///
/// Guards on [`KeyEventKind::Press`] to avoid double-fire on some terminals.
pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit = true,
        KeyCode::Char('r') | KeyCode::Enter => app.run_once(),
        KeyCode::Char('a') => app.toggle_auto(),
        KeyCode::Char('c') => app.clear_history(),
        KeyCode::Char('e') => app.export_csv(),
        KeyCode::Char('j') => app.download(ReportFormat::Json),
        KeyCode::Char('t') => app.download(ReportFormat::Txt),
        KeyCode::Char('d') => app.toggle_theme(),
        _ => {}
    }
}
