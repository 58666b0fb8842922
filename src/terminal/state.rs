use ratatui::widgets::ListState;

use crate::domain::mapping::LogicalField;
use crate::workflow::{AppState, Effect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sites,
    Lists,
    Mapping,
    Emails,
    Results,
}

/// Application state plus where the cursor is in each panel.
pub struct UiState {
    pub app: AppState,
    pub focus: Focus,
    /// Row 0 is "no site".
    pub sites: ListState,
    /// Row 0 is "no list".
    pub lists: ListState,
    pub mapping_row: usize,
    pub emails: ListState,
    pub results: ListState,
}

impl UiState {
    pub fn new(app: AppState) -> Self {
        let mut s = Self {
            app,
            focus: Focus::Emails,
            sites: ListState::default(),
            lists: ListState::default(),
            mapping_row: 0,
            emails: ListState::default(),
            results: ListState::default(),
        };
        s.sites.select(Some(0));
        s.lists.select(Some(0));
        s
    }

    fn focus_order(&self) -> Vec<Focus> {
        let mut order = vec![Focus::Sites, Focus::Lists];
        if self.app.mapping_available() {
            order.push(Focus::Mapping);
        }
        order.extend([Focus::Emails, Focus::Results]);
        order
    }

    pub fn cycle_focus(&mut self, step: i32) {
        let order = self.focus_order();
        let cur = order.iter().position(|f| *f == self.focus).unwrap_or(0) as i32;
        let next = (cur + step).rem_euclid(order.len() as i32) as usize;
        self.focus = order[next];
    }

    fn rows(&self, focus: Focus) -> usize {
        match focus {
            Focus::Sites => self.app.sites.len() + 1,
            Focus::Lists => self.app.destination.lists().len() + 1,
            Focus::Mapping => LogicalField::ALL.len(),
            Focus::Emails => self.app.messages.len(),
            Focus::Results => self.app.results.len(),
        }
    }

    pub fn move_cursor(&mut self, delta: i32) {
        let len = self.rows(self.focus) as i32;
        if self.focus == Focus::Mapping {
            self.mapping_row = (self.mapping_row as i32 + delta).clamp(0, len - 1) as usize;
            return;
        }
        let list_state = match self.focus {
            Focus::Sites => &mut self.sites,
            Focus::Lists => &mut self.lists,
            Focus::Emails => &mut self.emails,
            Focus::Results => &mut self.results,
            Focus::Mapping => return,
        };
        if len == 0 {
            list_state.select(None);
            return;
        }
        let cur = list_state.selected().unwrap_or(0) as i32;
        list_state.select(Some((cur + delta).clamp(0, len - 1) as usize));
    }

    pub fn selected_field(&self) -> LogicalField {
        LogicalField::ALL[self.mapping_row.min(LogicalField::ALL.len() - 1)]
    }

    /// Enter on the focused panel.
    pub fn activate(&mut self) -> Vec<Effect> {
        match self.focus {
            Focus::Sites => {
                let site_id = self
                    .sites
                    .selected()
                    .filter(|i| *i > 0)
                    .and_then(|i| self.app.sites.get(i - 1))
                    .map(|s| s.id.clone())
                    .unwrap_or_default();
                let effects = self.app.choose_site(&site_id);
                self.lists.select(Some(0));
                effects
            }
            Focus::Lists => {
                let list_id = self
                    .lists
                    .selected()
                    .filter(|i| *i > 0)
                    .and_then(|i| self.app.destination.lists().get(i - 1))
                    .map(|l| l.id.clone())
                    .unwrap_or_default();
                let effects = self.app.choose_list(&list_id);
                if self.app.destination.list_id().is_none() {
                    self.lists.select(Some(0));
                }
                effects
            }
            Focus::Mapping => {
                self.app.cycle_mapping(self.selected_field(), 1);
                vec![]
            }
            Focus::Emails => {
                self.toggle_email();
                vec![]
            }
            Focus::Results => vec![],
        }
    }

    pub fn toggle_email(&mut self) {
        let id = self
            .emails
            .selected()
            .and_then(|i| self.app.messages.get(i))
            .map(|m| m.id.clone());
        if let Some(id) = id {
            self.app.toggle_message(&id);
        }
    }

    /// Keep cursors inside their panels after data changed underneath them.
    pub fn clamp_cursors(&mut self) {
        if self.focus == Focus::Mapping && !self.app.mapping_available() {
            self.focus = Focus::Lists;
        }
        let (site_rows, list_rows) = (self.rows(Focus::Sites), self.rows(Focus::Lists));
        for (len, state) in [(site_rows, &mut self.sites), (list_rows, &mut self.lists)] {
            if state.selected().is_none_or(|i| i >= len) {
                state.select(Some(0));
            }
        }
        for (len, state) in [
            (self.app.messages.len(), &mut self.emails),
            (self.app.results.len(), &mut self.results),
        ] {
            match state.selected() {
                _ if len == 0 => state.select(None),
                Some(i) if i < len => {}
                _ => state.select(Some(0)),
            }
        }
    }
}
