//! Presentation view-state.
//!
//! The per-editor display toggles (pencil, autocheck, clue hiding, list
//! layout, keybinding mode, color attribution) as one immutable value with
//! pure reducers. The presentation layer passes the current value down and
//! replaces it wholesale on toggle; none of this state enters the engine
//! or the replicated document.

/// Per-editor display toggles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewState {
    pub pencil: bool,
    pub autocheck: bool,
    pub hide_across: bool,
    pub hide_down: bool,
    pub list_layout: bool,
    pub vim: bool,
    pub color_attribution: bool,
}

impl ViewState {
    pub fn toggle_pencil(self) -> Self {
        Self { pencil: !self.pencil, ..self }
    }

    pub fn toggle_autocheck(self) -> Self {
        Self { autocheck: !self.autocheck, ..self }
    }

    pub fn toggle_hide_across(self) -> Self {
        Self { hide_across: !self.hide_across, ..self }
    }

    pub fn toggle_hide_down(self) -> Self {
        Self { hide_down: !self.hide_down, ..self }
    }

    pub fn toggle_list_layout(self) -> Self {
        Self { list_layout: !self.list_layout, ..self }
    }

    pub fn toggle_vim(self) -> Self {
        Self { vim: !self.vim, ..self }
    }

    pub fn toggle_color_attribution(self) -> Self {
        Self { color_attribution: !self.color_attribution, ..self }
    }
}
