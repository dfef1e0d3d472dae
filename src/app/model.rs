//! TUI view model: cursor, input prompt and status notice.

/// What a submitted path prompt does with its input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PromptKind {
    /// Replace the playlist and start playing.
    Open,
    /// Append to the playlist.
    Add,
}

impl PromptKind {
    pub fn label(self) -> &'static str {
        match self {
            PromptKind::Open => "Open",
            PromptKind::Add => "Add",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Prompt { kind: PromptKind, input: String },
}

/// The main view model.
pub struct App {
    /// Cursor row in the playlist.
    pub selected: usize,
    /// Whether the cursor jumps to the active item when it changes.
    pub follow_playback: bool,
    pub show_volume_panel: bool,
    pub mode: InputMode,
    /// One-line message for the status bar (errors, hints).
    pub notice: Option<String>,
    pub header_text: String,
    /// Volume to restore when unmuting.
    volume_before_mute: Option<u8>,
    /// A lone `g` was pressed; a second one jumps to the top.
    pending_g: bool,
}

impl App {
    pub fn new(header_text: impl Into<String>, follow_playback: bool, show_volume_panel: bool) -> Self {
        Self {
            selected: 0,
            follow_playback,
            show_volume_panel,
            mode: InputMode::Normal,
            notice: None,
            header_text: header_text.into(),
            volume_before_mute: None,
            pending_g: false,
        }
    }

    /// Move the cursor down, wrapping to the top.
    pub fn next(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1) % len;
    }

    /// Move the cursor up, wrapping to the bottom.
    pub fn prev(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        self.selected = if self.selected == 0 || self.selected >= len {
            len - 1
        } else {
            self.selected - 1
        };
    }

    pub fn jump_top(&mut self) {
        self.selected = 0;
    }

    pub fn jump_bottom(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    /// Keep the cursor inside a playlist of `len` items.
    pub fn clamp_selection(&mut self, len: usize) {
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    /// Move the cursor onto the active item when following playback.
    pub fn follow(&mut self, current_index: Option<usize>) {
        if let (true, Some(i)) = (self.follow_playback, current_index) {
            self.selected = i;
        }
    }

    pub fn toggle_follow_playback(&mut self) {
        self.follow_playback = !self.follow_playback;
    }

    pub fn toggle_volume_panel(&mut self) {
        self.show_volume_panel = !self.show_volume_panel;
    }

    /// Returns true on the second of two consecutive `g` presses.
    pub fn press_g(&mut self) -> bool {
        if self.pending_g {
            self.pending_g = false;
            true
        } else {
            self.pending_g = true;
            false
        }
    }

    pub fn clear_pending_g(&mut self) {
        self.pending_g = false;
    }

    /// Volume to apply for a mute toggle given the current one.
    ///
    /// Muting remembers the previous level; unmuting restores it, or `fallback`
    /// when the volume was already zero before muting.
    pub fn mute_target(&mut self, current: u8, fallback: u8) -> u8 {
        if current == 0 {
            self.volume_before_mute.take().filter(|v| *v > 0).unwrap_or(fallback)
        } else {
            self.volume_before_mute = Some(current);
            0
        }
    }

    pub fn open_prompt(&mut self, kind: PromptKind) {
        self.mode = InputMode::Prompt {
            kind,
            input: String::new(),
        };
    }

    pub fn cancel_prompt(&mut self) {
        self.mode = InputMode::Normal;
    }

    pub fn push_prompt_char(&mut self, c: char) {
        if let InputMode::Prompt { input, .. } = &mut self.mode {
            input.push(c);
        }
    }

    pub fn pop_prompt_char(&mut self) {
        if let InputMode::Prompt { input, .. } = &mut self.mode {
            input.pop();
        }
    }

    /// Leave prompt mode, returning what was typed (trimmed, non-empty).
    pub fn take_prompt(&mut self) -> Option<(PromptKind, String)> {
        match std::mem::take(&mut self.mode) {
            InputMode::Prompt { kind, input } => {
                let input = input.trim().to_string();
                (!input.is_empty()).then_some((kind, input))
            }
            InputMode::Normal => None,
        }
    }

    pub fn is_prompting(&self) -> bool {
        matches!(self.mode, InputMode::Prompt { .. })
    }

    pub fn set_notice(&mut self, msg: impl Into<String>) {
        self.notice = Some(msg.into());
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }
}
