use egui::{Pos2, Rect};

/// Floating panels anchored under toolbar buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Popup {
    BrushSize,
    Color,
    Upload,
}

/// Visibility of every overlay. At most one popup is open at a time.
#[derive(Debug, Default, Clone)]
pub struct UiState {
    active_popup: Option<Popup>,
    /// Where the canvas context menu was requested
    context_menu: Option<Pos2>,
    /// Screen rects that count as "inside" for the outside-click check.
    /// Refreshed every frame by whoever draws the popup and the toolbar.
    shielded: Vec<Rect>,
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_popup(&self) -> Option<Popup> {
        self.active_popup
    }

    pub fn is_open(&self, popup: Popup) -> bool {
        self.active_popup == Some(popup)
    }

    /// Open `popup`, or close it if it is the open one
    pub fn toggle(&mut self, popup: Popup) {
        self.active_popup = if self.is_open(popup) { None } else { Some(popup) };
    }

    pub fn open(&mut self, popup: Popup) {
        self.active_popup = Some(popup);
    }

    pub fn close_all(&mut self) {
        self.active_popup = None;
        self.context_menu = None;
    }

    pub fn context_menu(&self) -> Option<Pos2> {
        self.context_menu
    }

    pub fn open_context_menu(&mut self, at: Pos2) {
        self.active_popup = None;
        self.context_menu = Some(at);
    }

    pub fn close_context_menu(&mut self) {
        self.context_menu = None;
    }

    /// Forget last frame's regions; call before drawing the overlays
    pub fn begin_frame(&mut self) {
        self.shielded.clear();
    }

    /// Clicks inside `rect` never close popups (sliders, inputs, the toolbar)
    pub fn shield(&mut self, rect: Rect) {
        self.shielded.push(rect);
    }

    /// Handle a primary press at `pos`. Returns true if it closed the open popup.
    pub fn on_primary_press(&mut self, pos: Pos2) -> bool {
        if self.active_popup.is_none() || self.shielded.iter().any(|rect| rect.contains(pos)) {
            return false;
        }
        log::debug!("Click outside popups at {:?}, closing {:?}", pos, self.active_popup);
        self.active_popup = None;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::vec2;

    #[test]
    fn only_one_popup_at_a_time() {
        let mut ui = UiState::new();
        ui.toggle(Popup::Color);
        ui.toggle(Popup::BrushSize);
        assert_eq!(ui.active_popup(), Some(Popup::BrushSize));
        ui.toggle(Popup::BrushSize);
        assert_eq!(ui.active_popup(), None);
    }

    #[test]
    fn outside_click_closes_but_shielded_click_does_not() {
        let mut ui = UiState::new();
        ui.open(Popup::BrushSize);
        ui.begin_frame();
        let slider = Rect::from_min_size(Pos2::new(10.0, 40.0), vec2(200.0, 30.0));
        ui.shield(slider);

        assert!(!ui.on_primary_press(Pos2::new(50.0, 50.0)));
        assert!(ui.is_open(Popup::BrushSize));

        assert!(ui.on_primary_press(Pos2::new(400.0, 400.0)));
        assert_eq!(ui.active_popup(), None);
    }

    #[test]
    fn context_menu_replaces_popups() {
        let mut ui = UiState::new();
        ui.open(Popup::Upload);
        ui.open_context_menu(Pos2::new(5.0, 5.0));
        assert_eq!(ui.active_popup(), None);
        assert_eq!(ui.context_menu(), Some(Pos2::new(5.0, 5.0)));
        ui.close_all();
        assert_eq!(ui.context_menu(), None);
    }
}
