use std::time::{Duration, Instant};

/// A desktop alert raised for a message that arrived while unfocused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopAlert {
    pub room: String,
    pub title: String,
    pub body: String,
}

/// Window focus and the single outstanding desktop alert.
pub struct FocusState {
    has_focus: bool,
    alerts_enabled: bool,
    current_alert: Option<(DesktopAlert, Instant)>, // alert, close deadline
}

impl FocusState {
    pub fn new(alerts_enabled: bool) -> Self {
        Self {
            has_focus: true,
            alerts_enabled,
            current_alert: None,
        }
    }

    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    pub fn blur(&mut self) {
        self.has_focus = false;
    }

    /// Regain focus; any outstanding alert is handed back for dismissal.
    pub fn focus(&mut self) -> Option<DesktopAlert> {
        self.has_focus = true;
        self.clear_alert()
    }

    pub fn toggle_alerts(&mut self) -> bool {
        self.alerts_enabled = !self.alerts_enabled;
        self.alerts_enabled
    }

    /// Alerts are only raised while the window is unfocused.
    pub fn should_alert(&self) -> bool {
        self.alerts_enabled && !self.has_focus
    }

    pub fn current_alert(&self) -> Option<&DesktopAlert> {
        self.current_alert.as_ref().map(|(alert, _)| alert)
    }

    /// Install a new alert, returning the one it replaces.
    pub fn set_alert(
        &mut self,
        alert: DesktopAlert,
        now: Instant,
        timeout: Duration,
    ) -> Option<DesktopAlert> {
        let replaced = self.clear_alert();
        self.current_alert = Some((alert, now + timeout));
        replaced
    }

    pub fn clear_alert(&mut self) -> Option<DesktopAlert> {
        self.current_alert.take().map(|(alert, _)| alert)
    }

    pub fn should_close_alert(&self, now: Instant) -> bool {
        if let Some((_, close_at)) = &self.current_alert {
            now >= *close_at
        } else {
            false
        }
    }
}
