use std::time::Duration;

use crate::state::DesktopAlert;

/// Platform seam for desktop alerts.
///
/// Implementations degrade to no-ops when the platform lacks the capability;
/// failures are logged, never surfaced to the user.
pub trait AlertSink {
    /// Whether the platform allows alerts to be shown at all.
    fn permission_granted(&self) -> bool;
    fn show(&mut self, alert: &DesktopAlert, timeout: Duration);
    fn dismiss(&mut self);
}

/// Sink for platforms without desktop alert support.
#[derive(Debug, Default)]
pub struct NoAlerts;

impl AlertSink for NoAlerts {
    fn permission_granted(&self) -> bool {
        false
    }

    fn show(&mut self, _alert: &DesktopAlert, _timeout: Duration) {}

    fn dismiss(&mut self) {}
}

/// Desktop notification service for system-level notifications
#[cfg(feature = "toast")]
#[derive(Default)]
pub struct DesktopNotificationService {
    #[cfg(all(unix, not(target_os = "macos")))]
    handle: Option<notify_rust::NotificationHandle>,
}

#[cfg(feature = "toast")]
impl DesktopNotificationService {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(feature = "toast")]
impl AlertSink for DesktopNotificationService {
    // enabling and disabling alerts is up to `FocusState`
    fn permission_granted(&self) -> bool {
        true
    }

    fn show(&mut self, alert: &DesktopAlert, timeout: Duration) {
        use notify_rust::{Notification, Timeout};
        use tracing::{debug, error};

        self.dismiss();

        let mut notification = Notification::new();
        notification
            .summary(&alert.title)
            .body(&alert.body)
            .appname("Lobbychat")
            .icon("dialog-information")
            .timeout(Timeout::Milliseconds(
                u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX),
            ));

        // Set urgency level for systems that support it
        #[cfg(target_os = "linux")]
        {
            notification.urgency(notify_rust::Urgency::Normal);
        }

        #[cfg(all(unix, not(target_os = "macos")))]
        match notification.show() {
            Ok(handle) => {
                debug!("Desktop notification sent: {} - {}", alert.title, alert.body);
                self.handle = Some(handle);
            }
            Err(e) => error!("Failed to send desktop notification: {}", e),
        }

        #[cfg(not(all(unix, not(target_os = "macos"))))]
        if let Err(e) = notification.show() {
            error!("Failed to send desktop notification: {}", e);
        }
    }

    fn dismiss(&mut self) {
        #[cfg(all(unix, not(target_os = "macos")))]
        if let Some(handle) = self.handle.take() {
            handle.close();
        }
    }
}


/// Sink that records what it was asked to do.
#[cfg(test)]
#[derive(Debug)]
pub(crate) struct RecordingAlerts {
    pub granted: bool,
    pub shown: std::rc::Rc<std::cell::RefCell<Vec<DesktopAlert>>>,
    pub dismissed: std::rc::Rc<std::cell::Cell<usize>>,
}

#[cfg(test)]
impl RecordingAlerts {
    pub fn new(granted: bool) -> Self {
        Self {
            granted,
            shown: Default::default(),
            dismissed: Default::default(),
        }
    }
}

#[cfg(test)]
impl AlertSink for RecordingAlerts {
    fn permission_granted(&self) -> bool {
        self.granted
    }

    fn show(&mut self, alert: &DesktopAlert, _timeout: Duration) {
        self.shown.borrow_mut().push(alert.clone());
    }

    fn dismiss(&mut self) {
        self.dismissed.set(self.dismissed.get() + 1);
    }
}
