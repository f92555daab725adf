use notify_rust::Notification;
use restnow_core::{Alert, AlertSink, ObserverError};

use crate::terminal::SharedScreen;

/// Terminal bell and/or desktop notification on phase alerts.
pub struct DesktopAlerts {
    bell: Option<SharedScreen>,
    desktop: bool,
}

impl DesktopAlerts {
    pub fn new(bell: Option<SharedScreen>, desktop: bool) -> Self {
        Self { bell, desktop }
    }
}

impl AlertSink for DesktopAlerts {
    fn alert(&mut self, alert: Alert) -> Result<(), ObserverError> {
        if let Some(screen) = &self.bell {
            screen.borrow_mut().bell()?;
        }
        if self.desktop {
            send_notification(alert)?;
        }
        Ok(())
    }
}

fn send_notification(alert: Alert) -> Result<(), ObserverError> {
    Notification::new()
        .summary(alert.title())
        .body(alert.body())
        .appname("restnow")
        .show()
        .map(|_| ())
        .map_err(|e| ObserverError::Sink {
            sink: "desktop",
            message: e.to_string(),
        })
}
