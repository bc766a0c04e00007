use std::error::Error;
use std::time::Duration;

use lobbychat_client::desktop_notifications::AlertSink;
use lobbychat_client::global_prefs::GlobalPrefs;
use lobbychat_client::{driver, logging, App, EventSender};
use tokio::io::{self, BufReader};
use tracing::info;

fn alert_sink() -> Box<dyn AlertSink> {
    #[cfg(feature = "toast")]
    {
        Box::new(lobbychat_client::desktop_notifications::DesktopNotificationService::new())
    }
    #[cfg(not(feature = "toast"))]
    {
        Box::new(lobbychat_client::desktop_notifications::NoAlerts)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    let prefs = GlobalPrefs::load();
    let tick_interval = Duration::from_millis(prefs.config.tick_interval_ms.max(1));

    let (events, outbound) = EventSender::channel();
    let app = App::new(
        prefs.config,
        prefs.desktop_notifications_enabled,
        alert_sink(),
        events,
    );

    info!("lobbychat client ready");
    driver::run(
        app,
        BufReader::new(io::stdin()),
        io::stdout(),
        outbound,
        tick_interval,
    )
    .await?;

    Ok(())
}
