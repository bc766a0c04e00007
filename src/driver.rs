use std::time::{Duration, Instant};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::app::App;
use crate::events::{InboundEvent, OutboundEvent};
use crate::state::AppResult;

/// Application events
enum AppEvent {
    Input(Option<String>),
    Outbound(OutboundEvent),
    Tick,
}

/// Drive `app` from newline-delimited JSON events until the input closes.
///
/// Each input line is one [`InboundEvent`]; every event the app emits is
/// written to `output` as one JSON line. Lines that are not valid UTF-8 are
/// decoded lossily and end up rejected like any other malformed event.
pub async fn run<R, W>(
    mut app: App,
    input: R,
    mut output: W,
    mut outbound: mpsc::UnboundedReceiver<OutboundEvent>,
    tick_interval: Duration,
) -> AppResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.split(b'\n');
    let mut ticker = tokio::time::interval(tick_interval);
    let mut input_open = true;

    loop {
        let event = tokio::select! {
            segment = lines.next_segment(), if input_open => AppEvent::Input(segment?.map(decode_line)),
            Some(event) = outbound.recv() => AppEvent::Outbound(event),
            _ = ticker.tick() => AppEvent::Tick,
        };

        match event {
            AppEvent::Input(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<InboundEvent>(&line) {
                    Ok(event) => {
                        let handled = app.handle_event(event);
                        debug!(handled, "inbound event processed");
                    }
                    Err(e) => app.reject(&line, &e),
                }
            }
            AppEvent::Input(None) => {
                info!("input closed, shutting down");
                input_open = false;
            }
            AppEvent::Outbound(event) => write_event(&mut output, &event).await?,
            AppEvent::Tick => app.on_tick(Instant::now()),
        }

        // flush whatever the last event produced before leaving
        if !input_open {
            while let Ok(event) = outbound.try_recv() {
                write_event(&mut output, &event).await?;
            }
            break;
        }
    }

    output.flush().await?;
    Ok(())
}

fn decode_line(segment: Vec<u8>) -> String {
    String::from_utf8_lossy(&segment)
        .trim_end_matches('\r')
        .to_string()
}

async fn write_event<W: AsyncWrite + Unpin>(output: &mut W, event: &OutboundEvent) -> AppResult<()> {
    let mut line = serde_json::to_vec(event)?;
    line.push(b'\n');
    output.write_all(&line).await?;
    Ok(())
}
