//! Line-oriented console interface.
//!
//! Reads user input line by line and publishes it on the inbound channel,
//! and renders every outbound event as one line of text or JSON.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use luccibot_core::{BusReceiver, Hub, TaskSpawner};
use luccibot_protocols::{Event, LifecycleError};

pub(crate) const HELP: &str = "Commands: /help, /quit (or /exit). Anything else is sent to LucciBot, e.g. 'swap 1 eth'.";

/// How outbound events are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

enum Input {
    Message(String),
    Help,
    Quit,
}

fn parse_input(line: &str) -> Input {
    match line.trim() {
        "/quit" | "/exit" => Input::Quit,
        "/help" => Input::Help,
        _ => Input::Message(line.to_string()),
    }
}

/// Render one event. `None` for events the interface does not show.
pub(crate) fn render(event: &Event, format: OutputFormat) -> Option<String> {
    if format == OutputFormat::Json {
        return serde_json::to_string(event).ok();
    }
    let line = match event {
        Event::UserMessage(_) => return None,
        Event::Log(text) => format!("[log] {}", text),
        Event::Response(text) => format!("LucciBot: {}", text),
        Event::Success(text) => format!("[ok] {}", text),
        Event::Error(text) => format!("[error] {}", text),
        Event::Signed(signed) => format!(
            "[signed] {} artifact={} signature={}",
            signed.skill_name,
            signed.artifact_text(),
            signed.signature_text()
        ),
    };
    Some(line)
}

pub(crate) struct ConsoleInterface<R, W> {
    hub: Arc<Hub>,
    outbound: BusReceiver<Event>,
    spawner: TaskSpawner,
    reader: R,
    writer: W,
    format: OutputFormat,
    linger: Duration,
    drain_limit: Option<Duration>,
}

impl<R, W> ConsoleInterface<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// `spawner` is the one skill invocations run on; the interface waits
    /// for its tasks before ending a session whose input has run out.
    pub(crate) fn new(
        hub: Arc<Hub>,
        outbound: BusReceiver<Event>,
        spawner: TaskSpawner,
        reader: R,
        writer: W,
    ) -> Self {
        Self {
            hub,
            outbound,
            spawner,
            reader,
            writer,
            format: OutputFormat::Text,
            linger: Duration::from_millis(500),
            drain_limit: None,
        }
    }

    pub(crate) fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Upper bound on waiting for in-flight skills once input has ended.
    /// `None` waits until they finish or the session is cancelled.
    pub(crate) fn with_drain_limit(mut self, limit: Option<Duration>) -> Self {
        self.drain_limit = limit;
        self
    }

    #[cfg(test)]
    pub(crate) fn with_linger(mut self, linger: Duration) -> Self {
        self.linger = linger;
        self
    }

    /// Run until the user quits, input ends or the bus is cancelled.
    ///
    /// Returning `Ok(())` ends the whole session.
    pub(crate) async fn run(self) -> Result<(), LifecycleError> {
        let Self {
            hub,
            mut outbound,
            spawner,
            reader,
            mut writer,
            format,
            linger,
            drain_limit,
        } = self;
        let mut lines = reader.lines();

        let input_ended = loop {
            tokio::select! {
                event = outbound.recv() => match event {
                    Some(event) => write_event(&mut writer, &event, format).await?,
                    None => break false,
                },
                line = lines.next_line() => {
                    let line = line.map_err(|e| {
                        LifecycleError::component_failed("interface", format!("Failed to read input: {}", e))
                    })?;
                    let Some(line) = line else {
                        info!("End of input");
                        break true;
                    };
                    match parse_input(&line) {
                        Input::Quit => {
                            info!("Quit requested");
                            break true;
                        }
                        Input::Help => write_event(&mut writer, &Event::response(HELP), format).await?,
                        Input::Message(text) => {
                            if !publish(&hub, &mut outbound, &mut writer, format, text).await? {
                                debug!("Bus stopped while publishing input");
                                break false;
                            }
                        }
                    }
                }
            }
        };

        if input_ended {
            drain(&mut outbound, &spawner, &mut writer, format, linger, drain_limit).await?;
        }
        Ok(())
    }
}

/// Print the replies to the last lines of input.
///
/// Returns once outbound has been quiet for `linger` with no skill task
/// running, or once `limit` (plus `linger`) has passed.
async fn drain<W>(
    outbound: &mut BusReceiver<Event>,
    spawner: &TaskSpawner,
    writer: &mut W,
    format: OutputFormat,
    linger: Duration,
    limit: Option<Duration>,
) -> Result<(), LifecycleError>
where
    W: AsyncWrite + Unpin + Send,
{
    let deadline = limit.map(|limit| Instant::now() + limit + linger);
    loop {
        match tokio::time::timeout(linger, outbound.recv()).await {
            Ok(Some(event)) => write_event(writer, &event, format).await?,
            Ok(None) => return Ok(()),
            Err(_) if spawner.active_count() == 0 => return Ok(()),
            Err(_) => {}
        }
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            let pending: Vec<String> = spawner
                .active_tasks()
                .into_iter()
                .map(|task| task.name)
                .collect();
            warn!(?pending, "Gave up waiting for skills after end of input");
            return Ok(());
        }
    }
}

/// Publish a user message while continuing to render outbound events, so a
/// full inbound channel never stalls the interpreter on a full outbound one.
///
/// Returns `false` once the bus has stopped.
async fn publish<W>(
    hub: &Hub,
    outbound: &mut BusReceiver<Event>,
    writer: &mut W,
    format: OutputFormat,
    text: String,
) -> Result<bool, LifecycleError>
where
    W: AsyncWrite + Unpin + Send,
{
    let send = hub.publish_inbound(Event::user_message(text));
    tokio::pin!(send);
    loop {
        tokio::select! {
            sent = &mut send => return Ok(sent.is_ok()),
            event = outbound.recv() => match event {
                Some(event) => write_event(writer, &event, format).await?,
                None => return Ok(false),
            },
        }
    }
}

async fn write_event<W>(writer: &mut W, event: &Event, format: OutputFormat) -> Result<(), LifecycleError>
where
    W: AsyncWrite + Unpin + Send,
{
    let Some(line) = render(event, format) else {
        return Ok(());
    };
    let write = async {
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await
    };
    write.await.map_err(|e| {
        LifecycleError::component_failed("interface", format!("Failed to write output: {}", e))
    })
}

#[cfg(test)]
#[path = "interface_tests.rs"]
mod tests;
