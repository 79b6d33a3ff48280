//! Socket.IO transport over `tokio-tungstenite`.
//!
//! One writer task owns the WebSocket sink and drains an unbounded frame
//! queue, so emits are synchronous and leave in call order. One reader
//! task decodes frames, answers pings, and hands events to the
//! dispatcher.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use bytes::Bytes;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use url::Url;
use urchin_core::wire::{self, Decoder, Frame, Inbound, OpenInfo, Payload};

use crate::dispatch::EventDispatcher;
use crate::error::ClientError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Anything that can carry events to the relay.
pub trait Transport: Send + Sync {
    /// Queue one event. Must not block.
    fn send(&self, event: &str, payload: Payload) -> Result<(), ClientError>;
    fn close(&self);
    fn is_open(&self) -> bool;
}

enum Outbound {
    Frame(Frame),
    Close,
}

/// Live Socket.IO connection to the relay.
pub struct SocketIoTransport {
    sid: String,
    outbound: mpsc::UnboundedSender<Outbound>,
    open: Arc<AtomicBool>,
    reader: JoinHandle<()>,
    _writer: JoinHandle<()>,
}

impl SocketIoTransport {
    /// Connect, complete the Engine.IO and namespace handshakes, then start
    /// the reader and writer tasks.
    pub async fn connect(
        endpoint: &str,
        dispatcher: Arc<EventDispatcher>,
        handshake_timeout: Duration,
    ) -> Result<Self, ClientError> {
        let url = engine_url(endpoint)?;
        let (ws, info) = tokio::time::timeout(handshake_timeout, async {
            let (mut ws, _) = connect_async(url.as_str())
                .await
                .map_err(|e| ClientError::Connect(format!("websocket connect to {url}: {e}")))?;
            let info = handshake(&mut ws).await?;
            Ok::<_, ClientError>((ws, info))
        })
        .await
        .map_err(|_| ClientError::Timeout {
            waited: handshake_timeout,
            what: format!("handshake with {endpoint}"),
        })??;

        // Relay pings every interval; silence past interval + timeout means gone.
        let idle = Duration::from_millis(info.ping_interval + info.ping_timeout);
        let (sink, stream) = ws.split();
        let (tx, rx) = mpsc::unbounded_channel();
        let open = Arc::new(AtomicBool::new(true));

        let writer = tokio::spawn(writer_task(sink, rx, open.clone()));
        let reader = tokio::spawn({
            let tx = tx.clone();
            let closed = CloseOnDrop(open.clone());
            async move {
                let _closed = closed;
                if let Err(e) = reader_loop(stream, tx, dispatcher, idle).await {
                    tracing::warn!(error = %e, "relay reader stopped");
                }
                tracing::info!("relay connection closed");
            }
        });

        tracing::info!(%url, sid = %info.sid, "connected to relay");
        Ok(Self {
            sid: info.sid,
            outbound: tx,
            open,
            reader,
            _writer: writer,
        })
    }

    /// Engine.IO session id.
    pub fn sid(&self) -> &str {
        &self.sid
    }
}

impl Transport for SocketIoTransport {
    fn send(&self, event: &str, payload: Payload) -> Result<(), ClientError> {
        if !self.is_open() {
            return Err(ClientError::NotConnected);
        }
        for frame in wire::encode_event(event, &payload)? {
            self.outbound
                .send(Outbound::Frame(frame))
                .map_err(|_| ClientError::NotConnected)?;
        }
        Ok(())
    }

    fn close(&self) {
        if self.open.swap(false, Ordering::SeqCst) {
            let _ = self.outbound.send(Outbound::Close);
            self.reader.abort();
        }
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

impl Drop for SocketIoTransport {
    fn drop(&mut self) {
        self.close();
    }
}

/// Clears the open flag when the owning task ends, including by panic
/// or abort.
struct CloseOnDrop(Arc<AtomicBool>);

impl Drop for CloseOnDrop {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// `https://host/` → `wss://host/socket.io/?EIO=4&transport=websocket`.
pub fn engine_url(endpoint: &str) -> Result<Url, ClientError> {
    let mut url = Url::parse(endpoint)
        .map_err(|e| ClientError::Connect(format!("bad endpoint {endpoint}: {e}")))?;
    let scheme = match url.scheme() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        other => return Err(ClientError::Connect(format!("unsupported scheme {other}"))),
    };
    url.set_scheme(scheme)
        .map_err(|_| ClientError::Connect(format!("cannot use {scheme} for {endpoint}")))?;
    url.set_path("/socket.io/");
    url.set_query(Some("EIO=4&transport=websocket"));
    Ok(url)
}

fn to_message(frame: Frame) -> Message {
    match frame {
        Frame::Text(text) => Message::Text(text.into()),
        Frame::Binary(bytes) => Message::Binary(bytes.to_vec().into()),
    }
}

async fn next_text(ws: &mut WsStream) -> Result<String, ClientError> {
    loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => return Ok(text.to_string()),
            Some(Ok(Message::Close(_))) | None => {
                return Err(ClientError::Connect("relay closed during handshake".into()))
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(ClientError::Connect(e.to_string())),
        }
    }
}

async fn handshake(ws: &mut WsStream) -> Result<OpenInfo, ClientError> {
    let mut decoder = Decoder::new();
    let info = loop {
        if let Some(Inbound::Open(info)) = decoder.decode_text(&next_text(ws).await?)? {
            break info;
        }
    };
    ws.send(to_message(wire::encode_connect()))
        .await
        .map_err(|e| ClientError::Connect(e.to_string()))?;
    loop {
        match decoder.decode_text(&next_text(ws).await?)? {
            Some(Inbound::Connected { .. }) => return Ok(info),
            Some(Inbound::ConnectError(message)) => return Err(ClientError::Connect(message)),
            Some(Inbound::Ping) => ws
                .send(to_message(wire::encode_pong()))
                .await
                .map_err(|e| ClientError::Connect(e.to_string()))?,
            _ => {}
        }
    }
}

async fn writer_task(
    mut sink: SplitSink<WsStream, Message>,
    mut rx: mpsc::UnboundedReceiver<Outbound>,
    open: Arc<AtomicBool>,
) {
    while let Some(out) = rx.recv().await {
        match out {
            Outbound::Frame(frame) => {
                if let Err(e) = sink.send(to_message(frame)).await {
                    tracing::warn!(error = %e, "relay write failed");
                    break;
                }
            }
            Outbound::Close => {
                let _ = sink.send(to_message(wire::encode_disconnect())).await;
                let _ = sink.close().await;
                break;
            }
        }
    }
    open.store(false, Ordering::SeqCst);
}

async fn reader_loop(
    mut stream: SplitStream<WsStream>,
    tx: mpsc::UnboundedSender<Outbound>,
    dispatcher: Arc<EventDispatcher>,
    idle: Duration,
) -> anyhow::Result<()> {
    let mut decoder = Decoder::new();
    loop {
        let msg = match tokio::time::timeout(idle, stream.next()).await {
            Ok(Some(msg)) => msg.context("websocket read failed")?,
            Ok(None) => return Ok(()),
            Err(_) => bail!("no traffic from relay for {idle:?}"),
        };
        let decoded = match msg {
            Message::Text(text) => decoder.decode_text(&text),
            Message::Binary(data) => decoder.decode_binary(Bytes::from(data)),
            Message::Close(_) => return Ok(()),
            _ => continue,
        };
        match decoded {
            Ok(Some(Inbound::Ping)) => {
                if tx.send(Outbound::Frame(wire::encode_pong())).is_err() {
                    return Ok(());
                }
            }
            Ok(Some(Inbound::Event(event))) => {
                dispatcher.dispatch(&event);
            }
            Ok(Some(Inbound::Close | Inbound::Disconnected)) => return Ok(()),
            Ok(Some(other)) => tracing::debug!(packet = ?other, "ignoring relay packet"),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "dropping malformed relay frame"),
        }
    }
}
