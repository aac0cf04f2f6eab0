//! Daemon client
//!
//! [`DaemonClient`] owns one connection to the daemon. Any number of calls
//! may be in flight on it at once; each is matched to its response by id,
//! whatever order the daemon answers in.
//!
//! # Call flow
//!
//! 1. Look up the command's schema ([`Error::UnknownMethod`] if none)
//! 2. Canonicalize the parameters ([`Error::Validation`] listing every bad field)
//! 3. Allocate an id, encode the request and register a pending call
//! 4. Queue the newline-terminated line for the writer task
//! 5. Await the response delivered by the reader task
//! 6. Map a daemon error object through the [`ErrorMapper`]
//!
//! Steps 1 and 2 fail before anything is written.
//!
//! # Writer task
//!
//! One task owns the write half and writes queued lines whole, in queue
//! order. Dropping a call future (an outer `timeout`, a `select!` branch)
//! never leaves half a line on the wire: once queued, the line is written
//! in full and the daemon's answer is read and discarded. A write failure
//! fails that call with [`Error::TransportClosed`] and stops the writer;
//! lines still queued fail the same way.
//!
//! # Reader task
//!
//! A single task reads the stream line by line. Responses complete their
//! pending call; responses nobody is waiting for (late answers to timed-out
//! calls, unknown ids) are dropped. Notifications go to the registered
//! [`NotificationHandler`] and run on the reader task, so handlers should
//! return quickly. When the stream ends or fails, every pending call fails
//! with [`Error::TransportClosed`] and later calls fail immediately.
//!
//! # Examples
//!
//! ```rust,no_run
//! use clnwire_client::ClientBuilder;
//! use clnwire_schema::responses::InvoiceResponse;
//! use serde_json::json;
//!
//! # async fn example() -> clnwire_core::Result<()> {
//! let client = ClientBuilder::new()
//!     .connect_unix("/home/user/.lightning/bitcoin/lightning-rpc")
//!     .await?;
//!
//! let invoice: InvoiceResponse = client
//!     .call_typed(
//!         "invoice",
//!         json!({"msatoshi": "10sat", "label": "coffee", "description": "one espresso"}),
//!     )
//!     .await?;
//! println!("{}", invoice.bolt11);
//! # Ok(())
//! # }
//! ```

use crate::builder::ClientConfig;
use crate::metrics::ClientMetrics;
use crate::notification::NotificationHandler;
use crate::request::{Completion, RequestManager};
use clnwire_core::{codec, DaemonMessage, Error, ErrorMapper, Notification, Result, RpcRequest};
use clnwire_schema::{canonicalize_value, Catalogue, ParameterBag};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Work for the writer task
enum Outbound {
    /// One encoded request line for the pending call `id`
    Line { id: u64, line: Vec<u8> },
    /// Shut down the write half
    Shutdown { done: oneshot::Sender<std::io::Result<()>> },
}

/// Aborts the reader task once the last client clone is gone
struct ReaderTask(JoinHandle<()>);

impl Drop for ReaderTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// JSON-RPC client for one daemon connection
///
/// Cheap to clone; clones share the connection and the pending-call table.
#[derive(Clone)]
pub struct DaemonClient {
    outbound: mpsc::UnboundedSender<Outbound>,
    request_manager: RequestManager,
    notification_handler: NotificationHandler,
    catalogue: Arc<Catalogue>,
    error_mapper: Arc<ErrorMapper>,
    config: ClientConfig,
    metrics: Option<Arc<ClientMetrics>>,
    _reader: Arc<ReaderTask>,
}

impl std::fmt::Debug for DaemonClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DaemonClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DaemonClient {
    /// Client over `stream` with the built-in catalogue and default settings
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new<S>(stream: S) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        Self::from_parts(stream, Catalogue::builtin().clone(), ClientConfig::default(), None)
    }

    pub(crate) fn from_parts<S>(
        stream: S,
        catalogue: Catalogue,
        config: ClientConfig,
        metrics: Option<Arc<ClientMetrics>>,
    ) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (reader, writer) = tokio::io::split(stream);
        let request_manager = RequestManager::new();
        let notification_handler = NotificationHandler::new();
        let error_mapper = Arc::new(catalogue.error_mapper());

        let (outbound, queue) = mpsc::unbounded_channel();
        tokio::spawn(Self::send_loop(writer, queue, request_manager.clone()));

        let task = tokio::spawn(Self::receive_loop(
            reader,
            request_manager.clone(),
            notification_handler.clone(),
            metrics.clone(),
        ));

        Self {
            outbound,
            request_manager,
            notification_handler,
            catalogue: Arc::new(catalogue),
            error_mapper,
            config,
            metrics,
            _reader: Arc::new(ReaderTask(task)),
        }
    }

    /// Validate `params` against the command's schema and send the call
    ///
    /// `params` may be an object, an array in positional order, or `null`.
    #[tracing::instrument(skip(self, params), fields(method = %method))]
    pub async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let bag = self.prepare(method, &params)?;
        self.dispatch_with_timeout(method, &bag, self.config.default_timeout)
            .await
    }

    /// [`DaemonClient::call`] with its own deadline instead of the default
    #[tracing::instrument(skip(self, params), fields(method = %method))]
    pub async fn call_with_timeout(&self, method: &str, params: Value, timeout: Duration) -> Result<Value> {
        let bag = self.prepare(method, &params)?;
        self.dispatch_with_timeout(method, &bag, Some(timeout)).await
    }

    /// [`DaemonClient::call`], deserializing the result into `R`
    pub async fn call_typed<R>(&self, method: &str, params: Value) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let value = self.call(method, params).await?;
        serde_json::from_value(value).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Send an already canonicalized bag, with the default deadline
    pub async fn dispatch(&self, method: &str, bag: &ParameterBag) -> Result<Value> {
        self.dispatch_with_timeout(method, bag, self.config.default_timeout)
            .await
    }

    /// Send an already canonicalized bag and await its response
    ///
    /// On timeout the pending entry stays registered; the daemon's eventual
    /// answer is read and discarded.
    #[tracing::instrument(skip(self, bag), fields(method = %method, id = tracing::field::Empty))]
    pub async fn dispatch_with_timeout(
        &self,
        method: &str,
        bag: &ParameterBag,
        timeout: Option<Duration>,
    ) -> Result<Value> {
        let start = Instant::now();
        let outcome = self.round_trip(method, bag, timeout).await;
        let duration = start.elapsed().as_secs_f64();

        if let Some(ref m) = self.metrics {
            match &outcome {
                Ok(_) => m.record_call(method, "success", duration),
                Err(e) => {
                    m.record_call(method, "error", duration);
                    m.record_error(method, e.kind());
                    if matches!(e, Error::Timeout { .. }) {
                        m.record_timeout(method);
                    }
                }
            }
        }

        match &outcome {
            Ok(_) => tracing::debug!(duration_secs = duration, "call completed"),
            Err(e) => tracing::debug!(error = %e, duration_secs = duration, "call failed"),
        }
        outcome
    }

    async fn round_trip(&self, method: &str, bag: &ParameterBag, timeout: Option<Duration>) -> Result<Value> {
        let id = self.request_manager.next_id();
        tracing::Span::current().record("id", id);

        let request = RpcRequest::new(id, method, bag.encode(self.config.param_style));
        let line = codec::encode_line(&request)?;
        let rx = self.request_manager.register(id, method).await?;

        // No await between registering and queueing: the entry always has a
        // line on its way to the daemon
        if self.outbound.send(Outbound::Line { id, line }).is_err() {
            tracing::debug!(id, "writer has stopped");
            self.request_manager.remove(id).await;
            return Err(Error::TransportClosed);
        }
        self.update_pending_gauge().await;

        let delivered = match timeout {
            Some(limit) => match tokio::time::timeout(limit, rx).await {
                Ok(delivered) => delivered,
                Err(_) => {
                    tracing::debug!(id, timeout_ms = limit.as_millis() as u64, "deadline expired");
                    return Err(Error::Timeout {
                        method: method.to_string(),
                        id,
                    });
                }
            },
            None => rx.await,
        };

        // A dropped sender means the entry was removed without an answer
        let response = delivered.map_err(|_| Error::TransportClosed)??;

        match response.into_result() {
            Ok(result) => Ok(result),
            Err(Some(error)) => Err(self.error_mapper.map(method, error).into()),
            Err(None) => Err(Error::Protocol(format!(
                "response to {} carries neither result nor error",
                id
            ))),
        }
    }

    fn prepare(&self, method: &str, params: &Value) -> Result<ParameterBag> {
        let outcome = match self.catalogue.get(method) {
            None => Err(Error::UnknownMethod(method.to_string())),
            Some(schema) => canonicalize_value(&schema, params).map_err(|errors| Error::Validation {
                method: method.to_string(),
                errors: errors.into(),
            }),
        };

        if let Err(ref e) = outcome {
            tracing::debug!(error = %e, "call rejected before sending");
            if let Some(ref m) = self.metrics {
                m.record_error(method, e.kind());
            }
        }
        outcome
    }

    /// Register a handler for a daemon notification method
    pub async fn on_notification<F, Fut>(&self, method: impl Into<String>, handler: F)
    where
        F: Fn(Notification) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.notification_handler.register(method, handler).await;
    }

    /// Calls awaiting a response, including ones whose caller timed out
    pub async fn pending_count(&self) -> usize {
        self.request_manager.pending_count().await
    }

    /// Whether the reader has seen the transport close
    pub async fn is_closed(&self) -> bool {
        self.request_manager.is_closed().await
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Shut down the write half of the connection
    ///
    /// Lines queued before the call are written first. Calls already written
    /// still receive their responses; new calls fail with
    /// [`Error::TransportClosed`].
    pub async fn close(&self) -> Result<()> {
        tracing::info!("closing connection");
        let (done, shut) = oneshot::channel();
        if self.outbound.send(Outbound::Shutdown { done }).is_err() {
            return Ok(());
        }
        match shut.await {
            Ok(result) => result.map_err(|e| Error::Io(e.to_string())),
            Err(_) => Ok(()),
        }
    }

    async fn update_pending_gauge(&self) {
        if let Some(ref m) = self.metrics {
            m.update_pending(self.request_manager.pending_count().await);
        }
    }

    async fn send_loop<W>(
        mut writer: W,
        mut queue: mpsc::UnboundedReceiver<Outbound>,
        request_manager: RequestManager,
    ) where
        W: AsyncWrite + Unpin,
    {
        while let Some(next) = queue.recv().await {
            match next {
                Outbound::Line { id, line } => {
                    if let Err(e) = Self::write_line(&mut writer, &line).await {
                        tracing::warn!(id, error = %e, "write failed");
                        request_manager.fail(id, Error::TransportClosed).await;
                        break;
                    }
                    tracing::debug!(id, "request sent");
                }
                Outbound::Shutdown { done } => {
                    let _ = done.send(writer.shutdown().await);
                    break;
                }
            }
        }

        // Nothing else reaches the wire
        queue.close();
        while let Some(next) = queue.recv().await {
            match next {
                Outbound::Line { id, .. } => {
                    request_manager.fail(id, Error::TransportClosed).await;
                }
                Outbound::Shutdown { done } => {
                    let _ = done.send(Ok(()));
                }
            }
        }
    }

    async fn write_line<W>(writer: &mut W, line: &[u8]) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        writer.write_all(line).await?;
        writer.flush().await
    }

    async fn receive_loop<R>(
        reader: R,
        request_manager: RequestManager,
        notification_handler: NotificationHandler,
        metrics: Option<Arc<ClientMetrics>>,
    ) where
        R: AsyncRead + Unpin,
    {
        let mut segments = BufReader::new(reader).split(b'\n');

        loop {
            match segments.next_segment().await {
                Ok(Some(segment)) => match std::str::from_utf8(&segment) {
                    Ok(line) => {
                        Self::handle_line(line, &request_manager, &notification_handler, &metrics).await
                    }
                    Err(e) => tracing::warn!(error = %e, "skipping line that is not UTF-8"),
                },
                Ok(None) => {
                    tracing::info!("daemon closed the connection");
                    break;
                }
                Err(e) => {
                    tracing::info!(error = %e, "read failed");
                    break;
                }
            }
        }

        let failed = request_manager.fail_all(Error::TransportClosed).await;
        if let Some(ref m) = metrics {
            m.update_pending(0);
        }
        tracing::info!(failed, "transport closed");
    }

    async fn handle_line(
        line: &str,
        request_manager: &RequestManager,
        notification_handler: &NotificationHandler,
        metrics: &Option<Arc<ClientMetrics>>,
    ) {
        let message = match codec::decode(line) {
            Ok(Some(message)) => message,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(error = %e, "skipping undecodable line");
                return;
            }
        };

        match message {
            DaemonMessage::Response(response) => {
                let Some(id) = response.id else {
                    tracing::warn!(error = ?response.error, "response without an id");
                    return;
                };
                match request_manager.complete(id, response).await {
                    Completion::Delivered { .. } => {
                        tracing::debug!(id, "response received");
                    }
                    Completion::Abandoned { method, age } => {
                        tracing::debug!(id, %method, age_ms = age.as_millis() as u64, "discarding late response");
                        if let Some(m) = metrics {
                            m.record_late_response();
                        }
                    }
                    Completion::Unmatched => {
                        tracing::debug!(id, "discarding response for unknown id");
                        if let Some(m) = metrics {
                            m.record_late_response();
                        }
                    }
                }
                if let Some(m) = metrics {
                    m.update_pending(request_manager.pending_count().await);
                }
            }
            DaemonMessage::Notification(notification) => {
                if let Some(m) = metrics {
                    m.record_notification(&notification.method);
                }
                notification_handler.handle(notification).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::{duplex, AsyncBufReadExt, BufReader, DuplexStream, ReadBuf};

    /// Readable connection whose writes always fail
    struct BrokenWrite(DuplexStream);

    impl AsyncRead for BrokenWrite {
        fn poll_read(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
            Pin::new(&mut self.get_mut().0).poll_read(cx, buf)
        }
    }

    impl AsyncWrite for BrokenWrite {
        fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, _buf: &[u8]) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    const NODE_ID: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

    #[tokio::test]
    async fn test_unknown_method_writes_nothing() {
        let (local, remote) = duplex(4096);
        let client = DaemonClient::new(local);

        let err = client.call("no_such_command", json!({})).await.unwrap_err();
        assert!(matches!(err, Error::UnknownMethod(ref m) if m == "no_such_command"));
        assert!(err.is_local());
        assert_eq!(client.pending_count().await, 0);

        // Closing our side must leave the daemon side with nothing to read
        client.close().await.unwrap();
        let mut lines = BufReader::new(remote).lines();
        assert!(lines.next_line().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_request_line_is_canonical() {
        let (local, remote) = duplex(4096);
        let client = DaemonClient::new(local);

        let pending = tokio::spawn({
            let client = client.clone();
            async move {
                client
                    .call("fundchannel", json!({"amount": "0.001btc", "id": NODE_ID}))
                    .await
            }
        });

        let (read_half, mut write_half) = tokio::io::split(remote);
        let mut lines = BufReader::new(read_half).lines();
        let line = lines.next_line().await.unwrap().unwrap();
        let request: Value = serde_json::from_str(&line).unwrap();

        assert_eq!(request["jsonrpc"], "2.0");
        assert_eq!(request["id"], 1);
        assert_eq!(request["method"], "fundchannel");
        assert_eq!(
            request["params"],
            json!({"id": NODE_ID, "amount": "100000sat", "announce": true, "minconf": 1})
        );

        write_half
            .write_all(b"{\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{\"txid\":\"ab\"}}\n")
            .await
            .unwrap();

        let result = pending.await.unwrap().unwrap();
        assert_eq!(result["txid"], "ab");
    }

    #[tokio::test]
    async fn test_eof_closes_client() {
        let (local, remote) = duplex(4096);
        let client = DaemonClient::new(local);
        drop(remote);

        while !client.is_closed().await {
            tokio::task::yield_now().await;
        }

        let err = client.call("setchannel", json!({"id": "all"})).await.unwrap_err();
        assert!(matches!(err, Error::TransportClosed));
        assert_eq!(client.pending_count().await, 0);
    }

    #[tokio::test]
    async fn test_write_failure_fails_call() {
        let (local, _remote) = duplex(4096);
        let client = DaemonClient::new(BrokenWrite(local));

        let err = client.call("setchannel", json!({"id": "all"})).await.unwrap_err();
        assert!(matches!(err, Error::TransportClosed));
        assert_eq!(client.pending_count().await, 0);

        // The reader is still up, but the writer has stopped
        assert!(!client.is_closed().await);
        let err = client.call("setchannel", json!({"id": "all"})).await.unwrap_err();
        assert!(matches!(err, Error::TransportClosed));
        assert_eq!(client.pending_count().await, 0);
    }
}
