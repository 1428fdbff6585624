use std::time::Duration;

use wowbridge_protocol::{parse_command, Request};
use wowbridge_queue::{RequestQueue, ResponseQueue, ShutdownFlag};

use crate::transport::{PipeConnection, PipeListener, ReadOutcome};

/// Bounded backoff for the Awaiting state: checks the response queue this
/// many times, sleeping `interval` between checks, before giving up on the
/// current request. ~100ms total with the defaults.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_iterations: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(10),
            max_iterations: 10,
        }
    }
}

fn await_response(responses: &ResponseQueue, poll: &PollConfig) -> Option<String> {
    for _ in 0..poll.max_iterations {
        if let Some(response) = responses.try_pop() {
            return Some(response);
        }
        std::thread::sleep(poll.interval);
    }
    responses.try_pop()
}

/// Services one connection end-to-end: Reading → (Ping fast path | enqueue)
/// → Awaiting → back to Reading, until the client disconnects or a transport
/// error ends the connection.
pub fn run_session<C: PipeConnection>(
    conn: &mut C,
    requests: &RequestQueue,
    responses: &ResponseQueue,
    poll: &PollConfig,
) {
    loop {
        let message = match conn.read_message() {
            Ok(ReadOutcome::Message(bytes)) => bytes,
            Ok(ReadOutcome::Disconnected) => {
                tracing::debug!("client disconnected");
                return;
            }
            Err(err) => {
                tracing::warn!(%err, "read failed, dropping connection");
                return;
            }
        };

        let request = parse_command(&message);
        if matches!(request, Request::Ping) {
            // Liveness must work even if the render thread is stalled, so
            // Ping never touches the request queue or the frame hook.
            responses.push("PONG".to_string());
        } else if let Err(_overloaded) = requests.push(request) {
            responses.push("ERROR:Overloaded".to_string());
        }

        match await_response(responses, poll) {
            Some(response) => {
                if let Err(err) = conn.write_message(response.as_bytes()) {
                    tracing::warn!(%err, "write failed, dropping connection");
                    return;
                }
            }
            None => {
                tracing::warn!("response wait timed out, leaving request unanswered");
            }
        }
    }
}

/// Owns the single pipe instance across its whole accept/service/reconnect
/// lifecycle (P10). One thread runs `serve` for the lifetime of the bridge.
pub struct IpcServer<L: PipeListener> {
    listener: L,
    requests: &'static RequestQueue,
    responses: &'static ResponseQueue,
    shutdown: &'static ShutdownFlag,
    poll: PollConfig,
}

impl<L: PipeListener> IpcServer<L> {
    pub fn new(
        listener: L,
        requests: &'static RequestQueue,
        responses: &'static ResponseQueue,
        shutdown: &'static ShutdownFlag,
    ) -> Self {
        Self {
            listener,
            requests,
            responses,
            shutdown,
            poll: PollConfig::default(),
        }
    }

    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Runs until the shutdown flag is observed. Blocks in `accept` between
    /// connections; the self-connect dummy write is what unblocks the final
    /// iteration.
    pub fn serve(&mut self) {
        loop {
            if self.shutdown.is_signaled() {
                return;
            }

            let mut conn = match self.listener.accept() {
                Ok(conn) => conn,
                Err(err) => {
                    tracing::warn!(%err, "accept failed, retrying");
                    continue;
                }
            };

            if self.shutdown.is_signaled() {
                return;
            }

            run_session(&mut conn, self.requests, self.responses, &self.poll);
        }
    }
}
