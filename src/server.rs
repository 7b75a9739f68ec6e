use std::future::Future;
use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument};

use crate::commands::executable::Executable;
use crate::commands::{self, Command};
use crate::connection::Connection;
use crate::db::Db;
use crate::frame::Frame;
use crate::pubsub::{Message, PubSub, Subscriber};
use crate::transaction::{is_transaction_command, TransactionState};
use crate::Result;

/// Accepts connections until `shutdown` resolves, then signals every
/// connection task and waits for all of them to finish before returning.
pub async fn run(port: u16, db: Db, shutdown: impl Future<Output = ()>) -> Result<()> {
    let listener = TcpListener::bind(("127.0.0.1", port)).await?;
    info!("server listening on {}", listener.local_addr()?);

    db.strings.start_sweeper();

    let (cancel_tx, cancel_rx) = watch::channel(false);
    let mut connections = JoinSet::new();

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (socket, client_address) = match accepted {
                    Ok(pair) => pair,
                    Err(err) => {
                        error!("failed to accept connection: {}", err);
                        continue;
                    }
                };
                debug!("accepted connection from {:?}", client_address);

                let db = db.clone();
                let cancel = cancel_rx.clone();
                connections.spawn(async move {
                    if let Err(err) = handle_connection(socket, client_address, db, cancel).await {
                        error!("connection error: {}", err);
                    }
                });
            }
            _ = &mut shutdown => break,
        }
    }

    info!("shutting down, draining {} connection(s)", connections.len());
    drop(listener);
    let _ = cancel_tx.send(true);
    while connections.join_next().await.is_some() {}
    db.strings.close();

    Ok(())
}

enum Event {
    Request(Option<Frame>),
    Delivery(Option<Message>),
    Shutdown,
}

#[instrument(name = "connection", skip(stream, db, cancel), fields(client_address = %client_address))]
async fn handle_connection(
    stream: TcpStream,
    client_address: SocketAddr,
    db: Db,
    mut cancel: watch::Receiver<bool>,
) -> Result<()> {
    let mut conn = Connection::new(stream);
    let mut session = Session::new(db);

    loop {
        // Frames from the client and pub/sub deliveries are multiplexed into
        // this single task, so all writes to the socket are serialized here.
        let event = tokio::select! {
            res = conn.read_frame() => Event::Request(res?),
            message = next_message(&mut session.subscriber) => Event::Delivery(message),
            _ = cancel.changed() => Event::Shutdown,
        };

        match event {
            Event::Shutdown => break,
            Event::Request(None) => break, // clean disconnect
            Event::Delivery(Some(message)) => {
                conn.write_frame(&message.into_frame()).await?;
            }
            // The bus dropped our sender; nothing left to deliver.
            Event::Delivery(None) => {}
            Event::Request(Some(frame)) => {
                debug!("received frame: {:?}", frame);
                if session.handle(frame, &mut conn).await? {
                    break;
                }
            }
        }
    }

    session.close();
    debug!("connection closed");
    Ok(())
}

async fn next_message(subscriber: &mut Option<Subscriber>) -> Option<Message> {
    match subscriber {
        Some(subscriber) => subscriber.messages.recv().await,
        None => std::future::pending().await,
    }
}

/// Per-connection state: the transaction machine plus the lazily created
/// pub/sub subscriber and its live subscription count.
struct Session {
    db: Db,
    tx: TransactionState,
    subscriber: Option<Subscriber>,
    subscription_count: usize,
}

impl Session {
    fn new(db: Db) -> Session {
        Session {
            db,
            tx: TransactionState::new(),
            subscriber: None,
            subscription_count: 0,
        }
    }

    /// A connection is in subscription mode while it has at least one live
    /// channel or pattern subscription.
    fn is_subscribed(&self) -> bool {
        self.subscription_count > 0
    }

    /// Routes one request and writes its response(s). Returns `true` when
    /// the connection should close (QUIT).
    async fn handle(&mut self, frame: Frame, conn: &mut Connection) -> Result<bool> {
        // Requests must be non-empty arrays of strings; anything else is a
        // command-level protocol error, not a connection-fatal one.
        let (name, args) = match commands::request_parts(&frame) {
            Ok(parts) => parts,
            Err(err) => {
                conn.write_frame(&Frame::Error(err.to_string())).await?;
                return Ok(false);
            }
        };

        // While queueing, everything except the transaction-control commands
        // is captured verbatim for EXEC.
        if self.tx.in_multi() && !is_transaction_command(&name) {
            self.tx.queue(name, args);
            conn.write_frame(&Frame::Simple("QUEUED".to_string())).await?;
            return Ok(false);
        }

        // In subscription mode only the pub/sub commands (plus PING and
        // QUIT) are allowed through.
        if self.is_subscribed() && !is_subscription_command(&name) {
            let msg = format!(
                "ERR Can't execute '{}': only (P)SUBSCRIBE / (P)UNSUBSCRIBE / PING / QUIT are allowed in this context",
                name
            );
            conn.write_frame(&Frame::Error(msg)).await?;
            return Ok(false);
        }

        let command = match Command::try_from(frame) {
            Ok(command) => command,
            Err(err) => {
                conn.write_frame(&Frame::Error(err.to_string())).await?;
                return Ok(false);
            }
        };

        match command {
            // Pub/sub registration changes go through the session, which
            // owns the subscriber; confirmations come back via its queue.
            Command::Subscribe(cmd) => {
                let id = self.subscriber_id();
                self.subscription_count = self.db.bus.subscribe(id, cmd.channels);
            }
            Command::Unsubscribe(cmd) => {
                let id = self.subscriber_id();
                self.subscription_count = self.db.bus.unsubscribe(id, cmd.channels);
            }
            Command::PSubscribe(cmd) => {
                let id = self.subscriber_id();
                self.subscription_count = self.db.bus.psubscribe(id, cmd.patterns);
            }
            Command::PUnsubscribe(cmd) => {
                let id = self.subscriber_id();
                self.subscription_count = self.db.bus.punsubscribe(id, cmd.patterns);
            }

            // Transaction control operates on this connection's state.
            Command::Multi(_) => {
                let response = match self.tx.begin() {
                    Ok(()) => Frame::Simple("OK".to_string()),
                    Err(err) => Frame::Error(err.to_string()),
                };
                conn.write_frame(&response).await?;
            }
            Command::Exec(_) => {
                let db = self.db.clone();
                let result = self
                    .tx
                    .exec(&db.versions, |name, args| execute_queued(&db, name, args));

                let response = match result {
                    Err(err) => Frame::Error(err.to_string()),
                    Ok(None) => Frame::NullArray,
                    Ok(Some(frames)) => Frame::Array(frames),
                };
                conn.write_frame(&response).await?;
            }
            Command::Discard(_) => {
                let response = match self.tx.discard() {
                    Ok(()) => Frame::Simple("OK".to_string()),
                    Err(err) => Frame::Error(err.to_string()),
                };
                conn.write_frame(&response).await?;
            }
            Command::Watch(cmd) => {
                let response = match self.tx.watch(&self.db.versions, cmd.keys) {
                    Ok(()) => Frame::Simple("OK".to_string()),
                    Err(err) => Frame::Error(err.to_string()),
                };
                conn.write_frame(&response).await?;
            }
            Command::Unwatch(_) => {
                self.tx.unwatch();
                conn.write_frame(&Frame::Simple("OK".to_string())).await?;
            }

            Command::Quit(_) => {
                conn.write_frame(&Frame::Simple("OK".to_string())).await?;
                return Ok(true);
            }

            // Everything else runs against the shared state.
            command => {
                let response = command
                    .exec(self.db.clone())
                    .unwrap_or_else(|err| Frame::Error(err.to_string()));
                conn.write_frame(&response).await?;
            }
        }

        Ok(false)
    }

    fn subscriber_id(&mut self) -> u64 {
        let bus: &PubSub = &self.db.bus;
        match &self.subscriber {
            Some(subscriber) => subscriber.id,
            None => {
                let subscriber = bus.subscriber();
                let id = subscriber.id;
                self.subscriber = Some(subscriber);
                id
            }
        }
    }

    /// Severs the subscriber from the bus before the connection drops it.
    fn close(&mut self) {
        if let Some(subscriber) = self.subscriber.take() {
            self.db.bus.remove_subscriber(subscriber.id);
        }
    }
}

/// Runs one queued command through the regular dispatch path during EXEC.
/// Failures become error frames in the result array; they never abort the
/// remaining entries.
fn execute_queued(db: &Db, name: &str, args: &[String]) -> Frame {
    let frame = commands::frame_from_parts(name, args);
    match Command::try_from(frame) {
        Ok(command) => command
            .exec(db.clone())
            .unwrap_or_else(|err| Frame::Error(err.to_string())),
        Err(err) => Frame::Error(err.to_string()),
    }
}

fn is_subscription_command(name: &str) -> bool {
    matches!(
        name,
        "subscribe" | "unsubscribe" | "psubscribe" | "punsubscribe" | "ping" | "quit"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_command_set() {
        for name in [
            "subscribe",
            "unsubscribe",
            "psubscribe",
            "punsubscribe",
            "ping",
            "quit",
        ] {
            assert!(is_subscription_command(name));
        }
        assert!(!is_subscription_command("get"));
        assert!(!is_subscription_command("multi"));
    }

    #[test]
    fn queued_commands_run_through_normal_dispatch() {
        let db = Db::new(std::env::temp_dir().join("oxidis-server-test.rdb"));

        let response = execute_queued(
            &db,
            "set",
            &["k".to_string(), "v".to_string()],
        );
        assert_eq!(response, Frame::Simple("OK".to_string()));
        assert_eq!(db.strings.get("k"), Some("v".to_string()));

        let response = execute_queued(&db, "nonsense", &[]);
        assert!(matches!(response, Frame::Error(msg) if msg.contains("unknown command")));

        // Session commands queued inside MULTI degrade to error entries.
        let response = execute_queued(&db, "subscribe", &["c".to_string()]);
        assert!(matches!(response, Frame::Error(msg) if msg.contains("not allowed in transactions")));
    }
}
