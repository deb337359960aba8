//! Unix-socket [`CommandSource`] implementation.
//!
//! Binds a Unix stream socket and serves one client at a time.  Each line a
//! client sends is parsed as a JSON-encoded [`Command`]; a status bar or a
//! key-bind helper typically connects, writes one line and disconnects.
//!
//! # Wire format
//!
//! Every message is a single line of JSON followed by `\n`:
//!
//! ```json
//! {"SwitchToSpace":42}
//! {"SwitchToIndex":3}
//! {"Rename":{"space":42,"name":"Mail"}}
//! {"ClearLabel":42}
//! "ResetLabels"
//! "Refresh"
//! ```
//!
//! Malformed lines are logged and skipped; they never end the connection.

use crate::command::Command;
use crate::traits::CommandSource;
use log::{debug, error, info, warn};
use std::io::{BufRead, BufReader};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

/// A [`CommandSource`] that listens on a Unix stream socket.
pub struct UnixSocketListener {
    path: PathBuf,
}

/// Errors produced by the Unix socket listener.
#[derive(Debug, thiserror::Error)]
pub enum UnixSocketError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// What happened to the sink while serving a client.
enum Served {
    Open,
    SinkClosed,
}

impl UnixSocketListener {
    /// Create a listener for `path`.
    ///
    /// The socket file is created when [`run`](CommandSource::run) is called;
    /// a stale file left by a previous run is replaced.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The filesystem path of the socket.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Forward every parsable line from one client.
    fn serve(stream: UnixStream, sink: &mpsc::Sender<Command>) -> Served {
        for line in BufReader::new(stream).lines() {
            let text = match line {
                Ok(text) => text,
                Err(e) => {
                    warn!("read error: {}", e);
                    break;
                }
            };
            let Some(cmd) = parse_line(&text) else {
                continue;
            };
            debug!("received {:?}", cmd);
            if sink.send(cmd).is_err() {
                return Served::SinkClosed;
            }
        }
        Served::Open
    }
}

/// Parse one wire line.  Blank lines are ignored silently, bad JSON is
/// logged.
fn parse_line(text: &str) -> Option<Command> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    match serde_json::from_str(text) {
        Ok(cmd) => Some(cmd),
        Err(e) => {
            error!("bad command {:?}: {}", text, e);
            None
        }
    }
}

impl CommandSource for UnixSocketListener {
    type Error = UnixSocketError;

    /// Bind the socket and serve clients until the sink is dropped.
    ///
    /// This method **blocks**.  Run it on a dedicated thread.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error> {
        let _ = std::fs::remove_file(&self.path);
        let listener = UnixListener::bind(&self.path)?;
        info!("listening on {}", self.path.display());

        for stream in listener.incoming() {
            let stream = match stream {
                Ok(s) => s,
                Err(e) => {
                    error!("accept error: {}", e);
                    continue;
                }
            };
            if let Served::SinkClosed = Self::serve(stream, &sink) {
                info!("sink closed, shutting down");
                break;
            }
        }

        let _ = std::fs::remove_file(&self.path);
        Ok(())
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::SpaceId;
    use std::io::Write;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Monotonic counter to generate unique socket paths per test.
    static TEST_ID: AtomicU32 = AtomicU32::new(0);

    fn tmp_socket_path() -> PathBuf {
        let id = TEST_ID.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!(
            "spaceswitch-test-{}-{}.sock",
            std::process::id(),
            id
        ))
    }

    /// Start a listener in the background and send `lines` from one client.
    fn send_lines(lines: &[&str]) -> Vec<Command> {
        let path = tmp_socket_path();
        let listener_path = path.clone();
        let (tx, rx) = mpsc::channel();

        let _handle = std::thread::spawn(move || {
            let mut listener = UnixSocketListener::new(&listener_path);
            let _ = listener.run(tx);
        });

        // Give the listener a moment to bind.
        std::thread::sleep(Duration::from_millis(150));
        {
            let mut stream = UnixStream::connect(&path).expect("connect");
            for line in lines {
                writeln!(stream, "{}", line).unwrap();
            }
            stream.shutdown(std::net::Shutdown::Write).unwrap();
        }
        std::thread::sleep(Duration::from_millis(150));

        let cmds = rx.try_iter().collect();
        let _ = std::fs::remove_file(&path);
        cmds
    }

    #[test]
    fn parse_line_skips_blank_and_bad_input() {
        assert_eq!(parse_line("   "), None);
        assert_eq!(parse_line("not json"), None);
        assert_eq!(parse_line(r#" "Refresh" "#), Some(Command::Refresh));
    }

    #[test]
    fn commands_arrive_over_socket() {
        let cmds = send_lines(&[
            r#"{"SwitchToSpace":42}"#,
            r#"{"Rename":{"space":"7","name":"Mail"}}"#,
            "",
            r#""Refresh""#,
        ]);
        assert_eq!(
            cmds,
            vec![
                Command::SwitchToSpace(SpaceId(42)),
                Command::Rename {
                    space: SpaceId(7),
                    name: "Mail".into()
                },
                Command::Refresh,
            ]
        );
    }

    #[test]
    fn malformed_json_does_not_end_connection() {
        let cmds = send_lines(&["not json at all", r#"{"SwitchToIndex":3}"#]);
        assert_eq!(cmds, vec![Command::SwitchToIndex(3)]);
    }
}
