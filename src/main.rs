//! Entry point for the **spaceswitch** daemon.
//!
//! Spawns the Unix-socket command listener on a background thread and runs
//! the model on the main thread: a periodic refresh every tick, commands as
//! they arrive, and the one-shot follow-up refresh after each switch.  The
//! model is only ever touched from this thread.
//!
//! ```text
//! spaceswitch --snapshot <path>
//! ```

use log::{debug, error, info, warn};
use spaceswitch::command::Command;
use spaceswitch::config::Config;
use spaceswitch::host::snapshot::SnapshotHost;
use spaceswitch::ipc::listener::UnixSocketListener;
use spaceswitch::model::{RefreshOutcome, SpaceModel};
use spaceswitch::names::NameStore;
use spaceswitch::store::JsonFileStore;
use spaceswitch::traits::{CommandSource, KeyValueStore, SpaceHost};
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Instant;

/// Default socket path for the command listener.
fn default_socket_path() -> String {
    let runtime = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into());
    format!("{}/spaceswitch.sock", runtime)
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/spaceswitch`).
fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("spaceswitch")
}

/// Try to load the config from `$XDG_CONFIG_HOME/spaceswitch/config.json`,
/// falling back to compiled-in defaults.
fn load_config() -> Config {
    let path = config_dir().join("config.json");
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

/// Value of `--snapshot <path>`.
fn snapshot_arg() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--snapshot" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}

//  Main

fn main() {
    env_logger::init();

    let Some(snapshot) = snapshot_arg() else {
        error!("usage: spaceswitch --snapshot <path>");
        std::process::exit(2);
    };

    let config = load_config();
    let host = SnapshotHost::new(&snapshot);
    let names = NameStore::new(
        JsonFileStore::new(config_dir().join("names.json")),
        config.names.namespace.clone(),
    );
    let mut model = SpaceModel::new(host, names);
    model.set_follow_up_delay(config.polling.follow_up());

    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
    spawn_command_sources(cmd_tx);

    run_event_loop(&mut model, cmd_rx, &config);
}

//  Event loop

fn run_event_loop<H: SpaceHost, S: KeyValueStore>(
    model: &mut SpaceModel<H, S>,
    cmd_rx: mpsc::Receiver<Command>,
    config: &Config,
) {
    let tick = config.polling.tick();
    info!("spaceswitch running (tick {:?})", tick);

    let outcome = model.refresh();
    publish(model, outcome);
    let mut next_tick = Instant::now() + tick;

    loop {
        let wake = model
            .next_deadline()
            .map_or(next_tick, |follow_up| follow_up.min(next_tick));
        let timeout = wake.saturating_duration_since(Instant::now());

        match cmd_rx.recv_timeout(timeout) {
            Ok(cmd) => {
                debug!("command {:?}", cmd);
                match model.handle(cmd) {
                    Ok(()) => info!("{}", model.status_line()),
                    Err(e) => warn!("command ignored: {}", e),
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                info!("command source closed, exiting");
                break;
            }
        }

        let now = Instant::now();
        if let Some(outcome) = model.poll_follow_up(now) {
            publish(model, outcome);
        }
        if now >= next_tick {
            let outcome = model.refresh();
            publish(model, outcome);
            next_tick = now + tick;
        }
    }
}

/// Log the snapshot whenever it changed.
fn publish<H: SpaceHost, S: KeyValueStore>(model: &SpaceModel<H, S>, outcome: RefreshOutcome) {
    if outcome == RefreshOutcome::Changed {
        info!("{}", model.status_line());
    }
}

//  Helpers

fn spawn_command_sources(tx: mpsc::Sender<Command>) {
    let path = default_socket_path();
    std::thread::spawn(move || {
        let mut source = UnixSocketListener::new(&path);
        if let Err(e) = source.run(tx) {
            error!("socket listener error: {}", e);
        }
    });
}
