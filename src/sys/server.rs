use crate::events::AppEvent;
use async_channel::Sender;
use std::io::ErrorKind;
use strum::EnumString;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{UnixListener, UnixStream};

const SOCKET_PATH: &str = "/tmp/torus.sock";

/// Commands accepted on the control socket, one per line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum SocketCommand {
    Show,
    Hide,
    Reload,
}

impl From<SocketCommand> for AppEvent {
    fn from(command: SocketCommand) -> Self {
        match command {
            SocketCommand::Show => AppEvent::Show,
            SocketCommand::Hide => AppEvent::Hide,
            SocketCommand::Reload => AppEvent::ConfigReload,
        }
    }
}

pub async fn run_server(tx: Sender<AppEvent>) {
    // a previous instance may have left its socket behind
    if let Err(e) = std::fs::remove_file(SOCKET_PATH)
        && e.kind() != ErrorKind::NotFound
    {
        log::warn!("Failed to remove stale socket: {}", e);
    }

    let listener = match UnixListener::bind(SOCKET_PATH) {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind unix socket: {}", e);
            return;
        }
    };
    log::info!("Listening on {}", SOCKET_PATH);

    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                tokio::spawn(handle_connection(stream, tx.clone()));
            }
            Err(e) => log::error!("Failed to accept connection: {}", e),
        }
    }
}

async fn handle_connection(stream: UnixStream, tx: Sender<AppEvent>) {
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        match line.trim().parse::<SocketCommand>() {
            Ok(command) => {
                // a closed channel means the GTK side is gone
                if tx.send(command.into()).await.is_err() {
                    return;
                }
            }
            Err(_) => log::warn!("Unknown socket command {:?}", line.trim()),
        }
    }
}
