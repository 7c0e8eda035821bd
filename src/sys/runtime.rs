use crate::events::AppEvent;
use async_channel::Sender;
use std::io;
use std::thread;
use tokio::runtime::Builder;

/// Run the control socket and the config watcher on a dedicated runtime
/// thread, feeding their events into the GTK main loop through `tx`.
///
/// Both services run until the process exits; the thread is never joined.
pub fn start_background_services(tx: Sender<AppEvent>) -> io::Result<()> {
    let rt = Builder::new_current_thread().enable_all().build()?;

    thread::Builder::new()
        .name("torus-services".into())
        .spawn(move || {
            rt.block_on(async {
                tokio::join!(
                    crate::sys::server::run_server(tx.clone()),
                    crate::config::run_async_watcher(tx),
                );
            });
        })?;

    Ok(())
}
