/// Events produced by the background services (socket server, config
/// watcher) and forwarded into the GTK main loop.
#[derive(Debug, Clone)]
pub enum AppEvent {
    Show,
    Hide,
    ConfigReload,
}
