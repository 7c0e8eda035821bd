use anyhow::Context;
use relm4::prelude::*;
use torus::config;
use torus::gui::app::AppModel;
use torus::sys::runtime;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    if let Ok(path) = config::write_default_config() {
        log::debug!("Config at {}", path.display());
    }

    let config = config::load_or_default();
    let menu = config
        .build_menu()
        .context("invalid menu configuration")?;

    let (tx, rx) = async_channel::bounded(32);

    runtime::start_background_services(tx).context("failed to start background services")?;

    let app = RelmApp::new("org.torus.menu");

    app.run::<AppModel>((menu, config, rx));
    Ok(())
}
