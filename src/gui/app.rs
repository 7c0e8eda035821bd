use crate::config::{self, Config, ExecCommand};
use crate::events::AppEvent;
use crate::gui::menu::{self, FRAME_INTERVAL_MS, Point, RadialMenu, TapEvent};
use crate::gui::theme::{self, ThemeColors};
use crate::gui::window;
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::prelude::*;
use std::cell::RefCell;
use std::process::{Command, Stdio};
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

pub struct AppModel {
    pub menu: Rc<RefCell<RadialMenu>>,
    pub config: Config,
    pub visible: bool,
    pub root: gtk::ApplicationWindow,
    pub drawing_area: gtk::DrawingArea,
}

#[derive(Debug)]
pub enum AppMsg {
    Show,
    Hide,
    Tap(Point),
    ConfigReload,
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::Show => AppMsg::Show,
            AppEvent::Hide => AppMsg::Hide,
            AppEvent::ConfigReload => AppMsg::ConfigReload,
        }
    }
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = (RadialMenu, Config, async_channel::Receiver<AppEvent>);
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        #[name = "window"]
        gtk::ApplicationWindow {
            set_title: Some("Torus"),
            #[watch]
            set_visible: model.visible,
            #[watch]
            set_opacity: if model.visible { 1.0 } else { 0.0 },
            add_css_class: "torus-window",
            set_decorated: false,

            add_controller = gtk::EventControllerKey {
                connect_key_pressed[sender] => move |_, key, _, _| {
                    if key == gtk::gdk::Key::Escape {
                        sender.input(AppMsg::Hide);
                        return glib::Propagation::Stop;
                    }
                    glib::Propagation::Proceed
                }
            },

            #[name = "drawing_area"]
            gtk::DrawingArea {
                set_hexpand: true,
                set_vexpand: true,
                add_css_class: "torus-drawing-area",

                add_controller = gtk::GestureClick {
                    connect_released[sender] => move |_, _, x, y| {
                        sender.input(AppMsg::Tap(Point::new(x, y)));
                    }
                }
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let (menu, config, rx) = init;

        theme::load_css();
        window::init_layer_shell(&root);

        let menu = Rc::new(RefCell::new(menu));

        let model = AppModel {
            menu: menu.clone(),
            config,
            visible: false,
            root: root.clone(),
            drawing_area: gtk::DrawingArea::default(),
        };

        let widgets = view_output!();

        let mut model = model;
        model.drawing_area = widgets.drawing_area.clone();

        let menu_draw = model.menu.clone();
        widgets
            .drawing_area
            .set_draw_func(move |drawing_area, cr, _, _| {
                let style_context = drawing_area.style_context();
                let colors = ThemeColors::from_context(&style_context);
                if let Err(e) = menu::draw(cr, &menu_draw.borrow(), &colors) {
                    log::error!("Drawing error: {}", e);
                }
            });

        let sender_clone = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = rx.recv().await {
                sender_clone.input(AppMsg::from(event));
            }
        });

        root.set_visible(false);

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, _sender: ComponentSender<Self>) {
        match msg {
            AppMsg::Show => {
                self.visible = true;

                // the window surface only exists once the watch above has
                // mapped it; summon on the next idle pass so the cursor query
                // and the size fallback see the mapped window
                let root = self.root.clone();
                let menu = self.menu.clone();
                let area = self.drawing_area.clone();
                glib::idle_add_local_once(move || {
                    let summon = window::get_cursor_position(&root).unwrap_or_else(|| {
                        Point::new(root.width() as f64 / 2.0, root.height() as f64 / 2.0)
                    });
                    menu.borrow_mut().open_at(summon, Instant::now());
                    area.queue_draw();
                    drive_animation(&menu, &area);
                });
            }
            AppMsg::Hide => {
                self.menu.borrow_mut().close();
                self.visible = false;
            }
            AppMsg::Tap(point) => {
                if !self.visible {
                    return;
                }
                match self.menu.borrow_mut().handle_tap(point) {
                    Some(TapEvent::Dismiss) => {
                        // the menu already closed itself; drop the overlay
                        self.visible = false;
                    }
                    Some(TapEvent::CenterAction) => {
                        log::debug!("Center action");
                        if let Some(exec) = self.config.center_exec.clone() {
                            run_command(&exec);
                        }
                    }
                    Some(TapEvent::SliceSelected(index)) => {
                        log::debug!("Section {} selected", index);
                        let exec = self
                            .config
                            .sections
                            .get(index - 1)
                            .and_then(|s| s.exec.clone());
                        if let Some(exec) = exec {
                            run_command(&exec);
                        }
                    }
                    None => {}
                }
                self.drawing_area.queue_draw();
            }
            AppMsg::ConfigReload => match config::load_config() {
                Ok(new_config) => match new_config.build_menu() {
                    Ok(new_menu) => {
                        *self.menu.borrow_mut() = new_menu;
                        self.config = new_config;
                        self.visible = false;
                        log::info!("Configuration reloaded");
                    }
                    Err(e) => log::error!("Reloaded config rejected: {}", e),
                },
                Err(e) => log::error!("Failed to reload config: {}", e),
            },
        }
    }
}

/// Pump the staggered reveal with a frame timer. The timer carries the
/// session generation so a close or reopen orphans it cleanly; nothing
/// fires for a cancelled session.
fn drive_animation(menu: &Rc<RefCell<RadialMenu>>, area: &gtk::DrawingArea) {
    let menu_ref = menu.borrow();
    let Some(generation) = menu_ref.session_generation() else {
        return;
    };
    if !menu_ref.is_animating() {
        return;
    }
    drop(menu_ref);

    let menu = menu.clone();
    let area = area.clone();
    glib::timeout_add_local(Duration::from_millis(FRAME_INTERVAL_MS), move || {
        let mut menu_ref = menu.borrow_mut();
        if menu_ref.session_generation() != Some(generation) {
            return glib::ControlFlow::Break;
        }
        let running = menu_ref.tick(Instant::now());
        drop(menu_ref);

        area.queue_draw();
        if running {
            glib::ControlFlow::Continue
        } else {
            glib::ControlFlow::Break
        }
    });
}

/// Split the configured command line and detach it from the overlay's stdio.
fn build_command(exec: &ExecCommand) -> Option<Command> {
    let argv = match shell_words::split(exec.as_str()) {
        Ok(argv) => argv,
        Err(e) => {
            log::error!("Bad command {:?}: {}", exec.as_str(), e);
            return None;
        }
    };
    let (program, args) = argv.split_first()?;

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    Some(command)
}

fn run_command(exec: &ExecCommand) {
    let Some(mut command) = build_command(exec) else {
        return;
    };
    match command.spawn() {
        Ok(mut child) => {
            // reap in the background so the long-lived overlay never
            // accumulates zombies
            thread::spawn(move || {
                let _ = child.wait();
            });
        }
        Err(e) => log::error!("Failed to run {:?}: {}", exec.as_str(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_are_split_into_program_and_args() {
        let command = build_command(&ExecCommand::from("grim -g '0,0 10x10' shot.png".to_owned()))
            .unwrap();
        assert_eq!(command.get_program(), "grim");
        let args: Vec<_> = command
            .get_args()
            .map(|a| a.to_str().unwrap())
            .collect();
        assert_eq!(args, ["-g", "0,0 10x10", "shot.png"]);
    }

    #[test]
    fn empty_or_malformed_commands_build_nothing() {
        assert!(build_command(&ExecCommand::from(String::new())).is_none());
        assert!(build_command(&ExecCommand::from("   ".to_owned())).is_none());
        assert!(build_command(&ExecCommand::from("foot 'unterminated".to_owned())).is_none());
    }
}
