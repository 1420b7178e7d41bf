mod app;
mod config;
mod engine;
mod speech;
mod ui;

use std::cell::RefCell;
use std::rc::Rc;

use gtk4::prelude::*;

use app::{AppState, BackendEvent};
use config::Config;

fn main() {
    env_logger::init();
    log::info!("Sign Visualizer starting");

    let application = libadwaita::Application::builder()
        .application_id("com.github.sign-visualizer")
        .build();

    application.connect_activate(on_activate);
    application.run();
}

fn on_activate(app: &libadwaita::Application) {
    // Backend → UI channel; the GTK main loop is the only consumer.
    let (backend_tx, backend_rx) = async_channel::unbounded::<BackendEvent>();

    let config = Config::load();
    config.ensure_saved();

    let state = match AppState::new(config, backend_tx.clone()) {
        Ok(state) => Rc::new(RefCell::new(state)),
        Err(e) => {
            log::error!("Failed to create tokio runtime: {e}");
            app.quit();
            return;
        }
    };

    let widgets = ui::visualizer::build_visualizer(app, backend_tx);
    widgets.window.present();
    state.borrow_mut().window = Some(widgets);
    app::refresh_view(&state);

    // Attach backend event handler
    {
        let state_clone = state.clone();
        gtk4::glib::spawn_future_local(async move {
            while let Ok(event) = backend_rx.recv().await {
                app::handle_backend_event(&state_clone, event);
            }
        });
    }

    // Kick off the one engine load for this session
    app::start_engine_load(&state);
}
