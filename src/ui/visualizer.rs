use std::cell::RefCell;

use gtk4::prelude::*;
use gtk4::{self, Align};
use libadwaita::prelude::*;

use crate::app::{BackendEvent, DebugInfo, ResultPanel, SelectorControl, View};
use crate::engine::SelectionId;

const PAGE_LOADING: &str = "loading";
const PAGE_FAILED: &str = "failed";
const PAGE_READY: &str = "ready";

const SIGNS_PER_ROW: u32 = 7;

/// Handles returned from building the visualizer window.
pub struct VisualizerWidgets {
    pub window: libadwaita::ApplicationWindow,
    stack: gtk4::Stack,
    loading_label: gtk4::Label,
    failed_label: gtk4::Label,
    sign_grid: gtk4::FlowBox,
    sign_buttons: RefCell<Vec<(SelectionId, gtk4::Button)>>,
    letter_box: gtk4::Box,
    letter_label: gtk4::Label,
    prompt_label: gtk4::Label,
    error_label: gtk4::Label,
    debug_box: gtk4::Box,
    debug_id_label: gtk4::Label,
    debug_valid_label: gtk4::Label,
    debug_total_label: gtk4::Label,
    backend_sender: async_channel::Sender<BackendEvent>,
}

/// Build the main window. Starts on the loading page.
pub fn build_visualizer(
    app: &libadwaita::Application,
    backend_sender: async_channel::Sender<BackendEvent>,
) -> VisualizerWidgets {
    load_css();

    let window = libadwaita::ApplicationWindow::builder()
        .application(app)
        .title("Sign Visualizer")
        .default_width(640)
        .default_height(720)
        .build();

    let toolbar_view = libadwaita::ToolbarView::new();
    let header = libadwaita::HeaderBar::new();
    header.set_title_widget(Some(&libadwaita::WindowTitle::new(
        "Sign Language to Text Visualizer",
        "Select a hand sign to see the corresponding alphabet letter (A\u{2013}Z)",
    )));
    toolbar_view.add_top_bar(&header);

    let stack = gtk4::Stack::new();
    stack.set_transition_type(gtk4::StackTransitionType::Crossfade);

    // --- Loading page ---
    let loading_page = gtk4::Box::new(gtk4::Orientation::Vertical, 12);
    loading_page.set_valign(Align::Center);
    let spinner = gtk4::Spinner::new();
    spinner.start();
    let loading_label = gtk4::Label::new(Some("Loading sign engine..."));
    loading_label.add_css_class("dim-label");
    loading_page.append(&spinner);
    loading_page.append(&loading_label);
    stack.add_named(&loading_page, Some(PAGE_LOADING));

    // --- Failed page ---
    let failed_label = gtk4::Label::new(None);
    failed_label.add_css_class("error");
    failed_label.set_wrap(true);
    failed_label.set_valign(Align::Center);
    stack.add_named(&failed_label, Some(PAGE_FAILED));

    // --- Ready page ---
    let content = gtk4::Box::new(gtk4::Orientation::Vertical, 12);
    content.set_margin_start(16);
    content.set_margin_end(16);
    content.set_margin_top(12);
    content.set_margin_bottom(12);

    let selector_title = gtk4::Label::new(Some("Select a Hand Sign"));
    selector_title.add_css_class("title-3");
    selector_title.set_halign(Align::Start);
    content.append(&selector_title);

    let sign_grid = gtk4::FlowBox::builder()
        .max_children_per_line(SIGNS_PER_ROW)
        .min_children_per_line(SIGNS_PER_ROW)
        .selection_mode(gtk4::SelectionMode::None)
        .homogeneous(true)
        .row_spacing(6)
        .column_spacing(6)
        .build();
    content.append(&sign_grid);
    content.append(&gtk4::Separator::new(gtk4::Orientation::Horizontal));

    let result_title = gtk4::Label::new(Some("Detected Letter"));
    result_title.add_css_class("title-3");
    result_title.set_halign(Align::Start);
    content.append(&result_title);

    let letter_box = gtk4::Box::new(gtk4::Orientation::Horizontal, 12);
    letter_box.set_halign(Align::Center);
    let letter_label = gtk4::Label::new(None);
    letter_label.add_css_class("detected-letter");
    let speak_button = gtk4::Button::builder()
        .icon_name("audio-volume-high-symbolic")
        .tooltip_text("Speak letter aloud")
        .valign(Align::Center)
        .build();
    let sender_for_speak = backend_sender.clone();
    speak_button.connect_clicked(move |_| {
        let _ = sender_for_speak.try_send(BackendEvent::SpeakRequested);
    });
    letter_box.append(&letter_label);
    letter_box.append(&speak_button);
    content.append(&letter_box);

    let prompt_label = gtk4::Label::new(Some("Select a hand sign above to see the result"));
    prompt_label.add_css_class("dim-label");
    content.append(&prompt_label);

    let error_label = gtk4::Label::new(None);
    error_label.add_css_class("error");
    content.append(&error_label);

    let debug_box = gtk4::Box::new(gtk4::Orientation::Vertical, 2);
    debug_box.add_css_class("debug-info");
    let debug_id_label = debug_line(&debug_box);
    let debug_valid_label = debug_line(&debug_box);
    let debug_total_label = debug_line(&debug_box);
    content.append(&debug_box);

    let scrolled = gtk4::ScrolledWindow::builder()
        .hscrollbar_policy(gtk4::PolicyType::Never)
        .child(&content)
        .build();
    stack.add_named(&scrolled, Some(PAGE_READY));

    // Assemble
    toolbar_view.set_content(Some(&stack));
    window.set_content(Some(&toolbar_view));

    let widgets = VisualizerWidgets {
        window,
        stack,
        loading_label,
        failed_label,
        sign_grid,
        sign_buttons: RefCell::new(Vec::new()),
        letter_box,
        letter_label,
        prompt_label,
        error_label,
        debug_box,
        debug_id_label,
        debug_valid_label,
        debug_total_label,
        backend_sender,
    };
    render(
        &widgets,
        &View::Loading {
            message: "Loading sign engine...".into(),
        },
        false,
    );
    widgets
}

/// Update every widget to match `view`.
pub fn render(widgets: &VisualizerWidgets, view: &View, show_debug: bool) {
    match view {
        View::Loading { message } => {
            widgets.loading_label.set_text(message);
            for (_, button) in widgets.sign_buttons.borrow().iter() {
                button.set_sensitive(false);
            }
            widgets.stack.set_visible_child_name(PAGE_LOADING);
        }
        View::Failed { message } => {
            widgets.failed_label.set_text(&format!("Error: {message}"));
            // Only the failure message is shown; drop the selector entirely.
            widgets.sign_grid.remove_all();
            widgets.sign_buttons.borrow_mut().clear();
            widgets.stack.set_visible_child_name(PAGE_FAILED);
        }
        View::Ready {
            controls,
            result,
            debug,
        } => {
            sync_sign_buttons(widgets, controls);
            render_result(widgets, result);
            render_debug(widgets, debug.as_ref().filter(|_| show_debug));
            widgets.stack.set_visible_child_name(PAGE_READY);
        }
    }
}

fn sync_sign_buttons(widgets: &VisualizerWidgets, controls: &[SelectorControl]) {
    let needs_rebuild = {
        let buttons = widgets.sign_buttons.borrow();
        buttons.len() != controls.len()
            || buttons.iter().zip(controls).any(|((id, _), c)| *id != c.id)
    };

    if needs_rebuild {
        widgets.sign_grid.remove_all();
        let mut buttons = widgets.sign_buttons.borrow_mut();
        buttons.clear();
        for control in controls {
            let button = sign_button(control, widgets.backend_sender.clone());
            widgets.sign_grid.append(&button);
            buttons.push((control.id, button));
        }
    }

    for ((_, button), control) in widgets.sign_buttons.borrow().iter().zip(controls) {
        button.set_sensitive(true);
        if control.selected {
            button.add_css_class("selected");
        } else {
            button.remove_css_class("selected");
        }
    }
}

fn sign_button(
    control: &SelectorControl,
    sender: async_channel::Sender<BackendEvent>,
) -> gtk4::Button {
    let inner = gtk4::Box::new(gtk4::Orientation::Vertical, 2);
    let hand = gtk4::Label::new(Some("\u{270B}"));
    hand.add_css_class("hand-sign");
    let letter = gtk4::Label::new(Some(control.label.as_str()));
    inner.append(&hand);
    inner.append(&letter);

    let button = gtk4::Button::builder().child(&inner).build();
    button.add_css_class("sign-button");

    let id = control.id;
    button.connect_clicked(move |_| {
        let _ = sender.try_send(BackendEvent::SignSelected(id));
    });
    button
}

fn render_result(widgets: &VisualizerWidgets, result: &ResultPanel) {
    widgets.letter_box.set_visible(false);
    widgets.prompt_label.set_visible(false);
    widgets.error_label.set_visible(false);

    match result {
        ResultPanel::Letter(letter) => {
            widgets.letter_label.set_text(&letter.to_string());
            widgets.letter_box.set_visible(true);
        }
        ResultPanel::Prompt => widgets.prompt_label.set_visible(true),
        ResultPanel::Error(message) => {
            widgets.error_label.set_text(message);
            widgets.error_label.set_visible(true);
            widgets.prompt_label.set_visible(true);
        }
    }
}

fn render_debug(widgets: &VisualizerWidgets, debug: Option<&DebugInfo>) {
    let Some(info) = debug else {
        widgets.debug_box.set_visible(false);
        return;
    };
    widgets
        .debug_id_label
        .set_text(&format!("Image ID: {}", info.id));
    widgets.debug_valid_label.set_text(&format!(
        "Valid ID: {}",
        if info.valid { "Yes" } else { "No" }
    ));
    widgets
        .debug_total_label
        .set_text(&format!("Total Signs: {}", info.total));
    widgets.debug_box.set_visible(true);
}

fn debug_line(parent: &gtk4::Box) -> gtk4::Label {
    let label = gtk4::Label::new(None);
    label.set_halign(Align::Start);
    label.add_css_class("dim-label");
    label.add_css_class("caption");
    parent.append(&label);
    label
}

fn load_css() {
    let Some(display) = gtk4::gdk::Display::default() else {
        log::warn!("No display available, skipping stylesheet");
        return;
    };

    let css_provider = gtk4::CssProvider::new();
    css_provider.load_from_string(
        r#"
        .sign-button {
            padding: 6px;
        }
        .sign-button.selected {
            background-color: @accent_bg_color;
            color: @accent_fg_color;
        }
        .hand-sign {
            font-size: 22px;
        }
        .detected-letter {
            font-size: 64px;
            font-weight: bold;
        }
        .debug-info {
            margin-top: 12px;
        }
        "#,
    );
    gtk4::style_context_add_provider_for_display(
        &display,
        &css_provider,
        gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
    );
}
