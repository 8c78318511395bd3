//! CLI smoke entry point.
//!
//! # Responsibility
//! - Wire `savedemo_core` to the in-memory host and headless panel.
//! - Replay edit, save, close and reopen, printing deterministic `key=value`
//!   lines for quick local sanity checks.

use log::error;
use savedemo_core::{
    default_log_level, init_logging, AppEvent, DocumentEvent, EventSource, InMemoryHost,
    PanelControl, PluginConfig, PluginRuntime, RecordingSurfaceFactory, UiSurface,
};
use std::cell::RefCell;
use std::process::ExitCode;
use std::rc::Rc;

type Runtime = PluginRuntime<InMemoryHost, RecordingSurfaceFactory>;

fn main() -> ExitCode {
    if let Err(err) = init_logging(default_log_level(), None) {
        eprintln!("logging disabled: {err}");
    }
    println!("savedemo_core version={}", savedemo_core::core_version());

    match run_scenario() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=smoke module=cli status=error error={err}");
            println!("status=error error={err}");
            ExitCode::FAILURE
        }
    }
}

fn run_scenario() -> Result<(), String> {
    let runtime: Rc<RefCell<Runtime>> = Rc::new(RefCell::new(PluginRuntime::new(
        InMemoryHost::new(),
        RecordingSurfaceFactory::default(),
        PluginConfig::default(),
    )));
    let documents = EventSource::new("documents");
    let app = EventSource::new("app");
    PluginRuntime::attach(&runtime, &documents, &app);

    runtime.borrow_mut().on_plugin_load();
    idle(&app);

    runtime
        .borrow_mut()
        .controller_mut()
        .document_mut()
        .new_document("smoke.3dm");
    documents.emit(&DocumentEvent::NewDocument);
    idle(&app);
    report("new", &runtime.borrow());

    {
        let mut runtime = runtime.borrow_mut();
        let event = runtime
            .panel_mut()
            .surface_mut()
            .ok_or("panel was not shown")?
            .user_input(PanelControl::Slider, 30.0);
        runtime.on_panel_event(event).map_err(|err| err.to_string())?;
    }
    report("edit", &runtime.borrow());

    runtime
        .borrow_mut()
        .controller_mut()
        .document_mut()
        .save_document()
        .map_err(|err| err.to_string())?;
    documents.emit(&DocumentEvent::CloseDocument);
    runtime
        .borrow_mut()
        .controller_mut()
        .document_mut()
        .close_document();
    idle(&app);
    report("close", &runtime.borrow());

    if !runtime
        .borrow_mut()
        .controller_mut()
        .document_mut()
        .open_document("smoke.3dm")
    {
        return Err("saved document is missing".to_string());
    }
    documents.emit(&DocumentEvent::EndOpenDocument);
    idle(&app);
    report("reopen", &runtime.borrow());

    runtime.borrow_mut().detach(&documents, &app);
    println!("status=ok");
    Ok(())
}

fn idle(app: &EventSource<AppEvent>) {
    // The first idle may only post work; the second drains it.
    app.emit(&AppEvent::Idle);
    app.emit(&AppEvent::Idle);
}

fn report(step: &str, runtime: &Runtime) {
    let controller = runtime.controller();
    let radius = controller
        .current()
        .map(|state| format!("{:.1}", state.radius))
        .unwrap_or_else(|_| "uninitialized".to_string());
    let spheres = controller
        .document()
        .active_document()
        .map(|document| document.spheres().len())
        .unwrap_or(0);
    let numeric = runtime
        .panel()
        .surface()
        .map(|surface| format!("{:.1}", surface.control_value(PanelControl::Numeric)))
        .unwrap_or_else(|| "hidden".to_string());
    println!("step={step} radius={radius} spheres={spheres} panel_numeric={numeric}");
}
