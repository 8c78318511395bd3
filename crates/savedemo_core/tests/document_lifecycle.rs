use savedemo_core::{
    decode, AppEvent, DocumentEvent, DocumentObject, EventSource, GeometryPolicy, HostDocument,
    InMemoryHost, PanelControl, PanelEvent, PluginConfig, PluginRuntime, Point3,
    RecordingSurfaceFactory, StateRecord, UiSurface, DEFAULT_RADIUS, STATE_KEY_NAME,
};
use std::cell::RefCell;
use std::rc::Rc;

type Runtime = PluginRuntime<InMemoryHost, RecordingSurfaceFactory>;

const MAX_ECHO_ROUNDS: usize = 8;

struct Harness {
    runtime: Rc<RefCell<Runtime>>,
    documents: EventSource<DocumentEvent>,
    app: EventSource<AppEvent>,
}

impl Harness {
    fn start(config: PluginConfig) -> Self {
        let runtime = Rc::new(RefCell::new(PluginRuntime::new(
            InMemoryHost::new(),
            RecordingSurfaceFactory::with_echo(),
            config,
        )));
        let documents = EventSource::new("documents");
        let app = EventSource::new("app");
        assert!(PluginRuntime::attach(&runtime, &documents, &app));
        runtime.borrow_mut().on_plugin_load();
        Self {
            runtime,
            documents,
            app,
        }
    }

    fn idle(&self) {
        assert_eq!(self.app.emit(&AppEvent::Idle), 1);
        // Second idle drains tasks posted by the first one.
        self.app.emit(&AppEvent::Idle);
        let mut runtime = self.runtime.borrow_mut();
        self.feed_echoes(&mut runtime);
    }

    fn new_document(&self, name: &str) {
        self.runtime
            .borrow_mut()
            .controller_mut()
            .document_mut()
            .new_document(name);
        self.documents.emit(&DocumentEvent::NewDocument);
        self.idle();
    }

    fn save_and_close(&self) {
        {
            let mut runtime = self.runtime.borrow_mut();
            runtime
                .controller_mut()
                .document_mut()
                .save_document()
                .expect("save document");
        }
        self.documents.emit(&DocumentEvent::CloseDocument);
        self.runtime
            .borrow_mut()
            .controller_mut()
            .document_mut()
            .close_document();
    }

    fn open(&self, name: &str) {
        let opened = self
            .runtime
            .borrow_mut()
            .controller_mut()
            .document_mut()
            .open_document(name);
        assert!(opened, "document {name} should exist");
        self.documents.emit(&DocumentEvent::EndOpenDocument);
        self.idle();
    }

    /// User drags `control` to `value`; toolkit echoes are fed back.
    fn user_sets(&self, control: PanelControl, value: f64) {
        self.user_input(control, value);
        let mut runtime = self.runtime.borrow_mut();
        self.feed_echoes(&mut runtime);
    }

    /// User drags `control` to `value`; toolkit echoes stay queued.
    fn user_input(&self, control: PanelControl, value: f64) {
        let mut runtime = self.runtime.borrow_mut();
        let event = runtime
            .panel_mut()
            .surface_mut()
            .expect("panel surface")
            .user_input(control, value);
        runtime.on_panel_event(event).expect("user edit");
    }

    fn feed_echoes(&self, runtime: &mut Runtime) {
        for _ in 0..MAX_ECHO_ROUNDS {
            let echoes = match runtime.panel_mut().surface_mut() {
                Some(surface) => surface.take_notifications(),
                None => return,
            };
            if echoes.is_empty() {
                return;
            }
            for event in echoes {
                runtime.on_panel_event(event).expect("echo");
            }
        }
        panic!("echo notifications did not settle after {MAX_ECHO_ROUNDS} rounds");
    }

    fn revision(&self) -> u64 {
        self.runtime.borrow().controller().revision()
    }

    fn stored_blob(&self) -> Option<String> {
        let runtime = self.runtime.borrow();
        let controller = runtime.controller();
        controller
            .document()
            .get_string(&controller.config().owner(), STATE_KEY_NAME)
    }

    fn spheres(&self) -> Vec<savedemo_core::Sphere> {
        self.runtime
            .borrow()
            .controller()
            .document()
            .active_document()
            .map(|document| document.spheres())
            .unwrap_or_default()
    }

    fn radius(&self) -> f64 {
        self.runtime
            .borrow()
            .controller()
            .current()
            .expect("controller ready")
            .radius
    }

    fn control(&self, control: PanelControl) -> f64 {
        self.runtime
            .borrow()
            .panel()
            .surface()
            .expect("panel surface")
            .control_value(control)
    }
}

#[test]
fn example_scenario_survives_close_and_reopen() {
    let harness = Harness::start(PluginConfig::default());
    harness.idle();
    harness.new_document("demo.3dm");
    {
        let runtime = harness.runtime.borrow();
        let surface = runtime.panel().surface().expect("panel shown");
        assert!(surface.shown);
        assert_eq!(surface.control_value(PanelControl::Numeric), 5.0);
    }

    harness.user_sets(PanelControl::Slider, 30.0);

    assert_eq!(harness.control(PanelControl::Numeric), 30.0);
    let spheres = harness.spheres();
    assert_eq!(spheres.len(), 1);
    assert_eq!(spheres[0].radius, 30.0);
    assert_eq!(spheres[0].center, Point3::new(0.0, 0.0, 10.0));
    let blob = harness.stored_blob().expect("persisted blob");
    assert_eq!(decode(&blob).expect("decode"), StateRecord::new(30.0, 10.0));

    harness.save_and_close();
    assert_eq!(harness.radius(), DEFAULT_RADIUS);

    harness.open("demo.3dm");
    assert_eq!(
        harness.runtime.borrow().controller().current().expect("ready"),
        StateRecord::new(30.0, 10.0)
    );
    assert_eq!(harness.control(PanelControl::Numeric), 30.0);
    assert_eq!(harness.control(PanelControl::Slider), 30.0);
    assert_eq!(harness.spheres().len(), 1);
}

#[test]
fn close_then_new_document_resets_radius() {
    let harness = Harness::start(PluginConfig::default());
    harness.idle();
    harness.new_document("first.3dm");
    harness.user_sets(PanelControl::Numeric, 64.5);
    assert_eq!(harness.radius(), 64.5);

    harness.save_and_close();
    harness.new_document("second.3dm");
    assert_eq!(harness.radius(), DEFAULT_RADIUS);
    assert_eq!(harness.control(PanelControl::Numeric), DEFAULT_RADIUS);
    let spheres = harness.spheres();
    assert_eq!(spheres.len(), 1);
    assert_eq!(spheres[0].radius, DEFAULT_RADIUS);
}

#[test]
fn any_edit_sequence_leaves_exactly_one_sphere() {
    let harness = Harness::start(PluginConfig::default());
    harness.idle();
    harness.new_document("edits.3dm");

    let edits = [
        (PanelControl::Slider, 12.0),
        (PanelControl::Numeric, 12.0),
        (PanelControl::Numeric, 77.3),
        (PanelControl::Slider, 1.0),
        (PanelControl::Slider, 100.0),
        (PanelControl::Numeric, 18.9),
    ];
    for (control, value) in edits {
        harness.user_sets(control, value);
        let spheres = harness.spheres();
        assert_eq!(spheres.len(), 1);
        assert_eq!(spheres[0].radius, harness.radius());
    }
    assert_eq!(harness.radius(), 18.9);
    assert_eq!(harness.control(PanelControl::Slider), 18.0);
}

#[test]
fn replace_owned_policy_keeps_foreign_objects() {
    let config = PluginConfig {
        geometry_policy: GeometryPolicy::ReplaceOwned,
        ..PluginConfig::default()
    };
    let harness = Harness::start(config);
    harness.idle();
    harness.new_document("shared.3dm");
    harness
        .runtime
        .borrow_mut()
        .controller_mut()
        .document_mut()
        .add_foreign_object("user curve")
        .expect("foreign object");

    harness.user_sets(PanelControl::Slider, 25.0);
    harness.user_sets(PanelControl::Slider, 40.0);
    assert_eq!(harness.spheres().len(), 1);

    harness.save_and_close();
    harness.open("shared.3dm");

    let runtime = harness.runtime.borrow();
    let document = runtime
        .controller()
        .document()
        .active_document()
        .expect("active document");
    let foreign = document
        .objects
        .values()
        .filter(|object| matches!(object, DocumentObject::Foreign(_)))
        .count();
    assert_eq!(foreign, 1);
    let spheres = document.spheres();
    assert_eq!(spheres.len(), 1);
    assert_eq!(spheres[0].radius, 40.0);
}

#[test]
fn closing_panel_recreates_it_on_next_document() {
    let harness = Harness::start(PluginConfig::default());
    harness.idle();
    harness.new_document("a.3dm");

    harness
        .runtime
        .borrow_mut()
        .on_panel_event(PanelEvent::Closed)
        .expect("close notification");
    assert!(!harness.runtime.borrow().panel().is_visible());

    harness.save_and_close();
    harness.new_document("b.3dm");

    let runtime = harness.runtime.borrow();
    assert!(runtime.panel().is_visible());
    assert!(runtime.panel().is_initialized());
    assert_eq!(runtime.panel().factory().created(), 2);
}

#[test]
fn detach_stops_event_delivery() {
    let harness = Harness::start(PluginConfig::default());
    let detached = {
        let mut runtime = harness.runtime.borrow_mut();
        runtime.detach(&harness.documents, &harness.app)
    };
    assert!(detached);
    assert_eq!(harness.documents.emit(&DocumentEvent::NewDocument), 0);
    assert_eq!(harness.app.emit(&AppEvent::Idle), 0);
    assert!(!harness.runtime.borrow().panel().is_visible());
}

#[test]
fn slider_change_mirrors_once_without_reentrant_edit() {
    let harness = Harness::start(PluginConfig::default());
    harness.idle();
    harness.new_document("mirror.3dm");
    let before = harness.runtime.borrow().controller().revision();

    harness.user_sets(PanelControl::Slider, 42.0);

    assert_eq!(harness.control(PanelControl::Numeric), 42.0);
    assert_eq!(harness.radius(), 42.0);
    assert_eq!(harness.runtime.borrow().controller().revision(), before + 1);
}

#[test]
fn late_echoes_after_document_switch_leave_state_alone() {
    let harness = Harness::start(PluginConfig::default());
    harness.idle();
    harness.new_document("first.3dm");

    harness.user_input(PanelControl::Slider, 42.0);
    harness.save_and_close();
    let revision = harness.revision();
    harness.new_document("second.3dm");

    assert_eq!(harness.revision(), revision + 1);
    assert_eq!(harness.radius(), DEFAULT_RADIUS);
    assert_eq!(harness.control(PanelControl::Slider), DEFAULT_RADIUS);
    assert_eq!(harness.control(PanelControl::Numeric), DEFAULT_RADIUS);
    assert_eq!(harness.stored_blob(), None);
    let spheres = harness.spheres();
    assert_eq!(spheres.len(), 1);
    assert_eq!(spheres[0].radius, DEFAULT_RADIUS);
}

#[test]
fn closing_document_resets_panel_controls() {
    let harness = Harness::start(PluginConfig::default());
    harness.idle();
    harness.new_document("closing.3dm");
    harness.user_sets(PanelControl::Slider, 30.0);
    assert_eq!(harness.control(PanelControl::Numeric), 30.0);

    harness.save_and_close();
    harness.idle();

    assert_eq!(harness.radius(), DEFAULT_RADIUS);
    assert_eq!(harness.control(PanelControl::Numeric), DEFAULT_RADIUS);
    assert_eq!(harness.control(PanelControl::Slider), DEFAULT_RADIUS);
    assert!(harness.runtime.borrow().panel().is_initialized());
}
