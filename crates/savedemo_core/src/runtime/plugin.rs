//! Plugin runtime: the dispatcher between host signals, controller and panel.
//!
//! # Responsibility
//! - Hold the lifecycle controller and the panel adapter, and pass the
//!   controller explicitly to the panel on every call.
//! - Register for host document/app events and deregister on detach.
//! - Defer all panel work onto the task queue.
//!
//! # Invariants
//! - Plugin-load never shows the panel synchronously; the first idle does.
//! - Tasks that find the controller uninitialized repost themselves.
//! - Every document switch (new, open, close) queues a panel refresh.

use crate::config::PluginConfig;
use crate::event::{AppEvent, DocumentEvent, EventListener, EventSource, SubscriptionId};
use crate::host::HostDocument;
use crate::runtime::tasks::{TaskQueue, UiTask};
use crate::service::controller::{ControllerError, LifecycleController};
use crate::ui::panel::{ControlChange, PanelAdapter, ShowOutcome};
use crate::ui::{PanelEvent, SurfaceFactory};
use log::{debug, info, warn};
use std::cell::RefCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// Host command that opens the panel.
pub const SHOW_PANEL_COMMAND: &str = "ShowSaveDemoPanel";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    UnknownCommand(String),
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownCommand(name) => write!(f, "unknown command: {name}"),
        }
    }
}

impl Error for CommandError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Subscriptions {
    documents: SubscriptionId,
    app: SubscriptionId,
}

pub struct PluginRuntime<D: HostDocument, F: SurfaceFactory> {
    controller: LifecycleController<D>,
    panel: PanelAdapter<F>,
    tasks: TaskQueue,
    show_on_idle: bool,
    subscriptions: Option<Subscriptions>,
}

impl<D: HostDocument, F: SurfaceFactory> PluginRuntime<D, F> {
    /// Builds the controller before any panel can exist.
    pub fn new(document: D, factory: F, config: PluginConfig) -> Self {
        Self {
            controller: LifecycleController::new(document, config),
            panel: PanelAdapter::new(factory),
            tasks: TaskQueue::new(),
            show_on_idle: false,
            subscriptions: None,
        }
    }

    pub fn controller(&self) -> &LifecycleController<D> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut LifecycleController<D> {
        &mut self.controller
    }

    pub fn panel(&self) -> &PanelAdapter<F> {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut PanelAdapter<F> {
        &mut self.panel
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_attached(&self) -> bool {
        self.subscriptions.is_some()
    }

    /// Host plugin-load hook: ready the controller, show the panel on idle.
    pub fn on_plugin_load(&mut self) {
        self.controller.on_plugin_load();
        self.show_on_idle = true;
        info!("event=plugin_load module=runtime status=ok panel=deferred_until_idle");
    }

    pub fn on_document_event(&mut self, event: DocumentEvent) {
        match event {
            DocumentEvent::NewDocument => {
                self.controller.on_new_document();
                self.tasks.post(UiTask::ShowPanel);
                self.tasks.post(UiTask::RefreshPanel);
            }
            DocumentEvent::EndOpenDocument => {
                self.controller.on_document_opened();
                self.tasks.post(UiTask::ShowPanel);
                self.tasks.post(UiTask::RefreshPanel);
            }
            DocumentEvent::CloseDocument => {
                self.controller.on_close_document();
                self.tasks.post(UiTask::RefreshPanel);
            }
        }
    }

    /// Idle: fire the one-shot plugin-load show, then drain queued tasks.
    pub fn on_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Idle => {
                if std::mem::take(&mut self.show_on_idle) {
                    self.tasks.post(UiTask::ShowPanel);
                }
                self.run_pending_tasks();
            }
        }
    }

    /// Runs a host command by its English name.
    pub fn run_command(&mut self, name: &str) -> Result<(), CommandError> {
        if name.trim() != SHOW_PANEL_COMMAND {
            warn!("event=command_run module=runtime status=error error_code=unknown_command");
            return Err(CommandError::UnknownCommand(name.to_string()));
        }
        self.tasks.post(UiTask::ShowPanel);
        info!("event=command_run module=runtime status=ok command={SHOW_PANEL_COMMAND}");
        Ok(())
    }

    /// Routes a panel notification.
    ///
    /// # Errors
    /// - Controller edit errors (`InvalidRadius`, `NotYetInitialized`).
    pub fn on_panel_event(&mut self, event: PanelEvent) -> Result<ControlChange, ControllerError> {
        match event {
            PanelEvent::ValueChanged { control, value } => {
                self.panel
                    .on_control_changed(&mut self.controller, control, value)
            }
            PanelEvent::Closed => {
                self.panel.on_closed();
                Ok(ControlChange::NoSurface)
            }
        }
    }

    /// Drains the tasks queued so far; returns how many ran.
    pub fn run_pending_tasks(&mut self) -> usize {
        let batch = self.tasks.take_batch();
        let count = batch.len();
        for task in batch {
            self.run_task(task);
        }
        count
    }

    fn run_task(&mut self, task: UiTask) {
        match task {
            UiTask::ShowPanel => {
                if self.panel.show() == ShowOutcome::Created {
                    self.tasks.post(UiTask::InitializePanel);
                }
            }
            UiTask::InitializePanel => {
                if !self.panel.is_visible() || self.panel.is_initialized() {
                    return;
                }
                self.sync_panel(task);
            }
            UiTask::RefreshPanel => self.sync_panel(task),
        }
    }

    fn sync_panel(&mut self, task: UiTask) {
        let result = match task {
            UiTask::InitializePanel => self.panel.initialize(&self.controller),
            _ => self.panel.refresh(&self.controller),
        };
        if let Err(ControllerError::NotYetInitialized) = result {
            debug!("event=panel_init module=runtime status=retry task={task:?}");
            self.tasks.post(task);
        }
    }
}

impl<D, F> PluginRuntime<D, F>
where
    D: HostDocument + 'static,
    F: SurfaceFactory + 'static,
{
    /// Registers `runtime` with the host event sources.
    ///
    /// Returns `false` when already attached.
    pub fn attach(
        runtime: &Rc<RefCell<Self>>,
        documents: &EventSource<DocumentEvent>,
        app: &EventSource<AppEvent>,
    ) -> bool {
        if runtime.borrow().is_attached() {
            return false;
        }
        let subscriptions = Subscriptions {
            documents: documents.subscribe(runtime),
            app: app.subscribe(runtime),
        };
        runtime.borrow_mut().subscriptions = Some(subscriptions);
        info!("event=subscription module=runtime status=ok action=attach");
        true
    }

    /// Deregisters from the host event sources.
    pub fn detach(
        &mut self,
        documents: &EventSource<DocumentEvent>,
        app: &EventSource<AppEvent>,
    ) -> bool {
        let Some(subscriptions) = self.subscriptions.take() else {
            return false;
        };
        documents.unsubscribe(subscriptions.documents);
        app.unsubscribe(subscriptions.app);
        info!("event=subscription module=runtime status=ok action=detach");
        true
    }
}

impl<D: HostDocument, F: SurfaceFactory> EventListener<DocumentEvent> for PluginRuntime<D, F> {
    fn on_event(&mut self, event: &DocumentEvent) {
        self.on_document_event(*event);
    }
}

impl<D: HostDocument, F: SurfaceFactory> EventListener<AppEvent> for PluginRuntime<D, F> {
    fn on_event(&mut self, event: &AppEvent) {
        self.on_app_event(*event);
    }
}
