//! # Estimator Session
//!
//! [`EstimatorSession`] ties the pieces together for an interactive front
//! end: it owns a [`ProjectStore`], the registry of stored projects, the
//! currently selected project with its [`ProjectState`], and a list of
//! listeners notified after every change.
//!
//! Mutations of the current project are persisted right away. A failed save
//! is logged and does not undo the change; the in-memory state stays
//! authoritative until the next successful save.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use calc_core::catalog::Catalog;
//! use calc_core::project::ProjectInfo;
//! use calc_core::session::{EstimatorSession, StateChange};
//! use calc_core::store::MemoryStore;
//!
//! let mut session = EstimatorSession::open(MemoryStore::new(), Arc::new(Catalog::default())).unwrap();
//! session.subscribe(|change: &StateChange| println!("changed: {}", change.as_str()));
//!
//! let id = session.create_project(ProjectInfo::new("فيلا", "P-1", "سكني", 200.0, 2)).unwrap();
//! assert_eq!(session.current_id(), Some(id.as_str()));
//! session.set_supervision_percentage(5.0);
//! assert_eq!(session.current_project().unwrap().settings.supervision_percentage, 5.0);
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::calculations::{calculate, LineItemInput, LineItemResult, RateOverrides};
use crate::catalog::Catalog;
use crate::errors::{CalcError, CalcResult};
use crate::pricing::{PriceOverrides, PriceResolver};
use crate::project::{Project, ProjectInfo};
use crate::state::ProjectState;
use crate::store::{ProjectListing, ProjectStore};

/// What changed in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum StateChange {
    /// A project was created or deleted
    ProjectsChanged,
    /// The selection moved (`None` when nothing is selected)
    ProjectSelected { project_id: Option<String> },
    /// Custom prices or units changed
    PricesChanged,
    /// Labor floor level or surcharges changed
    FloorChanged { floor_level: u32 },
    /// Custom consumption rates changed
    RatesChanged,
    /// Summary cards were added, removed, restored or edited
    CardsChanged,
    /// Project settings changed
    SettingsChanged,
}

impl StateChange {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateChange::ProjectsChanged => "ProjectsChanged",
            StateChange::ProjectSelected { .. } => "ProjectSelected",
            StateChange::PricesChanged => "PricesChanged",
            StateChange::FloorChanged { .. } => "FloorChanged",
            StateChange::RatesChanged => "RatesChanged",
            StateChange::CardsChanged => "CardsChanged",
            StateChange::SettingsChanged => "SettingsChanged",
        }
    }
}

/// Receives session change notifications.
pub trait ChangeListener {
    fn on_change(&mut self, change: &StateChange);
}

impl<F> ChangeListener for F
where
    F: FnMut(&StateChange),
{
    fn on_change(&mut self, change: &StateChange) {
        self(change)
    }
}

struct OpenProject {
    project: Project,
    state: ProjectState,
}

/// Project registry, current project and change notifications.
pub struct EstimatorSession<S: ProjectStore> {
    store: S,
    catalog: Arc<Catalog>,
    projects: Vec<ProjectListing>,
    current: Option<OpenProject>,
    listeners: Vec<Box<dyn ChangeListener>>,
}

impl<S: ProjectStore> EstimatorSession<S> {
    /// Open a session and reselect the project that was current last time.
    ///
    /// A remembered project that no longer loads is dropped from the
    /// selection with a warning.
    pub fn open(store: S, catalog: Arc<Catalog>) -> CalcResult<Self> {
        let projects = store.list()?;
        let mut session = EstimatorSession {
            store,
            catalog,
            projects,
            current: None,
            listeners: Vec::new(),
        };

        if let Some(id) = session.store.load_current_id()? {
            match session.store.load(&id) {
                Ok(project) => session.open_project(project),
                Err(e) => {
                    tracing::warn!(project_id = %id, error = %e, "remembered project could not be loaded");
                    session.persist_selection();
                }
            }
        }
        Ok(session)
    }

    pub fn subscribe(&mut self, listener: impl ChangeListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Stored projects, oldest first
    pub fn projects(&self) -> &[ProjectListing] {
        &self.projects
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current.as_ref().map(|open| open.project.id.as_str())
    }

    /// The current project as last written from its working state
    pub fn current_project(&self) -> Option<&Project> {
        self.current.as_ref().map(|open| &open.project)
    }

    pub fn state(&self) -> Option<&ProjectState> {
        self.current.as_ref().map(|open| &open.state)
    }

    // ------------------------------------------------------------------
    // Registry
    // ------------------------------------------------------------------

    /// Validate, store and select a new project.
    pub fn create_project(&mut self, info: ProjectInfo) -> CalcResult<String> {
        let project = Project::create(info)?;
        self.store.save(&project)?;
        let id = project.id.clone();
        tracing::info!(project_id = %id, name = %project.name, "project created");

        self.refresh_projects();
        self.notify(StateChange::ProjectsChanged);
        self.open_project(project);
        Ok(id)
    }

    pub fn select_project(&mut self, id: &str) -> CalcResult<()> {
        let project = self.store.load(id)?;
        self.open_project(project);
        Ok(())
    }

    /// Delete a stored project. Deleting the current project leaves nothing
    /// selected.
    pub fn delete_project(&mut self, id: &str) -> CalcResult<()> {
        self.store.delete(id)?;
        tracing::info!(project_id = %id, "project deleted");
        self.refresh_projects();
        self.notify(StateChange::ProjectsChanged);

        if self.current_id() == Some(id) {
            self.current = None;
            self.persist_selection();
            self.notify(StateChange::ProjectSelected { project_id: None });
        }
        Ok(())
    }

    /// Current project or `ProjectNotFound("<none>")`
    pub fn require_current(&self) -> CalcResult<&ProjectState> {
        self.state().ok_or_else(|| CalcError::project_not_found("<none>"))
    }

    // ------------------------------------------------------------------
    // Calculation
    // ------------------------------------------------------------------

    /// Price a line item with the current project's prices and rates, or
    /// with catalog defaults when no project is selected.
    pub fn calculate(&self, input: &LineItemInput) -> LineItemResult {
        match self.state() {
            Some(state) => state.calculate(input),
            None => {
                let overrides = PriceOverrides::default();
                let resolver = PriceResolver::new(&self.catalog, &overrides);
                calculate(&resolver, &RateOverrides::default(), input)
            }
        }
    }

    // ------------------------------------------------------------------
    // Mutations of the current project
    // ------------------------------------------------------------------

    pub fn set_price(&mut self, name: &str, price: f64) -> bool {
        self.mutate(StateChange::PricesChanged, |state| state.set_price(name, price))
            .is_some()
    }

    pub fn set_display_price(&mut self, name: &str, typed: f64) -> Option<f64> {
        self.mutate(StateChange::PricesChanged, |state| state.set_display_price(name, typed))
    }

    pub fn clear_price(&mut self, name: &str) -> bool {
        self.mutate(StateChange::PricesChanged, |state| state.clear_price(name))
            .unwrap_or(false)
    }

    pub fn select_unit(&mut self, name: &str, unit: &str) -> bool {
        self.mutate(StateChange::PricesChanged, |state| state.select_unit(name, unit))
            .unwrap_or(false)
    }

    pub fn set_floor_level(&mut self, floor: f64) -> bool {
        let Some(open) = self.current.as_mut() else {
            return false;
        };
        open.state.set_floor_level(floor);
        let floor_level = open.state.labor_floor().floor_level;
        self.commit(StateChange::FloorChanged { floor_level });
        true
    }

    pub fn set_extra_per_floor(&mut self, name: &str, extra: f64) -> bool {
        let Some(open) = self.current.as_mut() else {
            return false;
        };
        if !open.state.set_extra_per_floor(name, extra) {
            return false;
        }
        let floor_level = open.state.labor_floor().floor_level;
        self.commit(StateChange::FloorChanged { floor_level });
        true
    }

    pub fn set_rate(&mut self, main_item: &str, sub_item: &str, resource: &str, rate: f64) -> bool {
        self.mutate(StateChange::RatesChanged, |state| {
            state.set_rate(main_item, sub_item, resource, rate)
        })
        .is_some()
    }

    pub fn reset_rate(&mut self, main_item: &str, sub_item: &str, resource: &str) -> Option<f64> {
        self.mutate(StateChange::RatesChanged, |state| {
            state.reset_rate(main_item, sub_item, resource)
        })
        .flatten()
    }

    /// Calculate and save a line item as a summary card.
    pub fn save_line_item(&mut self, input: &LineItemInput) -> Option<String> {
        let open = self.current.as_mut()?;
        let id = open.state.save_line_item(input)?;
        self.commit(StateChange::CardsChanged);
        Some(id)
    }

    pub fn delete_card(&mut self, id: &str) -> bool {
        self.mutate_if(StateChange::CardsChanged, |state| state.delete_card(id))
    }

    pub fn undo(&mut self) -> bool {
        self.mutate_if(StateChange::CardsChanged, ProjectState::undo)
    }

    pub fn update_card_risk_tax(&mut self, id: &str, risk_percentage: f64, tax_percentage: f64) -> bool {
        self.mutate_if(StateChange::CardsChanged, |state| {
            state.update_card_risk_tax(id, risk_percentage, tax_percentage)
        })
    }

    pub fn set_supervision_percentage(&mut self, supervision_percentage: f64) -> bool {
        self.mutate(StateChange::SettingsChanged, |state| {
            state.set_supervision_percentage(supervision_percentage)
        })
        .is_some()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Apply `f` to the current state, then persist and notify.
    /// `None` when no project is selected.
    fn mutate<R>(&mut self, change: StateChange, f: impl FnOnce(&mut ProjectState) -> R) -> Option<R> {
        let open = self.current.as_mut()?;
        let result = f(&mut open.state);
        self.commit(change);
        Some(result)
    }

    /// Like [`Self::mutate`], but only persists when `f` reports a change.
    fn mutate_if(&mut self, change: StateChange, f: impl FnOnce(&mut ProjectState) -> bool) -> bool {
        let Some(open) = self.current.as_mut() else {
            return false;
        };
        if !f(&mut open.state) {
            return false;
        }
        self.commit(change);
        true
    }

    fn commit(&mut self, change: StateChange) {
        if let Some(open) = self.current.as_mut() {
            open.state.write_into(&mut open.project);
            if let Err(e) = self.store.save(&open.project) {
                tracing::warn!(project_id = %open.project.id, error = %e, "failed to save project");
            }
        }
        self.notify(change);
    }

    fn open_project(&mut self, project: Project) {
        let state = ProjectState::from_project(Arc::clone(&self.catalog), &project);
        let project_id = project.id.clone();
        tracing::debug!(project_id = %project_id, cards = state.cards().len(), "project selected");
        self.current = Some(OpenProject { project, state });
        self.persist_selection();
        self.notify(StateChange::ProjectSelected {
            project_id: Some(project_id),
        });
    }

    fn persist_selection(&mut self) {
        let id = self.current.as_ref().map(|open| open.project.id.clone());
        if let Err(e) = self.store.save_current_id(id.as_deref()) {
            tracing::warn!(error = %e, "failed to remember current project");
        }
    }

    fn refresh_projects(&mut self) {
        match self.store.list() {
            Ok(projects) => self.projects = projects,
            Err(e) => tracing::warn!(error = %e, "failed to list projects"),
        }
    }

    fn notify(&mut self, change: StateChange) {
        for listener in &mut self.listeners {
            listener.on_change(&change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::test_support::{sample_catalog, BATHROOM_SIKA, INSULATION};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn info(code: &str) -> ProjectInfo {
        ProjectInfo::new("مشروع", code, "سكني", 120.0, 3)
    }

    fn session() -> EstimatorSession<MemoryStore> {
        EstimatorSession::open(MemoryStore::new(), Arc::new(sample_catalog())).unwrap()
    }

    fn recorder(session: &mut EstimatorSession<MemoryStore>) -> Rc<RefCell<Vec<&'static str>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        session.subscribe(move |change: &StateChange| sink.borrow_mut().push(change.as_str()));
        seen
    }

    #[test]
    fn test_create_selects_and_persists() {
        let mut session = session();
        let seen = recorder(&mut session);

        let id = session.create_project(info("A-1")).unwrap();
        assert_eq!(session.current_id(), Some(id.as_str()));
        assert_eq!(session.projects().len(), 1);
        assert_eq!(session.store().load_current_id().unwrap(), Some(id));
        assert_eq!(*seen.borrow(), vec!["ProjectsChanged", "ProjectSelected"]);
    }

    #[test]
    fn test_create_rejects_invalid_info() {
        let mut session = session();
        let err = session.create_project(info("")).unwrap_err();
        assert_eq!(err.error_code(), "MISSING_FIELD");
        assert!(session.projects().is_empty());
        assert!(session.current_id().is_none());
    }

    #[test]
    fn test_mutations_are_saved() {
        let mut session = session();
        let id = session.create_project(info("A-1")).unwrap();

        let card_id = session
            .save_line_item(&LineItemInput::new(INSULATION, BATHROOM_SIKA, 10.0))
            .unwrap();
        session.set_price("سيكا 107", 1200.0);
        session.update_card_risk_tax(&card_id, 10.0, 0.0);

        let stored = session.store().load(&id).unwrap();
        assert_eq!(stored.items.len(), 1);
        assert_eq!(stored.prices.price("سيكا 107"), Some(1200.0));
        assert_eq!(stored.items[0].risk_percentage, Some(10.0));
    }

    #[test]
    fn test_delete_current_clears_selection() {
        let mut session = session();
        let first = session.create_project(info("A-1")).unwrap();
        let second = session.create_project(info("A-2")).unwrap();
        assert_eq!(session.current_id(), Some(second.as_str()));

        session.delete_project(&first).unwrap();
        assert_eq!(session.current_id(), Some(second.as_str()));

        session.delete_project(&second).unwrap();
        assert!(session.current_id().is_none());
        assert_eq!(session.store().load_current_id().unwrap(), None);
        assert!(session.projects().is_empty());
        assert_eq!(session.delete_project(&second).unwrap_err().error_code(), "PROJECT_NOT_FOUND");
    }

    #[test]
    fn test_reopen_restores_current_project() {
        let mut session = session();
        let id = session.create_project(info("A-1")).unwrap();
        session.set_floor_level(2.0);
        session.set_supervision_percentage(7.0);

        let store = session.store.clone();
        let reopened = EstimatorSession::open(store, Arc::new(sample_catalog())).unwrap();
        assert_eq!(reopened.current_id(), Some(id.as_str()));
        let state = reopened.state().unwrap();
        assert_eq!(state.labor_floor().floor_level, 2);
        assert_eq!(state.totals().supervision_percentage, 7.0);
    }

    #[test]
    fn test_stale_current_id_is_dropped() {
        let mut store = MemoryStore::new();
        store.save_current_id(Some("gone")).unwrap();
        let session = EstimatorSession::open(store, Arc::new(sample_catalog())).unwrap();
        assert!(session.current_id().is_none());
        assert_eq!(session.store().load_current_id().unwrap(), None);
    }

    #[test]
    fn test_without_project() {
        let mut session = session();
        assert!(!session.set_price("سيكا 107", 5.0));
        assert!(!session.undo());
        assert!(session.save_line_item(&LineItemInput::new(INSULATION, BATHROOM_SIKA, 1.0)).is_none());
        assert!(session.require_current().is_err());

        let result = session.calculate(&LineItemInput::new(INSULATION, BATHROOM_SIKA, 10.0));
        assert!((result.grand_total - 2550.0).abs() < 1e-6);
    }

    #[test]
    fn test_noop_mutations_do_not_notify() {
        let mut session = session();
        session.create_project(info("A-1")).unwrap();
        let seen = recorder(&mut session);

        assert!(!session.delete_card("missing"));
        assert!(!session.undo());
        assert!(!session.set_extra_per_floor("نظافة", 2.0));
        assert!(seen.borrow().is_empty());

        assert!(session.set_extra_per_floor("تشوين أسمنت", 2.0));
        assert_eq!(*seen.borrow(), vec!["FloorChanged"]);
    }
}
