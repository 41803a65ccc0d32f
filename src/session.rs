//! One user-facing configuration session for a bundle product.
//!
//! The session owns the selection state and the reconciler for a single
//! product instance; the surrounding UI drives it exclusively through
//! [`BundleSession::apply_selection`] and reads back state, validation and
//! reconciler status.

use std::time::Duration;

use crate::api;
use crate::catalog::BundleCatalog;
use crate::defaults::resolve_defaults;
use crate::pricing::{self, BundlePriceInfo};
use crate::reconciler::{ConfigureBundle, Reconciler, ReconcilerStatus, DEFAULT_DEBOUNCE};
use crate::selection::SelectionState;
use crate::validation::{validate, ValidationResult};

pub struct BundleSession<C: ConfigureBundle> {
    catalog: BundleCatalog,
    state: SelectionState,
    initialized: bool,
    reconciler: Reconciler<C>,
}

impl<C: ConfigureBundle> BundleSession<C> {
    pub fn new(catalog: BundleCatalog, configurer: C) -> Self {
        Self::with_debounce(catalog, configurer, DEFAULT_DEBOUNCE)
    }

    pub fn with_debounce(catalog: BundleCatalog, configurer: C, debounce: Duration) -> Self {
        let reconciler = Reconciler::new(configurer, debounce, catalog.default_configuration.clone());
        Self {
            catalog,
            state: SelectionState::new(),
            initialized: false,
            reconciler,
        }
    }

    /// Populates the initial selection, once. Priority for the base state:
    /// a decodable preset wins entirely, then the server's last-known
    /// configuration, then empty; required-but-empty components are filled
    /// from their default option afterwards. Subsequent calls are no-ops.
    ///
    /// A malformed preset is logged and treated as absent, not surfaced as a
    /// blocking error.
    pub fn initialize(&mut self, preset: Option<&str>) {
        if self.initialized {
            return;
        }
        let server_base = || {
            self.catalog
                .default_configuration
                .as_ref()
                .map(api::state_from_flat)
        };
        let base = match preset {
            Some(raw) => match SelectionState::decode_preset(raw) {
                Ok(state) => Some(state),
                Err(err) => {
                    tracing::warn!(error = %err, "failed to parse preset configuration");
                    server_base()
                }
            },
            None => server_base(),
        };
        self.state = resolve_defaults(&self.catalog.components, base.as_ref());
        self.initialized = true;
        self.reconcile();
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The sole mutator: applies one selection-change event and feeds the
    /// result through validation into the reconciler. Remote failures never
    /// propagate here; they surface through
    /// [`reconciler_status`](Self::reconciler_status).
    pub fn apply_selection(
        &mut self,
        component_key: &str,
        option_id: &str,
        quantity: u64,
        child_id: Option<&str>,
    ) {
        let component = self.catalog.component(component_key);
        self.state
            .apply(component, component_key, option_id, quantity, child_id);
        self.reconcile();
    }

    fn reconcile(&self) {
        let formatted = api::to_api_format(&self.state);
        let is_valid = validate(&self.catalog.components, &self.state).is_valid;
        self.reconciler.submit(formatted, self.initialized, is_valid);
    }

    pub fn selection_state(&self) -> &SelectionState {
        &self.state
    }

    pub fn validation(&self) -> ValidationResult {
        validate(&self.catalog.components, &self.state)
    }

    pub fn reconciler_status(&self) -> ReconcilerStatus {
        self.reconciler.status()
    }

    pub fn price_info(&self) -> BundlePriceInfo {
        pricing::price_info(&self.catalog, self.reconciler.configured().as_ref())
    }

    pub fn catalog(&self) -> &BundleCatalog {
        &self.catalog
    }

    /// Encodes the current selection for embedding in a shareable link.
    pub fn encode_preset(&self) -> String {
        self.state.encode_preset()
    }
}
