//! ---
//! rpc_section: "01-core-functionality"
//! rpc_subsection: "module"
//! rpc_type: "source"
//! rpc_scope: "code"
//! rpc_description: "Typed registry of shared host services."
//! rpc_version: "v0.0.0-prealpha"
//! rpc_owner: "tbd"
//! ---
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info_span, Span};

type SharedValue = Arc<dyn Any + Send + Sync>;

/// Registry handed to components during construction.
///
/// Each shared value is keyed by its concrete type, so a component attaches
/// at most one singleton of a given type and unrelated components can look it
/// up without a global. The registry also carries the tracing span that
/// events emitted on behalf of this host are recorded under.
pub struct Resources {
    label: String,
    span: Span,
    shared: RwLock<HashMap<TypeId, SharedValue>>,
}

impl Resources {
    /// Create an empty registry for the host identified by `label`.
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        let span = info_span!("resources", label = %label);
        Self {
            label,
            span,
            shared: RwLock::new(HashMap::new()),
        }
    }

    /// Name of the host these resources belong to.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Span that components should enter while logging on behalf of this host.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Attach `value`, replacing and returning any previous value of the same type.
    pub fn set_shared<T>(&self, value: Arc<T>) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        let previous = self.shared.write().insert(TypeId::of::<T>(), value);
        previous.and_then(|prev| prev.downcast::<T>().ok())
    }

    /// Look up the value of type `T`, if one has been attached.
    pub fn shared<T>(&self) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        let value = self.shared.read().get(&TypeId::of::<T>()).cloned()?;
        value.downcast::<T>().ok()
    }
}

impl Default for Resources {
    fn default() -> Self {
        Self::new("default")
    }
}

impl fmt::Debug for Resources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resources")
            .field("label", &self.label)
            .field("shared", &self.shared.read().len())
            .finish()
    }
}
