//! The live presentation context stylesheets are loaded into.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use crate::error::PresentationError;

/// Identity of a stylesheet: a resource URI or a file path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StylesheetId {
    Resource(String),
    File(PathBuf),
}

impl fmt::Display for StylesheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StylesheetId::Resource(uri) => f.write_str(uri),
            StylesheetId::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Host surface that applies stylesheets.
pub trait PresentationContext {
    fn load_stylesheet(&self, id: &StylesheetId) -> Result<(), PresentationError>;

    fn unload_stylesheet(&self, id: &StylesheetId) -> Result<(), PresentationError>;
}

/// A call made on a [`MemoryContext`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextCall {
    Load(StylesheetId),
    Unload(StylesheetId),
}

#[derive(Debug, Default)]
struct ContextState {
    loaded: Vec<StylesheetId>,
    calls: Vec<ContextCall>,
    failing_loads: HashSet<StylesheetId>,
    failing_unloads: HashSet<StylesheetId>,
}

/// Records loads and unloads in memory.
///
/// Unloading a stylesheet that is not loaded fails, as does loading one
/// marked with [`fail_loading`](Self::fail_loading).
#[derive(Debug, Default)]
pub struct MemoryContext {
    state: RefCell<ContextState>,
}

impl MemoryContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later load of `id` fail.
    pub fn fail_loading(&self, id: StylesheetId) {
        self.state.borrow_mut().failing_loads.insert(id);
    }

    /// Makes every later unload of `id` fail.
    pub fn fail_unloading(&self, id: StylesheetId) {
        self.state.borrow_mut().failing_unloads.insert(id);
    }

    /// Currently loaded stylesheets, in load order.
    pub fn loaded(&self) -> Vec<StylesheetId> {
        self.state.borrow().loaded.clone()
    }

    /// Every call so far, including failed ones.
    pub fn calls(&self) -> Vec<ContextCall> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }
}

impl PresentationContext for MemoryContext {
    fn load_stylesheet(&self, id: &StylesheetId) -> Result<(), PresentationError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(ContextCall::Load(id.clone()));
        if state.failing_loads.contains(id) {
            return Err(PresentationError::Load {
                id: id.clone(),
                reason: "stylesheet could not be parsed".to_string(),
            });
        }
        state.loaded.push(id.clone());
        Ok(())
    }

    fn unload_stylesheet(&self, id: &StylesheetId) -> Result<(), PresentationError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(ContextCall::Unload(id.clone()));
        let position = state.loaded.iter().position(|loaded| loaded == id);
        match position {
            Some(at) if !state.failing_unloads.contains(id) => {
                state.loaded.remove(at);
                Ok(())
            }
            Some(_) => Err(PresentationError::Unload {
                id: id.clone(),
                reason: "context refused".to_string(),
            }),
            None => Err(PresentationError::Unload {
                id: id.clone(),
                reason: "not loaded".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(name: &str) -> StylesheetId {
        StylesheetId::Resource(format!("resource:///test/{name}"))
    }

    #[test]
    fn test_records_loads_and_unloads() {
        let context = MemoryContext::new();
        context.load_stylesheet(&sheet("a.css")).unwrap();
        context.unload_stylesheet(&sheet("a.css")).unwrap();

        assert!(context.loaded().is_empty());
        assert_eq!(
            context.calls(),
            vec![ContextCall::Load(sheet("a.css")), ContextCall::Unload(sheet("a.css"))]
        );
    }

    #[test]
    fn test_failed_load_is_recorded_but_not_loaded() {
        let context = MemoryContext::new();
        context.fail_loading(sheet("bad.css"));

        let err = context.load_stylesheet(&sheet("bad.css")).unwrap_err();
        assert!(matches!(err, PresentationError::Load { .. }));
        assert!(context.loaded().is_empty());
        assert_eq!(context.calls().len(), 1);
    }

    #[test]
    fn test_unload_of_unknown_sheet_fails() {
        let context = MemoryContext::new();
        assert!(context.unload_stylesheet(&sheet("a.css")).is_err());
    }

    #[test]
    fn test_display_of_file_id() {
        let id = StylesheetId::File(PathBuf::from("/data/custom-theme.css"));
        assert_eq!(id.to_string(), "/data/custom-theme.css");
    }
}
