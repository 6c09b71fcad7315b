//! Dirty working copy resolution.

use std::sync::Arc;

use copyward_core::Resource;

use crate::collaborators::{FileAccess, WorkingCopy, WorkingCopyRegistry};

/// Finds the dirty working copies an operation on a resource would affect.
///
/// For schemes the provider reports as hierarchical, a working copy matches
/// when its resource equals the target or lives below it. Flat schemes only
/// match exactly.
#[derive(Clone)]
pub struct DirtySetResolver {
    file_access: Arc<dyn FileAccess>,
    working_copies: Arc<dyn WorkingCopyRegistry>,
}

impl DirtySetResolver {
    /// Create a resolver over a provider and a working copy registry.
    pub fn new(file_access: Arc<dyn FileAccess>, working_copies: Arc<dyn WorkingCopyRegistry>) -> Self {
        Self {
            file_access,
            working_copies,
        }
    }

    /// Dirty working copies at or under `target`.
    pub fn resolve(&self, target: &Resource) -> Vec<Arc<dyn WorkingCopy>> {
        self.resolve_all(&[target])
    }

    /// Dirty working copies matching any of `targets`, without duplicates.
    pub fn resolve_all(&self, targets: &[&Resource]) -> Vec<Arc<dyn WorkingCopy>> {
        let matchers: Vec<Matcher<'_>> = targets.iter().map(|t| self.matcher(t)).collect();

        let mut resolved: Vec<Arc<dyn WorkingCopy>> = Vec::new();
        for copy in self.working_copies.dirty_working_copies() {
            if !copy.is_dirty() || !matchers.iter().any(|m| m.matches(copy.resource())) {
                continue;
            }
            if resolved.iter().any(|seen| same_copy(seen, &copy)) {
                continue;
            }
            resolved.push(copy);
        }
        resolved
    }

    fn matcher<'a>(&self, target: &'a Resource) -> Matcher<'a> {
        let scheme = target.scheme();
        Matcher {
            target,
            hierarchical: self.file_access.has_hierarchical_paths(scheme),
            ignore_case: !self.file_access.is_path_case_sensitive(scheme),
        }
    }
}

impl std::fmt::Debug for DirtySetResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirtySetResolver").finish_non_exhaustive()
    }
}

struct Matcher<'a> {
    target: &'a Resource,
    hierarchical: bool,
    ignore_case: bool,
}

impl Matcher<'_> {
    fn matches(&self, candidate: &Resource) -> bool {
        if self.hierarchical {
            candidate.is_equal_or_descendant_of(self.target, self.ignore_case)
        } else {
            candidate.is_equal(self.target, self.ignore_case)
        }
    }
}

fn same_copy(a: &Arc<dyn WorkingCopy>, b: &Arc<dyn WorkingCopy>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
