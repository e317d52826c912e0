//! Name resolution: the root-to-self label path of every node.

use tracing::{debug, instrument};

use crate::model::{ResolvedPath, SpecNode, SpecTree};

/// Environment variable that overrides the path separator.
pub const SEPARATOR_ENV: &str = "SPECTREE_PATH_SEPARATOR";

/// Separator used when none is configured.
pub const DEFAULT_SEPARATOR: &str = " > ";

/// Name resolution settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    pub separator: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

impl ResolverConfig {
    /// Read the separator from `SPECTREE_PATH_SEPARATOR`, falling back to
    /// [`DEFAULT_SEPARATOR`] when it is unset or empty.
    pub fn from_env() -> Self {
        match std::env::var(SEPARATOR_ENV) {
            Ok(separator) if !separator.is_empty() => ResolverConfig { separator },
            _ => ResolverConfig::default(),
        }
    }
}

/// Assigns every node its resolved path.
///
/// Resolution is total: empty labels become empty segments and duplicate
/// paths are kept. It only reads labels, so resolving a tree again yields
/// the same paths.
#[derive(Debug, Clone)]
pub struct NameResolver {
    separator: String,
}

impl Default for NameResolver {
    fn default() -> Self {
        NameResolver::from_config(&ResolverConfig::default())
    }
}

impl NameResolver {
    pub fn new(separator: impl Into<String>) -> Self {
        NameResolver {
            separator: separator.into(),
        }
    }

    pub fn from_config(config: &ResolverConfig) -> Self {
        NameResolver::new(config.separator.clone())
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    #[instrument(level = "debug", skip_all, fields(separator = %self.separator))]
    pub fn resolve(&self, mut tree: SpecTree) -> ResolvedTree {
        let mut segments = Vec::new();
        for root in tree.roots_mut() {
            self.resolve_node(root, &mut segments);
        }
        debug!(leaves = tree.leaf_count(), "resolved spec tree");
        ResolvedTree {
            tree,
            separator: self.separator.clone(),
        }
    }

    fn resolve_node(&self, node: &mut SpecNode, segments: &mut Vec<String>) {
        segments.push(node.label().to_string());
        node.set_path(ResolvedPath::new(segments.clone(), &self.separator));
        for child in node.children_mut() {
            self.resolve_node(child, segments);
        }
        segments.pop();
    }
}

/// A spec tree whose nodes all carry their resolved path.
///
/// Read-only: the traversal API lives on this type, and the only way to
/// change the tree is to take it apart with [`into_tree`](Self::into_tree).
#[derive(Debug, Clone)]
pub struct ResolvedTree {
    tree: SpecTree,
    separator: String,
}

impl ResolvedTree {
    pub fn roots(&self) -> &[SpecNode] {
        self.tree.roots()
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn tree(&self) -> &SpecTree {
        &self.tree
    }

    pub fn into_tree(self) -> SpecTree {
        self.tree
    }
}
