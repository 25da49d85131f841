use std::collections::{HashMap, HashSet};

use super::category::Category;

/// Immutable snapshot of a store's categories.
///
/// Categories keep the order the store returned them in; parent/child
/// relationships are resolved through `parent` ids.
#[derive(Debug, Clone, Default)]
pub struct Taxonomy {
    categories: Vec<Category>,
    index: HashMap<u64, usize>,
}

impl Taxonomy {
    pub fn new(categories: Vec<Category>) -> Self {
        let mut index = HashMap::with_capacity(categories.len());
        for (position, category) in categories.iter().enumerate() {
            // First occurrence wins on duplicate ids.
            index.entry(category.id).or_insert(position);
        }
        Self { categories, index }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&Category> {
        self.index.get(&id).map(|&position| &self.categories[position])
    }

    /// Display name for an id, or `ID:<id>` when the id is unknown.
    pub fn name_of(&self, id: u64) -> String {
        match self.get(id) {
            Some(category) => category.name.clone(),
            None => format!("ID:{}", id),
        }
    }

    pub fn roots(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(|c| c.is_root())
    }

    pub fn children(&self, id: u64) -> impl Iterator<Item = &Category> {
        self.categories
            .iter()
            .filter(move |c| c.parent == id && c.id != id)
    }

    /// Categories whose non-zero parent is not part of this snapshot.
    pub fn orphans(&self) -> impl Iterator<Item = &Category> {
        self.categories
            .iter()
            .filter(|c| !c.is_root() && !self.index.contains_key(&c.parent))
    }

    /// Depth-first walk from every root, children in snapshot order.
    ///
    /// Returns `(depth, category)` pairs with roots at depth 0. Categories
    /// unreachable from a root (orphans and parent cycles) are not visited.
    pub fn walk(&self) -> Vec<(usize, &Category)> {
        let mut out = Vec::with_capacity(self.categories.len());
        let mut visited = HashSet::new();
        for root in self.roots() {
            self.walk_from(root, 0, &mut visited, &mut out);
        }
        out
    }

    fn walk_from<'a>(
        &'a self,
        category: &'a Category,
        depth: usize,
        visited: &mut HashSet<u64>,
        out: &mut Vec<(usize, &'a Category)>,
    ) {
        if !visited.insert(category.id) {
            return;
        }
        out.push((depth, category));
        for child in self.children(category.id) {
            self.walk_from(child, depth + 1, visited, out);
        }
    }

    /// Names from the root down to `id`, e.g. `["Mode", "Chaussures"]`.
    pub fn path_of(&self, id: u64) -> Vec<String> {
        let mut path = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.get(id);
        while let Some(category) = current {
            if !seen.insert(category.id) {
                break;
            }
            path.push(category.name.clone());
            current = if category.is_root() {
                None
            } else {
                self.get(category.parent)
            };
        }
        path.reverse();
        path
    }
}

impl From<Vec<Category>> for Taxonomy {
    fn from(categories: Vec<Category>) -> Self {
        Self::new(categories)
    }
}
