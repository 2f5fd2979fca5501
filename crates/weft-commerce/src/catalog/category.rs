//! Category types for product organization.

use crate::ids::CategoryId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A product category. Categories form a tree via `parent_id`; the tree is
/// assembled in memory with [`build_tree`] for the categories endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Unique category identifier.
    pub id: CategoryId,
    /// Parent category ID (None for root categories).
    pub parent_id: Option<CategoryId>,
    /// Category name.
    pub name: String,
    /// URL-friendly slug.
    pub slug: String,
    /// Category description.
    pub description: Option<String>,
    /// Category image URL.
    pub image_url: Option<String>,
    /// Sort order position within parent.
    pub position: i32,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Category {
    /// Create a new root category.
    pub fn new_root(name: impl Into<String>, slug: impl Into<String>) -> Self {
        let now = current_timestamp();
        Self {
            id: CategoryId::generate(),
            parent_id: None,
            name: name.into(),
            slug: slug.into(),
            description: None,
            image_url: None,
            position: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a new child category.
    pub fn new_child(
        parent: &Category,
        name: impl Into<String>,
        slug: impl Into<String>,
    ) -> Self {
        let mut category = Self::new_root(name, slug);
        category.parent_id = Some(parent.id.clone());
        category
    }

    /// Check if this is a root category.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// A category with its children attached, ready to serialize as a tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<CategoryNode>,
}

/// Assemble a flat category list into a tree of root nodes.
///
/// Children are ordered by position, then name. Categories whose parent is
/// missing from the input are treated as roots rather than dropped.
pub fn build_tree(mut categories: Vec<Category>) -> Vec<CategoryNode> {
    categories.sort_by(|a, b| a.position.cmp(&b.position).then(a.name.cmp(&b.name)));

    let known: std::collections::HashSet<CategoryId> =
        categories.iter().map(|c| c.id.clone()).collect();

    let mut children_of: HashMap<CategoryId, Vec<Category>> = HashMap::new();
    let mut roots = Vec::new();
    for category in categories {
        match &category.parent_id {
            Some(parent) if known.contains(parent) => {
                children_of.entry(parent.clone()).or_default().push(category);
            }
            _ => roots.push(category),
        }
    }

    roots
        .into_iter()
        .map(|root| attach_children(root, &mut children_of))
        .collect()
}

fn attach_children(
    category: Category,
    children_of: &mut HashMap<CategoryId, Vec<Category>>,
) -> CategoryNode {
    let children = children_of
        .remove(&category.id)
        .unwrap_or_default()
        .into_iter()
        .map(|child| attach_children(child, children_of))
        .collect();
    CategoryNode { category, children }
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_category() {
        let cat = Category::new_root("Sarees", "sarees");
        assert!(cat.is_root());
        assert_eq!(cat.name, "Sarees");
    }

    #[test]
    fn test_child_category() {
        let parent = Category::new_root("Sarees", "sarees");
        let child = Category::new_child(&parent, "Silk Sarees", "silk-sarees");

        assert!(!child.is_root());
        assert_eq!(child.parent_id, Some(parent.id));
    }

    #[test]
    fn test_build_tree() {
        let root = Category::new_root("Apparel", "apparel");
        let mut scarves = Category::new_child(&root, "Scarves", "scarves");
        scarves.position = 1;
        let mut stoles = Category::new_child(&root, "Stoles", "stoles");
        stoles.position = 0;
        let silk = Category::new_child(&scarves, "Silk", "silk-scarves");

        let tree = build_tree(vec![silk.clone(), root.clone(), scarves.clone(), stoles.clone()]);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].category.id, root.id);
        // Position 0 sorts before position 1.
        assert_eq!(tree[0].children[0].category.id, stoles.id);
        assert_eq!(tree[0].children[1].category.id, scarves.id);
        assert_eq!(tree[0].children[1].children[0].category.id, silk.id);
    }

    #[test]
    fn test_build_tree_orphan_becomes_root() {
        let mut orphan = Category::new_root("Orphan", "orphan");
        orphan.parent_id = Some(CategoryId::new("cat_missing"));

        let tree = build_tree(vec![orphan.clone()]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].category.id, orphan.id);
    }
}
