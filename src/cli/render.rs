//! Tree rendering for the terminal and for external tree widgets

use serde_json::{json, Value};
use termtree::Tree;

use crate::config::LayoutConfig;
use crate::domain::TreeNode;

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for TreeNode {
    fn to_tree_string(&self) -> Tree<String> {
        let leaves: Vec<_> = self.children.iter().map(|c| c.to_tree_string()).collect();
        Tree::new(self.name.clone()).with_leaves(leaves)
    }
}

/// Tree data plus widget options, in the shape react-d3-tree style widgets take.
pub fn widget_payload(tree: &TreeNode, layout: &LayoutConfig) -> Value {
    json!({
        "data": tree,
        "options": {
            "separation": {
                "siblings": layout.separation_siblings,
                "nonSiblings": layout.separation_non_siblings,
            },
            "translate": { "x": layout.translate_x, "y": layout.translate_y },
            "depthFactor": layout.depth_factor,
            "rootNodeClassName": layout.root_class,
            "branchNodeClassName": layout.branch_class,
            "leafNodeClassName": layout.leaf_class,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_nested_node_when_rendering_then_lists_children_indented() {
        let tree = TreeNode::branch(
            "root",
            vec![TreeNode::branch("Yes", vec![TreeNode::leaf("Africa")])],
        );

        let text = tree.to_tree_string().to_string();

        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "root");
        assert!(lines[1].ends_with("Yes"));
        assert!(lines[2].ends_with("Africa"));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn given_layout_when_building_payload_then_uses_widget_keys() {
        let payload = widget_payload(&TreeNode::leaf("root"), &LayoutConfig::default());

        assert_eq!(payload["data"]["name"], "root");
        assert_eq!(payload["options"]["separation"]["nonSiblings"], 0.5);
        assert_eq!(payload["options"]["depthFactor"], 200.0);
        assert_eq!(payload["options"]["leafNodeClassName"], "node__leaf");
    }
}
