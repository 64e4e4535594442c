//! Deterministic mind-map layout.
//!
//! `layout` is a pure function from a framework document (plus a viewport
//! hint) to a positioned node/edge graph. There is no incremental diffing:
//! callers recompute the whole graph whenever the document changes, and
//! identifiers are stable strings so a renderer can key on them across
//! recomputations.

use serde::{Deserialize, Serialize};

use crate::framework::{Framework, Item};

/// Spacing presets. Two fixed shapes, not a continuous function of width.
const NARROW_SPACING: (f32, f32) = (300.0, 120.0);
const WIDE_SPACING: (f32, f32) = (500.0, 150.0);

/// Horizontal zig-zag offset for item nodes beneath their anchor.
const ITEM_X_OFFSET: f32 = 200.0;
/// Vertical step multiplier for item rows.
const ITEM_Y_FACTOR: f32 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportHint {
    pub narrow: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Goal,
    ActionSteps,
    Challenges,
    Resources,
    Tips,
    Clarification,
}

impl Category {
    fn id(self) -> &'static str {
        match self {
            Category::Goal => "goal",
            Category::ActionSteps => "action_steps",
            Category::Challenges => "challenges",
            Category::Resources => "resources",
            Category::Tips => "tips",
            Category::Clarification => "clarification",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Category::Goal => "Goal",
            Category::ActionSteps => "Action Steps",
            Category::Challenges => "Challenges",
            Category::Resources => "Resources",
            Category::Tips => "Tips",
            Category::Clarification => "Clarification Needed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramNode {
    pub id: String,
    pub label: String,
    pub position: Position,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    pub nodes: Vec<DiagramNode>,
    pub edges: Vec<DiagramEdge>,
}

/// Compute the node/edge graph for a framework document.
///
/// The shape is a fixed two-level tree: one goal root, four category
/// anchors that exist even when their item list is empty, and item leaves
/// in an alternating zig-zag beneath each anchor. A fifth anchor for
/// clarification questions appears only when that list is non-empty. A
/// handful of decorative cross edges mirror the reference visual design
/// and carry no data relationship.
pub fn layout(framework: &Framework, hint: ViewportHint) -> Diagram {
    let (h, v) = if hint.narrow {
        NARROW_SPACING
    } else {
        WIDE_SPACING
    };

    let mut diagram = Diagram {
        nodes: Vec::new(),
        edges: Vec::new(),
    };

    diagram.nodes.push(DiagramNode {
        id: Category::Goal.id().to_string(),
        label: framework.goal.clone(),
        position: Position { x: 0.0, y: 0.0 },
        category: Category::Goal,
    });

    let anchors = [
        (Category::ActionSteps, &framework.action_steps, -h, v),
        (Category::Challenges, &framework.challenges, h, v),
        (Category::Resources, &framework.resources, -h, 7.0 * v),
        (Category::Tips, &framework.tips, h, 7.0 * v),
    ];
    for (category, items, x, y) in anchors {
        add_branch(&mut diagram, category, items, Position { x, y }, v);
    }

    if !framework.clarification_needed.is_empty() {
        add_branch(
            &mut diagram,
            Category::Clarification,
            &framework.clarification_needed,
            Position { x: 0.0, y: 10.0 * v },
            v,
        );
    }

    add_cross_edges(&mut diagram, framework);
    diagram
}

/// Emit one category anchor, its goal edge, its item leaves, and the
/// anchor-to-item plus same-parity chain edges.
fn add_branch(
    diagram: &mut Diagram,
    category: Category,
    items: &[Item],
    anchor: Position,
    v: f32,
) {
    let anchor_id = category.id().to_string();
    diagram.nodes.push(DiagramNode {
        id: anchor_id.clone(),
        label: category.label().to_string(),
        position: anchor,
        category,
    });
    diagram.edges.push(edge(Category::Goal.id(), &anchor_id, category));

    for (index, item) in items.iter().enumerate() {
        let node_id = format!("{anchor_id}-{index}");
        let x_offset = if index % 2 == 0 {
            -ITEM_X_OFFSET
        } else {
            ITEM_X_OFFSET
        };
        diagram.nodes.push(DiagramNode {
            id: node_id.clone(),
            label: item.display_text(),
            position: Position {
                x: anchor.x + x_offset,
                y: anchor.y + (index as f32 + 1.0) * v * ITEM_Y_FACTOR,
            },
            category,
        });
        diagram.edges.push(edge(&anchor_id, &node_id, category));

        // Visual-continuity chain between every other item pair. The index
        // rule is exact: interior even indices only.
        if index > 0 && index < items.len() - 1 && index % 2 == 0 {
            let previous = format!("{anchor_id}-{}", index - 1);
            diagram.edges.push(edge(&previous, &node_id, category));
        }
    }
}

/// Decorative cross-category edges, present only when both endpoints'
/// categories are non-empty.
fn add_cross_edges(diagram: &mut Diagram, framework: &Framework) {
    let pairs = [
        (
            Category::ActionSteps,
            !framework.action_steps.is_empty(),
            Category::Resources,
            !framework.resources.is_empty(),
        ),
        (
            Category::Challenges,
            !framework.challenges.is_empty(),
            Category::Tips,
            !framework.tips.is_empty(),
        ),
    ];
    for (source, source_filled, target, target_filled) in pairs {
        if source_filled && target_filled {
            diagram.edges.push(edge(source.id(), target.id(), source));
        }
    }

    if !framework.action_steps.is_empty() && !framework.challenges.is_empty() {
        let step = min_pair_index(framework.action_steps.len());
        let challenge = min_pair_index(framework.challenges.len());
        diagram.edges.push(edge(
            &format!("{}-{step}", Category::ActionSteps.id()),
            &format!("{}-{challenge}", Category::Challenges.id()),
            Category::ActionSteps,
        ));
    }
}

fn min_pair_index(len: usize) -> usize {
    1.min(len - 1)
}

fn edge(source: &str, target: &str, category: Category) -> DiagramEdge {
    DiagramEdge {
        id: format!("e-{source}-{target}"),
        source: source.to_string(),
        target: target.to_string(),
        category,
    }
}
