//! Element tree normalization
//!
//! Each backend has its own hierarchy format (WDA JSON, UiAutomator XML).
//! Both implement [`SourceNode`] so a single pre-order walk can flatten them
//! into [`ScreenElement`]s the caller can address.
//!
//! Visibility is the backend flag plus a non-negative origin. Elements are not
//! clamped against the current viewport, so a node scrolled below the screen
//! with a positive origin still counts as visible.

use serde::Serialize;

/// The closed set of element types worth reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    TextField,
    Button,
    Switch,
    Icon,
    SearchField,
    StaticText,
    Image,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TextField => "TextField",
            Self::Button => "Button",
            Self::Switch => "Switch",
            Self::Icon => "Icon",
            Self::SearchField => "SearchField",
            Self::StaticText => "StaticText",
            Self::Image => "Image",
        }
    }

    /// Match a canonical type name exactly
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "TextField" => Some(Self::TextField),
            "Button" => Some(Self::Button),
            "Switch" => Some(Self::Switch),
            "Icon" => Some(Self::Icon),
            "SearchField" => Some(Self::SearchField),
            "StaticText" => Some(Self::StaticText),
            "Image" => Some(Self::Image),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ElementRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// A normalized, platform-agnostic UI element
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenElement {
    #[serde(rename = "type")]
    pub element_type: String,
    pub label: Option<String>,
    pub name: Option<String>,
    pub value: Option<String>,
    pub identifier: Option<String>,
    pub rect: ElementRect,
    /// Holds input focus; only Android hierarchies report it
    pub focused: bool,
}

impl ScreenElement {
    /// Center point, handy for tapping
    pub fn center(&self) -> (i32, i32) {
        (
            self.rect.x + self.rect.width / 2,
            self.rect.y + self.rect.height / 2,
        )
    }
}

/// A node of a backend-specific UI hierarchy
pub trait SourceNode: Sized {
    /// Canonical kind, or `None` for types that are never reported
    fn kind(&self) -> Option<ElementKind>;
    /// The backend's own visibility flag
    fn visible_flag(&self) -> bool;
    fn rect(&self) -> ElementRect;
    fn label(&self) -> Option<&str>;
    fn name(&self) -> Option<&str>;
    fn value(&self) -> Option<&str>;
    fn identifier(&self) -> Option<&str>;
    fn focused(&self) -> bool {
        false
    }
    fn children(&self) -> &[Self];
}

/// Flatten `root` into accepted elements, parent before children
pub fn normalize<N: SourceNode>(root: &N) -> Vec<ScreenElement> {
    let mut output = Vec::new();
    collect(root, &mut output);
    output
}

fn collect<N: SourceNode>(node: &N, output: &mut Vec<ScreenElement>) {
    if let Some(kind) = node.kind() {
        if is_visible(node) && has_identity(node) {
            output.push(ScreenElement {
                element_type: kind.as_str().to_string(),
                label: non_empty(node.label()),
                name: non_empty(node.name()),
                value: non_empty(node.value()),
                identifier: non_empty(node.identifier()),
                rect: node.rect(),
                focused: node.focused(),
            });
        }
    }

    // Containers that are not reported may still hold reportable children
    for child in node.children() {
        collect(child, output);
    }
}

fn is_visible<N: SourceNode>(node: &N) -> bool {
    let rect = node.rect();
    node.visible_flag() && rect.x >= 0 && rect.y >= 0
}

fn has_identity<N: SourceNode>(node: &N) -> bool {
    non_empty(node.label()).is_some()
        || non_empty(node.name()).is_some()
        || non_empty(node.identifier()).is_some()
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Node {
        kind: Option<ElementKind>,
        visible: bool,
        rect: ElementRect,
        label: Option<String>,
        identifier: Option<String>,
        children: Vec<Node>,
    }

    impl SourceNode for Node {
        fn kind(&self) -> Option<ElementKind> {
            self.kind
        }
        fn visible_flag(&self) -> bool {
            self.visible
        }
        fn rect(&self) -> ElementRect {
            self.rect
        }
        fn label(&self) -> Option<&str> {
            self.label.as_deref()
        }
        fn name(&self) -> Option<&str> {
            None
        }
        fn value(&self) -> Option<&str> {
            None
        }
        fn identifier(&self) -> Option<&str> {
            self.identifier.as_deref()
        }
        fn children(&self) -> &[Self] {
            &self.children
        }
    }

    fn button(label: &str) -> Node {
        Node {
            kind: Some(ElementKind::Button),
            visible: true,
            rect: ElementRect {
                x: 10,
                y: 20,
                width: 100,
                height: 40,
            },
            label: Some(label.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_preorder_and_container_recursion() {
        let root = Node {
            children: vec![
                Node {
                    children: vec![button("b"), button("c")],
                    ..button("a")
                },
                Node {
                    kind: None,
                    visible: false,
                    children: vec![button("d")],
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let labels: Vec<_> = normalize(&root)
            .into_iter()
            .map(|e| e.label.unwrap())
            .collect();
        assert_eq!(labels, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_negative_origin_is_hidden() {
        let mut off_screen = button("off");
        off_screen.rect.x = -1;
        let root = Node {
            children: vec![off_screen, button("on")],
            ..Default::default()
        };

        let elements = normalize(&root);
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].label.as_deref(), Some("on"));
    }

    #[test]
    fn test_anonymous_and_hidden_elements_are_dropped() {
        let mut anonymous = button("");
        anonymous.label = None;
        let mut empty_label = button("");
        empty_label.label = Some(String::new());
        let mut hidden = button("hidden");
        hidden.visible = false;
        let mut by_id = button("");
        by_id.label = None;
        by_id.identifier = Some("login".into());

        let root = Node {
            children: vec![anonymous, empty_label, hidden, by_id],
            ..Default::default()
        };

        let elements = normalize(&root);
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].identifier.as_deref(), Some("login"));
        assert_eq!(elements[0].element_type, "Button");
        assert_eq!(elements[0].center(), (60, 40));
        assert!(!elements[0].focused);
    }
}
