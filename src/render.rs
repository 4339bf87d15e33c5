use std::{borrow::Cow, fmt::Debug};

/// Renders a structured node to text during serialization.
///
/// Structured nodes are opaque to the core beyond their ordering;
/// flavor renderers implement this for whatever node types they
/// produce. Rendering must be pure: the core may call it any number
/// of times and expects identical output each time.
pub trait Render: Debug {
    fn render(&self) -> String;
}

/// One entry in a generated file's content sequence.
#[derive(Debug)]
pub enum ContentNode {
    /// A pre-rendered fragment, passed through verbatim.
    Text(String),
    /// A structured node, rendered through [`Render`] at
    /// serialization time.
    Structured(Box<dyn Render>),
}

impl ContentNode {
    /// Returns the node's rendered text.
    pub fn render(&self) -> Cow<'_, str> {
        match self {
            Self::Text(text) => Cow::Borrowed(text),
            Self::Structured(node) => Cow::Owned(node.render()),
        }
    }
}

impl From<String> for ContentNode {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for ContentNode {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<Box<dyn Render>> for ContentNode {
    fn from(node: Box<dyn Render>) -> Self {
        Self::Structured(node)
    }
}
