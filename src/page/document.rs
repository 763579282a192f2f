/*!
 * Page document backed by `scraper::Html`.
 *
 * The parsed tree is kept as the live document. Nodes are addressed by
 * `ego_tree::NodeId`, an index into the tree's arena, so handles stay valid
 * for the lifetime of the document and undo bookkeeping never depends on
 * object identity. Serialization goes through html5ever.
 */

use html5ever::{LocalName, QualName, ns};
use scraper::node::{Element, Text};
use scraper::{Html, Node};

pub use ego_tree::NodeId;

/// A mutable page tree
#[derive(Debug, Clone)]
pub struct Document {
    html: Html,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

fn element_name(name: &str) -> QualName {
    QualName::new(None, ns!(html), LocalName::from(name.to_lowercase()))
}

fn attribute_name(name: &str) -> QualName {
    QualName::new(None, ns!(), LocalName::from(name))
}

impl Document {
    /// Create an empty document holding only the root node
    pub fn new() -> Self {
        Self {
            html: Html::new_document(),
        }
    }

    /// Create `<html><body></body></html>` and return the document with the body id
    pub fn with_body() -> (Self, NodeId) {
        let mut doc = Self::new();
        let html = doc.append_element(doc.root(), "html");
        let body = doc.append_element(html, "body");
        (doc, body)
    }

    /// Parse an HTML document
    pub fn parse_html(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// The document root
    pub fn root(&self) -> NodeId {
        self.html.tree.root().id()
    }

    /// Append an element under `parent`; an unknown parent appends to the root
    pub fn append_element(&mut self, parent: NodeId, name: &str) -> NodeId {
        self.append(parent, Node::Element(Element::new(element_name(name), Vec::new())))
    }

    /// Append a text node under `parent`; an unknown parent appends to the root
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.append(parent, Node::Text(Text { text: text.into() }))
    }

    fn append(&mut self, parent: NodeId, value: Node) -> NodeId {
        if let Some(mut node) = self.html.tree.get_mut(parent) {
            return node.append(value).id();
        }
        self.html.tree.root_mut().append(value).id()
    }

    /// Node payload
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.html.tree.get(id).map(|node| node.value())
    }

    /// Parent of a node, `None` for the root
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.html.tree.get(id)?.parent().map(|parent| parent.id())
    }

    /// Children of a node in document order
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.html
            .tree
            .get(id)
            .into_iter()
            .flat_map(|node| node.children())
            .map(|child| child.id())
    }

    /// Child of `parent` at `position`
    pub fn child_at(&self, parent: NodeId, position: usize) -> Option<NodeId> {
        self.children(parent).nth(position)
    }

    /// Position of `id` among its parent's children
    pub fn child_position(&self, id: NodeId) -> Option<usize> {
        let node = self.html.tree.get(id)?;
        node.parent()?;
        Some(node.prev_siblings().count())
    }

    /// The parent of `id` when that parent is an element
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        self.tag_name(parent).map(|_| parent)
    }

    /// Tag name of an element node
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.node(id)?.as_element().map(|element| element.name())
    }

    /// Value of a text node
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.node(id)?.as_text().map(|text| &**text)
    }

    /// Overwrite the value of a text node. Returns false for any other node kind.
    pub fn set_text(&mut self, id: NodeId, value: &str) -> bool {
        let Some(mut node) = self.html.tree.get_mut(id) else {
            return false;
        };
        match node.value() {
            Node::Text(text) => {
                text.text = value.into();
                true
            }
            _ => false,
        }
    }

    /// Attribute of an element node
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id)?.as_element()?.attr(name)
    }

    /// Set an attribute on an element node. Returns false for any other node kind.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> bool {
        let key = attribute_name(name);
        self.with_element_mut(id, |element| {
            // `Element::attr` binary-searches, so the list stays sorted
            match element.attrs.binary_search_by(|(k, _)| k.cmp(&key)) {
                Ok(pos) => element.attrs[pos].1 = value.into(),
                Err(pos) => element.attrs.insert(pos, (key, value.into())),
            }
        })
        .is_some()
    }

    /// Remove an attribute, returning its previous value
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<String> {
        let key = attribute_name(name);
        self.with_element_mut(id, |element| {
            let pos = element.attrs.binary_search_by(|(k, _)| k.cmp(&key)).ok()?;
            Some(String::from(element.attrs.remove(pos).1))
        })
        .flatten()
    }

    fn with_element_mut<R>(&mut self, id: NodeId, f: impl FnOnce(&mut Element) -> R) -> Option<R> {
        let mut node = self.html.tree.get_mut(id)?;
        match node.value() {
            Node::Element(element) => Some(f(element)),
            _ => None,
        }
    }

    /// Pre-order walk starting at (and including) `root`
    pub fn descendants(&self, root: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.html
            .tree
            .get(root)
            .into_iter()
            .flat_map(|node| node.descendants())
            .map(|node| node.id())
    }

    /// First element named `name` in document order
    pub fn find_element(&self, name: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .find(|id| self.tag_name(*id) == Some(name))
    }

    /// The `<body>` element, if any
    pub fn body(&self) -> Option<NodeId> {
        self.find_element("body")
    }

    /// All elements carrying `name="value"`
    pub fn elements_with_attribute(&self, name: &str, value: &str) -> Vec<NodeId> {
        self.descendants(self.root())
            .filter(|id| self.attribute(*id, name) == Some(value))
            .collect()
    }

    /// Concatenated text of every text node under `id`
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id).filter_map(|n| self.text(n)).collect()
    }

    /// Serialize the tree back to HTML.
    ///
    /// html5ever writes only the doctype name, so public and system
    /// identifiers are put back here.
    pub fn to_html(&self) -> String {
        let serialized = self.html.html();
        match self.legacy_doctype() {
            Some((short, full)) => serialized.replacen(&short, &full, 1),
            None => serialized,
        }
    }

    fn legacy_doctype(&self) -> Option<(String, String)> {
        let doctype = self
            .html
            .tree
            .root()
            .children()
            .find_map(|node| node.value().as_doctype())?;
        let (public_id, system_id) = (doctype.public_id(), doctype.system_id());
        if public_id.is_empty() && system_id.is_empty() {
            return None;
        }

        let mut full = format!("<!DOCTYPE {}", doctype.name());
        if public_id.is_empty() {
            full.push_str(&format!(" SYSTEM \"{}\"", system_id));
        } else {
            full.push_str(&format!(" PUBLIC \"{}\"", public_id));
            if !system_id.is_empty() {
                full.push_str(&format!(" \"{}\"", system_id));
            }
        }
        full.push('>');
        Some((format!("<!DOCTYPE {}>", doctype.name()), full))
    }
}
