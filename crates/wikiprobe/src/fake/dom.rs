//! In-memory document model for the fake page driver.
//!
//! [`El`] trees are rendered to HTML and parsed with `scraper`; CSS queries
//! run through `scraper::Selector`. What HTML cannot express (hidden and
//! late-attaching elements, form values, click behaviors) lives in a side
//! table keyed by the parsed tree's `NodeId`s.

use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};
use std::collections::{BTreeSet, HashMap};
use std::fmt::Write as _;
use std::time::Duration;

use crate::locator::{text_matches, Query, QueryStep};
use crate::result::{ProbeError, ProbeResult};

/// Marks rendered elements so their behavior can be found after parsing
const NODE_ATTR: &str = "data-fake-node";

const VOID_TAGS: &[&str] = &[
    "area", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "wbr",
];

/// What clicking an element does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickBehavior {
    /// Navigate to a URL, resolved against the current one
    Navigate(String),
    /// Navigate to `action` with query parameters appended
    Submit {
        /// Form action URL, resolved against the current one
        action: String,
        /// Parameters appended in order
        params: Vec<(String, FormValue)>,
    },
    /// Un-hide every element matching a CSS selector
    Reveal(String),
}

impl ClickBehavior {
    /// Navigate to `url`
    #[must_use]
    pub fn navigate(url: impl Into<String>) -> Self {
        Self::Navigate(url.into())
    }

    /// Reveal elements matching `selector`
    #[must_use]
    pub fn reveal(selector: impl Into<String>) -> Self {
        Self::Reveal(selector.into())
    }

    /// Submit to `action` with `params`
    #[must_use]
    pub fn submit(action: impl Into<String>, params: Vec<(&str, FormValue)>) -> Self {
        Self::Submit {
            action: action.into(),
            params: params
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        }
    }
}

/// Source of a submitted parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    /// Current value of the first element matching a CSS selector
    Field(String),
    /// Fixed value
    Literal(String),
}

impl FormValue {
    /// Value of the field matching `selector`
    #[must_use]
    pub fn field(selector: impl Into<String>) -> Self {
        Self::Field(selector.into())
    }

    /// Fixed value
    #[must_use]
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }
}

/// Per-element state the markup does not carry
#[derive(Debug, Clone, Default)]
struct Behavior {
    hidden: bool,
    appears_after: Option<Duration>,
    on_click: Option<ClickBehavior>,
    reveals_on_input: Option<String>,
    value: Option<String>,
}

/// Builder for one element of a fake document
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct El {
    tag: String,
    attrs: Vec<(String, String)>,
    text: String,
    behavior: Behavior,
    children: Vec<El>,
}

impl El {
    /// Element with the given tag name
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// `<a href=..>text</a>`
    pub fn link(href: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new("a").attr("href", href).text(text)
    }

    /// Set the `id` attribute
    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    /// Add a class
    pub fn class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if let Some((_, existing)) = self.attrs.iter_mut().find(|(k, _)| k == "class") {
            existing.push(' ');
            existing.push_str(&class);
        } else {
            self.attrs.push(("class".to_string(), class));
        }
        self
    }

    /// Set an attribute, replacing any previous value
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into().to_ascii_lowercase();
        let value = value.into();
        if let Some((_, existing)) = self.attrs.iter_mut().find(|(k, _)| *k == name) {
            *existing = value;
        } else {
            self.attrs.push((name, value));
        }
        self
    }

    /// Own text, placed before the children
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Start hidden (`display: none`)
    pub const fn hidden(mut self) -> Self {
        self.behavior.hidden = true;
        self
    }

    /// Only attach the element `delay` after the document loads
    pub const fn appears_after(mut self, delay: Duration) -> Self {
        self.behavior.appears_after = Some(delay);
        self
    }

    /// Behavior when clicked
    pub fn on_click(mut self, behavior: ClickBehavior) -> Self {
        self.behavior.on_click = Some(behavior);
        self
    }

    /// Reveal elements matching `selector` while this field holds text
    pub fn reveals_on_input(mut self, selector: impl Into<String>) -> Self {
        self.behavior.reveals_on_input = Some(selector.into());
        self
    }

    /// Initial form value
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.behavior.value = Some(value.into());
        self
    }

    /// Append a child
    pub fn child(mut self, child: El) -> Self {
        self.children.push(child);
        self
    }

    /// Append children
    pub fn children(mut self, children: impl IntoIterator<Item = El>) -> Self {
        self.children.extend(children);
        self
    }

    /// Write the element as HTML; behaviors are pushed in marker order
    fn render(self, out: &mut String, behaviors: &mut Vec<Behavior>) {
        let _ = write!(out, "<{} {NODE_ATTR}=\"{}\"", self.tag, behaviors.len());
        behaviors.push(self.behavior);
        for (name, value) in &self.attrs {
            let _ = write!(out, " {name}=\"{}\"", escape(value));
        }
        out.push('>');
        if VOID_TAGS.contains(&self.tag.as_str()) {
            return;
        }
        out.push_str(&escape(&self.text));
        for child in self.children {
            child.render(out, behaviors);
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn parse_selector(selector: &str) -> ProbeResult<Selector> {
    Selector::parse(selector)
        .map_err(|e| ProbeError::driver(format!("invalid selector {selector:?}: {e:?}")))
}

/// A fake document: parsed markup plus element state.
///
/// `scraper::Html` is not `Send`, so the document keeps its source and
/// rebuilds the tree per query; node ids are stable across parses.
#[derive(Debug, Clone)]
pub struct FakeDocument {
    source: String,
    /// Elements under `<body>` in document order
    order: Vec<NodeId>,
    behaviors: HashMap<NodeId, Behavior>,
    elapsed: Duration,
}

impl FakeDocument {
    /// Build a document whose body holds `body`
    #[must_use]
    pub fn new(body: Vec<El>) -> Self {
        let mut source = String::from("<!DOCTYPE html><html><head></head><body>");
        let mut marked = Vec::new();
        for el in body {
            el.render(&mut source, &mut marked);
        }
        source.push_str("</body></html>");

        let html = Html::parse_document(&source);
        let order = body_elements(&html);
        let mut behaviors = HashMap::new();
        for &id in &order {
            let marker = html
                .tree
                .get(id)
                .and_then(ElementRef::wrap)
                .and_then(|e| e.value().attr(NODE_ATTR))
                .and_then(|v| v.parse::<usize>().ok());
            if let Some(behavior) = marker.and_then(|n| marked.get_mut(n)) {
                behaviors.insert(id, std::mem::take(behavior));
            }
        }
        Self {
            source,
            order,
            behaviors,
            elapsed: Duration::ZERO,
        }
    }

    /// Document with no elements
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Number of elements, attached or not
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the document has no elements
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// HTML source of the document
    #[must_use]
    pub fn html(&self) -> &str {
        &self.source
    }

    fn parse(&self) -> Html {
        Html::parse_document(&self.source)
    }

    /// Time since load, which decides which delayed elements are attached
    pub(crate) fn refresh(&mut self, elapsed: Duration) {
        self.elapsed = elapsed;
    }

    fn element<'a>(&self, html: &'a Html, index: usize) -> Option<ElementRef<'a>> {
        self.order
            .get(index)
            .and_then(|&id| html.tree.get(id))
            .and_then(ElementRef::wrap)
    }

    fn behavior(&self, id: NodeId) -> Option<&Behavior> {
        self.behaviors.get(&id)
    }

    /// The element and its ancestors all have their delay behind them
    fn attached(&self, html: &Html, id: NodeId) -> bool {
        html.tree.get(id).is_some_and(|node| {
            std::iter::once(node).chain(node.ancestors()).all(|n| {
                self.behavior(n.id())
                    .and_then(|b| b.appears_after)
                    .map_or(true, |delay| self.elapsed >= delay)
            })
        })
    }

    fn visible(&self, html: &Html, id: NodeId) -> bool {
        self.attached(html, id)
            && html.tree.get(id).is_some_and(|node| {
                !std::iter::once(node)
                    .chain(node.ancestors())
                    .any(|n| self.behavior(n.id()).is_some_and(|b| b.hidden))
            })
    }

    fn attached_all(&self, html: &Html) -> Vec<usize> {
        (0..self.order.len())
            .filter(|&i| self.attached(html, self.order[i]))
            .collect()
    }

    /// Attached descendants of the scopes, deduplicated, in document order
    fn candidates(&self, html: &Html, scopes: Option<&[usize]>) -> Vec<usize> {
        let Some(scopes) = scopes else {
            return self.attached_all(html);
        };
        let position: HashMap<NodeId, usize> =
            self.order.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        let mut set = BTreeSet::new();
        for scope in scopes.iter().filter_map(|&s| self.element(html, s)) {
            set.extend(
                scope
                    .descendants()
                    .skip(1)
                    .filter(|n| self.attached(html, n.id()))
                    .filter_map(|n| position.get(&n.id()).copied()),
            );
        }
        set.into_iter().collect()
    }

    fn collect_text(&self, html: &Html, id: NodeId, out: &mut String) {
        let Some(node) = html.tree.get(id) else {
            return;
        };
        for child in node.children() {
            if let Some(text) = child.value().as_text() {
                out.push_str(text);
            } else if child.value().is_element() && self.attached(html, child.id()) {
                self.collect_text(html, child.id(), out);
            }
        }
    }

    fn text_of(&self, html: &Html, index: usize) -> String {
        let mut out = String::new();
        if let Some(&id) = self.order.get(index) {
            self.collect_text(html, id, &mut out);
        }
        out
    }

    /// Text content of an element, skipping unattached descendants
    #[must_use]
    pub fn text_content(&self, index: usize) -> String {
        self.text_of(&self.parse(), index)
    }

    /// Whether an element is attached and rendered
    #[must_use]
    pub fn is_visible(&self, index: usize) -> bool {
        self.order
            .get(index)
            .is_some_and(|&id| self.visible(&self.parse(), id))
    }

    /// Resolve a query to attached elements in document order
    pub fn resolve(&self, query: &Query) -> ProbeResult<Vec<usize>> {
        let html = self.parse();
        // None = the document itself
        let mut scopes: Option<Vec<usize>> = None;
        for step in query.steps() {
            let next = match step {
                QueryStep::Css(selector) => {
                    let selector = parse_selector(selector)?;
                    self.candidates(&html, scopes.as_deref())
                        .into_iter()
                        .filter(|&i| self.element(&html, i).is_some_and(|e| selector.matches(&e)))
                        .collect()
                }
                QueryStep::HasText(text) => scopes
                    .unwrap_or_else(|| self.attached_all(&html))
                    .into_iter()
                    .filter(|&i| text_matches(&self.text_of(&html, i), text))
                    .collect(),
                QueryStep::Text(text) => self
                    .candidates(&html, scopes.as_deref())
                    .into_iter()
                    .filter(|&i| self.innermost_text_match(&html, i, text))
                    .collect(),
                QueryStep::Nth(n) => scopes
                    .unwrap_or_else(|| self.attached_all(&html))
                    .get(*n)
                    .map(|&i| vec![i])
                    .unwrap_or_default(),
            };
            scopes = Some(next);
        }
        scopes.ok_or_else(|| ProbeError::driver("empty query does not resolve to an element"))
    }

    fn innermost_text_match(&self, html: &Html, index: usize, text: &str) -> bool {
        let Some(element) = self.element(html, index) else {
            return false;
        };
        let matches_id = |id: NodeId| {
            let mut out = String::new();
            self.collect_text(html, id, &mut out);
            text_matches(&out, text)
        };
        matches_id(element.id())
            && !element
                .children()
                .filter(|c| c.value().is_element() && self.attached(html, c.id()))
                .any(|c| matches_id(c.id()))
    }

    /// First attached match of `query`, if any
    pub fn first(&self, query: &Query) -> ProbeResult<Option<usize>> {
        Ok(self.resolve(query)?.first().copied())
    }

    fn tag(&self, html: &Html, index: usize) -> String {
        self.element(html, index)
            .map(|e| e.value().name().to_string())
            .unwrap_or_default()
    }

    /// What a click on the element does: its own behavior, else a link's href
    #[must_use]
    pub fn click_behavior(&self, index: usize) -> Option<ClickBehavior> {
        let id = *self.order.get(index)?;
        if let Some(behavior) = self.behavior(id).and_then(|b| b.on_click.clone()) {
            return Some(behavior);
        }
        let html = self.parse();
        let element = self.element(&html, index)?;
        if element.value().name() == "a" {
            element.value().attr("href").map(ClickBehavior::navigate)
        } else {
            None
        }
    }

    /// Form value of a field
    pub fn input_value(&self, index: usize) -> ProbeResult<String> {
        let tag = self.tag(&self.parse(), index);
        if matches!(tag.as_str(), "input" | "textarea" | "select") {
            Ok(self
                .order
                .get(index)
                .and_then(|&id| self.behavior(id))
                .and_then(|b| b.value.clone())
                .unwrap_or_default())
        } else {
            Err(ProbeError::driver(format!(
                "<{tag}> is not an input, textarea or select element"
            )))
        }
    }

    /// Replace a field's value, revealing or hiding its dependent elements
    pub fn fill(&mut self, index: usize, text: &str) -> ProbeResult<()> {
        let html = self.parse();
        let Some(element) = self.element(&html, index) else {
            return Err(ProbeError::driver(format!("no element at {index}")));
        };
        let id = element.id();
        let tag = element.value().name();
        if !self.visible(&html, id) {
            return Err(ProbeError::driver(format!("<{tag}> is not visible")));
        }
        let editable = matches!(tag, "input" | "textarea")
            || element
                .value()
                .attr("contenteditable")
                .is_some_and(|v| v != "false");
        if !editable {
            return Err(ProbeError::driver(format!("<{tag}> is not an editable element")));
        }
        let behavior = self.behaviors.entry(id).or_default();
        behavior.value = Some(text.to_string());
        let reveals = behavior.reveals_on_input.clone();
        if let Some(selector) = reveals {
            self.set_hidden(&selector, text.is_empty())?;
        }
        Ok(())
    }

    /// Set the hidden flag on every element matching `selector`
    pub(crate) fn set_hidden(&mut self, selector: &str, hidden: bool) -> ProbeResult<()> {
        let selector = parse_selector(selector)?;
        let html = self.parse();
        let matched: Vec<NodeId> = (0..self.order.len())
            .filter_map(|i| self.element(&html, i))
            .filter(|e| selector.matches(e))
            .map(|e| e.id())
            .collect();
        for id in matched {
            self.behaviors.entry(id).or_default().hidden = hidden;
        }
        Ok(())
    }
}

fn body_elements(html: &Html) -> Vec<NodeId> {
    html.root_element()
        .children()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "body")
        .map(|body| {
            body.descendants()
                .skip(1)
                .filter(|n| n.value().is_element())
                .map(|n| n.id())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> FakeDocument {
        FakeDocument::new(vec![
            El::new("div").id("form").children([
                El::new("input").id("name").value("alice"),
                El::new("div").class("menu").hidden().children([
                    El::new("li").class("item").child(El::link("/a", "Contents")),
                    El::new("li").class("item").child(El::link("/b", "Random article")),
                ]),
            ]),
            El::new("p").text("Intro ").child(El::link("/wiki/X", "X")),
            El::new("div").id("late").appears_after(Duration::from_millis(100)),
        ])
    }

    fn wiki_like() -> FakeDocument {
        FakeDocument::new(vec![
            El::new("div").class("mw-content-container").children([
                El::new("h1").id("firstHeading").text("Search results"),
                El::new("input").id("searchText").attr("aria-label", "Search Wikipedia"),
                El::new("button").attr("type", "submit"),
            ]),
            El::new("p").children([
                El::link("/wiki/Quantum", "Quantum"),
                El::link("https://example.org/", "Elsewhere"),
            ]),
            El::new("span").id("See_also"),
            El::new("ul").child(El::new("li").text("Related")),
            El::new("a").attr("title", "mw:").text("MediaWiki"),
        ])
    }

    fn count(selector: &str) -> usize {
        wiki_like().resolve(&Query::css(selector)).unwrap().len()
    }

    mod build_tests {
        use super::*;

        #[test]
        fn test_document_order() {
            let d = doc();
            assert_eq!(d.len(), 10);
            let html = d.parse();
            assert_eq!(d.tag(&html, 0), "div");
            assert_eq!(d.tag(&html, 1), "input");
            assert_eq!(d.tag(&html, 7), "p");
        }

        #[test]
        fn test_markup_is_escaped() {
            let d = FakeDocument::new(vec![El::new("p")
                .attr("title", "a \"b\"")
                .text("x < y & z")]);
            assert!(d.html().contains("x &lt; y &amp; z"));
            assert_eq!(d.text_content(0), "x < y & z");
            assert_eq!(count_in(&d, r#"[title='a "b"']"#), 1);
        }

        #[test]
        fn test_class_builder_appends() {
            let d = FakeDocument::new(vec![El::new("div").class("a").class("b")]);
            assert_eq!(count_in(&d, ".a.b"), 1);
        }

        fn count_in(d: &FakeDocument, selector: &str) -> usize {
            d.resolve(&Query::css(selector)).unwrap().len()
        }
    }

    mod selector_tests {
        use super::*;

        #[test]
        fn test_simple_selectors() {
            assert_eq!(count("#firstHeading"), 1);
            assert_eq!(count(".mw-content-container"), 1);
            assert_eq!(count("a"), 3);
            assert_eq!(count("*"), 11);
        }

        #[test]
        fn test_attribute_operators() {
            assert_eq!(count(r#"[aria-label="Search Wikipedia"]"#), 1);
            assert_eq!(count(r#"[title="mw:"]"#), 1);
            assert_eq!(count(r#"a[href*="wiki"]"#), 1);
            assert_eq!(count(r#"a[href^="https"]"#), 1);
            assert_eq!(count("[href]"), 2);
        }

        #[test]
        fn test_combinators() {
            assert_eq!(count(r#"p a[href*="wiki"]"#), 1);
            assert_eq!(count(".mw-content-container > #firstHeading"), 1);
            assert_eq!(count("span#See_also ~ ul li"), 1);
            assert_eq!(count("span#See_also + ul"), 1);
            assert_eq!(count("p + ul"), 0);
            assert_eq!(count("h1, button, #nope"), 2);
        }

        #[test]
        fn test_invalid_selector_is_driver_error() {
            let err = wiki_like().resolve(&Query::css("[x=")).unwrap_err();
            assert!(matches!(err, ProbeError::Driver { .. }));
        }
    }

    mod resolve_tests {
        use super::*;

        #[test]
        fn test_css_and_text_content() {
            let d = doc();
            let hits = d.resolve(&Query::css("p")).unwrap();
            assert_eq!(hits.len(), 1);
            assert_eq!(d.text_content(hits[0]), "Intro X");
        }

        #[test]
        fn test_scoped_css_excludes_scope_itself() {
            let d = doc();
            let q = Query::css("div").then(QueryStep::Css("div".into()));
            let hits = d.resolve(&q).unwrap();
            assert_eq!(hits, vec![2]);
        }

        #[test]
        fn test_text_step_finds_innermost() {
            let d = doc();
            let q = Query::css(".item").then(QueryStep::Text("contents".into()));
            let hits = d.resolve(&q).unwrap();
            assert_eq!(hits.len(), 1);
            assert_eq!(d.tag(&d.parse(), hits[0]), "a");
        }

        #[test]
        fn test_has_text_and_nth() {
            let d = doc();
            let q = Query::css(".item").then(QueryStep::HasText("RANDOM".into()));
            assert_eq!(d.resolve(&q).unwrap().len(), 1);
            let q = Query::css(".item").then(QueryStep::Nth(5));
            assert!(d.resolve(&q).unwrap().is_empty());
        }

        #[test]
        fn test_hidden_ancestor_hides_descendants() {
            let d = doc();
            let link = d.first(&Query::css(".item a")).unwrap().unwrap();
            assert!(!d.is_visible(link));
        }

        #[test]
        fn test_delayed_element_attaches_later() {
            let mut d = doc();
            assert!(d.resolve(&Query::css("#late")).unwrap().is_empty());
            d.refresh(Duration::from_millis(99));
            assert!(d.resolve(&Query::css("#late")).unwrap().is_empty());
            d.refresh(Duration::from_millis(100));
            assert_eq!(d.resolve(&Query::css("#late")).unwrap().len(), 1);
        }

        #[test]
        fn test_empty_query_is_an_error() {
            assert!(doc().resolve(&Query::new()).is_err());
        }

        #[test]
        fn test_click_behavior_falls_back_to_href() {
            let d = doc();
            let link = d.first(&Query::css("p a")).unwrap().unwrap();
            assert_eq!(d.click_behavior(link), Some(ClickBehavior::navigate("/wiki/X")));
            let p = d.first(&Query::css("p")).unwrap().unwrap();
            assert_eq!(d.click_behavior(p), None);
        }
    }

    mod form_tests {
        use super::*;

        #[test]
        fn test_fill_and_read_back() {
            let mut d = doc();
            let input = d.first(&Query::css("#name")).unwrap().unwrap();
            assert_eq!(d.input_value(input).unwrap(), "alice");
            d.fill(input, "bob").unwrap();
            assert_eq!(d.input_value(input).unwrap(), "bob");
        }

        #[test]
        fn test_fill_rejects_non_editable() {
            let mut d = doc();
            let p = d.first(&Query::css("p")).unwrap().unwrap();
            assert!(d.fill(p, "x").is_err());
            assert!(d.input_value(p).is_err());
        }

        #[test]
        fn test_reveal_on_input() {
            let mut d = FakeDocument::new(vec![
                El::new("input").id("q").reveals_on_input(".menu"),
                El::new("div").class("menu").hidden(),
            ]);
            d.fill(0, "Quan").unwrap();
            assert!(d.is_visible(1));
            d.fill(0, "").unwrap();
            assert!(!d.is_visible(1));
        }
    }
}
