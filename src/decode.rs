//! XML decoding of Torznab responses.
//!
//! The body is read with a quick-xml event reader into a small element tree,
//! then mapped onto the document types in [`models`](crate::models). Element
//! matching uses local names so that `torznab:attr` and `newznab:attr` are
//! treated alike; the channel's `<link>` and `<atom:link>` are told apart by
//! their qualified names.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::DecodeError;
use crate::models::{
    Capabilities, CapsCategory, Channel, Enclosure, Indexer, Indexers, Limits, RawAttr, RawItem,
    Rss, SearchMode, ServerInfo, SourceIndexer,
};

type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// A Torznab `<error code="..." description="..."/>` document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub code: u32,
    pub description: String,
}

#[derive(Debug, Default)]
struct Element {
    /// Qualified name, e.g. `torznab:attr`.
    name: String,
    /// Name without prefix, e.g. `attr`.
    local: String,
    attrs: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> DecodeResult<Self> {
        let mut attrs = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attrs.push((key, value));
        }

        Ok(Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            local: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
            attrs,
            ..Default::default()
        })
    }

    fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn attr_or_empty(&self, key: &str) -> String {
        self.attr(key).unwrap_or_default().to_string()
    }

    fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.local == local)
    }

    fn child(&self, local: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.local == local)
    }

    fn child_text(&self, local: &str) -> String {
        self.child(local).map(|c| c.text.clone()).unwrap_or_default()
    }
}

/// Reads the whole document into an element tree and returns its root.
fn read_tree(xml: &str) -> DecodeResult<Element> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => {
                if root.is_some() {
                    return Err(DecodeError::new("content after the root element"));
                }
                stack.push(Element::from_start(e)?);
            }
            Event::Empty(ref e) => {
                let element = Element::from_start(e)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None if root.is_none() => root = Some(element),
                    None => return Err(DecodeError::new("content after the root element")),
                }
            }
            Event::Text(ref e) => {
                let text = e.unescape()?;
                match stack.last_mut() {
                    Some(current) => current.text.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None if root.is_none() => {
                        return Err(DecodeError::new(format!(
                            "no root element (found text {:?})",
                            preview(&text)
                        )));
                    }
                    None => return Err(DecodeError::new("content after the root element")),
                }
            }
            Event::CData(ref e) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(e));
                }
            }
            Event::End(_) => {
                let Some(element) = stack.pop() else {
                    return Err(DecodeError::new("unexpected closing tag"));
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(DecodeError::new(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| DecodeError::new("empty document"))
}

/// First few characters of stray text, for error messages.
fn preview(text: &str) -> String {
    const MAX: usize = 32;
    let text = text.trim();
    match text.char_indices().nth(MAX) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

fn expect_root(root: &Element, local: &str) -> DecodeResult<()> {
    if root.local == local {
        Ok(())
    } else {
        Err(DecodeError::new(format!(
            "expected <{}> document, found <{}>",
            local, root.name
        )))
    }
}

/// Decodes an `<rss>` result feed.
pub fn parse_rss(xml: &str) -> DecodeResult<Rss> {
    let root = read_tree(xml)?;
    expect_root(&root, "rss")?;

    let channel = root
        .child("channel")
        .map(parse_channel)
        .unwrap_or_default();

    Ok(Rss {
        version: root.attr_or_empty("version"),
        channel,
    })
}

fn parse_channel(element: &Element) -> Channel {
    let mut channel = Channel::default();

    for child in &element.children {
        match (child.name.as_str(), child.local.as_str()) {
            ("link", _) => channel.link = child.text.clone(),
            (_, "link") => channel.atom_link = child.attr_or_empty("href"),
            (_, "title") => channel.title = child.text.clone(),
            (_, "description") => channel.description = child.text.clone(),
            (_, "language") => channel.language = child.text.clone(),
            (_, "category") => channel.category = child.text.clone(),
            (_, "item") => channel.items.push(parse_item(child)),
            _ => {}
        }
    }

    channel
}

fn parse_item(element: &Element) -> RawItem {
    let mut item = RawItem::default();

    for child in &element.children {
        let text = || child.text.clone();
        match child.local.as_str() {
            "title" => item.title = text(),
            "guid" => item.guid = text(),
            "jackettindexer" => {
                item.indexer = SourceIndexer {
                    id: child.attr_or_empty("id"),
                    name: text(),
                }
            }
            "type" => item.kind = text(),
            "comments" => item.comments = text(),
            "pubDate" => item.pub_date = text(),
            "size" => item.size = text(),
            "files" => item.files = text(),
            "grabs" => item.grabs = text(),
            "description" => item.description = text(),
            "link" => item.link = text(),
            "category" => item.categories.push(text()),
            "enclosure" => {
                item.enclosure = Enclosure {
                    url: child.attr_or_empty("url"),
                    length: child.attr_or_empty("length"),
                    mime_type: child.attr_or_empty("type"),
                }
            }
            "attr" => {
                if let Some(name) = child.attr("name") {
                    item.attrs
                        .push(RawAttr::new(name, child.attr("value").unwrap_or_default()));
                }
            }
            _ => {}
        }
    }

    item
}

/// Decodes an `<indexers>` list.
pub fn parse_indexers(xml: &str) -> DecodeResult<Indexers> {
    let root = read_tree(xml)?;
    expect_root(&root, "indexers")?;
    Ok(indexers_from(&root))
}

fn indexers_from(root: &Element) -> Indexers {
    let indexers = root
        .children_named("indexer")
        .map(|e| Indexer {
            id: e.attr_or_empty("id"),
            configured: e.attr("configured").is_some_and(is_truthy),
            title: e.child_text("title"),
            description: e.child_text("description"),
            link: e.child_text("link"),
            language: e.child_text("language"),
            kind: e.child_text("type"),
        })
        .collect();

    Indexers { indexers }
}

/// Decodes a capability response, accepting either an `<indexers>` list or
/// a `<caps>` document.
pub fn parse_capabilities(xml: &str) -> DecodeResult<Capabilities> {
    let root = read_tree(xml)?;

    match root.local.as_str() {
        "indexers" => Ok(Capabilities {
            indexers: indexers_from(&root).indexers,
            ..Default::default()
        }),
        "caps" => Ok(caps_from(&root)),
        _ => Err(DecodeError::new(format!(
            "expected <caps> or <indexers> document, found <{}>",
            root.name
        ))),
    }
}

fn caps_from(root: &Element) -> Capabilities {
    let server = root.child("server").map(|e| ServerInfo {
        title: e.attr_or_empty("title"),
        version: e.attr_or_empty("version"),
    });

    let limits = root.child("limits").map(|e| Limits {
        default: e.attr("default").and_then(|v| v.trim().parse().ok()),
        max: e.attr("max").and_then(|v| v.trim().parse().ok()),
    });

    let searching = root
        .child("searching")
        .map(|s| {
            s.children
                .iter()
                .map(|mode| SearchMode {
                    name: mode.local.clone(),
                    available: mode.attr("available").is_some_and(is_truthy),
                    supported_params: mode
                        .attr("supportedParams")
                        .unwrap_or_default()
                        .split(',')
                        .map(str::trim)
                        .filter(|p| !p.is_empty())
                        .map(String::from)
                        .collect(),
                })
                .collect()
        })
        .unwrap_or_default();

    let categories = root
        .child("categories")
        .map(|c| c.children_named("category").map(caps_category).collect())
        .unwrap_or_default();

    Capabilities {
        indexers: Vec::new(),
        server,
        limits,
        searching,
        categories,
    }
}

fn caps_category(element: &Element) -> CapsCategory {
    CapsCategory {
        id: element.attr_or_empty("id"),
        name: element.attr_or_empty("name"),
        subcategories: element.children_named("subcat").map(caps_category).collect(),
    }
}

/// Returns the error carried by a Torznab `<error>` document, or `None` if
/// `xml` is anything else.
pub fn parse_api_error(xml: &str) -> Option<ApiError> {
    let root = read_tree(xml).ok()?;
    if root.local != "error" {
        return None;
    }
    Some(ApiError {
        code: root
            .attr("code")
            .and_then(|c| c.trim().parse().ok())
            .unwrap_or(0),
        description: root.attr_or_empty("description"),
    })
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "1")
}
