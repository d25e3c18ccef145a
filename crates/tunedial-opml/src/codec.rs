//! OPML document codec: bytes to outline subtrees and back.
//!
//! Parsing walks the XML event stream with a stack of open `<outline>`
//! frames; node kind dispatch happens when a frame closes, so implicit
//! branches (no `type` attribute but nested entries) are recognised.
//! Serialization is the mirror image, with one asymmetry: the
//! favourites root writes only its children at the top level.

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use tracing::warn;

use crate::error::FormatError;
use crate::node::{upgrade_url_scheme, Attributes, NodeId, OutlineKind, OutlineNode};
use crate::tree::Tree;

/// An `<outline>` element still being read; children accumulate until
/// the closing tag decides the node kind.
struct Frame {
    attributes: Attributes,
    children: Vec<NodeId>,
}

/// Parse a directory document and return the ids of its top-level
/// entries (the children of `/opml/body`), allocated into `tree`.
///
/// Childless elements with an unrecognised (or absent) `type` attribute
/// are skipped with a warning rather than failing the whole document;
/// nested entries under `link` or `audio` are a hard format error.
pub fn parse_document(tree: &mut Tree, bytes: &[u8]) -> Result<Vec<NodeId>, FormatError> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut toplevel = Vec::new();
    let mut in_body = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"body" => in_body = true,
                b"outline" if in_body => stack.push(Frame {
                    attributes: read_attributes(&e)?,
                    children: Vec::new(),
                }),
                _ => {}
            },
            Event::Empty(e) => {
                if in_body && e.name().as_ref() == b"outline" {
                    let frame = Frame {
                        attributes: read_attributes(&e)?,
                        children: Vec::new(),
                    };
                    if let Some(id) = build_outline(tree, frame)? {
                        attach(&mut stack, &mut toplevel, id);
                    }
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"body" => in_body = false,
                b"outline" if in_body => {
                    if let Some(frame) = stack.pop() {
                        if let Some(id) = build_outline(tree, frame)? {
                            attach(&mut stack, &mut toplevel, id);
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(toplevel)
}

fn attach(stack: &mut [Frame], toplevel: &mut Vec<NodeId>, id: NodeId) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(id);
    } else {
        toplevel.push(id);
    }
}

fn read_attributes(elem: &BytesStart<'_>) -> Result<Attributes, FormatError> {
    let mut attributes = Attributes::new();
    for attr in elem.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attr.value).into_owned();
        let value = quick_xml::escape::unescape(&raw)?.into_owned();
        attributes.insert(key, value);
    }
    Ok(attributes)
}

/// Turn a closed frame into a node. Returns `None` for skipped
/// unsupported leaves.
fn build_outline(tree: &mut Tree, frame: Frame) -> Result<Option<NodeId>, FormatError> {
    let Frame {
        mut attributes,
        children,
    } = frame;
    upgrade_url_scheme(&mut attributes);
    let text = attributes.get("text").cloned().unwrap_or_default();

    // Explicit `type` wins; an element with nested entries but no type,
    // or the placeholder `type="text"`, counts as a plain outline.
    let kind = match attributes.get("type").map(String::as_str) {
        Some("outline") | Some("text") => "outline",
        None if !children.is_empty() => "outline",
        Some("link") => "link",
        Some("audio") => "audio",
        other => {
            warn!(
                "skipping unsupported outline (type={:?}, text={:?})",
                other, text
            );
            return Ok(None);
        }
    };

    let node = match kind {
        "outline" => {
            let mut node = OutlineNode::branch(text, attributes);
            node.children = children;
            node
        }
        "link" => {
            if !children.is_empty() {
                return Err(FormatError::UnexpectedChildren { kind: "link" });
            }
            OutlineNode::link(text, attributes)?
        }
        "audio" => {
            if !children.is_empty() {
                return Err(FormatError::UnexpectedChildren { kind: "audio" });
            }
            OutlineNode::audio(text, attributes)?
        }
        _ => unreachable!(),
    };

    Ok(Some(tree.alloc(node)))
}

/// Serialize the subtree at `id` as a full `<opml><body>…` document.
///
/// The favourites root is the one node that does not produce an element
/// for itself: only its children land at the top level, so the saved
/// favourites file reads back as an ordinary document.
pub fn write_document(tree: &Tree, id: NodeId) -> Result<Vec<u8>, FormatError> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Start(BytesStart::new("opml")))?;
    writer.write_event(Event::Start(BytesStart::new("body")))?;

    if matches!(tree.node(id).kind, OutlineKind::Favourites { .. }) {
        for &child in &tree.node(id).children {
            write_outline(tree, &mut writer, child)?;
        }
    } else {
        write_outline(tree, &mut writer, id)?;
    }

    writer.write_event(Event::End(BytesEnd::new("body")))?;
    writer.write_event(Event::End(BytesEnd::new("opml")))?;
    Ok(writer.into_inner())
}

fn write_outline(tree: &Tree, writer: &mut Writer<Vec<u8>>, id: NodeId) -> Result<(), FormatError> {
    let node = tree.node(id);
    let mut elem = BytesStart::new("outline");
    for (key, value) in &node.attributes {
        elem.push_attribute((key.as_str(), value.as_str()));
    }

    if node.children.is_empty() {
        writer.write_event(Event::Empty(elem))?;
    } else {
        writer.write_event(Event::Start(elem))?;
        for &child in &node.children {
            write_outline(tree, writer, child)?;
        }
        writer.write_event(Event::End(BytesEnd::new("outline")))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(doc: &str) -> (Tree, Vec<NodeId>) {
        let mut tree = Tree::new();
        let top = parse_document(&mut tree, doc.as_bytes()).unwrap();
        (tree, top)
    }

    #[test]
    fn parses_branch_with_audio_child_and_upgrades_scheme() {
        let (tree, top) = parse(
            r#"<opml><body>
                <outline text="Rock">
                    <outline type="audio" text="Station" URL="http://x/stream.pls" bitrate="128"/>
                </outline>
            </body></opml>"#,
        );
        assert_eq!(top.len(), 1);
        let branch = tree.node(top[0]);
        assert!(matches!(branch.kind, OutlineKind::Branch { collapsed: true }));
        assert_eq!(branch.text, "Rock");
        assert_eq!(branch.children.len(), 1);

        let station = tree.node(branch.children[0]);
        assert_eq!(station.attributes["URL"], "https://x/stream.pls");
        assert_eq!(station.render().data0, "128k");
    }

    #[test]
    fn type_text_is_treated_as_plain_outline() {
        // The directory uses type="text" for placeholder rows like
        // "No stations or shows available".
        let (tree, top) = parse(
            r#"<opml><body>
                <outline type="text" text="No stations or shows available"/>
            </body></opml>"#,
        );
        assert_eq!(top.len(), 1);
        assert!(matches!(
            tree.node(top[0]).kind,
            OutlineKind::Branch { .. }
        ));
    }

    #[test]
    fn unknown_childless_type_is_skipped() {
        let (_, top) = parse(
            r#"<opml><body>
                <outline type="video" text="Not a radio thing" URL="https://x/v"/>
                <outline type="audio" text="Kept" URL="https://x/s.pls"/>
            </body></opml>"#,
        );
        assert_eq!(top.len(), 1);
    }

    #[test]
    fn nested_entries_under_link_fail() {
        let mut tree = Tree::new();
        let err = parse_document(
            &mut tree,
            br#"<opml><body>
                <outline type="link" text="l" URL="https://x/dir">
                    <outline type="audio" text="s" URL="https://x/s.pls"/>
                </outline>
            </body></opml>"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            FormatError::UnexpectedChildren { kind: "link" }
        ));
    }

    #[test]
    fn round_trip_preserves_structure_and_attributes() {
        let doc = r#"<opml><body>
            <outline text="World">
                <outline type="link" text="Europe" URL="https://x/eu"/>
                <outline type="audio" text="St" URL="http://x/s.pls" bitrate="64" reliability="90"/>
            </outline>
        </body></opml>"#;
        let (tree, top) = parse(doc);
        let bytes = write_document(&tree, top[0]).unwrap();

        let (tree2, top2) = parse(std::str::from_utf8(&bytes).unwrap());
        assert_eq!(top2.len(), 1);
        let (a, b) = (tree.node(top[0]), tree2.node(top2[0]));
        assert_eq!(a.attributes, b.attributes);
        assert_eq!(a.children.len(), b.children.len());
        for (&ca, &cb) in a.children.iter().zip(&b.children) {
            assert_eq!(tree.node(ca).attributes, tree2.node(cb).attributes);
            assert_eq!(tree.node(ca).kind, tree2.node(cb).kind);
        }
        // The scheme upgrade happened at first parse and is preserved,
        // not re-applied, on the second pass.
        let audio = tree2.node(b.children[1]);
        assert_eq!(audio.attributes["URL"], "https://x/s.pls");
    }

    #[test]
    fn favourites_root_serializes_children_at_top_level() {
        let mut tree = Tree::new();
        let fav = tree.alloc(OutlineNode::favourites());
        let mut attrs = Attributes::new();
        attrs.insert("URL".to_string(), "https://x/s.pls".to_string());
        attrs.insert("type".to_string(), "audio".to_string());
        attrs.insert("text".to_string(), "St".to_string());
        let station = tree.alloc(OutlineNode::audio("St".to_string(), attrs).unwrap());
        tree.push_child(fav, station);

        let out = String::from_utf8(write_document(&tree, fav).unwrap()).unwrap();
        // No element for the favourites container itself.
        assert_eq!(out.matches("<outline").count(), 1);
        assert!(out.contains(r#"text="St""#));
    }
}
