//! Pull-parser turning NAF XML into a [`Document`].

use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};
use tracing::debug;

use super::{
    Attributes, Document, Entity, LinguisticProcessor, NafError, OpaqueLayer, ProcessorLayer,
    Result, Term, WordForm,
};

pub(super) fn read_document(xml: &str) -> Result<Document> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"NAF" => {
                let mut doc = root(&e)?;
                read_layers(&mut reader, &mut doc)?;
                return Ok(doc);
            }
            Event::Empty(e) if e.name().as_ref() == b"NAF" => return root(&e),
            Event::Start(_) | Event::Empty(_) | Event::Eof => return Err(NafError::MissingRoot),
            _ => {}
        }
    }
}

fn root(e: &BytesStart<'_>) -> Result<Document> {
    let mut attrs = attributes(e)?;
    Ok(Document {
        lang: attrs.shift_remove("xml:lang"),
        version: attrs.shift_remove("version"),
        extra: attrs,
        ..Document::default()
    })
}

fn read_layers(reader: &mut Reader<&[u8]>, doc: &mut Document) -> Result<()> {
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"nafHeader" => read_header(reader, doc)?,
                b"raw" => doc.raw = Some(read_content(reader, b"raw", "raw")?),
                b"text" => read_words(reader, doc)?,
                b"terms" => read_terms(reader, doc)?,
                b"entities" => read_entities(reader, doc)?,
                other => {
                    let name = String::from_utf8(other.to_vec())?;
                    let attributes = attributes(&e)?;
                    let inner = reader.read_text(e.name())?.trim().to_string();
                    debug!(layer = %name, "keeping layer verbatim");
                    doc.extra_layers.push(OpaqueLayer {
                        name,
                        attributes,
                        inner,
                    });
                }
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"nafHeader" | b"raw" | b"text" | b"terms" | b"entities" => {}
                other => doc.extra_layers.push(OpaqueLayer {
                    name: String::from_utf8(other.to_vec())?,
                    attributes: attributes(&e)?,
                    inner: String::new(),
                }),
            },
            Event::End(e) if e.name().as_ref() == b"NAF" => return Ok(()),
            Event::Eof => return Err(NafError::UnexpectedEof("NAF")),
            _ => {}
        }
    }
}

fn read_header(reader: &mut Reader<&[u8]>, doc: &mut Document) -> Result<()> {
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"linguisticProcessors" => {
                    let layer = required(&mut attributes(&e)?, "linguisticProcessors", "layer")?;
                    let processors = read_processors(reader)?;
                    doc.header
                        .processors
                        .push(ProcessorLayer { layer, processors });
                }
                b"fileDesc" => {
                    doc.header.file_desc = Some(attributes(&e)?);
                    reader.read_to_end(e.name())?;
                }
                b"public" => {
                    doc.header.public = Some(attributes(&e)?);
                    reader.read_to_end(e.name())?;
                }
                _ => doc.header.children.push_str(&raw_element(reader, &e)?),
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"linguisticProcessors" => {
                    let layer = required(&mut attributes(&e)?, "linguisticProcessors", "layer")?;
                    doc.header.processors.push(ProcessorLayer {
                        layer,
                        processors: Vec::new(),
                    });
                }
                b"fileDesc" => doc.header.file_desc = Some(attributes(&e)?),
                b"public" => doc.header.public = Some(attributes(&e)?),
                _ => doc.header.children.push_str(&raw_empty(&e)?),
            },
            Event::End(e) if e.name().as_ref() == b"nafHeader" => return Ok(()),
            Event::Eof => return Err(NafError::UnexpectedEof("nafHeader")),
            _ => {}
        }
    }
}

fn read_processors(reader: &mut Reader<&[u8]>) -> Result<Vec<LinguisticProcessor>> {
    let mut processors = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"lp" => {
                processors.push(processor(&e)?);
                reader.read_to_end(e.name())?;
            }
            Event::Empty(e) if e.name().as_ref() == b"lp" => processors.push(processor(&e)?),
            Event::End(e) if e.name().as_ref() == b"linguisticProcessors" => {
                return Ok(processors)
            }
            Event::Eof => return Err(NafError::UnexpectedEof("linguisticProcessors")),
            _ => {}
        }
    }
}

fn processor(e: &BytesStart<'_>) -> Result<LinguisticProcessor> {
    let mut attrs = attributes(e)?;
    Ok(LinguisticProcessor {
        name: required(&mut attrs, "lp", "name")?,
        version: attrs.shift_remove("version").unwrap_or_default(),
        begin_timestamp: attrs.shift_remove("beginTimestamp"),
        end_timestamp: attrs.shift_remove("endTimestamp"),
        timestamp: attrs.shift_remove("timestamp"),
        hostname: attrs.shift_remove("hostname"),
        extra: attrs,
    })
}

fn read_words(reader: &mut Reader<&[u8]>, doc: &mut Document) -> Result<()> {
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"wf" => {
                let attrs = attributes(&e)?;
                let form = read_content(reader, b"wf", "wf")?;
                doc.words.push(word(attrs, form)?);
            }
            Event::Empty(e) if e.name().as_ref() == b"wf" => {
                doc.words.push(word(attributes(&e)?, String::new())?);
            }
            Event::End(e) if e.name().as_ref() == b"text" => return Ok(()),
            Event::Eof => return Err(NafError::UnexpectedEof("text")),
            _ => {}
        }
    }
}

fn word(mut attrs: Attributes, form: String) -> Result<WordForm> {
    Ok(WordForm {
        id: required(&mut attrs, "wf", "id")?,
        sent: attrs.shift_remove("sent"),
        para: attrs.shift_remove("para"),
        offset: number(&mut attrs, "offset"),
        length: number(&mut attrs, "length"),
        extra: attrs,
        form,
    })
}

/// Take a numeric attribute out of `attrs`. Values that do not parse stay
/// behind so they are written back untouched.
fn number(attrs: &mut Attributes, key: &str) -> Option<usize> {
    let value = attrs.get(key)?.parse().ok()?;
    attrs.shift_remove(key);
    Some(value)
}

fn read_terms(reader: &mut Reader<&[u8]>, doc: &mut Document) -> Result<()> {
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"term" => {
                let attrs = attributes(&e)?;
                let body = read_spanned(reader, b"term", "term")?;
                doc.terms.push(term(attrs, body)?);
            }
            Event::Empty(e) if e.name().as_ref() == b"term" => {
                doc.terms.push(term(attributes(&e)?, Spanned::default())?);
            }
            Event::End(e) if e.name().as_ref() == b"terms" => return Ok(()),
            Event::Eof => return Err(NafError::UnexpectedEof("terms")),
            _ => {}
        }
    }
}

fn term(mut attrs: Attributes, body: Spanned) -> Result<Term> {
    Ok(Term {
        id: required(&mut attrs, "term", "id")?,
        kind: attrs.shift_remove("type"),
        lemma: attrs.shift_remove("lemma"),
        pos: attrs.shift_remove("pos"),
        morphofeat: attrs.shift_remove("morphofeat"),
        extra: attrs,
        span: body.targets,
        children: body.children,
    })
}

fn read_entities(reader: &mut Reader<&[u8]>, doc: &mut Document) -> Result<()> {
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"entity" => {
                let mut attrs = attributes(&e)?;
                let body = read_spanned(reader, b"entity", "entity")?;
                doc.entities.push(Entity {
                    id: required(&mut attrs, "entity", "id")?,
                    kind: attrs.shift_remove("type").unwrap_or_default(),
                    extra: attrs,
                    span: body.targets,
                    children: body.children,
                });
            }
            Event::End(e) if e.name().as_ref() == b"entities" => return Ok(()),
            Event::Eof => return Err(NafError::UnexpectedEof("entities")),
            _ => {}
        }
    }
}

/// Body of a `term` or `entity`: the span targets plus any other children.
#[derive(Default)]
struct Spanned {
    targets: Vec<String>,
    children: String,
}

/// Collect the `<target id=..>` of the element's span. `references` and
/// `span` wrappers are descended into; every other child is kept as raw
/// markup.
fn read_spanned(reader: &mut Reader<&[u8]>, end: &[u8], element: &'static str) -> Result<Spanned> {
    let mut body = Spanned::default();
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"references" | b"span" => {}
                b"target" => {
                    body.targets.push(required(&mut attributes(&e)?, "target", "id")?);
                    reader.read_to_end(e.name())?;
                }
                _ => body.children.push_str(&raw_element(reader, &e)?),
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"references" | b"span" => {}
                b"target" => body.targets.push(required(&mut attributes(&e)?, "target", "id")?),
                _ => body.children.push_str(&raw_empty(&e)?),
            },
            Event::End(e) if e.name().as_ref() == end => return Ok(body),
            Event::Eof => return Err(NafError::UnexpectedEof(element)),
            _ => {}
        }
    }
}

/// Markup of the element opened by `e`, consuming it up to its closing tag.
fn raw_element(reader: &mut Reader<&[u8]>, e: &BytesStart<'_>) -> Result<String> {
    let tag = String::from_utf8((**e).to_vec())?;
    let name = String::from_utf8(e.name().as_ref().to_vec())?;
    let inner = reader.read_text(e.name())?;
    Ok(format!("<{tag}>{inner}</{name}>"))
}

fn raw_empty(e: &BytesStart<'_>) -> Result<String> {
    let tag = String::from_utf8((**e).to_vec())?;
    Ok(format!("<{}/>", tag.trim_end()))
}

/// Text and CDATA content up to the closing tag of the current element.
fn read_content(reader: &mut Reader<&[u8]>, end: &[u8], element: &'static str) -> Result<String> {
    let mut content = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(t) => content.push_str(&t.unescape()?),
            Event::CData(c) => content.push_str(&String::from_utf8(c.into_inner().into_owned())?),
            Event::End(e) if e.name().as_ref() == end => return Ok(content),
            Event::Eof => return Err(NafError::UnexpectedEof(element)),
            _ => {}
        }
    }
}

fn attributes(e: &BytesStart<'_>) -> Result<Attributes> {
    let mut attrs = Attributes::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8(attr.key.as_ref().to_vec())?;
        attrs.insert(key, attr.unescape_value()?.into_owned());
    }
    Ok(attrs)
}

fn required(attrs: &mut Attributes, element: &'static str, attribute: &'static str) -> Result<String> {
    attrs
        .shift_remove(attribute)
        .ok_or(NafError::MissingAttribute { element, attribute })
}
