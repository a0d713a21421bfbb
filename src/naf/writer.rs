//! NAF XML serialization.

use std::io::Write;

use quick_xml::{
    events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event},
    Writer,
};

use super::{Attributes, Document, Header, LinguisticProcessor, Result};

type XmlWriter = Writer<Vec<u8>>;

pub(super) fn write_document(doc: &Document) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("NAF");
    if let Some(lang) = &doc.lang {
        root.push_attribute(("xml:lang", lang.as_str()));
    }
    if let Some(version) = &doc.version {
        root.push_attribute(("version", version.as_str()));
    }
    push_extra(&mut root, &doc.extra);
    writer.write_event(Event::Start(root))?;

    write_header(&mut writer, &doc.header)?;
    if let Some(raw) = &doc.raw {
        writer.write_event(Event::Start(BytesStart::new("raw")))?;
        if raw.contains("]]>") {
            writer.write_event(Event::Text(BytesText::new(raw)))?;
        } else {
            writer.write_event(Event::CData(BytesCData::new(raw.as_str())))?;
        }
        writer.write_event(Event::End(BytesEnd::new("raw")))?;
    }
    write_words(&mut writer, doc)?;
    write_terms(&mut writer, doc)?;
    write_entities(&mut writer, doc)?;
    for layer in &doc.extra_layers {
        let start = element(&layer.name, &layer.attributes);
        if layer.inner.is_empty() {
            writer.write_event(Event::Empty(start))?;
        } else {
            writer.write_event(Event::Start(start))?;
            writer.get_mut().write_all(layer.inner.as_bytes())?;
            writer.write_event(Event::End(BytesEnd::new(layer.name.as_str())))?;
        }
    }

    writer.write_event(Event::End(BytesEnd::new("NAF")))?;
    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(String::from_utf8(bytes)?)
}

fn write_header(writer: &mut XmlWriter, header: &Header) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("nafHeader")))?;
    if let Some(attrs) = &header.file_desc {
        writer.write_event(Event::Empty(element("fileDesc", attrs)))?;
    }
    if let Some(attrs) = &header.public {
        writer.write_event(Event::Empty(element("public", attrs)))?;
    }
    for group in &header.processors {
        let mut start = BytesStart::new("linguisticProcessors");
        start.push_attribute(("layer", group.layer.as_str()));
        writer.write_event(Event::Start(start))?;
        for lp in &group.processors {
            writer.write_event(Event::Empty(processor(lp)))?;
        }
        writer.write_event(Event::End(BytesEnd::new("linguisticProcessors")))?;
    }
    writer.get_mut().write_all(header.children.as_bytes())?;
    writer.write_event(Event::End(BytesEnd::new("nafHeader")))?;
    Ok(())
}

fn processor(lp: &LinguisticProcessor) -> BytesStart<'_> {
    let mut start = BytesStart::new("lp");
    start.push_attribute(("name", lp.name.as_str()));
    if let Some(ts) = &lp.begin_timestamp {
        start.push_attribute(("beginTimestamp", ts.as_str()));
    }
    if let Some(ts) = &lp.end_timestamp {
        start.push_attribute(("endTimestamp", ts.as_str()));
    }
    if let Some(ts) = &lp.timestamp {
        start.push_attribute(("timestamp", ts.as_str()));
    }
    start.push_attribute(("version", lp.version.as_str()));
    if let Some(host) = &lp.hostname {
        start.push_attribute(("hostname", host.as_str()));
    }
    push_extra(&mut start, &lp.extra);
    start
}

fn write_words(writer: &mut XmlWriter, doc: &Document) -> Result<()> {
    if doc.words.is_empty() {
        return Ok(());
    }
    writer.write_event(Event::Start(BytesStart::new("text")))?;
    for wf in &doc.words {
        let mut start = BytesStart::new("wf");
        start.push_attribute(("id", wf.id.as_str()));
        if let Some(sent) = &wf.sent {
            start.push_attribute(("sent", sent.as_str()));
        }
        if let Some(para) = &wf.para {
            start.push_attribute(("para", para.as_str()));
        }
        if let Some(offset) = wf.offset {
            start.push_attribute(("offset", offset.to_string().as_str()));
        }
        if let Some(length) = wf.length {
            start.push_attribute(("length", length.to_string().as_str()));
        }
        push_extra(&mut start, &wf.extra);
        writer.write_event(Event::Start(start))?;
        writer.write_event(Event::Text(BytesText::new(&wf.form)))?;
        writer.write_event(Event::End(BytesEnd::new("wf")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("text")))?;
    Ok(())
}

fn write_terms(writer: &mut XmlWriter, doc: &Document) -> Result<()> {
    if doc.terms.is_empty() {
        return Ok(());
    }
    writer.write_event(Event::Start(BytesStart::new("terms")))?;
    for term in &doc.terms {
        let mut start = BytesStart::new("term");
        start.push_attribute(("id", term.id.as_str()));
        let optional = [
            ("type", &term.kind),
            ("lemma", &term.lemma),
            ("pos", &term.pos),
            ("morphofeat", &term.morphofeat),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                start.push_attribute((key, value.as_str()));
            }
        }
        push_extra(&mut start, &term.extra);
        writer.write_event(Event::Start(start))?;
        write_span(writer, &term.span)?;
        writer.get_mut().write_all(term.children.as_bytes())?;
        writer.write_event(Event::End(BytesEnd::new("term")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("terms")))?;
    Ok(())
}

fn write_entities(writer: &mut XmlWriter, doc: &Document) -> Result<()> {
    if doc.entities.is_empty() {
        return Ok(());
    }
    let index = doc.index();
    writer.write_event(Event::Start(BytesStart::new("entities")))?;
    for entity in &doc.entities {
        let mut start = BytesStart::new("entity");
        start.push_attribute(("id", entity.id.as_str()));
        start.push_attribute(("type", entity.kind.as_str()));
        push_extra(&mut start, &entity.extra);
        writer.write_event(Event::Start(start))?;
        writer.write_event(Event::Start(BytesStart::new("references")))?;
        let text = comment_text(&index.entity_text(entity));
        writer.write_event(Event::Comment(BytesText::from_escaped(text)))?;
        write_span(writer, &entity.span)?;
        writer.write_event(Event::End(BytesEnd::new("references")))?;
        writer.get_mut().write_all(entity.children.as_bytes())?;
        writer.write_event(Event::End(BytesEnd::new("entity")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("entities")))?;
    Ok(())
}

fn write_span(writer: &mut XmlWriter, targets: &[String]) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("span")))?;
    for id in targets {
        let mut target = BytesStart::new("target");
        target.push_attribute(("id", id.as_str()));
        writer.write_event(Event::Empty(target))?;
    }
    writer.write_event(Event::End(BytesEnd::new("span")))?;
    Ok(())
}

/// Comment body that never contains `--` and never ends in `-`.
fn comment_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 1);
    let mut after_dash = false;
    for c in text.chars() {
        if c == '-' && after_dash {
            out.push(' ');
        }
        after_dash = c == '-';
        out.push(c);
    }
    if after_dash {
        out.push(' ');
    }
    out
}

fn push_extra(start: &mut BytesStart<'_>, extra: &Attributes) {
    for (key, value) in extra {
        start.push_attribute((key.as_str(), value.as_str()));
    }
}

fn element<'a>(name: &'a str, attrs: &'a Attributes) -> BytesStart<'a> {
    let mut start = BytesStart::new(name);
    push_extra(&mut start, attrs);
    start
}
