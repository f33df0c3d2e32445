//! Sitemap loading and rewriting.
//!
//! The sitemap is the source of truth for which routes get prerendered.
//! It is parsed once before rendering, and rewritten during deploy when
//! the not-found entry is dropped.
//!
//! # Sitemap Format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://clarity.design/documentation/v2/alerts</loc>
//!     <lastmod>2025-01-01</lastmod>
//!   </url>
//! </urlset>
//! ```

use anyhow::{Context, Result, bail};
use quick_xml::{Reader, events::Event};
use std::borrow::Cow;
use std::fs;
use std::path::Path;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// One `<url>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: Option<String>,
}

/// A parsed sitemap document.
#[derive(Debug, Clone, Default)]
pub struct Sitemap {
    pub entries: Vec<SitemapEntry>,
}

/// Which child of `<url>` text is currently being collected into.
#[derive(Clone, Copy)]
enum Field {
    Loc,
    Lastmod,
}

impl Sitemap {
    /// Read and parse a sitemap file. Missing or malformed input is fatal.
    pub fn load(path: &Path) -> Result<Self> {
        let xml = fs::read_to_string(path)
            .with_context(|| format!("reading sitemap {}", path.display()))?;
        Self::parse(&xml).with_context(|| format!("parsing sitemap {}", path.display()))
    }

    /// Parse sitemap XML, collecting `<loc>` and `<lastmod>` under `<url>`.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut entries = Vec::new();
        let mut current: Option<SitemapEntry> = None;
        let mut field: Option<Field> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"url" => {
                        current = Some(SitemapEntry {
                            loc: String::new(),
                            lastmod: None,
                        });
                    }
                    b"loc" => field = Some(Field::Loc),
                    b"lastmod" => field = Some(Field::Lastmod),
                    _ => {}
                },
                Ok(Event::Text(e)) => {
                    let text = reader
                        .decoder()
                        .decode(&e)
                        .map(Cow::into_owned)
                        .map_err(|e| anyhow::anyhow!("invalid sitemap text: {e}"))?;
                    append_field(&mut current, field, &text);
                }
                Ok(Event::GeneralRef(e)) => {
                    // Entity references (&amp; etc.) arrive as separate events
                    let entity = reader
                        .decoder()
                        .decode(&e)
                        .map(Cow::into_owned)
                        .map_err(|e| anyhow::anyhow!("invalid sitemap entity: {e}"))?;
                    append_field(&mut current, field, &decode_entity(&entity));
                }
                Ok(Event::CData(e)) => {
                    let text = String::from_utf8_lossy(&e).into_owned();
                    append_field(&mut current, field, &text);
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"url" => {
                        if let Some(entry) = current.take()
                            && !entry.loc.is_empty()
                        {
                            entries.push(entry);
                        }
                    }
                    b"loc" | b"lastmod" => field = None,
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => bail!(
                    "XML parse error at position {}: {:?}",
                    reader.error_position(),
                    e
                ),
            }
        }

        Ok(Self { entries })
    }

    /// Keep only entries matching the predicate.
    pub fn retain<F: FnMut(&SitemapEntry) -> bool>(&mut self, f: F) {
        self.entries.retain(f);
    }

    /// Serialize back to sitemap XML.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(4096);

        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<urlset xmlns=\"");
        xml.push_str(SITEMAP_NS);
        xml.push_str("\">\n");

        for entry in &self.entries {
            xml.push_str("  <url>\n    <loc>");
            xml.push_str(&escape_xml(&entry.loc));
            xml.push_str("</loc>\n");
            if let Some(lastmod) = &entry.lastmod {
                xml.push_str("    <lastmod>");
                xml.push_str(&escape_xml(lastmod));
                xml.push_str("</lastmod>\n");
            }
            xml.push_str("  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }

    /// Write the sitemap to disk.
    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_xml())
            .with_context(|| format!("writing sitemap to {}", path.display()))
    }
}

/// Append text to the field currently being collected.
fn append_field(current: &mut Option<SitemapEntry>, field: Option<Field>, text: &str) {
    if let (Some(entry), Some(field)) = (current.as_mut(), field) {
        match field {
            Field::Loc => entry.loc.push_str(text),
            Field::Lastmod => entry.lastmod.get_or_insert_default().push_str(text),
        }
    }
}

/// Decode a named or numeric entity reference.
fn decode_entity(entity: &str) -> String {
    match entity {
        "lt" => "<".to_string(),
        "gt" => ">".to_string(),
        "amp" => "&".to_string(),
        "apos" => "'".to_string(),
        "quot" => "\"".to_string(),
        s if s.starts_with('#') => {
            let code = if s.starts_with("#x") || s.starts_with("#X") {
                u32::from_str_radix(&s[2..], 16).ok()
            } else {
                s[1..].parse::<u32>().ok()
            };
            code.and_then(char::from_u32)
                .map_or_else(|| format!("&{entity};"), |c| c.to_string())
        }
        // Unknown entity - preserve as-is
        _ => format!("&{entity};"),
    }
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> Cow<'_, str> {
    // Fast path: check if escaping is needed
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    Cow::Owned(
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;"),
    )
}
