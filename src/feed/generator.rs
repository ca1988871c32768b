use std::borrow::Cow;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{Local, TimeZone};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::ArticleView;

const PUB_DATE_FORMAT: &str = "%d.%m.%Y %H:%M";

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Writes the RSS 2.0 document describing the current article set.
#[derive(Debug, Clone)]
pub struct FeedGenerator {
    path: PathBuf,
    title: String,
    link: String,
}

impl FeedGenerator {
    pub fn new(path: impl Into<PathBuf>, title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            link: link.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.feed_path, &config.feed_title, &config.feed_link)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serializes `articles` in the order given (callers pass newest first).
    pub fn render(&self, articles: &[ArticleView]) -> Result<String> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut rss = BytesStart::new("rss");
        rss.push_attribute(("version", "2.0"));
        writer.write_event(Event::Start(rss))?;
        writer.write_event(Event::Start(BytesStart::new("channel")))?;

        write_text_element(&mut writer, "title", &self.title)?;
        write_text_element(&mut writer, "link", &self.link)?;

        for article in articles {
            writer.write_event(Event::Start(BytesStart::new("item")))?;
            write_text_element(&mut writer, "title", &article.title)?;
            write_text_element(&mut writer, "link", &article.source)?;
            write_cdata_element(&mut writer, "description", &article.description)?;
            write_cdata_element(&mut writer, "text", &article.text)?;
            write_text_element(&mut writer, "pubDate", &format_pub_date(article.datetime))?;
            write_text_element(&mut writer, "category", &article.category)?;
            writer.write_event(Event::End(BytesEnd::new("item")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("channel")))?;
        writer.write_event(Event::End(BytesEnd::new("rss")))?;

        let mut bytes = writer.into_inner().into_inner();
        bytes.push(b'\n');
        String::from_utf8(bytes)
            .map_err(|e| AppError::Feed(format!("Generated feed is not valid UTF-8: {}", e)))
    }

    /// Renders the feed and replaces the file at `path`. The document is
    /// written to a sibling temp file first, so readers never observe a
    /// partial feed.
    pub fn regenerate(&self, articles: &[ArticleView]) -> Result<()> {
        let content = self.render(articles)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let temp_path = self.path.with_extension(format!("tmp.{:016x}", suffix));

        let written = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
            .and_then(|mut file| {
                file.write_all(content.as_bytes())?;
                file.sync_all()
            })
            .and_then(|()| std::fs::rename(&temp_path, &self.path));

        if let Err(e) = written {
            let _ = std::fs::remove_file(&temp_path);
            return Err(AppError::Feed(format!(
                "Failed to write feed {:?}: {}",
                self.path, e
            )));
        }

        tracing::info!("Wrote feed with {} items to {:?}", articles.len(), self.path);
        Ok(())
    }
}

/// Formats a stored epoch as `dd.mm.yyyy HH:MM` in the local time zone.
pub fn format_pub_date(epoch_secs: i64) -> String {
    Local
        .timestamp_opt(epoch_secs, 0)
        .single()
        .map(|dt| dt.format(PUB_DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Drops characters XML 1.0 does not allow anywhere in a document, escaped
/// or not: C0 controls other than tab, newline and carriage return, and the
/// noncharacters U+FFFE and U+FFFF.
fn xml_chars(text: &str) -> Cow<'_, str> {
    fn allowed(c: char) -> bool {
        matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}')
    }

    if text.chars().all(allowed) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|&c| allowed(c)).collect())
    }
}

fn write_text_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<()> {
    let text = xml_chars(text);
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    // Always emit the text event, even when empty, so the end tag stays inline.
    writer.write_event(Event::Text(BytesText::new(&text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_cdata_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<()> {
    let text = xml_chars(text);
    writer.write_event(Event::Start(BytesStart::new(name)))?;

    // `]]>` cannot appear inside a CDATA section: close the section between
    // `]]` and `>` and open a new one.
    let mut rest: &str = &text;
    while let Some(pos) = rest.find("]]>") {
        let (head, tail) = rest.split_at(pos + 2);
        writer.write_event(Event::CData(BytesCData::new(head)))?;
        rest = tail;
    }
    writer.write_event(Event::CData(BytesCData::new(rest)))?;

    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
