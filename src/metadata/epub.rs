//! EPUB metadata extraction.
//!
//! An EPUB is a zip container; `META-INF/container.xml` points at the OPF
//! package document, whose Dublin Core elements carry title, creator,
//! publisher and subjects. The fields are pulled with targeted regexes
//! rather than a full XML parser; OPF files in the wild are small and the
//! elements of interest are flat text nodes.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use zip::ZipArchive;

use crate::models::BookMeta;

fn rootfile_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"full-path="([^"]+)""#).expect("static regex"))
}

fn dc_re(element: &'static str, cell: &'static OnceLock<Regex>) -> &'static Regex {
    cell.get_or_init(|| {
        Regex::new(&format!(r"<dc:{0}[^>]*>([^<]*)</dc:{0}>", element)).expect("static regex")
    })
}

/// Read metadata out of an EPUB file.
pub fn read_metadata(path: &Path) -> anyhow::Result<BookMeta> {
    let mut archive = ZipArchive::new(File::open(path)?)?;

    let opf_path = match read_entry(&mut archive, "META-INF/container.xml") {
        Ok(container) => rootfile_re()
            .captures(&container)
            .map(|c| c[1].to_string())
            .ok_or_else(|| anyhow::anyhow!("container.xml names no rootfile"))?,
        // Some hand-rolled EPUBs skip the container; find any OPF entry.
        Err(_) => archive
            .file_names()
            .find(|name| name.ends_with(".opf"))
            .map(String::from)
            .ok_or_else(|| anyhow::anyhow!("no OPF package document in archive"))?,
    };

    let opf = read_entry(&mut archive, &opf_path)?;
    Ok(parse_opf(&opf))
}

fn read_entry(archive: &mut ZipArchive<File>, name: &str) -> anyhow::Result<String> {
    let mut entry = archive.by_name(name)?;
    let mut content = String::new();
    entry.read_to_string(&mut content)?;
    Ok(content)
}

fn parse_opf(opf: &str) -> BookMeta {
    static TITLE: OnceLock<Regex> = OnceLock::new();
    static CREATOR: OnceLock<Regex> = OnceLock::new();
    static PUBLISHER: OnceLock<Regex> = OnceLock::new();
    static SUBJECT: OnceLock<Regex> = OnceLock::new();

    let first = |re: &Regex| {
        re.captures(opf)
            .map(|c| unescape_xml(c[1].trim()))
            .unwrap_or_default()
    };

    BookMeta {
        title: first(dc_re("title", &TITLE)),
        author: first(dc_re("creator", &CREATOR)),
        publisher: first(dc_re("publisher", &PUBLISHER)),
        tags: dc_re("subject", &SUBJECT)
            .captures_iter(opf)
            .map(|c| unescape_xml(c[1].trim()))
            .filter(|tag| !tag.is_empty())
            .collect(),
    }
}

/// Decode the five predefined XML entities.
fn unescape_xml(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
