//! Content-Type resolution for uploaded objects
//!
//! Resolution order: the fixed SPA extension table, the MIME registry, then
//! sniffing of the leading bytes, then [`DEFAULT_CONTENT_TYPE`].

use std::path::Path;

/// Fallback for content nothing else can classify
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Number of leading bytes consulted by [`sniff`]
pub const SNIFF_LEN: usize = 512;

/// Resolve the content type of a file from its path and leading bytes
pub fn resolve_content_type(path: &Path, leading: &[u8]) -> String {
    if let Some(ct) = from_extension(path) {
        return ct;
    }

    sniff(leading).unwrap_or(DEFAULT_CONTENT_TYPE).to_string()
}

/// Content type implied by the file extension alone
pub fn from_extension(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();

    let fixed = match ext.as_str() {
        "js" | "mjs" => Some("application/javascript"),
        "css" => Some("text/css"),
        "html" => Some("text/html"),
        "json" => Some("application/json"),
        "svg" => Some("image/svg+xml"),
        "wasm" => Some("application/wasm"),
        _ => None,
    };
    if let Some(ct) = fixed {
        return Some(ct.to_string());
    }

    mime_guess::from_ext(&ext)
        .first()
        .map(|m| m.essence_str().to_string())
}

enum Signature {
    /// Exact prefix
    Prefix(&'static [u8], &'static str),
    /// Prefix compared under a mask; `skip_ws` allows leading whitespace
    Masked {
        mask: &'static [u8],
        pattern: &'static [u8],
        skip_ws: bool,
        ct: &'static str,
    },
    /// Case-insensitive HTML tag followed by a space or `>`
    Html(&'static [u8]),
    Mp4,
    Text,
}

const HTML: &str = "text/html; charset=utf-8";

static SIGNATURES: &[Signature] = &[
    Signature::Html(b"<!DOCTYPE HTML"),
    Signature::Html(b"<HTML"),
    Signature::Html(b"<HEAD"),
    Signature::Html(b"<SCRIPT"),
    Signature::Html(b"<IFRAME"),
    Signature::Html(b"<H1"),
    Signature::Html(b"<DIV"),
    Signature::Html(b"<FONT"),
    Signature::Html(b"<TABLE"),
    Signature::Html(b"<A"),
    Signature::Html(b"<STYLE"),
    Signature::Html(b"<TITLE"),
    Signature::Html(b"<B"),
    Signature::Html(b"<BODY"),
    Signature::Html(b"<BR"),
    Signature::Html(b"<P"),
    Signature::Html(b"<!--"),
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\xFF\xFF",
        pattern: b"<?xml",
        skip_ws: true,
        ct: "text/xml; charset=utf-8",
    },
    Signature::Prefix(b"%PDF-", "application/pdf"),
    Signature::Prefix(b"%!PS-Adobe-", "application/postscript"),
    Signature::Masked {
        mask: b"\xFF\xFF\x00\x00",
        pattern: b"\xFE\xFF\x00\x00",
        skip_ws: false,
        ct: "text/plain; charset=utf-16be",
    },
    Signature::Masked {
        mask: b"\xFF\xFF\x00\x00",
        pattern: b"\xFF\xFE\x00\x00",
        skip_ws: false,
        ct: "text/plain; charset=utf-16le",
    },
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\x00",
        pattern: b"\xEF\xBB\xBF\x00",
        skip_ws: false,
        ct: "text/plain; charset=utf-8",
    },
    Signature::Prefix(b"\x00\x00\x01\x00", "image/x-icon"),
    Signature::Prefix(b"\x00\x00\x02\x00", "image/x-icon"),
    Signature::Prefix(b"BM", "image/bmp"),
    Signature::Prefix(b"GIF87a", "image/gif"),
    Signature::Prefix(b"GIF89a", "image/gif"),
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF\xFF\xFF",
        pattern: b"RIFF\x00\x00\x00\x00WEBPVP",
        skip_ws: false,
        ct: "image/webp",
    },
    Signature::Prefix(b"\x89PNG\x0D\x0A\x1A\x0A", "image/png"),
    Signature::Prefix(b"\xFF\xD8\xFF", "image/jpeg"),
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
        pattern: b"FORM\x00\x00\x00\x00AIFF",
        skip_ws: false,
        ct: "audio/aiff",
    },
    Signature::Prefix(b"ID3", "audio/mpeg"),
    Signature::Prefix(b"OggS\x00", "application/ogg"),
    Signature::Prefix(b"MThd\x00\x00\x00\x06", "audio/midi"),
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
        pattern: b"RIFF\x00\x00\x00\x00AVI ",
        skip_ws: false,
        ct: "video/avi",
    },
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
        pattern: b"RIFF\x00\x00\x00\x00WAVE",
        skip_ws: false,
        ct: "audio/wave",
    },
    Signature::Mp4,
    Signature::Prefix(b"\x1A\x45\xDF\xA3", "video/webm"),
    Signature::Prefix(b"\x00\x01\x00\x00", "font/ttf"),
    Signature::Prefix(b"OTTO", "font/otf"),
    Signature::Prefix(b"ttcf", "font/collection"),
    Signature::Prefix(b"wOFF", "font/woff"),
    Signature::Prefix(b"wOF2", "font/woff2"),
    Signature::Prefix(b"\x1F\x8B\x08", "application/x-gzip"),
    Signature::Prefix(b"PK\x03\x04", "application/zip"),
    Signature::Prefix(b"Rar!\x1A\x07\x00", "application/x-rar-compressed"),
    Signature::Prefix(b"Rar!\x1A\x07\x01\x00", "application/x-rar-compressed"),
    Signature::Prefix(b"\x00\x61\x73\x6D", "application/wasm"),
    Signature::Text,
];

/// Classify content by its leading bytes
///
/// Only the first [`SNIFF_LEN`] bytes are considered. Returns `None` when no
/// signature matches and the data looks binary.
pub fn sniff(data: &[u8]) -> Option<&'static str> {
    let data = &data[..data.len().min(SNIFF_LEN)];
    let first_non_ws = data.iter().position(|b| !is_ws(*b)).unwrap_or(data.len());

    SIGNATURES.iter().find_map(|sig| match sig {
        Signature::Prefix(prefix, ct) => data.starts_with(prefix).then_some(*ct),
        Signature::Masked {
            mask,
            pattern,
            skip_ws,
            ct,
        } => {
            let data = if *skip_ws {
                &data[first_non_ws..]
            } else {
                data
            };
            masked_match(data, mask, pattern).then_some(*ct)
        }
        Signature::Html(tag) => html_match(&data[first_non_ws..], tag).then_some(HTML),
        Signature::Mp4 => is_mp4(data).then_some("video/mp4"),
        Signature::Text => (!data.iter().any(|b| is_binary(*b))).then_some("text/plain; charset=utf-8"),
    })
}

fn masked_match(data: &[u8], mask: &[u8], pattern: &[u8]) -> bool {
    data.len() >= pattern.len()
        && data
            .iter()
            .zip(mask.iter().zip(pattern))
            .all(|(d, (m, p))| d & m == *p)
}

fn html_match(data: &[u8], tag: &[u8]) -> bool {
    if data.len() < tag.len() + 1 {
        return false;
    }
    let matches = data
        .iter()
        .zip(tag)
        .all(|(d, t)| if t.is_ascii_uppercase() { d.to_ascii_uppercase() == *t } else { d == t });
    matches && matches!(data[tag.len()], b' ' | b'>')
}

fn is_mp4(data: &[u8]) -> bool {
    if data.len() < 12 {
        return false;
    }
    let box_size = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if data.len() < box_size || box_size % 4 != 0 || &data[4..8] != b"ftyp" {
        return false;
    }
    (8..box_size)
        .step_by(4)
        .filter(|&offset| offset != 12)
        .any(|offset| data.get(offset..offset + 3) == Some(b"mp4".as_slice()))
}

fn is_ws(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | b'\x0C' | b'\r' | b' ')
}

fn is_binary(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}
