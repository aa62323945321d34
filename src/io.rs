use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::io::Cursor;

use crate::canvas::{DEFAULT_CANVAS_SIZE, PixelBuffer, clamp_canvas_size};
use crate::components::tools::Tool;
use crate::error::CodecError;

/// Keyword of the text chunk that carries [`EditorMetadata`].
pub const METADATA_KEYWORD: &str = "TilePaint";
/// Written into every saved file.
pub const METADATA_VERSION: u32 = 2;

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];
const DATA_URL_PREFIX: &str = "data:image/png;base64,";

// ============================================================================
// EDITOR METADATA
// ============================================================================

/// Editor state stored alongside the pixels in a saved PNG.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorMetadata {
    #[serde(default)]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas_size: Option<u32>,
    /// Canvas size as written by version 1 files. Read only.
    #[serde(default, skip_serializing)]
    pub size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_spacing: Option<u32>,
    #[serde(default)]
    pub palette: Vec<String>,
    #[serde(default)]
    pub last_tool: Tool,
}

impl EditorMetadata {
    /// Canvas size, falling back to the legacy key.
    pub fn canvas_size(&self) -> Option<u32> {
        self.canvas_size.or(self.size)
    }

    pub fn to_json(&self) -> Result<String, CodecError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, CodecError> {
        Ok(serde_json::from_str(text)?)
    }
}

// ============================================================================
// PNG ENCODE / DECODE
// ============================================================================

/// Encode 8-bit RGBA pixels as a PNG stream.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, CodecError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(CodecError::Empty);
    }
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, image.width(), image.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(image.as_raw())?;
        writer.finish()?;
    }
    Ok(out)
}

/// Decode any PNG into RGBA8. Palette, grey and 16-bit images are expanded
/// or stripped to 8-bit RGBA.
pub fn decode_png(bytes: &[u8]) -> Result<RgbaImage, CodecError> {
    if !bytes.starts_with(&PNG_SIGNATURE) {
        return Err(CodecError::NotPng);
    }
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;
    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    if info.width == 0 || info.height == 0 {
        return Err(CodecError::Empty);
    }
    convert_to_rgba(&buf[..info.buffer_size()], info.width, info.height, info.color_type)
}

fn convert_to_rgba(buf: &[u8], width: u32, height: u32, color_type: png::ColorType) -> Result<RgbaImage, CodecError> {
    let pixels = width as usize * height as usize;
    let channels = match color_type {
        png::ColorType::Rgba => 4,
        png::ColorType::Rgb => 3,
        png::ColorType::GrayscaleAlpha => 2,
        png::ColorType::Grayscale => 1,
        // EXPAND turns palettes into RGB(A); anything left here is malformed.
        png::ColorType::Indexed => {
            return Err(CodecError::Unsupported("indexed output after expansion".into()));
        }
    };
    if buf.len() < pixels * channels {
        return Err(CodecError::Unsupported(format!(
            "{:?} buffer too small: {} bytes for {}x{}",
            color_type,
            buf.len(),
            width,
            height
        )));
    }

    let mut rgba = Vec::with_capacity(pixels * 4);
    for px in buf[..pixels * channels].chunks_exact(channels) {
        match channels {
            4 => rgba.extend_from_slice(px),
            3 => rgba.extend_from_slice(&[px[0], px[1], px[2], 255]),
            2 => rgba.extend_from_slice(&[px[0], px[0], px[0], px[1]]),
            _ => rgba.extend_from_slice(&[px[0], px[0], px[0], 255]),
        }
    }
    RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| CodecError::Unsupported(format!("cannot build {}x{} image", width, height)))
}

// ============================================================================
// METADATA CHUNKS
// ============================================================================

struct Chunk<'a> {
    kind: [u8; 4],
    data: &'a [u8],
    /// The whole chunk: length, type, data and CRC.
    raw: &'a [u8],
}

fn read_chunks(bytes: &[u8]) -> Result<Vec<Chunk<'_>>, CodecError> {
    if !bytes.starts_with(&PNG_SIGNATURE) {
        return Err(CodecError::NotPng);
    }
    let mut chunks = Vec::new();
    let mut pos = PNG_SIGNATURE.len();
    while pos < bytes.len() {
        let header = bytes.get(pos..pos + 8).ok_or_else(|| CodecError::TruncatedChunk("header".into()))?;
        let len = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;
        let kind = [header[4], header[5], header[6], header[7]];
        let end = pos + 12 + len;
        let raw = bytes
            .get(pos..end)
            .ok_or_else(|| CodecError::TruncatedChunk(String::from_utf8_lossy(&kind).into_owned()))?;
        chunks.push(Chunk {
            kind,
            data: &raw[8..8 + len],
            raw,
        });
        pos = end;
        if &kind == b"IEND" {
            break;
        }
    }
    Ok(chunks)
}

fn write_chunk(out: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    let mut crc = crc32fast::Hasher::new();
    crc.update(kind);
    crc.update(data);
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(data);
    out.extend_from_slice(&crc.finalize().to_be_bytes());
}

/// Keyword of a tEXt/zTXt/iTXt chunk, if this is one.
fn text_keyword<'a>(chunk: &Chunk<'a>) -> Option<&'a [u8]> {
    match &chunk.kind {
        b"tEXt" | b"zTXt" | b"iTXt" => chunk.data.split(|&b| b == 0).next(),
        _ => None,
    }
}

/// Store `text` under `keyword`, replacing every text chunk that already uses
/// it. The new chunk goes right before `IEND`.
pub fn embed_metadata(png_bytes: &[u8], keyword: &str, text: &str) -> Result<Vec<u8>, CodecError> {
    let chunks = read_chunks(png_bytes)?;
    if !chunks.iter().any(|c| &c.kind == b"IEND") {
        return Err(CodecError::TruncatedChunk("IEND".into()));
    }

    let mut out = Vec::with_capacity(png_bytes.len() + keyword.len() + text.len() + 32);
    out.extend_from_slice(&PNG_SIGNATURE);
    for chunk in &chunks {
        if text_keyword(chunk) == Some(keyword.as_bytes()) {
            continue;
        }
        if &chunk.kind == b"IEND" {
            let mut data = keyword.as_bytes().to_vec();
            data.push(0);
            if text.is_ascii() {
                data.extend_from_slice(text.as_bytes());
                write_chunk(&mut out, b"tEXt", &data);
            } else {
                // Uncompressed iTXt, empty language and translated keyword.
                data.extend_from_slice(&[0, 0, 0, 0]);
                data.extend_from_slice(text.as_bytes());
                write_chunk(&mut out, b"iTXt", &data);
            }
        }
        out.extend_from_slice(chunk.raw);
    }
    Ok(out)
}

/// The text stored under `keyword` by a tEXt or uncompressed iTXt chunk.
pub fn extract_metadata(png_bytes: &[u8], keyword: &str) -> Result<Option<String>, CodecError> {
    for chunk in read_chunks(png_bytes)? {
        if text_keyword(&chunk) != Some(keyword.as_bytes()) {
            continue;
        }
        let body = chunk.data.get(keyword.len() + 1..).unwrap_or_default();
        match &chunk.kind {
            // Latin-1 maps one-to-one onto the first 256 code points.
            b"tEXt" => return Ok(Some(body.iter().map(|&b| b as char).collect())),
            b"iTXt" => {
                let [compressed, _method, rest @ ..] = body else {
                    continue;
                };
                if *compressed != 0 {
                    log::warn!("skipping compressed iTXt `{}`", keyword);
                    continue;
                }
                // Skip language tag and translated keyword.
                let mut parts = rest.splitn(3, |&b| b == 0);
                let (Some(_), Some(_), Some(text)) = (parts.next(), parts.next(), parts.next()) else {
                    continue;
                };
                return Ok(Some(String::from_utf8_lossy(text).into_owned()));
            }
            _ => continue,
        }
    }
    Ok(None)
}

// ============================================================================
// LOAD SQUARING
// ============================================================================

/// Side length a loaded image becomes: metadata size, else the image's own
/// side when square, else the default. Always within canvas limits.
pub fn resolve_canvas_size(metadata: Option<&EditorMetadata>, width: u32, height: u32) -> u32 {
    let size = metadata
        .and_then(EditorMetadata::canvas_size)
        .unwrap_or(if width == height { width } else { DEFAULT_CANVAS_SIZE });
    clamp_canvas_size(size)
}

/// Crop to the top-left square and nearest-neighbour resample to `size`.
pub fn fit_to_canvas(image: RgbaImage, size: u32) -> Result<PixelBuffer, CodecError> {
    let side = image.width().min(image.height());
    if side == 0 {
        return Err(CodecError::Empty);
    }
    let square = if image.width() == image.height() {
        image
    } else {
        imageops::crop_imm(&image, 0, 0, side, side).to_image()
    };
    let fitted = if side == size {
        square
    } else {
        imageops::resize(&square, size, size, FilterType::Nearest)
    };
    PixelBuffer::from_image(fitted).ok_or(CodecError::Empty)
}

// ============================================================================
// DATA URLS (OS clipboard bridge)
// ============================================================================

pub fn to_data_url(png_bytes: &[u8]) -> String {
    format!("{}{}", DATA_URL_PREFIX, STANDARD.encode(png_bytes))
}

/// PNG bytes of a `data:image/png;base64,` URL.
pub fn from_data_url(url: &str) -> Option<Vec<u8>> {
    let payload = url.strip_prefix(DATA_URL_PREFIX)?;
    STANDARD.decode(payload.trim()).ok()
}
