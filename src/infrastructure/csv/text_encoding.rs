// ============================================================
// TEXT ENCODINGS
// ============================================================
// Strict decoders for the encodings Korean spreadsheet exports use

use encoding_rs::{EUC_KR, UTF_8};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// A text encoding the loader may try
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextEncoding {
    /// UTF-8, leading BOM ignored
    #[serde(rename = "utf-8")]
    Utf8,

    /// Windows code page 949 (Unified Hangul Code), a superset of EUC-KR
    Cp949,

    /// EUC-KR restricted to the KS X 1001 byte ranges
    EucKr,
}

impl TextEncoding {
    /// Default fallback order
    pub const LADDER: [TextEncoding; 3] =
        [TextEncoding::Utf8, TextEncoding::Cp949, TextEncoding::EucKr];

    pub fn label(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Cp949 => "cp949",
            TextEncoding::EucKr => "euc-kr",
        }
    }

    /// Decode the whole buffer, or `None` on the first malformed sequence.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
        match self {
            TextEncoding::Utf8 => {
                let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                UTF_8.decode_without_bom_handling_and_without_replacement(body)
            }
            TextEncoding::Cp949 => EUC_KR.decode_without_bom_handling_and_without_replacement(bytes),
            TextEncoding::EucKr => {
                if !is_ks_x_1001(bytes) {
                    return None;
                }
                EUC_KR.decode_without_bom_handling_and_without_replacement(bytes)
            }
        }
    }
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// ASCII plus double-byte pairs with both bytes in 0xA1..=0xFE
fn is_ks_x_1001(bytes: &[u8]) -> bool {
    let in_range = |b: u8| (0xA1..=0xFE).contains(&b);
    let mut iter = bytes.iter().copied();

    while let Some(lead) = iter.next() {
        if lead < 0x80 {
            continue;
        }
        if !in_range(lead) {
            return false;
        }
        match iter.next() {
            Some(trail) if in_range(trail) => {}
            _ => return false,
        }
    }

    true
}
