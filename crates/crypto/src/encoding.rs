//! Base64 text codecs with graceful degradation.
//!
//! Runtimes expose base64 in one of two shapes: a byte-buffer primitive
//! (strict RFC 4648) or a text codec in the `btoa`/`atob` mould, which is
//! lenient about padding and embedded whitespace. Both encode identically,
//! so a token produced by either is accepted gateway-side. When neither is
//! present the codec refuses instead of guessing.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine;

use crate::{CryptoError, Result};

const TEXT_CODEC: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Which base64 primitives the hosting runtime offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Base64Support {
    /// Byte-buffer primitive
    pub byte_buffer: bool,
    /// `btoa`/`atob` style text codec
    pub text_codec: bool,
}

impl Base64Support {
    /// Both primitives present.
    pub const FULL: Self = Self {
        byte_buffer: true,
        text_codec: true,
    };

    /// Only the text codec.
    pub const TEXT_ONLY: Self = Self {
        byte_buffer: false,
        text_codec: true,
    };

    /// Nothing at all.
    pub const NONE: Self = Self {
        byte_buffer: false,
        text_codec: false,
    };
}

/// The base64 codec a provider ended up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Base64Codec {
    /// Strict byte-buffer codec
    #[default]
    ByteBuffer,
    /// Lenient text codec
    TextCodec,
    /// No primitive; every call fails
    Unavailable,
}

impl Base64Codec {
    /// Pick the best codec: byte buffer, then text codec, then nothing.
    #[must_use]
    pub fn select(support: Base64Support) -> Self {
        if support.byte_buffer {
            Self::ByteBuffer
        } else if support.text_codec {
            Self::TextCodec
        } else {
            Self::Unavailable
        }
    }

    /// Encode raw bytes.
    ///
    /// `owner` names the provider in the error when no codec exists.
    pub fn encode_bytes(self, owner: &str, bytes: &[u8]) -> Result<String> {
        match self {
            Self::ByteBuffer => Ok(STANDARD.encode(bytes)),
            Self::TextCodec => Ok(TEXT_CODEC.encode(bytes)),
            Self::Unavailable => Err(CryptoError::unsupported(
                owner,
                "base64_encode",
                "Base64 encoding not available",
            )),
        }
    }

    /// Encode UTF-8 text.
    pub fn encode(self, owner: &str, data: &str) -> Result<String> {
        self.encode_bytes(owner, data.as_bytes())
    }

    /// Decode base64 back into UTF-8 text.
    pub fn decode(self, owner: &str, data: &str) -> Result<String> {
        let bytes = match self {
            Self::ByteBuffer => STANDARD
                .decode(data)
                .map_err(|e| CryptoError::Encoding(e.to_string()))?,
            Self::TextCodec => {
                let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
                TEXT_CODEC
                    .decode(compact)
                    .map_err(|e| CryptoError::Encoding(e.to_string()))?
            }
            Self::Unavailable => {
                return Err(CryptoError::unsupported(
                    owner,
                    "base64_decode",
                    "Base64 decoding not available",
                ));
            }
        };

        String::from_utf8(bytes)
            .map_err(|e| CryptoError::Encoding(format!("decoded payload is not UTF-8: {e}")))
    }
}
