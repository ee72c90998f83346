//! Well-known language tags.
//!
//! Language tags are plain strings: tools may introduce new ones without
//! touching this crate. These constants only name the languages the built-in
//! tools exchange.

pub const HLSL: &str = "HLSL";
pub const GLSL: &str = "GLSL";
pub const SLANG: &str = "Slang";
pub const METAL: &str = "Metal";
pub const DXBC: &str = "DXBC";
pub const DXIL: &str = "DXIL";
pub const SPIRV: &str = "SPIR-V";

/// File extension conventionally used for source in the given language.
///
/// Some compilers infer the input language from the extension, so adapters
/// name their temp input files with it. Unknown languages get `tmp`.
pub fn file_extension(language: &str) -> &'static str {
    match language {
        HLSL => "hlsl",
        GLSL => "glsl",
        SLANG => "slang",
        METAL => "metal",
        DXBC => "dxbc",
        DXIL => "dxil",
        SPIRV => "spv",
        _ => "tmp",
    }
}

/// Language of a source file, guessed from its extension.
pub fn from_extension(extension: &str) -> Option<&'static str> {
    let lang = match extension.to_ascii_lowercase().as_str() {
        "hlsl" | "hlsli" | "fx" => HLSL,
        "glsl" | "vert" | "frag" | "comp" | "geom" | "tesc" | "tese" => GLSL,
        "slang" => SLANG,
        "metal" => METAL,
        "dxbc" | "cso" => DXBC,
        "dxil" => DXIL,
        "spv" | "spirv" => SPIRV,
        _ => return None,
    };
    Some(lang)
}

/// Whether artifacts in `language` are bytecode rather than source text.
pub fn is_binary(language: &str) -> bool {
    matches!(language, DXBC | DXIL | SPIRV)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        assert_eq!(file_extension(HLSL), "hlsl");
        assert_eq!(file_extension(SPIRV), "spv");
        assert_eq!(file_extension(SLANG), "slang");
    }

    #[test]
    fn test_unknown_language_falls_back() {
        assert_eq!(file_extension("WGSL"), "tmp");
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(from_extension("frag"), Some(GLSL));
        assert_eq!(from_extension("HLSL"), Some(HLSL));
        assert_eq!(from_extension("cso"), Some(DXBC));
        assert_eq!(from_extension("txt"), None);
    }

    #[test]
    fn test_binary_languages() {
        assert!(is_binary(SPIRV));
        assert!(is_binary(DXIL));
        assert!(!is_binary(METAL));
    }
}
