//! Service name formatting strategies.

use unicode_normalization::UnicodeNormalization;

/// Produces the name written to the `.ch2` file.
pub trait NameFormatter: Send + Sync {
    /// `half_width_name` is the source's own half-width rendering, if it has one.
    fn format_name(&self, name: &str, half_width_name: Option<&str>) -> String;
}

/// Keep the service name as broadcast.
#[derive(Debug, Clone, Copy, Default)]
pub struct Verbatim;

impl NameFormatter for Verbatim {
    fn format_name(&self, name: &str, _half_width_name: Option<&str>) -> String {
        name.to_string()
    }
}

/// Unicode NFKC: full-width alphanumerics become ASCII, half-width katakana
/// become full-width.
#[derive(Debug, Clone, Copy, Default)]
pub struct Nfkc;

impl NameFormatter for Nfkc {
    fn format_name(&self, name: &str, half_width_name: Option<&str>) -> String {
        half_width_name.unwrap_or(name).nfkc().collect()
    }
}

/// Pick the formatter for the `--normalize` switch.
pub fn formatter(normalize: bool) -> Box<dyn NameFormatter> {
    if normalize {
        Box::new(Nfkc)
    } else {
        Box::new(Verbatim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbatim() {
        assert_eq!(
            Verbatim.format_name("ＮＨＫ総合１・東京", Some("NHK総合1・東京")),
            "ＮＨＫ総合１・東京"
        );
    }

    #[test]
    fn test_nfkc_full_width() {
        assert_eq!(Nfkc.format_name("ＮＨＫ総合１・東京", None), "NHK総合1・東京");
        assert_eq!(Nfkc.format_name("ＢＳ日テレ", None), "BS日テレ");
        assert_eq!(Nfkc.format_name("ＴＯＫＹＯ　ＭＸ１", None), "TOKYO MX1");
    }

    #[test]
    fn test_nfkc_half_width_katakana() {
        assert_eq!(Nfkc.format_name("ﾃﾚﾋﾞ東京", None), "テレビ東京");
    }

    #[test]
    fn test_nfkc_prefers_half_width_name() {
        assert_eq!(
            Nfkc.format_name("ＮＨＫ総合１・東京", Some("NHK総合1・東京")),
            "NHK総合1・東京"
        );
    }

    #[test]
    fn test_formatter_switch() {
        assert_eq!(formatter(true).format_name("ＢＳ１", None), "BS1");
        assert_eq!(formatter(false).format_name("ＢＳ１", None), "ＢＳ１");
    }
}
