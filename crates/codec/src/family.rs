use crate::error::{Error, ErrorKind};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// The two kinds of visual code a catalog identifier can be printed as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize), serde(rename_all = "lowercase"))]
pub enum CodeFamily {
    /// 2D matrix code (QR).
    Matrix,
    /// 1D linear barcode (Code 128).
    Linear,
}

impl CodeFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Matrix => "matrix",
            Self::Linear => "linear",
        }
    }

    /// Prefix of the file a rendered code for this family is cached under,
    /// e.g. `qrcode42.png` or `barcode42.png`.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Self::Matrix => "qrcode",
            Self::Linear => "barcode",
        }
    }
}

impl FromStr for CodeFamily {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "matrix" | "qr" | "qrcode" => Ok(Self::Matrix),
            "linear" | "barcode" | "code128" => Ok(Self::Linear),
            other => exn::bail!(ErrorKind::UnknownFamily(other.to_string())),
        }
    }
}

impl Display for CodeFamily {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("matrix", CodeFamily::Matrix)]
    #[case("QR", CodeFamily::Matrix)]
    #[case("qrcode", CodeFamily::Matrix)]
    #[case("linear", CodeFamily::Linear)]
    #[case(" barcode ", CodeFamily::Linear)]
    #[case("Code128", CodeFamily::Linear)]
    fn test_parse(#[case] input: &str, #[case] expected: CodeFamily) {
        assert_eq!(input.parse::<CodeFamily>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "datamatrix".parse::<CodeFamily>().unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnknownFamily(name) if name == "datamatrix"));
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(CodeFamily::Matrix.file_stem(), "qrcode");
        assert_eq!(CodeFamily::Linear.file_stem(), "barcode");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&CodeFamily::Linear).unwrap(), r#""linear""#);
        assert_eq!(serde_json::from_str::<CodeFamily>(r#""matrix""#).unwrap(), CodeFamily::Matrix);
    }
}
