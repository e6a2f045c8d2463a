//! CPE 2.2 URI 바인딩 파싱
//!
//! NVD 2.0 피드의 `vuln:product`는 `cpe:/{part}:{vendor}:{product}:{version}...`
//! 형식의 문자열입니다. 관련성 판단은 접두사([`APPLICATION_PREFIX`])만으로 하고,
//! 인덱스 키(vendor, product)가 필요할 때만 [`CpeUri::parse`]로 분해합니다.

use std::fmt;

/// 애플리케이션 CPE 접두사
pub const APPLICATION_PREFIX: &str = "cpe:/a:";

/// 운영체제 CPE 접두사
pub const OPERATING_SYSTEM_PREFIX: &str = "cpe:/o:";

/// 하드웨어 CPE 접두사
pub const HARDWARE_PREFIX: &str = "cpe:/h:";

const URI_SCHEME: &str = "cpe:/";

/// CPE part 구분
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CpePart {
    /// `a` -- 애플리케이션
    Application,
    /// `o` -- 운영체제
    OperatingSystem,
    /// `h` -- 하드웨어
    Hardware,
}

impl CpePart {
    fn from_code(code: &str) -> Option<Self> {
        match code {
            "a" => Some(Self::Application),
            "o" => Some(Self::OperatingSystem),
            "h" => Some(Self::Hardware),
            _ => None,
        }
    }

    /// URI 바인딩의 part 코드
    pub fn code(&self) -> &'static str {
        match self {
            Self::Application => "a",
            Self::OperatingSystem => "o",
            Self::Hardware => "h",
        }
    }
}

impl fmt::Display for CpePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Application => write!(f, "application"),
            Self::OperatingSystem => write!(f, "operating-system"),
            Self::Hardware => write!(f, "hardware"),
        }
    }
}

/// 애플리케이션 CPE인지 접두사로 판단합니다.
pub fn is_application(cpe: &str) -> bool {
    cpe.starts_with(APPLICATION_PREFIX)
}

/// CPE URI 파싱 실패
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CpeParseError {
    /// `cpe:/` 로 시작하지 않음
    #[error("missing 'cpe:/' scheme")]
    MissingScheme,
    /// 알 수 없는 part 코드
    #[error("unknown part '{0}'")]
    UnknownPart(String),
    /// 잘못된 퍼센트 인코딩
    #[error("invalid percent-encoding in '{0}'")]
    InvalidEncoding(String),
}

/// 분해된 CPE URI
///
/// 각 컴포넌트는 퍼센트 디코딩 후 소문자로 정규화됩니다.
/// 비어 있는 컴포넌트는 `None` 입니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpeUri {
    /// part (a / o / h)
    pub part: CpePart,
    /// 벤더
    pub vendor: Option<String>,
    /// 제품
    pub product: Option<String>,
    /// 버전
    pub version: Option<String>,
    /// 업데이트
    pub update: Option<String>,
    /// 에디션
    pub edition: Option<String>,
    /// 언어
    pub language: Option<String>,
}

impl CpeUri {
    /// CPE 2.2 URI 문자열을 파싱합니다.
    pub fn parse(uri: &str) -> Result<Self, CpeParseError> {
        let rest = uri
            .strip_prefix(URI_SCHEME)
            .ok_or(CpeParseError::MissingScheme)?;

        let mut parts = rest.split(':');
        let part_code = parts.next().unwrap_or_default();
        let part = CpePart::from_code(part_code)
            .ok_or_else(|| CpeParseError::UnknownPart(part_code.to_owned()))?;

        let mut next = || -> Result<Option<String>, CpeParseError> {
            match parts.next() {
                Some(raw) if !raw.is_empty() => decode_component(raw).map(Some),
                _ => Ok(None),
            }
        };

        Ok(Self {
            part,
            vendor: next()?,
            product: next()?,
            version: next()?,
            update: next()?,
            edition: next()?,
            language: next()?,
        })
    }

    /// 인덱스 조회 키 `(vendor, product)`
    ///
    /// 둘 중 하나라도 없으면 빈 문자열로 채웁니다.
    pub fn index_key(&self) -> (String, String) {
        (
            self.vendor.clone().unwrap_or_default(),
            self.product.clone().unwrap_or_default(),
        )
    }
}

fn decode_component(raw: &str) -> Result<String, CpeParseError> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = raw
                .get(i + 1..i + 3)
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| CpeParseError::InvalidEncoding(raw.to_owned()))?;
            out.push(hex);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    let decoded =
        String::from_utf8(out).map_err(|_| CpeParseError::InvalidEncoding(raw.to_owned()))?;
    Ok(decoded.to_lowercase())
}
