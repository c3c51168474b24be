use thiserror::Error;

/// Why a city name was rejected before reaching the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidCity {
    #[error("Lütfen geçerli bir şehir ismi giriniz.")]
    MissingCity,
    #[error("Şehir ismi en az 2 karakter olmalıdır.")]
    CityTooShort,
}

/// Everything a single lookup can fail with.
///
/// Each variant maps to one HTTP status via [`LookupError::status_code`]; the
/// `Display` text is the message returned to the caller.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("{0}")]
    InvalidInput(InvalidCity),

    #[error("'{city}' şehri bulunamadı. Lütfen şehir ismini kontrol edin.")]
    NotFound { city: String },

    #[error("API anahtarı geçersiz.")]
    UpstreamAuth,

    #[error("Hava durumu servisi hatası: {status}")]
    Upstream { status: u16 },

    #[error("Hava durumu servisi yanıt vermiyor. Lütfen daha sonra tekrar deneyin.")]
    Timeout,

    #[error("İnternet bağlantısı sorunu. Lütfen bağlantınızı kontrol edin.")]
    Connectivity,

    #[error("Beklenmeyen bir hata oluştu: {0}")]
    Unexpected(String),
}

impl LookupError {
    pub fn status_code(&self) -> u16 {
        match self {
            LookupError::InvalidInput(_) => 400,
            LookupError::NotFound { .. } => 404,
            // The credential is a server-side secret, so a rejected key is our fault.
            LookupError::UpstreamAuth => 500,
            LookupError::Upstream { .. } => 500,
            LookupError::Timeout => 504,
            LookupError::Connectivity => 503,
            LookupError::Unexpected(_) => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LookupError::Timeout
        } else if err.is_connect() {
            LookupError::Connectivity
        } else {
            LookupError::Unexpected(err.to_string())
        }
    }
}

impl From<serde_json::Error> for LookupError {
    fn from(err: serde_json::Error) -> Self {
        LookupError::Unexpected(err.to_string())
    }
}
