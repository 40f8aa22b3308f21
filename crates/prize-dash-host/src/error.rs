use prize_dash_core::catalog::CatalogError;

#[derive(Debug)]
pub enum HostError {
    Config(String),
    Catalog(CatalogError),
    Command(String),
}

impl std::fmt::Display for HostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(m) => write!(f, "configuration error: {m}"),
            Self::Catalog(e) => write!(f, "{e}"),
            Self::Command(m) => write!(f, "bad command: {m}"),
        }
    }
}

impl std::error::Error for HostError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Catalog(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CatalogError> for HostError {
    fn from(e: CatalogError) -> Self {
        Self::Catalog(e)
    }
}
