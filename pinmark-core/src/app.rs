pub type DBPool = sqlx::PgPool;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageTitle(String);

impl PageTitle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<PageTitle> for String {
    fn from(t: PageTitle) -> Self {
        t.0
    }
}

impl From<String> for PageTitle {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PageTitle {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
