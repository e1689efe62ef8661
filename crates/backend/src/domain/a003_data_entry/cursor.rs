use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::NaiveDate;

/// Позиция в списке записей (дата по убыванию, затем id по убыванию)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    pub date: NaiveDate,
    pub id: String,
}

impl PageCursor {
    pub fn new(date: NaiveDate, id: impl Into<String>) -> Self {
        Self {
            date,
            id: id.into(),
        }
    }

    /// Непрозрачный токен для клиента
    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(format!("{}|{}", self.date.format("%Y-%m-%d"), self.id))
    }

    pub fn decode(token: &str) -> anyhow::Result<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|e| anyhow::anyhow!("malformed page token: {}", e))?;
        let raw = String::from_utf8(bytes)
            .map_err(|_| anyhow::anyhow!("malformed page token: not utf-8"))?;
        let (date, id) = raw
            .split_once('|')
            .ok_or_else(|| anyhow::anyhow!("malformed page token"))?;
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| anyhow::anyhow!("malformed page token date: {}", e))?;
        if id.is_empty() {
            anyhow::bail!("malformed page token: empty id");
        }
        Ok(Self::new(date, id))
    }
}
