use serde::{Deserialize, Serialize};

/// Какую страницу загрузить
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageAction {
    Next,
    Previous,
    Index(usize),
}

/// Учет курсоров постраничного списка на стороне клиента.
///
/// Страница 0 загружается без курсора; курсор страницы N+1 становится
/// известен только после загрузки страницы N.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageTokens {
    tokens: Vec<Option<String>>,
    current: usize,
    has_more: bool,
}

impl Default for PageTokens {
    fn default() -> Self {
        Self {
            tokens: vec![None],
            current: 0,
            has_more: true,
        }
    }
}

impl PageTokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_page(&self) -> usize {
        self.current
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Количество страниц, для которых известен курсор
    pub fn known_pages(&self) -> usize {
        self.tokens.len()
    }

    /// Номер страницы для действия и ее курсор. None, если курсор страницы еще неизвестен.
    pub fn target(&self, action: PageAction) -> Option<(usize, Option<String>)> {
        let page = match action {
            PageAction::Next if self.has_more => self.current + 1,
            PageAction::Previous if self.current > 0 => self.current - 1,
            PageAction::Index(i) => i,
            _ => self.current,
        };
        self.tokens.get(page).map(|token| (page, token.clone()))
    }

    /// Запомнить результат загрузки страницы `page`
    pub fn record(&mut self, page: usize, next_token: Option<String>) {
        self.current = page;
        match next_token {
            Some(token) => {
                if !self.tokens.iter().any(|t| t.as_deref() == Some(token.as_str())) {
                    self.tokens.push(Some(token));
                }
                self.has_more = true;
            }
            None => self.has_more = false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page_has_no_token() {
        let pages = PageTokens::new();
        assert_eq!(pages.target(PageAction::Index(0)), Some((0, None)));
        assert_eq!(pages.target(PageAction::Next), None);
    }

    #[test]
    fn test_walk_forward_and_back() {
        let mut pages = PageTokens::new();
        pages.record(0, Some("t1".into()));
        assert_eq!(pages.target(PageAction::Next), Some((1, Some("t1".into()))));

        pages.record(1, Some("t2".into()));
        pages.record(2, None);
        assert!(!pages.has_more());
        assert_eq!(pages.known_pages(), 3);
        // на последней странице "next" остается на месте
        assert_eq!(pages.target(PageAction::Next), Some((2, Some("t2".into()))));
        assert_eq!(pages.target(PageAction::Previous), Some((1, Some("t1".into()))));
    }

    #[test]
    fn test_record_does_not_duplicate_tokens() {
        let mut pages = PageTokens::new();
        pages.record(0, Some("t1".into()));
        pages.record(0, Some("t1".into()));
        assert_eq!(pages.known_pages(), 2);
        assert!(pages.has_more());
    }

    #[test]
    fn test_previous_on_first_page_stays() {
        let pages = PageTokens::new();
        assert_eq!(pages.target(PageAction::Previous), Some((0, None)));
    }
}
