//! Scripted in-memory stand-in for a browser session, used to exercise the
//! extractor and paginator without ChromeDriver.

use std::sync::{Arc, Mutex};

use super::extractor;
use super::page::{PageDriver, PageElement, PageError};

#[derive(Clone)]
pub struct FakeHeader {
    pub field: Option<String>,
    pub title: Option<String>,
    pub text: String,
}

#[derive(Clone, Copy, PartialEq)]
enum NextControl {
    /// Clickable; advances to the following page.
    Normal,
    /// Carries the disabled marker in its class list.
    Disabled,
    /// Not rendered at all.
    Missing,
    /// Click always fails as intercepted.
    Intercepted,
    /// Clickable but the page never changes.
    Sticky,
}

#[derive(Clone)]
pub struct FakePage {
    headers: Vec<FakeHeader>,
    rows: Vec<Vec<String>>,
    next: NextControl,
    overlay: bool,
}

impl FakePage {
    pub fn new() -> Self {
        Self {
            headers: Vec::new(),
            rows: Vec::new(),
            next: NextControl::Normal,
            overlay: false,
        }
    }

    pub fn header(mut self, header: FakeHeader) -> Self {
        self.headers.push(header);
        self
    }

    pub fn row(mut self, cells: Vec<&str>) -> Self {
        self.rows.push(cells.into_iter().map(str::to_string).collect());
        self
    }

    pub fn with_disabled_next(mut self) -> Self {
        self.next = NextControl::Disabled;
        self
    }

    pub fn without_next(mut self) -> Self {
        self.next = NextControl::Missing;
        self
    }

    pub fn with_intercepted_next(mut self) -> Self {
        self.next = NextControl::Intercepted;
        self
    }

    pub fn with_sticky_next(mut self) -> Self {
        self.next = NextControl::Sticky;
        self
    }

    pub fn with_overlay(mut self) -> Self {
        self.overlay = true;
        self
    }
}

struct Shared {
    pages: Vec<FakePage>,
    current: usize,
    table_present: bool,
    visits: Vec<usize>,
}

#[derive(Clone)]
pub struct FakeDriver {
    shared: Arc<Mutex<Shared>>,
}

impl FakeDriver {
    pub fn new(pages: Vec<FakePage>) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                table_present: !pages.is_empty(),
                pages,
                current: 0,
                visits: Vec::new(),
            })),
        }
    }

    pub fn single_page(page: FakePage) -> Self {
        Self::new(vec![page])
    }

    /// A page that never renders its data table.
    pub fn without_table() -> Self {
        Self::new(Vec::new())
    }

    /// Page indices that had their rows read, in visit order.
    pub fn pages_visited(&self) -> Vec<usize> {
        self.shared.lock().unwrap().visits.clone()
    }

    pub fn overlay_present(&self) -> bool {
        let shared = self.shared.lock().unwrap();
        shared
            .pages
            .get(shared.current)
            .map(|p| p.overlay)
            .unwrap_or(false)
    }

    fn element(&self, kind: Kind) -> FakeElement {
        FakeElement {
            shared: Arc::clone(&self.shared),
            kind,
        }
    }
}

#[derive(Clone)]
enum Kind {
    Table,
    HeaderCell { index: usize },
    Row { page: usize, index: usize },
    Cell { page: usize, row: usize, col: usize },
    Next { page: usize },
    OverlayClose,
}

#[derive(Clone)]
pub struct FakeElement {
    shared: Arc<Mutex<Shared>>,
    kind: Kind,
}

impl PageElement for FakeElement {
    async fn text(&self) -> Result<String, PageError> {
        let shared = self.shared.lock().unwrap();
        let text = match &self.kind {
            Kind::HeaderCell { index } => shared.pages[shared.current].headers[*index]
                .text
                .clone(),
            Kind::Cell { page, row, col } => shared.pages[*page].rows[*row][*col].clone(),
            Kind::Row { page, index } => shared.pages[*page].rows[*index].join(" "),
            _ => String::new(),
        };
        Ok(text)
    }

    async fn attr(&self, name: &str) -> Result<Option<String>, PageError> {
        let shared = self.shared.lock().unwrap();
        let value = match &self.kind {
            Kind::HeaderCell { index } => {
                let header = &shared.pages[shared.current].headers[*index];
                match name {
                    "field" => header.field.clone(),
                    "title" => header.title.clone(),
                    _ => None,
                }
            }
            Kind::Next { page } if name == "class" => {
                let class = match shared.pages[*page].next {
                    NextControl::Disabled => "Pagination_button__sqGoH disabled",
                    _ => "Pagination_button__sqGoH",
                };
                Some(class.to_string())
            }
            _ => None,
        };
        Ok(value)
    }

    async fn click(&self) -> Result<(), PageError> {
        let mut shared = self.shared.lock().unwrap();
        match &self.kind {
            Kind::Next { page } => match shared.pages[*page].next {
                NextControl::Normal => {
                    if shared.current + 1 < shared.pages.len() {
                        shared.current += 1;
                    }
                    Ok(())
                }
                NextControl::Intercepted => Err(PageError::NotClickable(
                    "element click intercepted".to_string(),
                )),
                _ => Ok(()),
            },
            Kind::OverlayClose => {
                let current = shared.current;
                shared.pages[current].overlay = false;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    async fn scroll_into_view(&self) -> Result<(), PageError> {
        Ok(())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Self>, PageError> {
        if selector != extractor::ROW_CELLS {
            return Ok(Vec::new());
        }

        let shared = self.shared.lock().unwrap();
        let elements = match &self.kind {
            Kind::Row { page, index } => {
                let cells = shared.pages[*page].rows[*index].len();
                (0..cells)
                    .map(|col| FakeElement {
                        shared: Arc::clone(&self.shared),
                        kind: Kind::Cell {
                            page: *page,
                            row: *index,
                            col,
                        },
                    })
                    .collect()
            }
            _ => Vec::new(),
        };
        Ok(elements)
    }

    async fn is_attached(&self) -> Result<bool, PageError> {
        let shared = self.shared.lock().unwrap();
        let attached = match &self.kind {
            Kind::Row { page, .. } | Kind::Cell { page, .. } | Kind::Next { page } => {
                *page == shared.current
            }
            _ => true,
        };
        Ok(attached)
    }
}

impl PageDriver for FakeDriver {
    type Element = FakeElement;

    async fn navigate(&self, _url: &str) -> Result<(), PageError> {
        Ok(())
    }

    async fn find(&self, selector: &str) -> Result<Self::Element, PageError> {
        let shared = self.shared.lock().unwrap();
        let missing = || PageError::NotFound(selector.to_string());

        match selector {
            extractor::TABLE_CONTAINER => {
                if shared.table_present {
                    Ok(self.element(Kind::Table))
                } else {
                    Err(missing())
                }
            }
            extractor::NEXT_BUTTON => {
                let page = shared.current;
                match shared.pages.get(page).map(|p| p.next) {
                    Some(NextControl::Missing) | None => Err(missing()),
                    Some(_) => Ok(self.element(Kind::Next { page })),
                }
            }
            extractor::OVERLAY_CLOSE => {
                if shared.pages.get(shared.current).map(|p| p.overlay) == Some(true) {
                    Ok(self.element(Kind::OverlayClose))
                } else {
                    Err(missing())
                }
            }
            _ => Err(missing()),
        }
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Self::Element>, PageError> {
        let mut shared = self.shared.lock().unwrap();
        let elements = match selector {
            extractor::HEADER_CELLS => {
                let count = shared
                    .pages
                    .get(shared.current)
                    .map(|p| p.headers.len())
                    .unwrap_or(0);
                (0..count)
                    .map(|index| self.element(Kind::HeaderCell { index }))
                    .collect()
            }
            extractor::BODY_ROWS => {
                let page = shared.current;
                shared.visits.push(page);
                let count = shared.pages.get(page).map(|p| p.rows.len()).unwrap_or(0);
                (0..count)
                    .map(|index| self.element(Kind::Row { page, index }))
                    .collect()
            }
            _ => Vec::new(),
        };
        Ok(elements)
    }

    async fn quit(&self) -> Result<(), PageError> {
        Ok(())
    }
}
