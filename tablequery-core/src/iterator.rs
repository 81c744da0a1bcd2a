use crate::{Connection, Result, Row, TableQuery};

/// Forward only cursor over every row of a [`TableQuery`], fetched one page at
/// a time.
///
/// The buffer is refilled lazily: only when [`PagedRowIterator::is_valid`] finds
/// the current page consumed. Once a refill comes back empty the iterator is
/// exhausted and stays so until [`PagedRowIterator::rewind`].
///
/// Used as an [`Iterator`] it yields `Result<Row>`, fetch errors are handed
/// to the caller as they happen and never retried.
pub struct PagedRowIterator<'q, C: Connection> {
    query: &'q mut TableQuery<C>,
    page_size: u64,
    buffer: Vec<Row>,
    position: usize,
    page: u64,
    has_more: bool,
}

impl<'q, C: Connection> PagedRowIterator<'q, C> {
    /// Number of rows for each page.
    pub const ROW_COUNT: u64 = 20;

    pub fn new(query: &'q mut TableQuery<C>) -> Result<Self> {
        Self::with_page_size(query, Self::ROW_COUNT)
    }

    pub fn with_page_size(query: &'q mut TableQuery<C>, page_size: u64) -> Result<Self> {
        let mut result = Self {
            query,
            page_size: page_size.max(1),
            buffer: Vec::new(),
            position: 0,
            page: 1,
            has_more: true,
        };
        result.refill()?;
        Ok(result)
    }

    /// Row under the cursor, `None` when the cursor is past the buffer.
    pub fn current(&self) -> Option<&Row> {
        self.buffer.get(self.position)
    }

    /// Position of the cursor inside the current page.
    pub fn key(&self) -> usize {
        self.position
    }

    pub fn advance(&mut self) {
        self.position += 1;
    }

    /// Whether a row is available under the cursor, fetching the next page
    /// when the current one is consumed.
    pub fn is_valid(&mut self) -> Result<bool> {
        if self.current().is_none() && self.has_more {
            self.refill()?;
        }
        Ok(self.current().is_some())
    }

    /// Fetch the next page into the buffer.
    ///
    /// An empty page marks the iterator as exhausted and leaves the buffer as
    /// it was, a non empty one replaces the buffer. Exhaustion is never
    /// cleared here.
    pub fn refill(&mut self) -> Result<()> {
        let rows = self
            .query
            .fetch_all(None, &[], self.page, self.page_size, &[])?;
        log::debug!(
            "Fetched {} rows of page {} from `{}`",
            rows.len(),
            self.page,
            self.query.table()
        );
        if rows.is_empty() {
            self.has_more = false;
            return Ok(());
        }
        self.reset();
        self.buffer.extend(rows);
        self.page += 1;
        Ok(())
    }

    /// Drop the buffered rows, page counter and exhaustion are untouched.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.position = 0;
    }

    /// Restart from the first page.
    ///
    /// The first page is fetched regardless of exhaustion, only finding rows
    /// there re-arms the iterator.
    pub fn rewind(&mut self) -> Result<()> {
        self.reset();
        self.page = 1;
        self.refill()?;
        if !self.buffer.is_empty() {
            self.has_more = true;
        }
        Ok(())
    }

    /// Page the next refill will request.
    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }
}

impl<'q, C: Connection> Iterator for PagedRowIterator<'q, C> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.is_valid() {
            Ok(true) => {
                let row = self.current().cloned();
                self.advance();
                row.map(Ok)
            }
            Ok(false) => None,
            Err(error) => Some(Err(error)),
        }
    }
}
