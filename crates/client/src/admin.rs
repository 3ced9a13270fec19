//! Admin panel: paginated, searchable catalog table and the mutations behind
//! it.
//!
//! [`AdminState`] is the table model. [`AdminPanel`] owns the state plus an
//! API client and applies each mutation locally only after the server has
//! accepted it, merging the server's copy of the item rather than the form
//! contents. Every call records a [`Notice`] for the UI to show.

use jewelcase_core::catalog::{CatalogItem, CatalogItemInput};
use jewelcase_core::types::DbId;
use jewelcase_core::upload::is_managed_image;

use crate::api::{CatalogApi, UploadedImage};
use crate::error::ClientError;
use crate::search::matches_search;

/// Rows per table page.
pub const PAGE_SIZE: usize = 10;

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// Items matching `search` over name, category and description.
pub fn filter_items<'a>(catalog: &'a [CatalogItem], search: &str) -> Vec<&'a CatalogItem> {
    catalog
        .iter()
        .filter(|item| matches_search(item, search))
        .collect()
}

/// `ceil(filtered / page_size)`; zero when nothing matches.
pub fn page_count(filtered: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    filtered.div_ceil(page_size)
}

/// Pull `page` back into `1..=page_count` (1 when there are no pages).
pub fn clamp_page(page: usize, page_count: usize) -> usize {
    page.min(page_count).max(1)
}

/// Table model for the admin panel.
#[derive(Debug, Clone)]
pub struct AdminState {
    catalog: Vec<CatalogItem>,
    search: String,
    /// 1-based.
    page: usize,
    page_size: usize,
}

impl Default for AdminState {
    fn default() -> Self {
        Self::with_page_size(PAGE_SIZE)
    }
}

impl AdminState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            catalog: Vec::new(),
            search: String::new(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn catalog(&self) -> &[CatalogItem] {
        &self.catalog
    }

    pub fn item(&self, id: DbId) -> Option<&CatalogItem> {
        self.catalog.iter().find(|item| item.id == id)
    }

    /// Replace the whole catalog, keeping the page within range.
    pub fn set_catalog(&mut self, catalog: Vec<CatalogItem>) {
        self.catalog = catalog;
        self.clamp();
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// A new search always starts from the first page.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page;
        self.clamp();
    }

    pub fn next_page(&mut self) {
        self.set_page(self.page + 1);
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.page.saturating_sub(1));
    }

    pub fn filtered(&self) -> Vec<&CatalogItem> {
        filter_items(&self.catalog, &self.search)
    }

    pub fn page_count(&self) -> usize {
        page_count(self.filtered().len(), self.page_size)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.page_count()
    }

    /// Rows on the current page.
    pub fn current_page_items(&self) -> Vec<&CatalogItem> {
        let page = clamp_page(self.page, self.page_count());
        self.filtered()
            .into_iter()
            .skip((page - 1) * self.page_size)
            .take(self.page_size)
            .collect()
    }

    /// Insert `item`, or replace the entry with the same id.
    pub fn upsert(&mut self, item: CatalogItem) {
        match self.catalog.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => *existing = item,
            None => self.catalog.push(item),
        }
        self.clamp();
    }

    pub fn remove(&mut self, id: DbId) -> Option<CatalogItem> {
        let index = self.catalog.iter().position(|item| item.id == id)?;
        let removed = self.catalog.remove(index);
        self.clamp();
        Some(removed)
    }

    fn clamp(&mut self) {
        self.page = clamp_page(self.page, self.page_count());
    }
}

// ---------------------------------------------------------------------------
// Notices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Transient message for the UI (a toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Panel
// ---------------------------------------------------------------------------

/// Admin panel controller over a [`CatalogApi`].
pub struct AdminPanel<A: CatalogApi> {
    api: A,
    state: AdminState,
    authenticated: bool,
    notice: Option<Notice>,
}

impl<A: CatalogApi> AdminPanel<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: AdminState::new(),
            authenticated: false,
            notice: None,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn state(&self) -> &AdminState {
        &self.state
    }

    /// Search and paging are local; they never touch the server.
    pub fn state_mut(&mut self) -> &mut AdminState {
        &mut self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Most recent notice, if any.
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Take the notice so it is shown once.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    fn report<T>(
        &mut self,
        result: Result<T, ClientError>,
        success: &str,
        failure: &str,
    ) -> Result<T, ClientError> {
        match &result {
            Ok(_) => self.notice = Some(Notice::success(success)),
            Err(e) => {
                tracing::error!(error = %e, "{failure}");
                self.notice = Some(Notice::error(failure));
            }
        }
        result
    }

    /// Check credentials with the server and load the catalog on success.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), ClientError> {
        if let Err(e) = self.api.login(username.trim(), password.trim()).await {
            let message = match e.status() {
                Some(401) => "Invalid username or password",
                _ => "Login failed",
            };
            tracing::warn!(error = %e, "Admin login failed");
            self.notice = Some(Notice::error(message));
            return Err(e);
        }

        self.authenticated = true;
        // A failed load keeps its own error notice.
        if self.load().await.is_ok() {
            self.notice = Some(Notice::success("Login successful!"));
        }
        Ok(())
    }

    pub fn logout(&mut self) {
        self.authenticated = false;
        self.notice = Some(Notice::success("Logged out successfully"));
    }

    /// Replace the local catalog with the server's.
    pub async fn load(&mut self) -> Result<(), ClientError> {
        let result = self.api.list().await;
        let result = self.report(
            result,
            "Catalog loaded",
            "Failed to load jewelry data. Make sure the server is running.",
        );
        let items = result?;
        self.state.set_catalog(items);
        Ok(())
    }

    /// Submit the item form: create when it has no id, update otherwise.
    ///
    /// The server's response replaces (update) or is appended to (create)
    /// the local catalog.
    pub async fn save(&mut self, form: CatalogItemInput) -> Result<CatalogItem, ClientError> {
        let (result, success) = match form.id {
            Some(id) => (
                self.api.update(id, &form.fields).await,
                "Item updated successfully",
            ),
            None => (
                self.api.create(&form.fields).await,
                "Item added successfully",
            ),
        };

        let item = self.report(result, success, "Failed to save item")?;
        self.state.upsert(item.clone());
        Ok(item)
    }

    /// Delete an item on the server, then locally.
    ///
    /// If the item's image is a managed upload (`./images/...`), the image
    /// file is deleted too. That second call is best-effort: its failure is
    /// logged and does not undo or fail the item deletion.
    pub async fn delete(&mut self, id: DbId) -> Result<CatalogItem, ClientError> {
        let Some(image) = self.state.item(id).map(|item| item.image.clone()) else {
            self.notice = Some(Notice::error("Failed to delete item"));
            return Err(ClientError::UnknownItem(id));
        };

        let result = self.api.delete(id).await;
        let deleted = self.report(result, "Item deleted successfully", "Failed to delete item")?;

        if is_managed_image(&image) {
            match self.api.delete_image(&image).await {
                Ok(()) => tracing::debug!(item_id = id, image = %image, "Image deleted"),
                Err(e) => {
                    tracing::warn!(item_id = id, image = %image, error = %e, "Image cleanup failed")
                }
            }
        }

        self.state.remove(id);
        Ok(deleted)
    }

    /// Upload an image file; returns the path to store in the item form.
    pub async fn upload_image(
        &mut self,
        filename: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedImage, ClientError> {
        let result = self.api.upload_image(filename, mime, bytes).await;
        self.report(result, "Image uploaded successfully!", "Failed to upload image")
    }

    /// Push the whole local catalog to the server in one bulk replace.
    pub async fn save_all(&mut self) -> Result<usize, ClientError> {
        let items: Vec<CatalogItemInput> = self
            .state
            .catalog()
            .iter()
            .cloned()
            .map(CatalogItemInput::from)
            .collect();

        let result = self.api.save_all(&items).await;
        self.report(result, "All changes saved successfully", "Failed to save changes")
    }
}
