//! [`TagPicker`]: the per-category selection state behind a tag field.
//!
//! The picker keeps the loaded vocabulary and the current selection in memory.
//! Creating a tag writes through to the store with [`tag::create_tag`], but a
//! failed write does not undo the local addition: the picker then holds a tag
//! the store does not, which the returned [`TagAdded::persisted`] flag reports.

use serde::Serialize;

use crate::{
  Error, Result,
  store::PortalStore,
  tag::{self, Tag, TagCategory, name_key, normalize_name},
};

/// Outcome of [`TagPicker::create`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagAdded {
  pub name:      String,
  /// `false` when the store write failed and the tag exists only locally.
  pub persisted: bool,
}

#[derive(Debug, Clone)]
pub struct TagPicker {
  category:  TagCategory,
  available: Vec<String>,
  selected:  Vec<String>,
}

impl TagPicker {
  pub fn new(category: TagCategory, selected: Vec<String>) -> Self {
    Self { category, available: Vec::new(), selected }
  }

  pub fn category(&self) -> TagCategory { self.category }

  pub fn available(&self) -> &[String] { &self.available }

  pub fn selected(&self) -> &[String] { &self.selected }

  pub fn into_selected(self) -> Vec<String> { self.selected }

  /// Replace the vocabulary with the store's list, or with the built-in
  /// defaults if the store cannot be read.
  pub async fn load<S: PortalStore>(&mut self, store: &S) {
    self.available = match store.list_tags(self.category).await {
      Ok(tags) => tags.into_iter().map(|t: Tag| t.name).collect(),
      Err(e) => {
        tracing::warn!(category = %self.category, error = %e, "loading tags failed, using defaults");
        self.category.defaults().iter().map(|s| (*s).to_owned()).collect()
      }
    };
  }

  pub fn is_selected(&self, name: &str) -> bool { self.selected.iter().any(|t| t == name) }

  /// Select `name` if unselected, otherwise unselect it.
  pub fn toggle(&mut self, name: &str) {
    if let Some(pos) = self.selected.iter().position(|t| t == name) {
      self.selected.remove(pos);
    } else {
      self.selected.push(name.to_owned());
    }
  }

  fn knows(&self, key: &str) -> bool {
    self
      .available
      .iter()
      .chain(self.selected.iter())
      .any(|t| name_key(t) == key)
  }

  /// Create a new tag and select it.
  ///
  /// A name matching (case-insensitively) anything already loaded or
  /// selected, or anything the store already holds, is rejected with
  /// [`Error::DuplicateTag`] and nothing changes.
  pub async fn create<S: PortalStore>(&mut self, store: &S, raw_name: &str) -> Result<TagAdded> {
    let name = normalize_name(raw_name)?;
    if self.knows(&name_key(&name)) {
      return Err(Error::DuplicateTag { category: self.category, name });
    }

    let persisted = match tag::create_tag(store, self.category, &name).await {
      Ok(_) => true,
      Err(e @ Error::DuplicateTag { .. }) => return Err(e),
      Err(e) => {
        tracing::warn!(category = %self.category, %name, error = %e, "tag kept locally after store write failed");
        false
      }
    };

    self.available.push(name.clone());
    self.selected.push(name.clone());
    Ok(TagAdded { name, persisted })
  }
}
