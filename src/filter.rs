//! Client-side search over a composite key.

use crate::model::{Course, Tutor};

/// Something that can be found by typing part of its composite key
pub trait Searchable {
    fn search_key(&self) -> String;
}

impl Searchable for Course {
    fn search_key(&self) -> String {
        format!("{}{}", self.code, self.name)
    }
}

impl Searchable for Tutor {
    fn search_key(&self) -> String {
        format!("{}{}{}", self.username, self.firstname, self.lastname)
    }
}

/// The query as typed plus its upper-cased form, recomputed per keystroke
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub original: String,
    pub uppercase: String,
}

impl Filter {
    pub fn new(query: &str) -> Self {
        Self {
            original: query.to_string(),
            uppercase: query.to_uppercase(),
        }
    }

    pub fn set(&mut self, query: &str) {
        *self = Self::new(query);
    }

    pub fn matches<T: Searchable>(&self, item: &T) -> bool {
        item.search_key().to_uppercase().contains(&self.uppercase)
    }

    /// Matching items in their original order
    pub fn apply<'a, T: Searchable>(&self, items: &'a [T]) -> Vec<&'a T> {
        items.iter().filter(|item| self.matches(*item)).collect()
    }
}
