//! Frequently asked questions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqCategory {
    pub id: i32,
    pub name: String,
}

/// A question, answered or still waiting in the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faq {
    pub id: i32,
    pub category_id: Option<i32>,
    pub question: String,
    pub answer: Option<String>,
}

impl Faq {
    pub fn is_answered(&self) -> bool {
        self.answer.as_deref().is_some_and(|a| !a.trim().is_empty())
    }
}

/// A category with its answered questions, as shown on the FAQ page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryFaqs {
    pub category: FaqCategory,
    pub faqs: Vec<Faq>,
}

impl CategoryFaqs {
    /// Group `faqs` under `categories`, keeping category order and dropping
    /// categories with nothing in them. Questions without a known category
    /// are left out.
    pub fn group(categories: &[FaqCategory], faqs: &[Faq]) -> Vec<Self> {
        categories
            .iter()
            .map(|category| Self {
                category: category.clone(),
                faqs: faqs
                    .iter()
                    .filter(|f| f.category_id == Some(category.id))
                    .cloned()
                    .collect(),
            })
            .filter(|group| !group.faqs.is_empty())
            .collect()
    }
}
