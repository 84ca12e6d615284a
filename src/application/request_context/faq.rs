//! FAQ accessors.

use std::sync::Arc;

use super::{into_store_error, many, RequestContext};
use crate::domain::errors::{CacheResult, LazyError};
use crate::domain::models::{CategoryFaqs, FaqCategory};
use crate::domain::ports::Querier;

impl<Q: Querier> RequestContext<Q> {
    pub async fn faq_categories(&self) -> CacheResult<Arc<Vec<FaqCategory>>> {
        let querier = &self.querier;
        self.registry("faq_categories")?
            .faq_categories
            .load(|| async move { many(querier.faq_categories().await) })
            .await
            .map_err(LazyError::Fetch)
    }

    /// Answered questions grouped under their categories. Categories with no
    /// answered questions are left out.
    pub async fn all_answered_faq(&self) -> CacheResult<Arc<Vec<CategoryFaqs>>> {
        let registry = self.registry("all_answered_faq")?;
        registry
            .all_answered_faq
            .load(|| async {
                let categories = self.faq_categories().await.map_err(into_store_error)?;
                let faqs = self.querier.answered_faqs(self.user_id).await?;
                Ok(Arc::new(CategoryFaqs::group(&categories, &faqs)))
            })
            .await
            .map_err(LazyError::Fetch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryQuerier;
    use crate::domain::errors::StoreError;
    use crate::domain::models::{Config, Faq};

    async fn seeded() -> Arc<InMemoryQuerier> {
        let querier = Arc::new(InMemoryQuerier::new());
        querier
            .update(|t| {
                t.faq_categories = vec![
                    FaqCategory {
                        id: 1,
                        name: "Accounts".into(),
                    },
                    FaqCategory {
                        id: 2,
                        name: "Forum".into(),
                    },
                ];
                t.faqs = vec![
                    Faq {
                        id: 1,
                        category_id: Some(1),
                        question: "How do I reset my password?".into(),
                        answer: Some("Use the reset link.".into()),
                    },
                    Faq {
                        id: 2,
                        category_id: Some(2),
                        question: "Can I delete a thread?".into(),
                        answer: None,
                    },
                ];
            })
            .await;
        querier
    }

    fn context(querier: &Arc<InMemoryQuerier>) -> RequestContext<InMemoryQuerier> {
        RequestContext::new(Arc::clone(querier), Arc::new(Config::default()), 0)
    }

    #[tokio::test]
    async fn test_answered_faq_reuses_category_slot() {
        let querier = seeded().await;
        let ctx = context(&querier);

        let groups = ctx.all_answered_faq().await.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].category.name, "Accounts");
        assert_eq!(groups[0].faqs[0].id, 1);

        assert_eq!(ctx.faq_categories().await.unwrap().len(), 2);
        ctx.all_answered_faq().await.unwrap();
        assert_eq!(querier.calls("faq_categories"), 1);
        assert_eq!(querier.calls("answered_faqs"), 1);
    }

    #[tokio::test]
    async fn test_answered_faq_failure_is_sticky() {
        let querier = seeded().await;
        querier.fail("answered_faqs", StoreError::Query("timeout".into()));
        let ctx = context(&querier);

        assert_eq!(
            ctx.all_answered_faq().await,
            Err(LazyError::Fetch(StoreError::Query("timeout".into())))
        );
        querier.recover("answered_faqs");
        assert!(ctx.all_answered_faq().await.is_err());
        assert!(ctx.faq_categories().await.is_ok());
    }
}
